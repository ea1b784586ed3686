use crate::TextBy;
use crate::scrape::{
    Cta, FooterInfo, FormField, HeaderInfo, Heading, Image, MainContent, PageStructure,
    PricePoint, SalesElement, ScrapedPage, Section,
};

use anyhow::Result;
use dom_smoothie::{Article, CandidateSelectMode, Config, Readability, TextMode};
use html2md;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector as ScraperSelector};

static TESTIMONIAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)testimonial|review|customer|feedback|quote|social-proof|endorsement")
        .expect("Failed to compile testimonial regex")
});
static BUTTON_CLASS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)button|btn|cta").expect("Failed to compile button regex"));
static PRICE_CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)price|cost|fee|pricing").expect("Failed to compile price class regex")
});
static SECTION_CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)section|container").expect("Failed to compile section class regex")
});
static PRICE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*(\d+(?:\.\d{2})?)").expect("Failed to compile price regex"));

const BENEFIT_PATTERNS: [&str; 7] = [
    "benefit",
    "feature",
    "advantage",
    "why",
    "what you get",
    "what you'll learn",
    "what you'll receive",
];
const SECTION_HEADINGS: [&str; 3] = ["h2", "h3", "h4"];
const PRICE_CONTEXT_CHARS: usize = 30;
const MIN_SECTION_TEXT: usize = 50;

/// Parses a fetched landing page into a [`ScrapedPage`].
///
/// # Arguments
///
/// * `url` - The URL the HTML was fetched from.
/// * `html` - The raw HTML content.
/// * `text_by` - The method to use for main text extraction (dom_smoothie or fast_html2md).
///
/// # Errors
///
/// Returns an error if one of the internal CSS selectors fails to compile.
pub fn parse_page(url: &str, html: &str, text_by: TextBy) -> Result<ScrapedPage> {
    let document = Html::parse_document(html);
    let main_text = extract_main_text(html, text_by);

    let headings = document
        .select(&selector("h1, h2, h3")?)
        .map(|element| Heading {
            level: element.value().name().to_string(),
            text: element_text(&element),
        })
        .filter(|heading| !heading.text.is_empty())
        .collect();

    let images = document
        .select(&selector("img[src]")?)
        .map(|element| Image {
            url: attr(&element, "src"),
            alt: attr(&element, "alt"),
        })
        .collect();

    Ok(ScrapedPage {
        url: url.to_string(),
        title: parse_title(&document).unwrap_or_default(),
        meta_description: document
            .select(&selector(r#"meta[name="description"]"#)?)
            .next()
            .map(|meta| attr(&meta, "content"))
            .unwrap_or_default(),
        headings,
        sales_elements: extract_sales_elements(&document)?,
        images,
        ctas: extract_ctas(&document)?,
        pricing: extract_pricing(&document, &main_text)?,
        structure: analyze_structure(&document)?,
        main_text,
    })
}

/// Extracts the readable main text of a page.
///
/// Falls back to the Markdown conversion when readability extraction fails.
pub fn extract_main_text(html: &str, text_by: TextBy) -> String {
    match text_by {
        TextBy::DomSmoothie => {
            let config = Config {
                text_mode: TextMode::Markdown,
                candidate_select_mode: CandidateSelectMode::DomSmoothie,
                ..Default::default()
            };

            let article: Result<Article> = Readability::new(html, None, Some(config))
                .and_then(|mut readability| readability.parse())
                .map_err(|e| anyhow::anyhow!("{e}"));

            match article {
                Ok(article) => article.text_content.to_string(),
                Err(err) => {
                    warn!("Readability extraction failed ({err}), converting whole page");
                    html2md::parse_html(html, false)
                }
            }
        }
        TextBy::FastHtml2Md => html2md::parse_html(html, false),
    }
}

/// Parses the title from the document, preferring `<title>` over the first heading.
fn parse_title(document: &Html) -> Option<String> {
    for tag in ["title", "h1", "h2"] {
        if let Ok(tag_selector) = ScraperSelector::parse(tag)
            && let Some(tag_element) = document.select(&tag_selector).next()
        {
            let tag_text = element_text(&tag_element);
            if !tag_text.is_empty() {
                return Some(tag_text);
            }
        }
    }

    None
}

fn extract_sales_elements(document: &Html) -> Result<Vec<SalesElement>> {
    let mut sales_elements = Vec::new();
    let item_selector = selector("li")?;

    for list in document.select(&selector("ul, ol")?) {
        let items: Vec<String> = list
            .select(&item_selector)
            .map(|item| element_text(&item))
            .filter(|item| !item.is_empty())
            .collect();
        if !items.is_empty() {
            sales_elements.push(SalesElement::List { items });
        }
    }

    let testimonials: Vec<String> = document
        .select(&selector("[class], [id]")?)
        .filter(|element| {
            ["class", "id"].iter().any(|name| {
                element
                    .value()
                    .attr(name)
                    .is_some_and(|value| TESTIMONIAL_REGEX.is_match(value))
            })
        })
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
        .collect();
    if !testimonials.is_empty() {
        sales_elements.push(SalesElement::Testimonials {
            items: testimonials,
        });
    }

    for heading in document.select(&selector("h2, h3, h4")?) {
        let heading_text = element_text(&heading).to_lowercase();
        if !BENEFIT_PATTERNS
            .iter()
            .any(|pattern| heading_text.contains(pattern))
        {
            continue;
        }

        let mut content = Vec::new();
        for sibling in heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|sibling| !SECTION_HEADINGS.contains(&sibling.value().name()))
        {
            match sibling.value().name() {
                "p" => content.push(element_text(&sibling)),
                "ul" | "ol" => content.extend(
                    sibling
                        .select(&item_selector)
                        .map(|item| element_text(&item)),
                ),
                _ => {}
            }
        }

        content.retain(|text| !text.is_empty());
        if !content.is_empty() {
            sales_elements.push(SalesElement::Benefits {
                heading: heading_text,
                content,
            });
        }
    }

    Ok(sales_elements)
}

fn extract_ctas(document: &Html) -> Result<Vec<Cta>> {
    let mut ctas = Vec::new();

    for button in document.select(&selector("button, a")?) {
        if !has_class_matching(&button, &BUTTON_CLASS_REGEX) {
            continue;
        }
        let text = element_text(&button);
        if text.is_empty() {
            continue;
        }
        let url = if button.value().name() == "a" {
            attr(&button, "href")
        } else {
            String::new()
        };
        ctas.push(Cta::Button { text, url });
    }

    let field_selector = selector("input, textarea, select")?;
    let submit_selector = selector(r#"input[type="submit"], button[type="submit"]"#)?;
    for form in document.select(&selector("form")?) {
        let elements: Vec<FormField> = form
            .select(&field_selector)
            .filter(|field| {
                !matches!(
                    field.value().attr("type"),
                    Some("hidden") | Some("submit")
                )
            })
            .map(|field| FormField {
                field_type: field
                    .value()
                    .attr("type")
                    .unwrap_or(field.value().name())
                    .to_string(),
                name: attr(&field, "name"),
                placeholder: attr(&field, "placeholder"),
            })
            .filter(|field| !field.name.is_empty() || !field.placeholder.is_empty())
            .collect();

        let submit_text = form
            .select(&submit_selector)
            .next()
            .map(|submit| {
                let text = if submit.value().name() == "input" {
                    attr(&submit, "value")
                } else {
                    element_text(&submit)
                };
                if text.is_empty() {
                    "Submit".to_string()
                } else {
                    text
                }
            })
            .unwrap_or_default();

        if !elements.is_empty() {
            ctas.push(Cta::Form {
                elements,
                submit_text,
            });
        }
    }

    Ok(ctas)
}

/// Collects price points from elements with price-like classes, titled by the
/// closest preceding heading. Falls back to `$` amounts found in `text`.
fn extract_pricing(document: &Html, text: &str) -> Result<Vec<PricePoint>> {
    let mut pricing = Vec::new();
    let mut last_heading = String::new();

    for element in document.select(&selector("h2, h3, h4, [class]")?) {
        if SECTION_HEADINGS.contains(&element.value().name()) {
            last_heading = element_text(&element);
            continue;
        }
        if !has_class_matching(&element, &PRICE_CLASS_REGEX) {
            continue;
        }

        let price_text = element_text(&element);
        let amount = PRICE_REGEX
            .captures(&price_text)
            .and_then(|caps| caps.get(1))
            .map(|amount| amount.as_str().to_string());
        if let Some(amount) = amount {
            pricing.push(PricePoint {
                title: last_heading.clone(),
                amount,
                text: price_text,
            });
        }
    }

    if pricing.is_empty() {
        for caps in PRICE_REGEX.captures_iter(text) {
            let (Some(whole), Some(amount)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            pricing.push(PricePoint {
                title: String::new(),
                amount: amount.as_str().to_string(),
                text: surrounding_text(text, whole.start(), whole.end()),
            });
        }
    }

    Ok(pricing)
}

fn surrounding_text(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(PRICE_CONTEXT_CHARS);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = end.saturating_add(PRICE_CONTEXT_CHARS).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    text.get(from..to).unwrap_or_default().trim().to_string()
}

fn analyze_structure(document: &Html) -> Result<PageStructure> {
    let nav_selector = selector("nav")?;
    let header = document
        .select(&selector("header")?)
        .next()
        .map(|header| HeaderInfo {
            content: element_text(&header),
            has_nav: header.select(&nav_selector).next().is_some(),
        });

    let footer = document
        .select(&selector("footer")?)
        .next()
        .map(|footer| FooterInfo {
            content: element_text(&footer),
        });

    let main_content = document
        .select(&selector("main")?)
        .next()
        .or_else(|| {
            selector("body > div").ok().and_then(|divs| {
                document
                    .select(&divs)
                    .max_by_key(|div| element_text(div).chars().count())
            })
        })
        .map(|main| MainContent {
            text_length: element_text(&main).chars().count(),
        });

    let heading_selector = selector("h1, h2, h3")?;
    let image_selector = selector("img")?;
    let form_selector = selector("form")?;
    let button_selector = selector("button, a")?;
    let sections = document
        .select(&selector("section[class], div[class]")?)
        .filter(|section| has_class_matching(section, &SECTION_CLASS_REGEX))
        .map(|section| (element_text(&section), section))
        .filter(|(text, _)| text.chars().count() > MIN_SECTION_TEXT)
        .map(|(text, section)| Section {
            heading: section
                .select(&heading_selector)
                .next()
                .map(|heading| element_text(&heading))
                .unwrap_or_default(),
            text_length: text.chars().count(),
            has_image: section.select(&image_selector).next().is_some(),
            has_form: section.select(&form_selector).next().is_some(),
            has_button: section
                .select(&button_selector)
                .any(|button| has_class_matching(&button, &BUTTON_CLASS_REGEX)),
        })
        .collect();

    Ok(PageStructure {
        header,
        main_content,
        footer,
        sections,
    })
}

fn selector(query: &str) -> Result<ScraperSelector> {
    ScraperSelector::parse(query).map_err(|e| anyhow::anyhow!("Invalid CSS selector {query}: {e}"))
}

/// Collapses the text content of an element into single-spaced text.
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn attr(element: &ElementRef, name: &str) -> String {
    element.value().attr(name).unwrap_or_default().to_string()
}

fn has_class_matching(element: &ElementRef, pattern: &Regex) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| pattern.is_match(class))
}
