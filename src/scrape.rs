//! The scrape module fetches a landing page and turns it into a [`ScrapedPage`]
//! record consumed by the analyzer.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::BROWSER_USER_AGENT;
use crate::parse::parse_page;
use crate::{ScrapeMode, TextBy};

/// Structured content extracted from a landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub main_text: String,
    pub headings: Vec<Heading>,
    pub sales_elements: Vec<SalesElement>,
    pub images: Vec<Image>,
    pub ctas: Vec<Cta>,
    pub pricing: Vec<PricePoint>,
    pub structure: PageStructure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Tag name, e.g. `h2`.
    #[serde(rename = "type")]
    pub level: String,
    pub text: String,
}

/// A block of the page that looks like part of the sales pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SalesElement {
    List { items: Vec<String> },
    Testimonials { items: Vec<String> },
    Benefits { heading: String, content: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// Call to action found on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cta {
    Button {
        text: String,
        url: String,
    },
    Form {
        elements: Vec<FormField>,
        submit_text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub title: String,
    pub amount: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStructure {
    pub header: Option<HeaderInfo>,
    pub main_content: Option<MainContent>,
    pub footer: Option<FooterInfo>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub content: String,
    pub has_nav: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainContent {
    pub text_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterInfo {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub text_length: usize,
    pub has_image: bool,
    pub has_form: bool,
    pub has_button: bool,
}

/// Fetches a landing page and extracts its content.
///
/// # Arguments
///
/// * `url` - The landing page URL
/// * `mode` - Whether to produce the placeholder page or fetch the real one
/// * `text_by` - Main text extraction method used in live mode
///
/// # Returns
///
/// Returns `Ok(None)` when the URL is not an absolute URL with a host, or when
/// the server answers with a non-success status.
///
/// # Errors
///
/// Returns an error if the HTTP request itself fails or the page cannot be parsed.
pub async fn fetch(url: &str, mode: ScrapeMode, text_by: TextBy) -> Result<Option<ScrapedPage>> {
    debug!("Scraping URL: {url}");

    let parsed_url = match Url::parse(url) {
        Ok(parsed_url) if parsed_url.host_str().is_some() => parsed_url,
        _ => {
            error!("Invalid URL: {url}");
            return Ok(None);
        }
    };

    match mode {
        ScrapeMode::Placeholder => Ok(Some(placeholder_page(&parsed_url))),
        ScrapeMode::Live => fetch_live(&parsed_url, text_by).await,
    }
}

async fn fetch_live(url: &Url, text_by: TextBy) -> Result<Option<ScrapedPage>> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .context("Unable to build HTTP client")?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    if !response.status().is_success() {
        warn!("Skipping {url} as {}", response.status());
        return Ok(None);
    }

    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?;

    let page = parse_page(url.as_str(), &html, text_by)?;
    info!(
        "Scraped {url}: {} headings, {} sales elements, {} price points",
        page.headings.len(),
        page.sales_elements.len(),
        page.pricing.len()
    );

    if page.title.is_empty() && page.main_text.trim().is_empty() {
        warn!("No content could be extracted from {url}");
        return Ok(None);
    }

    Ok(Some(page))
}

fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Builds the deterministic sample page used instead of a real fetch.
pub fn placeholder_page(url: &Url) -> ScrapedPage {
    let domain = url.host_str().unwrap_or_default();
    let path = url.path();

    let benefits = string_list(&[
        "Save time and increase productivity",
        "Improve results with our proven system",
        "Access exclusive resources and community",
        "Learn from industry experts and professionals",
        "Implement strategies that actually work",
    ]);
    let testimonials = string_list(&[
        "This product completely changed how I approach the problem. I've seen a 300% improvement!",
        "I wish I had found this years ago. The value is incredible.",
        "The support and community alone make this worth every penny.",
    ]);

    let main_text = format!(
        "Welcome to our premium offer at {domain}{path}.\n\
         This is a comprehensive solution designed to help you achieve your goals faster.\n\
         Our product has been carefully created to solve the biggest challenges you face.\n\n\
         KEY BENEFITS:\n{}\n\n\
         Don't miss this opportunity to transform your results.\n\n\
         OUR CUSTOMERS SAY:\n{}\n\n\
         PRICING OPTIONS:\n\
         Basic package: $97 one-time payment\n\
         Premium package: $197 one-time payment\n\
         Complete solution: $497 one-time payment\n\n\
         LIMITED TIME OFFER:\n\
         Act now and receive 50% off plus our exclusive bonuses worth over $1,000!\n\n\
         GUARANTEE:\n\
         We stand behind our product with a 30-day money-back guarantee.",
        benefits
            .iter()
            .map(|benefit| format!("- {benefit}"))
            .collect::<Vec<_>>()
            .join("\n"),
        testimonials
            .iter()
            .map(|quote| format!("\"{quote}\""))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    ScrapedPage {
        url: url.to_string(),
        title: format!("Sales Page for {domain}"),
        meta_description: format!("Premium product offering from {domain}"),
        main_text,
        headings: placeholder_headings(domain),
        sales_elements: vec![
            SalesElement::List { items: benefits },
            SalesElement::Testimonials {
                items: testimonials,
            },
        ],
        images: vec![
            Image {
                url: "https://via.placeholder.com/600x400".to_string(),
                alt: "Product showcase".to_string(),
            },
            Image {
                url: "https://via.placeholder.com/300x300".to_string(),
                alt: "Customer results".to_string(),
            },
        ],
        ctas: placeholder_ctas(),
        pricing: [
            ("Basic Package", "97", "Basic package: $97 one-time payment"),
            ("Premium Package", "197", "Premium package: $197 one-time payment"),
            ("Complete Solution", "497", "Complete solution: $497 one-time payment"),
        ]
        .iter()
        .map(|(title, amount, text)| PricePoint {
            title: (*title).to_string(),
            amount: (*amount).to_string(),
            text: (*text).to_string(),
        })
        .collect(),
        structure: placeholder_structure(),
    }
}

fn placeholder_headings(domain: &str) -> Vec<Heading> {
    [
        ("h1", format!("Premium Solution from {domain}")),
        ("h2", "Key Benefits".to_string()),
        ("h2", "Customer Testimonials".to_string()),
        ("h2", "Pricing Options".to_string()),
        ("h3", "Limited Time Offer".to_string()),
    ]
    .into_iter()
    .map(|(level, text)| Heading {
        level: level.to_string(),
        text,
    })
    .collect()
}

fn placeholder_ctas() -> Vec<Cta> {
    vec![
        Cta::Button {
            text: "Get Started Now".to_string(),
            url: "#order".to_string(),
        },
        Cta::Form {
            elements: vec![
                FormField {
                    field_type: "text".to_string(),
                    name: "name".to_string(),
                    placeholder: "Your Name".to_string(),
                },
                FormField {
                    field_type: "email".to_string(),
                    name: "email".to_string(),
                    placeholder: "Your Email".to_string(),
                },
            ],
            submit_text: "Claim Your Discount".to_string(),
        },
    ]
}

fn placeholder_structure() -> PageStructure {
    let section = |heading: &str, text_length, has_image, has_form, has_button| Section {
        heading: heading.to_string(),
        text_length,
        has_image,
        has_form,
        has_button,
    };

    PageStructure {
        header: Some(HeaderInfo {
            content: "Header navigation".to_string(),
            has_nav: true,
        }),
        main_content: Some(MainContent { text_length: 1500 }),
        footer: Some(FooterInfo {
            content: "Footer links and copyright".to_string(),
        }),
        sections: vec![
            section("Key Benefits", 300, true, false, false),
            section("Customer Testimonials", 400, true, false, false),
            section("Pricing Options", 200, false, false, true),
            section("Order Now", 150, false, true, true),
        ],
    }
}
