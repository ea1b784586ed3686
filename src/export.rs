//! The export module renders a project's funnel and email sequence into a zip
//! archive of static pages, ready to upload to any web host.

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, error, info};
use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::copy::MainPageCopy;
use crate::email::EmailSequence;
use crate::flow::{FlowNode, MAIN_NODE_ID, THANK_YOU_NODE_ID, downsell_id, find_node, upsell_id};
use crate::funnel::Funnel;
use crate::offer::Offer;
use crate::storage::Project;
use crate::template::{PageKind, TemplateSet, escape_html, fill};

const STYLESHEET: &str = include_str!("../templates/style.css");
const FLOW_SCRIPT: &str = include_str!("../templates/funnel.js");

/// Writes the export archive of a project to `<exports_dir>/<project id>.zip`.
///
/// # Arguments
///
/// * `project` - The project to export
/// * `exports_dir` - Directory receiving the archive, created if missing
/// * `templates` - Page templates; unavailable kinds use a minimal layout
///
/// # Returns
///
/// Returns the path of the written archive.
///
/// # Errors
///
/// Returns an error if:
/// * The project has no funnel data
/// * The directory or archive file cannot be written
pub fn export_project(
    project: &Project,
    exports_dir: &Path,
    templates: &TemplateSet,
) -> Result<PathBuf> {
    debug!("Creating ZIP export for project {}", project.id);
    require_funnel(project)?;

    fs::create_dir_all(exports_dir)
        .with_context(|| format!("Failed to create {}", exports_dir.display()))?;
    let archive_path = exports_dir.join(format!("{}.zip", project.id));
    let file = File::create(&archive_path)
        .with_context(|| format!("Failed to create {}", archive_path.display()))?;

    write_archive(project, templates, file)?;

    info!(
        "Exported project {} to {}",
        project.id,
        archive_path.display()
    );
    Ok(archive_path)
}

/// Streams the export archive of a project into `writer` and returns the writer.
///
/// Pages that fail to render are replaced by a minimal layout, so the archive
/// always holds every page of the funnel.
///
/// # Errors
///
/// Returns an error if the project has no funnel data or writing the archive fails.
pub fn write_archive<W: Write + Seek>(
    project: &Project,
    templates: &TemplateSet,
    writer: W,
) -> Result<W> {
    let funnel = require_funnel(project)?;
    let mut zip = ZipWriter::new(writer);

    add_entry(
        &mut zip,
        "index.html",
        &render_main_page(templates, &funnel.main_page, &funnel.funnel_flow),
    )?;
    add_entry(&mut zip, "style.css", STYLESHEET)?;
    add_entry(&mut zip, "funnel.js", &generate_flow_script(&funnel.funnel_flow))?;

    for (index, upsell) in funnel.upsells.iter().enumerate() {
        let id = upsell_id(index + 1);
        let html = render_offer_page(templates, PageKind::Upsell, upsell, &funnel.funnel_flow, &id);
        add_entry(&mut zip, &format!("{id}.html"), &html)?;
    }

    for (index, downsell) in funnel.downsells.iter().enumerate() {
        let id = downsell_id(index + 1);
        let html =
            render_offer_page(templates, PageKind::Downsell, downsell, &funnel.funnel_flow, &id);
        add_entry(&mut zip, &format!("{id}.html"), &html)?;
    }

    add_entry(
        &mut zip,
        "thank_you.html",
        &thank_you_page(funnel.customizations.brand_name()),
    )?;

    if let Some(sequence) = &project.email_sequence {
        for (index, email) in sequence.emails.iter().enumerate() {
            let number = index + 1;
            let default_subject = format!("Email {number}");
            let subject = non_empty_or(&email.subject, &default_subject);
            let body = non_empty_or(&email.body, "Email content");
            add_entry(
                &mut zip,
                &format!("emails/email_{number}.txt"),
                &format!("Subject: {subject}\n\n{body}"),
            )?;
        }
        add_entry(&mut zip, "emails/README.txt", &email_documentation(sequence))?;
    }

    add_entry(&mut zip, "README.txt", &generate_documentation(project, funnel))?;

    zip.finish().context("Failed to finalize export archive")
}

fn require_funnel(project: &Project) -> Result<&Funnel> {
    project
        .funnel
        .as_ref()
        .with_context(|| format!("No funnel data available for export of project {}", project.id))
}

fn add_entry<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &str) -> Result<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options)
        .with_context(|| format!("Failed to add {name} to archive"))?;
    zip.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {name} to archive"))?;
    Ok(())
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}

/// Accept and decline actions of a page, as written into `data-action` attributes.
fn page_actions(flow: &[FlowNode], id: &str) -> (String, String) {
    match find_node(flow, id) {
        Some(node) => (
            node.accept_action.to_string(),
            node.decline_action.to_string(),
        ),
        None => (format!("to_{THANK_YOU_NODE_ID}"), "exit".to_string()),
    }
}

fn format_price(price: f64) -> String {
    if price.fract().abs() < f64::EPSILON {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| format!("            <p>{}</p>", escape_html(paragraph)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the main sales page.
pub fn render_main_page(templates: &TemplateSet, copy: &MainPageCopy, flow: &[FlowNode]) -> String {
    let (accept_action, decline_action) = page_actions(flow, MAIN_NODE_ID);

    let benefits = copy
        .benefits
        .iter()
        .map(|benefit| {
            format!(
                "                <li><strong>{}</strong> {}</li>",
                escape_html(&benefit.title),
                escape_html(&benefit.description)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let features = copy
        .features
        .iter()
        .map(|feature| {
            format!(
                "            <div class=\"col-md-6 mb-3\"><h3>{}</h3><p>{}</p></div>",
                escape_html(&feature.title),
                escape_html(&feature.description)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let social_proof = copy
        .social_proof
        .iter()
        .map(|testimonial| {
            format!(
                "        <div class=\"testimonial\"><p>&ldquo;{}&rdquo;</p><p><strong>{}</strong>, {}</p></div>",
                escape_html(&testimonial.text),
                escape_html(&testimonial.name),
                escape_html(&testimonial.position)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let faq = copy
        .faq
        .iter()
        .map(|entry| {
            format!(
                "        <div class=\"faq-item\"><p class=\"faq-question\">{}</p><p class=\"faq-answer\">{}</p></div>",
                escape_html(&entry.question),
                escape_html(&entry.answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let headline = escape_html(&copy.headline);
    let subheadline = escape_html(&copy.subheadline);
    let intro = escape_html(&copy.intro);
    let problem_statement = escape_html(&copy.problem_statement);
    let solution_intro = escape_html(&copy.solution_intro);
    let pricing_section = paragraphs(&copy.pricing_section);
    let guarantee = paragraphs(&copy.guarantee);
    let cta_primary = escape_html(&copy.cta_primary);
    let cta_secondary = escape_html(&copy.cta_secondary);

    render_page(
        templates,
        PageKind::Main,
        &[
            ("headline", headline.as_str()),
            ("subheadline", subheadline.as_str()),
            ("intro", intro.as_str()),
            ("problem_statement", problem_statement.as_str()),
            ("solution_intro", solution_intro.as_str()),
            ("benefits", benefits.as_str()),
            ("features", features.as_str()),
            ("social_proof", social_proof.as_str()),
            ("pricing_section", pricing_section.as_str()),
            ("guarantee", guarantee.as_str()),
            ("faq", faq.as_str()),
            ("cta_primary", cta_primary.as_str()),
            ("cta_secondary", cta_secondary.as_str()),
            ("accept_action", accept_action.as_str()),
            ("decline_action", decline_action.as_str()),
        ],
        &Skeleton {
            headline: &copy.headline,
            description: &copy.intro,
            cta_text: &copy.cta_primary,
            accept_action: &accept_action,
        },
    )
}

/// Renders an upsell or downsell page for the flow node `id`.
pub fn render_offer_page(
    templates: &TemplateSet,
    kind: PageKind,
    offer: &Offer,
    flow: &[FlowNode],
    id: &str,
) -> String {
    let (accept_action, decline_action) = page_actions(flow, id);

    let key_benefits = offer
        .key_benefits
        .iter()
        .map(|benefit| format!("                <li>&#10003; {}</li>", escape_html(benefit)))
        .collect::<Vec<_>>()
        .join("\n");

    let headline = escape_html(&offer.headline);
    let product_name = escape_html(&offer.product_name);
    let description = escape_html(&offer.description);
    let main_feature = escape_html(&offer.main_feature);
    let price = format_price(offer.price);
    let price_description = escape_html(&offer.price_description);
    let reason_to_buy = escape_html(&offer.reason_to_buy);
    let scarcity_element = escape_html(&offer.scarcity_element);
    let cta_text = escape_html(&offer.cta_text);

    render_page(
        templates,
        kind,
        &[
            ("headline", headline.as_str()),
            ("product_name", product_name.as_str()),
            ("description", description.as_str()),
            ("key_benefits", key_benefits.as_str()),
            ("main_feature", main_feature.as_str()),
            ("price", price.as_str()),
            ("price_description", price_description.as_str()),
            ("reason_to_buy", reason_to_buy.as_str()),
            ("scarcity_element", scarcity_element.as_str()),
            ("cta_text", cta_text.as_str()),
            ("accept_action", accept_action.as_str()),
            ("decline_action", decline_action.as_str()),
        ],
        &Skeleton {
            headline: &offer.headline,
            description: &offer.description,
            cta_text: &offer.cta_text,
            accept_action: &accept_action,
        },
    )
}

/// Unescaped content of the minimal page used when a template is unavailable.
struct Skeleton<'a> {
    headline: &'a str,
    description: &'a str,
    cta_text: &'a str,
    accept_action: &'a str,
}

fn render_page(
    templates: &TemplateSet,
    kind: PageKind,
    vars: &[(&str, &str)],
    skeleton: &Skeleton<'_>,
) -> String {
    let rendered = templates
        .get(kind)
        .with_context(|| format!("No {} template available", kind.as_str()))
        .and_then(|template| fill(template, vars));

    match rendered {
        Ok(html) => html,
        Err(err) => {
            error!("Error creating HTML for {} page: {err}", kind.as_str());
            fallback_page(skeleton)
        }
    }
}

fn fallback_page(skeleton: &Skeleton<'_>) -> String {
    let headline = if skeleton.headline.is_empty() {
        "Funnel Page".to_string()
    } else {
        escape_html(skeleton.headline)
    };
    let cta_text = if skeleton.cta_text.is_empty() {
        "Continue".to_string()
    } else {
        escape_html(skeleton.cta_text)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{headline}</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <div class="container py-5">
        <h1>{headline}</h1>
        <p>{description}</p>
        <button class="cta-button accept-button" data-action="{accept_action}">{cta_text}</button>
    </div>
    <script src="funnel.js"></script>
</body>
</html>
"#,
        description = escape_html(skeleton.description),
        accept_action = escape_html(skeleton.accept_action),
    )
}

fn thank_you_page(brand_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Thank You for Your Purchase | {brand_name}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <div class="container py-5">
        <div class="thank-you-box">
            <h1>Thank You for Your Purchase!</h1>
            <p>Your order has been successfully processed and is on its way to you.</p>
            <div class="my-4">
                <h3>What's Next?</h3>
                <p>Check your email for your order confirmation and access instructions.</p>
                <p>If you have any questions, please contact our support team.</p>
            </div>
            <div class="mt-5">
                <h3>Recommended Next Steps</h3>
                <ul class="list-group my-3">
                    <li class="list-group-item">Check your email for your order confirmation</li>
                    <li class="list-group-item">Bookmark this page for future reference</li>
                    <li class="list-group-item">Follow us on social media for updates and tips</li>
                </ul>
            </div>
        </div>
    </div>

    <script src="funnel.js"></script>
</body>
</html>
"#,
        brand_name = escape_html(brand_name)
    )
}

/// Builds `funnel.js`, which embeds the flow graph so the static pages can
/// navigate without a server.
pub fn generate_flow_script(flow: &[FlowNode]) -> String {
    let flow_json = serde_json::to_string(flow).unwrap_or_else(|err| {
        error!("Error serializing funnel flow: {err}");
        "[]".to_string()
    });
    FLOW_SCRIPT.replace("{funnel_flow}", &flow_json)
}

fn email_documentation(sequence: &EmailSequence) -> String {
    let timing = (2..=sequence.emails.len())
        .map(|number| {
            let when = sequence
                .timing
                .get(&number.to_string())
                .cloned()
                .unwrap_or_else(|| format!("Day {}", number - 1));
            format!("- Email {number}: {when}")
        })
        .collect::<Vec<_>>();

    let mut schedule = vec!["- Email 1: Immediately after signup".to_string()];
    schedule.extend(timing);

    format!(
        "Email Sequence Documentation
============================

Sequence Name: {name}
Number of Emails: {count}
Sequence Type: {sequence_type}

Timing:
{schedule}

Purpose:
{purpose}

Instructions:
1. Import these emails into your email marketing platform
2. Set up the automation sequence with the timing above
3. Customize sender name and contact information before sending
",
        name = non_empty_or(&sequence.sequence_name, "Email Sequence"),
        count = sequence.emails.len(),
        sequence_type = non_empty_or(&sequence.sequence_type, "sales"),
        schedule = schedule.join("\n"),
        purpose = non_empty_or(&sequence.purpose, "Nurture leads and promote products"),
    )
}

/// Builds the `README.txt` shipped with the export.
pub fn generate_documentation(project: &Project, funnel: &Funnel) -> String {
    let customizations = &funnel.customizations;
    let target_audience = customizations
        .target_audience
        .as_deref()
        .filter(|audience| !audience.trim().is_empty())
        .unwrap_or("General audience");

    format!(
        "Funnelcraft Funnel - Documentation
==================================

Project Name: {name}
Original URL: {url}
Generated on: {generated_on}

Product Information:
--------------------
Brand Name: {brand_name}
Target Audience: {target_audience}
Unique Angle: {unique_angle}

Funnel Structure:
-----------------
1. Main Sales Page (index.html)
2. Upsells: {upsells} pages
3. Downsells: {downsells} pages
4. Thank You Page (thank_you.html)

Files Included:
---------------
- index.html: Main sales page
- upsell_*.html: Upsell pages
- downsell_*.html: Downsell pages
- thank_you.html: Thank you page
- style.css: CSS styles for all pages
- funnel.js: JavaScript for funnel flow control
- emails/: Directory containing email sequence (if generated)
- README.txt: This documentation file

How to Use:
-----------
1. Upload all files to your web hosting
2. Link your payment processor to the buttons
3. Set up email sequence in your email marketing platform
4. Test the complete funnel flow before driving traffic

Customization:
--------------
- Edit HTML files to customize design and content
- Modify CSS in style.css to change appearance
- Update funnel.js if you need to change the flow
",
        name = project.name,
        url = project.url,
        generated_on = Local::now().format("%Y-%m-%d %H:%M"),
        brand_name = customizations.brand_name(),
        unique_angle = customizations.unique_angle(),
        upsells = funnel.upsells.len(),
        downsells = funnel.downsells.len(),
    )
}
