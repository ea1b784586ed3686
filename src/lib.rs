//! The funnelcraft library turns a landing page into a sales funnel: it
//! analyzes the page, composes a main page with upsell and downsell offers,
//! writes an email sequence with an LLM and exports everything as static files.

pub mod analysis;
pub mod constants;
pub mod copy;
pub mod email;
pub mod export;
pub mod flow;
pub mod funnel;
pub mod generated;
pub mod offer;
pub mod parse;
pub mod scrape;
pub mod storage;
pub mod template;

/// Enum representing the text extraction method.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TextBy {
    /// Use dom_smoothie for text extraction
    #[default]
    DomSmoothie,
    /// Use fast_html2md for text extraction
    FastHtml2Md,
}

impl std::str::FromStr for TextBy {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "dom_smoothie" => Ok(TextBy::DomSmoothie),
            "fast_html2md" => Ok(TextBy::FastHtml2Md),
            _ => Err(format!("Invalid text extraction method: {}", input)),
        }
    }
}

/// Enum representing how a landing page is obtained.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ScrapeMode {
    /// Synthesize a page from the URL without any network access.
    #[default]
    Placeholder,
    /// Download and parse the page.
    Live,
}

impl std::str::FromStr for ScrapeMode {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "placeholder" => Ok(ScrapeMode::Placeholder),
            "live" => Ok(ScrapeMode::Live),
            _ => Err(format!("Invalid scrape mode: {}", input)),
        }
    }
}

pub use analysis::{Analysis, analyze_page};
pub use copy::{Customizations, MainPageCopy, generate_copy};
pub use email::{EmailContext, EmailParams, EmailSequence, generate_email_sequence};
pub use export::{export_project, write_archive};
pub use flow::{FlowAction, FlowNode, design_funnel_flow, validate_flow};
pub use funnel::{Funnel, generate_funnel};
pub use generated::Generated;
pub use offer::{Offer, OfferKind, ProductInfo, generate_offer};
pub use scrape::{ScrapedPage, fetch};
pub use storage::{Project, ProjectStatus, Storage};
pub use template::TemplateSet;
