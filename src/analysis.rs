//! The analysis module derives the persuasion profile of a scraped landing page.

use log::{debug, error};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::generated::Generated;
use crate::scrape::ScrapedPage;

/// Descriptive record of a landing page's persuasion structure.
///
/// Every field always holds a value so downstream generators never branch on
/// absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub url: String,
    pub title: String,
    pub product_type: String,
    pub main_hook: String,
    pub target_audience: String,
    pub key_benefits: Vec<String>,
    pub pain_points: Vec<String>,
    pub unique_selling_points: Vec<String>,
    pub pricing_strategy: String,
    pub cta_strategy: String,
    pub persuasion_techniques: Vec<String>,
    pub structure_analysis: String,
    pub content_tone: String,
    pub suggested_improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::fallback("", "No analysis available")
    }
}

impl Analysis {
    /// Neutral analysis used when a page could not be analyzed.
    pub fn fallback(url: &str, reason: &str) -> Self {
        let unknown = || "Unknown".to_string();
        Self {
            url: url.to_string(),
            title: unknown(),
            product_type: unknown(),
            main_hook: "Could not analyze".to_string(),
            target_audience: unknown(),
            key_benefits: Vec::new(),
            pain_points: Vec::new(),
            unique_selling_points: Vec::new(),
            pricing_strategy: unknown(),
            cta_strategy: unknown(),
            persuasion_techniques: Vec::new(),
            structure_analysis: "Failed to analyze".to_string(),
            content_tone: unknown(),
            suggested_improvements: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Analyzes a scraped page.
///
/// The result is a fixed profile personalised with the page title and the
/// URL host. A URL without a host yields a [`Generated::Fallback`] carrying
/// the neutral [`Analysis::fallback`] record.
pub fn analyze_page(page: &ScrapedPage, url: &str) -> Generated<Analysis> {
    debug!("Analyzing page from URL: {url}");

    let domain = match Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
    {
        Some(domain) => domain,
        None => {
            let reason = format!("Cannot determine the domain of {url}");
            error!("Error analyzing page: {reason}");
            return Generated::Fallback {
                record: Analysis::fallback(url, &reason),
                reason,
            };
        }
    };

    let title = if page.title.trim().is_empty() {
        format!("Sales Page for {domain}")
    } else {
        page.title.clone()
    };

    Generated::Nominal(Analysis {
        url: url.to_string(),
        title,
        product_type: "Digital Course & Membership".to_string(),
        main_hook: format!("Transform your results with this premium solution from {domain}"),
        target_audience:
            "Professionals and businesses looking to improve efficiency and results".to_string(),
        key_benefits: strings(&[
            "Save time and increase productivity",
            "Improve results with proven systems",
            "Access exclusive resources and community",
            "Learn from industry experts",
            "Implement strategies that actually work",
            "Get personal support and guidance",
            "Stay ahead of competitors",
            "Reduce costs and increase ROI",
            "Scale your operations efficiently",
            "Eliminate common frustrations and bottlenecks",
        ]),
        pain_points: strings(&[
            "Lack of time to implement complex solutions",
            "Frustration with inconsistent results",
            "Overwhelmed by too many options and information",
            "Previous solutions that promised but didn't deliver",
            "High costs with minimal returns",
        ]),
        unique_selling_points: strings(&[
            "Proprietary system developed by industry leaders",
            "Comprehensive solution with ongoing support",
            "Proven results with case studies and testimonials",
            "Exclusive community access for networking",
            "Step-by-step implementation guidance",
        ]),
        pricing_strategy: "Tiered pricing with limited-time discounts to create urgency. Multiple package options with increasing value. One-time payment structure with bonus offers.".to_string(),
        cta_strategy: "Strong, direct calls-to-action with urgency elements. Multiple CTAs throughout the page. Form submissions to capture leads.".to_string(),
        persuasion_techniques: strings(&[
            "Social proof through testimonials",
            "Scarcity with limited-time offers",
            "Authority positioning with expert credentials",
            "Risk reversal with guarantees",
            "Reciprocity through bonus offerings",
            "FOMO (Fear of Missing Out)",
        ]),
        structure_analysis: "Classic sales page with a strong headline, problem-agitation-solution format, feature/benefit sections, social proof, pricing options, and multiple CTAs.".to_string(),
        content_tone: "Professional yet conversational. Authoritative while remaining accessible. High-energy with emphasis on transformation and results.".to_string(),
        suggested_improvements: strings(&[
            "Add more specific case studies with measurable results",
            "Include video testimonials for increased credibility",
            "Create more personalized sections for different audience segments",
            "Strengthen the guarantee to reduce perceived risk",
            "Add an FAQ section to address common objections",
            "Improve mobile responsiveness for better conversion",
            "Add exit-intent popups to capture leaving visitors",
            "Include more precise benefit quantification",
        ]),
        error: None,
    })
}
