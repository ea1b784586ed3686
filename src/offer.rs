//! The offer module produces upsell and downsell offers from a fixed table of
//! hand-written variants.

use anyhow::{Result, bail};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::generated::Generated;
use crate::template::fill;

/// Whether an offer is presented after an accept (upsell) or a decline (downsell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Upsell,
    Downsell,
}

impl OfferKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upsell => "upsell",
            Self::Downsell => "downsell",
        }
    }

    /// Price of the generic offer used when an offer cannot be generated.
    pub fn fallback_price(self) -> f64 {
        match self {
            Self::Upsell => 97.0,
            Self::Downsell => 47.0,
        }
    }

    fn variants(self) -> &'static [OfferTemplate; 3] {
        match self {
            Self::Upsell => &UPSELL_VARIANTS,
            Self::Downsell => &DOWNSELL_VARIANTS,
        }
    }
}

impl std::fmt::Display for OfferKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// What the offers are derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub product_type: String,
    pub brand_name: String,
}

/// An upsell or downsell offer page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_type: OfferKind,
    pub position: u32,
    pub product_name: String,
    pub headline: String,
    pub description: String,
    pub key_benefits: Vec<String>,
    pub main_feature: String,
    pub price: f64,
    pub price_description: String,
    pub reason_to_buy: String,
    pub scarcity_element: String,
    pub cta_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Offer {
    /// Generic offer used when a variant cannot be rendered.
    pub fn fallback(kind: OfferKind, position: u32, reason: &str) -> Self {
        let title = match kind {
            OfferKind::Upsell => "Upsell",
            OfferKind::Downsell => "Downsell",
        };
        Self {
            offer_type: kind,
            position,
            product_name: format!("Default {title}"),
            headline: format!("Add this {kind} to your order"),
            description: "Could not generate description".to_string(),
            key_benefits: vec![
                "Benefit 1".to_string(),
                "Benefit 2".to_string(),
                "Benefit 3".to_string(),
            ],
            main_feature: "Main feature".to_string(),
            price: kind.fallback_price(),
            price_description: "One-time payment".to_string(),
            reason_to_buy: "Great value".to_string(),
            scarcity_element: "Limited time offer".to_string(),
            cta_text: "Add to Order".to_string(),
            error: Some(reason.to_string()),
        }
    }
}

/// A hand-written offer variant. Text fields may use `{brand_name}` and
/// `{product_type}` slots.
struct OfferTemplate {
    product_name: &'static str,
    headline: &'static str,
    description: &'static str,
    key_benefits: &'static [&'static str],
    main_feature: &'static str,
    price: f64,
    price_description: &'static str,
    reason_to_buy: &'static str,
    scarcity_element: &'static str,
    cta_text: &'static str,
}

const UPSELL_VARIANTS: [OfferTemplate; 3] = [
    OfferTemplate {
        product_name: "{brand_name} Pro Edition",
        headline: "WAIT! Upgrade to {brand_name} Pro for Maximum Results",
        description: "The Pro Edition includes all features of the standard {brand_name} plus advanced capabilities for power users.",
        key_benefits: &[
            "Access to premium training resources",
            "Direct 1-on-1 coaching sessions",
            "Priority support response",
            "Advanced customization options",
            "Exclusive community access",
        ],
        main_feature: "Personalized implementation strategy call with a senior expert",
        price: 297.0,
        price_description: "One-time upgrade payment (save 50% today only)",
        reason_to_buy: "Triple your results with expert guidance and premium resources",
        scarcity_element: "This special upgrade price expires in 15 minutes",
        cta_text: "Yes, Upgrade My Order to Pro!",
    },
    OfferTemplate {
        product_name: "{brand_name} Implementation Accelerator",
        headline: "Get Results 3X Faster with the {brand_name} Implementation Accelerator",
        description: "This done-for-you implementation package helps you fast-track your success by handling the technical setup and customization.",
        key_benefits: &[
            "Complete system setup by our expert team",
            "Custom configuration for your specific needs",
            "Technical roadblocks removed before you start",
            "Ready-to-use templates and frameworks",
        ],
        main_feature: "White-glove implementation service with 48-hour turnaround",
        price: 397.0,
        price_description: "One-time service fee (50% less than our standard rate)",
        reason_to_buy: "Skip the learning curve and get straight to results",
        scarcity_element: "Limited to just 10 clients this month",
        cta_text: "Yes, Fast-Track My Success!",
    },
    OfferTemplate {
        product_name: "{brand_name} Enterprise Solution",
        headline: "Scale Your Success with the {brand_name} Enterprise Package",
        description: "The complete {brand_name} system plus team licenses, advanced integrations, and enterprise-grade support.",
        key_benefits: &[
            "Multiple user licenses for your entire team",
            "Advanced API integrations with your existing tools",
            "Custom reporting and analytics",
            "Quarterly strategy consultations",
        ],
        main_feature: "Unlimited team access with centralized management console",
        price: 997.0,
        price_description: "Annual subscription (less than $3 per day)",
        reason_to_buy: "Scale the system across your entire organization",
        scarcity_element: "Early adopter pricing - will increase by 40% next month",
        cta_text: "Upgrade to Enterprise",
    },
];

const DOWNSELL_VARIANTS: [OfferTemplate; 3] = [
    OfferTemplate {
        product_name: "{brand_name} Essentials",
        headline: "Get Started with {brand_name} Essentials for a Lower Investment",
        description: "The core features of {brand_name} at a more accessible price point.",
        key_benefits: &[
            "Core system fundamentals",
            "Step-by-step implementation guides",
            "Community support access",
            "Key resources library",
        ],
        main_feature: "Complete foundations course for beginners",
        price: 197.0,
        price_description: "One-time payment with option to upgrade later",
        reason_to_buy: "Get started with the essential features at a lower investment",
        scarcity_element: "Special introductory pricing for first-time customers only",
        cta_text: "Yes, I Want the Essentials Package!",
    },
    OfferTemplate {
        product_name: "{brand_name} Self-Study Edition",
        headline: "Access the {brand_name} System at Your Own Pace",
        description: "The self-study version gives you all the content without the premium support elements.",
        key_benefits: &[
            "Complete system access",
            "Digital resource library",
            "Self-paced learning modules",
            "Email support",
        ],
        main_feature: "Digital-only access to the entire system",
        price: 147.0,
        price_description: "One-time payment (60% off the full system)",
        reason_to_buy: "Get all the content at a reduced price if you are self-motivated",
        scarcity_element: "This special self-study offer expires in 24 hours",
        cta_text: "Yes, Give Me Self-Study Access",
    },
    OfferTemplate {
        product_name: "{brand_name} Starter Kit",
        headline: "Try the {brand_name} Starter Kit Risk-Free",
        description: "A simplified version to help you get started and experience initial results.",
        key_benefits: &[
            "Core strategies and techniques",
            "Quick-start implementation guide",
            "Basic support access",
            "Foundational templates",
        ],
        main_feature: "90-day quick-start roadmap",
        price: 97.0,
        price_description: "One-time payment with 60-day guarantee",
        reason_to_buy: "Experience initial results without a larger investment",
        scarcity_element: "First-time customer special - not available after exit",
        cta_text: "Yes, I Want the Starter Kit!",
    },
];

/// Generates the offer of `kind` shown at `position` (1-based) in the funnel.
///
/// Positions past 3 reuse the third variant. Position 0 is not a valid funnel
/// step and yields a [`Generated::Fallback`] offer.
pub fn generate_offer(product: &ProductInfo, kind: OfferKind, position: u32) -> Generated<Offer> {
    debug!("Generating {kind} at position {position}");

    match render_offer(product, kind, position) {
        Ok(offer) => Generated::Nominal(offer),
        Err(err) => {
            let reason = err.to_string();
            error!("Error generating {kind}: {reason}");
            Generated::Fallback {
                record: Offer::fallback(kind, position, &reason),
                reason,
            }
        }
    }
}

fn render_offer(product: &ProductInfo, kind: OfferKind, position: u32) -> Result<Offer> {
    if position == 0 {
        bail!("Offer positions start at 1");
    }

    let index = usize::try_from(position.min(3) - 1)?;
    let Some(variant) = kind.variants().get(index) else {
        bail!("No {kind} variant for position {position}");
    };

    let vars = [
        ("brand_name", product.brand_name.as_str()),
        ("product_type", product.product_type.as_str()),
    ];

    Ok(Offer {
        offer_type: kind,
        position,
        product_name: fill(variant.product_name, &vars)?,
        headline: fill(variant.headline, &vars)?,
        description: fill(variant.description, &vars)?,
        key_benefits: variant
            .key_benefits
            .iter()
            .map(|benefit| fill(benefit, &vars))
            .collect::<Result<_>>()?,
        main_feature: fill(variant.main_feature, &vars)?,
        price: variant.price,
        price_description: fill(variant.price_description, &vars)?,
        reason_to_buy: fill(variant.reason_to_buy, &vars)?,
        scarcity_element: fill(variant.scarcity_element, &vars)?,
        cta_text: fill(variant.cta_text, &vars)?,
        error: None,
    })
}
