//! The copy module writes the main sales page copy from a page analysis.

use anyhow::Result;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::constants::{DEFAULT_BRAND_NAME, DEFAULT_NUM_DOWNSELLS, DEFAULT_NUM_UPSELLS};
use crate::generated::Generated;
use crate::template::fill;

/// User-supplied options that personalise the generated funnel.
///
/// Blank strings count as absent. Unknown keys are ignored when the options
/// are deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customizations {
    pub brand_name: Option<String>,
    pub unique_angle: Option<String>,
    pub target_audience: Option<String>,
    pub num_upsells: Option<u32>,
    pub num_downsells: Option<u32>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.trim().is_empty())
}

impl Customizations {
    pub fn brand_name(&self) -> &str {
        non_blank(self.brand_name.as_ref()).unwrap_or(DEFAULT_BRAND_NAME)
    }

    pub fn unique_angle(&self) -> &str {
        non_blank(self.unique_angle.as_ref()).unwrap_or_default()
    }

    /// The audience to write for, defaulting to the analyzed audience.
    pub fn target_audience<'a>(&'a self, analysis: &'a Analysis) -> &'a str {
        non_blank(self.target_audience.as_ref()).unwrap_or(analysis.target_audience.as_str())
    }

    pub fn num_upsells(&self) -> u32 {
        self.num_upsells.unwrap_or(DEFAULT_NUM_UPSELLS)
    }

    pub fn num_downsells(&self) -> u32 {
        self.num_downsells.unwrap_or(DEFAULT_NUM_DOWNSELLS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitledText {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub position: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Copy for the main sales page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainPageCopy {
    pub headline: String,
    pub subheadline: String,
    pub intro: String,
    pub problem_statement: String,
    pub solution_intro: String,
    pub benefits: Vec<TitledText>,
    pub features: Vec<TitledText>,
    pub social_proof: Vec<Testimonial>,
    pub pricing_section: String,
    pub guarantee: String,
    pub faq: Vec<FaqEntry>,
    pub cta_primary: String,
    pub cta_secondary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MainPageCopy {
    /// Placeholder copy used when the real copy could not be rendered.
    pub fn fallback(reason: &str) -> Self {
        Self {
            headline: "Could not generate headline".to_string(),
            subheadline: "Could not generate subheadline".to_string(),
            intro: "Could not generate intro".to_string(),
            problem_statement: "Could not generate problem statement".to_string(),
            solution_intro: "Could not generate solution intro".to_string(),
            benefits: Vec::new(),
            features: Vec::new(),
            social_proof: Vec::new(),
            pricing_section: String::new(),
            guarantee: String::new(),
            faq: Vec::new(),
            cta_primary: "Buy Now".to_string(),
            cta_secondary: "Learn More".to_string(),
            error: Some(reason.to_string()),
        }
    }
}

const HEADLINE: &str =
    "Introducing {brand_name}: The Revolutionary {product_type} That Transforms Results In Just Days";
const SUBHEADLINE: &str = "Join Thousands Who Have Already Discovered The System That {main_hook} Without The Usual Stress Or Complexity";
const INTRO: &str = "You're about to discover a breakthrough approach to {product_type_lower} that's helping professionals and businesses achieve exceptional results. {brand_name} isn't just another solution - it's a complete transformation system designed specifically for {target_audience}.";
const PROBLEM_STATEMENT: &str = "If you're like most {target_audience_lower}, you've probably struggled with {first_pain_point}, felt frustrated by {second_pain_point}, and wasted time on solutions that promised everything but delivered little.";
const SOLUTION_INTRO: &str = "That's why we created {brand_name}. {unique_angle}This complete system gives you everything you need to overcome these challenges and achieve the results you've been looking for.";
const PRICING_SECTION: &str = "Investment In Your Success\n\nThe complete {brand_name} system is available for just $497 - a fraction of the value you'll receive and the results you'll achieve. This one-time investment gives you lifetime access to the entire system with no recurring fees or hidden costs.\n\nWhen you consider that most clients report ROI within the first 30 days, this becomes an easy decision for serious professionals.";
const GUARANTEE: &str = "Our 100% Risk-Free Guarantee\n\nWe are so confident in the power of {brand_name} that we offer a complete 30-day money-back guarantee. Try the entire system, implement the strategies, and if you do not see meaningful results, simply let us know and we will refund your entire investment - no questions asked.";
const CTA_PRIMARY: &str = "Yes! I Want Access To {brand_name} Now";
const CTA_SECONDARY: &str = "Learn More About Our Process";

const BENEFITS: [(&str, &str); 5] = [
    (
        "Save Time & Boost Productivity",
        "Our streamlined system eliminates wasted effort and focuses on what actually works, saving you hours every week.",
    ),
    (
        "Proven Results System",
        "Follow our step-by-step approach that has been tested and refined with thousands of successful clients.",
    ),
    (
        "Expert Community Access",
        "Connect with industry leaders and peers who can provide valuable insights and support.",
    ),
    (
        "Personalized Implementation",
        "Customize the approach to your specific situation with our flexible framework.",
    ),
    (
        "Ongoing Support & Updates",
        "You will never be left behind as the industry evolves - we are constantly updating our resources.",
    ),
];

const FEATURES: [(&str, &str); 5] = [
    (
        "Comprehensive Resource Library",
        "Access over 50+ templates, guides, and tools to implement the system.",
    ),
    (
        "Step-by-Step Implementation Plan",
        "Follow our proven 12-week roadmap to transform your results.",
    ),
    (
        "Expert Masterclass Series",
        "Learn advanced strategies through 10 in-depth video training modules.",
    ),
    (
        "Members-Only Community",
        "Connect with peers and mentors in our active online community.",
    ),
    (
        "Monthly Live Q&A Sessions",
        "Get your specific questions answered by our team of experts.",
    ),
];

const TESTIMONIALS: [(&str, &str, &str); 3] = [
    (
        "Michael T.",
        "CEO",
        "I was skeptical about trying another {product_type_lower}, but {brand_name} completely exceeded my expectations. Within just 3 weeks, we saw a 43% improvement in our key metrics. The ROI has been incredible.",
    ),
    (
        "Sarah J.",
        "Marketing Director",
        "What I love about {brand_name} is how practical everything is. No fluff, just actionable strategies that work. We have implemented the system across our entire department with fantastic results.",
    ),
    (
        "David K.",
        "Small Business Owner",
        "As someone who has tried every solution on the market, I can confidently say {brand_name} is in a league of its own. The support alone is worth the investment, but the results we have achieved make it priceless.",
    ),
];

const FAQ: [(&str, &str); 5] = [
    (
        "How is {brand_name} different from other solutions?",
        "{brand_name} stands apart through its comprehensive approach that combines proven strategies, ongoing support, and a focus on practical implementation. Unlike most programs that deliver information without guidance, we provide a complete system for success.",
    ),
    (
        "How quickly will I see results?",
        "Most clients begin seeing initial results within the first 2-3 weeks of implementation. However, the most significant improvements typically come after 6-8 weeks of consistent application.",
    ),
    (
        "Do I need technical skills to implement this?",
        "No technical expertise is required. We have designed the system to be accessible for everyone, with clear step-by-step guidance and support available if you have questions.",
    ),
    (
        "Is there ongoing support?",
        "Yes! Your purchase includes lifetime access to our support team and community. We are committed to your long-term success.",
    ),
    (
        "What if this does not work for my specific situation?",
        "Our system is highly adaptable to various scenarios. However, if you find it is not a good fit, our 30-day guarantee ensures you can get a full refund.",
    ),
];

/// Generates the main sales page copy.
///
/// Analysis fields and customizations are interpolated into fixed templates.
/// A rendering fault yields a [`Generated::Fallback`] with placeholder copy.
pub fn generate_copy(
    analysis: &Analysis,
    customizations: &Customizations,
) -> Generated<MainPageCopy> {
    debug!("Generating sales copy based on analysis");

    match render_copy(analysis, customizations) {
        Ok(copy) => Generated::Nominal(copy),
        Err(err) => {
            let reason = err.to_string();
            error!("Error generating copy: {reason}");
            Generated::Fallback {
                record: MainPageCopy::fallback(&reason),
                reason,
            }
        }
    }
}

fn render_copy(analysis: &Analysis, customizations: &Customizations) -> Result<MainPageCopy> {
    let target_audience = customizations.target_audience(analysis);
    let first_pain_point = analysis.pain_points.first().map_or_else(
        || "common industry challenges".to_string(),
        |pain| pain.to_lowercase(),
    );
    let second_pain_point = analysis
        .pain_points
        .get(1)
        .map_or_else(|| "inconsistent results".to_string(), |pain| pain.to_lowercase());
    let unique_angle = match customizations.unique_angle() {
        "" => String::new(),
        angle => format!("{angle} "),
    };

    let product_type_lower = analysis.product_type.to_lowercase();
    let target_audience_lower = target_audience.to_lowercase();
    let vars = [
        ("brand_name", customizations.brand_name()),
        ("product_type", analysis.product_type.as_str()),
        ("product_type_lower", product_type_lower.as_str()),
        ("main_hook", analysis.main_hook.as_str()),
        ("target_audience", target_audience),
        ("target_audience_lower", target_audience_lower.as_str()),
        ("first_pain_point", first_pain_point.as_str()),
        ("second_pain_point", second_pain_point.as_str()),
        ("unique_angle", unique_angle.as_str()),
    ];

    Ok(MainPageCopy {
        headline: fill(HEADLINE, &vars)?,
        subheadline: fill(SUBHEADLINE, &vars)?,
        intro: fill(INTRO, &vars)?,
        problem_statement: fill(PROBLEM_STATEMENT, &vars)?,
        solution_intro: fill(SOLUTION_INTRO, &vars)?,
        benefits: titled(&BENEFITS),
        features: titled(&FEATURES),
        social_proof: TESTIMONIALS
            .iter()
            .map(|(name, position, text)| {
                Ok(Testimonial {
                    name: (*name).to_string(),
                    position: (*position).to_string(),
                    text: fill(text, &vars)?,
                })
            })
            .collect::<Result<_>>()?,
        pricing_section: fill(PRICING_SECTION, &vars)?,
        guarantee: fill(GUARANTEE, &vars)?,
        faq: FAQ
            .iter()
            .map(|(question, answer)| {
                Ok(FaqEntry {
                    question: fill(question, &vars)?,
                    answer: fill(answer, &vars)?,
                })
            })
            .collect::<Result<_>>()?,
        cta_primary: fill(CTA_PRIMARY, &vars)?,
        cta_secondary: CTA_SECONDARY.to_string(),
        error: None,
    })
}

fn titled(items: &[(&str, &str)]) -> Vec<TitledText> {
    items
        .iter()
        .map(|(title, description)| TitledText {
            title: (*title).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}
