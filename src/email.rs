//! The email module asks an LLM for an email drip sequence promoting a funnel.

use anyhow::{Context, Result, anyhow, bail};
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider, StructuredOutputFormat};
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use url::Url;

use crate::constants::{
    CODE_FENCE_STRIPPER, DEFAULT_EMAIL_STYLE, DEFAULT_NUM_EMAILS, DEFAULT_SEQUENCE_TYPE,
    EMAIL_PROMPT_TEMPLATE, EMAIL_SEQUENCE_SCHEMA, EMAIL_SYSTEM_PROMPT, EMAIL_TEMPERATURE,
    EMAIL_UPSELLS_TEMPLATE, MAX_NUM_EMAILS, MODEL_API_KEY_ENV_NAME, THINK_STRIPPER,
};
use crate::funnel::Funnel;
use crate::generated::Generated;
use crate::template::fill;

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));
static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(CODE_FENCE_STRIPPER).expect("Failed to compile CODE_FENCE_STRIPPER regex")
});

const MAX_PROMPT_BENEFITS: usize = 5;
const MAX_PROMPT_UPSELLS: usize = 3;

/// Options for generating an email sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailParams {
    pub num_emails: Option<u32>,
    pub sequence_type: Option<String>,
    pub email_style: Option<String>,
}

impl EmailParams {
    /// Requested number of emails, capped at 20.
    pub fn num_emails(&self) -> u32 {
        self.num_emails
            .unwrap_or(DEFAULT_NUM_EMAILS)
            .min(MAX_NUM_EMAILS)
    }

    pub fn sequence_type(&self) -> &str {
        self.sequence_type.as_deref().unwrap_or(DEFAULT_SEQUENCE_TYPE)
    }

    pub fn email_style(&self) -> &str {
        self.email_style.as_deref().unwrap_or(DEFAULT_EMAIL_STYLE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Email {
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub purpose: String,
    #[serde(deserialize_with = "null_as_default")]
    pub call_to_action: String,
}

/// Reads `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An email drip sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSequence {
    pub sequence_name: String,
    pub sequence_type: String,
    pub purpose: String,
    /// Send time of each email keyed by its 1-based number.
    pub timing: BTreeMap<String, String>,
    pub emails: Vec<Email>,
    pub num_emails: usize,
    pub brand_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fixed three-email sequence used when generation fails.
pub fn fallback_sequence(brand_name: &str, reason: &str) -> EmailSequence {
    let email = |subject: &str, body: &str, purpose: &str, call_to_action: &str| Email {
        subject: subject.to_string(),
        body: body.to_string(),
        purpose: purpose.to_string(),
        call_to_action: call_to_action.to_string(),
    };
    let emails = vec![
        email(
            "Welcome to [Brand Name]",
            "Welcome email content goes here...",
            "Introduction",
            "Visit our website",
        ),
        email(
            "Benefits of [Product Name]",
            "Benefits email content goes here...",
            "Highlight benefits",
            "Learn more",
        ),
        email(
            "Special Offer Inside",
            "Promotional email content goes here...",
            "Drive sales",
            "Buy now",
        ),
    ];

    EmailSequence {
        sequence_name: "Basic Sales Sequence".to_string(),
        sequence_type: "sales".to_string(),
        purpose: "To nurture leads and drive sales".to_string(),
        timing: [("1", "Day 0 (Immediately)"), ("2", "Day 2"), ("3", "Day 4")]
            .iter()
            .map(|(number, when)| ((*number).to_string(), (*when).to_string()))
            .collect(),
        num_emails: emails.len(),
        emails,
        brand_name: brand_name.to_string(),
        error: Some(reason.to_string()),
    }
}

/// Shared data for email generation.
pub struct EmailContext<'a> {
    /// LLM model used to write the sequence
    pub model: &'a dyn ChatProvider,
}

/// Builds an [`LLMBuilder`] for email generation from a model URL such as
/// `openai://gpt-4o` or `ollama://llama3:8b@localhost`.
///
/// # Errors
///
/// Returns an error if the URL is invalid, names an unknown backend, or has no model.
pub fn email_model_builder(model: &str) -> Result<LLMBuilder> {
    let model_url = Url::parse(model).map_err(|e| anyhow!("Invalid model URL: {}", e))?;
    let schema: StructuredOutputFormat = serde_json::from_str(EMAIL_SEQUENCE_SCHEMA)
        .context("Invalid email sequence schema")?;

    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(
            [
                model_url
                    .host_str()
                    .context("Specify model name as host URL.")?,
                model_url.username(),
            ]
            .iter()
            .filter(|x| !x.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(":"),
        )
        .system(EMAIL_SYSTEM_PROMPT)
        .temperature(EMAIL_TEMPERATURE)
        .schema(schema);

    Ok(match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(model_key) => {
            info!("API key provided via {MODEL_API_KEY_ENV_NAME}");
            llm_builder.api_key(model_key)
        }
        Err(err) => {
            info!("{err} while reading {MODEL_API_KEY_ENV_NAME}, continuing without API key");
            llm_builder
        }
    })
}

/// Renders the user prompt describing the funnel to the model.
///
/// # Errors
///
/// Returns an error if the prompt template cannot be filled.
pub fn build_email_prompt(funnel: &Funnel, params: &EmailParams) -> Result<String> {
    let benefits = funnel
        .main_page
        .benefits
        .iter()
        .take(MAX_PROMPT_BENEFITS)
        .map(|benefit| benefit.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let num_emails = params.num_emails().to_string();

    let mut prompt = fill(
        EMAIL_PROMPT_TEMPLATE,
        &[
            ("brand_name", funnel.customizations.brand_name()),
            ("headline", funnel.main_page.headline.as_str()),
            ("benefits", benefits.as_str()),
            ("sequence_type", params.sequence_type()),
            ("email_style", params.email_style()),
            ("num_emails", num_emails.as_str()),
        ],
    )?;

    let upsells = funnel
        .upsells
        .iter()
        .take(MAX_PROMPT_UPSELLS)
        .map(|upsell| format!("{} - {}", upsell.product_name, upsell.description))
        .collect::<Vec<_>>();
    if !upsells.is_empty() {
        prompt.push_str(&fill(
            EMAIL_UPSELLS_TEMPLATE,
            &[("upsells", upsells.join("\n").as_str())],
        )?);
    }

    Ok(prompt)
}

/// Generates an email sequence for the funnel.
///
/// Never fails: any provider or parsing fault yields the fixed three-email
/// [`fallback_sequence`] wrapped in [`Generated::Fallback`]. The number of
/// emails returned may differ from the requested count.
pub async fn generate_email_sequence(
    funnel: &Funnel,
    params: &EmailParams,
    ctx: &EmailContext<'_>,
) -> Generated<EmailSequence> {
    let brand_name = funnel.customizations.brand_name();
    debug!("Generating email sequence for {brand_name}");

    match request_sequence(funnel, params, ctx).await {
        Ok(sequence) => {
            info!(
                "Generated {} emails for {brand_name} (requested {})",
                sequence.num_emails,
                params.num_emails()
            );
            Generated::Nominal(sequence)
        }
        Err(err) => {
            let reason = err.to_string();
            error!("Error generating email sequence: {reason}");
            Generated::Fallback {
                record: fallback_sequence(brand_name, &reason),
                reason,
            }
        }
    }
}

async fn request_sequence(
    funnel: &Funnel,
    params: &EmailParams,
    ctx: &EmailContext<'_>,
) -> Result<EmailSequence> {
    let prompt = build_email_prompt(funnel, params)?;
    let messages = vec![ChatMessage::user().content(prompt).build()];

    let response = ctx
        .model
        .chat(&messages)
        .await
        .map_err(|err| anyhow!("LLM error: {err}."))?
        .to_string();

    parse_email_sequence(&response, funnel.customizations.brand_name(), params)
}

#[derive(Deserialize)]
struct SequenceResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    sequence_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    sequence_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    purpose: String,
    #[serde(default)]
    timing: TimingResponse,
    emails: Vec<Email>,
}

/// Models return the schedule either keyed by email number or as a plain list.
/// Any other shape, `null` or free text, carries no per-email schedule.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimingResponse {
    Keyed(BTreeMap<String, Value>),
    Listed(Vec<Value>),
    Other(Value),
}

impl Default for TimingResponse {
    fn default() -> Self {
        Self::Keyed(BTreeMap::new())
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl From<TimingResponse> for BTreeMap<String, String> {
    fn from(timing: TimingResponse) -> Self {
        match timing {
            TimingResponse::Keyed(keyed) => keyed
                .into_iter()
                .map(|(number, when)| (number, value_text(when)))
                .collect(),
            TimingResponse::Listed(listed) => listed
                .into_iter()
                .enumerate()
                .map(|(index, when)| ((index + 1).to_string(), value_text(when)))
                .collect(),
            TimingResponse::Other(other) => {
                debug!("Ignoring email timing of unexpected shape: {other}");
                BTreeMap::new()
            }
        }
    }
}

/// Parses a model response into an [`EmailSequence`].
///
/// `<think>` blocks and Markdown code fences around the JSON are ignored.
///
/// # Errors
///
/// Returns an error if the response holds no JSON object, the object has no
/// `emails` list, or the list is empty.
pub fn parse_email_sequence(
    response: &str,
    brand_name: &str,
    params: &EmailParams,
) -> Result<EmailSequence> {
    let stripped = THINK_STRIPPER_REGEX.replace_all(response, "");
    let stripped = CODE_FENCE_REGEX.replace_all(stripped.trim(), "");
    let json = match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if start < end => stripped.get(start..=end).unwrap_or_default(),
        _ => bail!("Response does not contain a JSON object"),
    };

    let parsed: SequenceResponse =
        serde_json::from_str(json).context("Malformed email sequence JSON")?;
    if parsed.emails.is_empty() {
        bail!("Email sequence contains no emails");
    }

    let sequence_type = if parsed.sequence_type.is_empty() {
        params.sequence_type().to_string()
    } else {
        parsed.sequence_type
    };

    Ok(EmailSequence {
        sequence_name: parsed.sequence_name,
        sequence_type,
        purpose: parsed.purpose,
        timing: parsed.timing.into(),
        num_emails: parsed.emails.len(),
        emails: parsed.emails,
        brand_name: brand_name.to_string(),
        error: None,
    })
}
