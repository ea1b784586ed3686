pub const MODEL_API_KEY_ENV_NAME: &str = "FUNNELCRAFT_MODEL_API_KEY";

/// Version of the JSON blobs stored in the `projects` table.
pub const SCHEMA_VERSION: i64 = 1;

pub const DEFAULT_BRAND_NAME: &str = "Our Product";
pub const DEFAULT_NUM_UPSELLS: u32 = 10;
pub const DEFAULT_NUM_DOWNSELLS: u32 = 10;

pub const DEFAULT_NUM_EMAILS: u32 = 10;
pub const MAX_NUM_EMAILS: u32 = 20;
pub const DEFAULT_SEQUENCE_TYPE: &str = "sales";
pub const DEFAULT_EMAIL_STYLE: &str = "conversational";
pub const EMAIL_TEMPERATURE: f32 = 0.7;

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";
pub(crate) const CODE_FENCE_STRIPPER: &str = r"^```(?:json)?\s*|\s*```$";

pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const EMAIL_SYSTEM_PROMPT: &str = "You are an expert email copywriter specializing in high-converting email sequences for sales funnels.";

pub(crate) const EMAIL_PROMPT_TEMPLATE: &str = r#"
Generate a complete email sequence for this product:

Brand Name: {brand_name}
Product Headline: {headline}

Key Benefits:
{benefits}

Sequence Type: {sequence_type} (Options: sales, nurture, onboarding, abandoned cart)
Email Style: {email_style} (Options: conversational, formal, story-based, direct)
Number of Emails: {num_emails}

Please generate a complete email sequence with these details in JSON format:
1. sequence_name: A name for this email sequence
2. sequence_type: The type of sequence (sales, nurture, etc.)
3. purpose: The overall purpose of this sequence
4. timing: When each email should be sent, keyed by email number (e.g. "1": "Day 1", "2": "Day 3")
5. emails: An array of email objects, each containing:
    a. subject: Email subject line
    b. body: Complete email body
    c. purpose: The specific purpose of this email
    d. call_to_action: The main call to action in this email

Return your response in valid JSON format."#;

pub(crate) const EMAIL_UPSELLS_TEMPLATE: &str = r#"

Upsell Products to Include in Some Emails:
{upsells}"#;

/// JSON schema handed to providers that support structured output.
pub const EMAIL_SEQUENCE_SCHEMA: &str = r#"{
    "name": "email_sequence",
    "description": "An email drip sequence for a sales funnel",
    "strict": false,
    "schema": {
        "type": "object",
        "properties": {
            "sequence_name": { "type": "string" },
            "sequence_type": { "type": "string" },
            "purpose": { "type": "string" },
            "timing": { "type": "object", "additionalProperties": { "type": "string" } },
            "emails": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "subject": { "type": "string" },
                        "body": { "type": "string" },
                        "purpose": { "type": "string" },
                        "call_to_action": { "type": "string" }
                    },
                    "required": ["subject", "body"]
                }
            }
        },
        "required": ["emails"]
    }
}"#;
