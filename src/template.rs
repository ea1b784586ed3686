//! Placeholder substitution shared by the copy generators and the exporter,
//! plus the set of HTML page templates used when exporting a funnel.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("Failed to compile placeholder regex"));

/// Replaces every `{name}` slot in `template` with the matching value from `vars`.
///
/// Substitution happens in a single pass, so braces inside the values are
/// left untouched.
///
/// # Errors
///
/// Returns an error naming the slots that have no value in `vars`.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut missing: Vec<String> = Vec::new();
    let filled = PLACEHOLDER_REGEX.replace_all(template, |caps: &Captures| {
        let key = caps.get(1).map_or("", |key| key.as_str());
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => (*value).to_string(),
            None => {
                missing.push(key.to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        bail!("Unresolved template placeholders: {}", missing.join(", "));
    }

    Ok(filled.into_owned())
}

/// Escapes text for safe interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Kind of funnel page rendered through a template.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PageKind {
    Main,
    Upsell,
    Downsell,
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Upsell => "upsell",
            Self::Downsell => "downsell",
        }
    }

    fn file_name(self) -> String {
        format!("{}.html", self.as_str())
    }
}

const BUILTIN_MAIN: &str = include_str!("../templates/main.html");
const BUILTIN_UPSELL: &str = include_str!("../templates/upsell.html");
const BUILTIN_DOWNSELL: &str = include_str!("../templates/downsell.html");

/// HTML templates for the templated funnel pages.
///
/// A kind without a template is "unavailable"; the exporter renders such
/// pages with a minimal inline skeleton instead.
#[derive(Clone, Debug, Default)]
pub struct TemplateSet {
    main: Option<String>,
    upsell: Option<String>,
    downsell: Option<String>,
}

impl TemplateSet {
    /// Templates embedded in the binary.
    pub fn builtin() -> Self {
        Self {
            main: Some(BUILTIN_MAIN.to_string()),
            upsell: Some(BUILTIN_UPSELL.to_string()),
            downsell: Some(BUILTIN_DOWNSELL.to_string()),
        }
    }

    /// Loads `main.html`, `upsell.html` and `downsell.html` from `dir`.
    /// Missing files leave the corresponding kind unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if a template file exists but cannot be read.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            main: load_template(dir, PageKind::Main)?,
            upsell: load_template(dir, PageKind::Upsell)?,
            downsell: load_template(dir, PageKind::Downsell)?,
        })
    }

    pub fn get(&self, kind: PageKind) -> Option<&str> {
        match kind {
            PageKind::Main => self.main.as_deref(),
            PageKind::Upsell => self.upsell.as_deref(),
            PageKind::Downsell => self.downsell.as_deref(),
        }
    }

    /// Replaces the template for one page kind.
    pub fn with_template(mut self, kind: PageKind, template: impl Into<String>) -> Self {
        let slot = match kind {
            PageKind::Main => &mut self.main,
            PageKind::Upsell => &mut self.upsell,
            PageKind::Downsell => &mut self.downsell,
        };
        *slot = Some(template.into());
        self
    }
}

fn load_template(dir: &Path, kind: PageKind) -> Result<Option<String>> {
    let path = dir.join(kind.file_name());
    match fs::read_to_string(&path) {
        Ok(content) => {
            debug!("Loaded {} template from {}", kind.as_str(), path.display());
            Ok(Some(content))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(
                "No {} template at {}, pages of this kind use the fallback layout",
                kind.as_str(),
                path.display()
            );
            Ok(None)
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read template {}", path.display()))
        }
    }
}
