//! Markdown conversion and sanitization.
//!
//! Conversion is CPU-bound, so it runs on tokio's blocking pool. Every
//! result passes through a [`Sanitizer`] before it leaves this module; when
//! either step fails the caller gets an escaped `<pre>` rendering of the
//! input instead of an error.

use std::borrow::Cow;
use std::sync::Arc;

use pulldown_cmark::{Options, Parser, html};

use crate::extract::{PLACEHOLDER_CLASS, SLOT_ATTRIBUTE};
use crate::util::escape_html;

/// Conversion or sanitization failure.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The sanitizer rejected or could not process the HTML.
    #[error("sanitization failed: {0}")]
    Sanitize(String),
    /// The blocking conversion task panicked or was cancelled.
    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Turns arbitrary HTML into HTML that is safe to mount.
pub trait Sanitizer: Send + Sync {
    /// Sanitize `html`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Sanitize`] if the input cannot be made safe.
    fn sanitize(&self, html: &str) -> Result<String, ConvertError>;
}

/// [`Sanitizer`] backed by `ammonia`.
///
/// Uses ammonia's default allowlist (prose, tables, links, images, code)
/// plus the attributes the slot markers and task lists need. The
/// placeholder class is reserved for the mounted view and removed from
/// every input element.
#[derive(Clone, Copy, Debug, Default)]
pub struct AmmoniaSanitizer;

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, ConvertError> {
        let mut builder = ammonia::Builder::default();
        builder
            .add_tags(["input"])
            .add_tag_attributes("div", ["id", "class", SLOT_ATTRIBUTE])
            .add_tag_attributes("code", ["class"])
            .add_tag_attributes("input", ["type", "checked", "disabled"])
            .add_tag_attributes("h1", ["id"])
            .add_tag_attributes("h2", ["id"])
            .add_tag_attributes("h3", ["id"])
            .add_tag_attributes("h4", ["id"])
            .add_tag_attributes("h5", ["id"])
            .add_tag_attributes("h6", ["id"])
            .attribute_filter(strip_placeholder_class);
        Ok(builder.clean(html).to_string())
    }
}

fn strip_placeholder_class<'u>(
    _element: &str,
    attribute: &str,
    value: &'u str,
) -> Option<Cow<'u, str>> {
    if attribute != "class" || !value.split_whitespace().any(|c| c == PLACEHOLDER_CLASS) {
        return Some(Cow::Borrowed(value));
    }
    let kept: Vec<&str> = value
        .split_whitespace()
        .filter(|c| *c != PLACEHOLDER_CLASS)
        .collect();
    (!kept.is_empty()).then(|| Cow::Owned(kept.join(" ")))
}

/// Markdown to sanitized HTML.
#[derive(Clone)]
pub struct MarkdownConverter {
    sanitizer: Arc<dyn Sanitizer>,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new(Arc::new(AmmoniaSanitizer))
    }
}

impl MarkdownConverter {
    #[must_use]
    pub fn new(sanitizer: Arc<dyn Sanitizer>) -> Self {
        Self { sanitizer }
    }

    /// Convert and sanitize, falling back to escaped text on failure.
    pub async fn convert(&self, text: &str) -> String {
        match self.try_convert(text).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "Markdown conversion failed, showing escaped source");
                fallback_html(text)
            }
        }
    }

    /// Convert and sanitize.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the conversion task fails or the
    /// sanitizer rejects the output.
    pub async fn try_convert(&self, text: &str) -> Result<String, ConvertError> {
        let text = text.to_owned();
        let sanitizer = Arc::clone(&self.sanitizer);
        tokio::task::spawn_blocking(move || {
            let raw = markdown_to_html(&text);
            sanitizer.sanitize(&raw)
        })
        .await?
    }
}

fn markdown_to_html(text: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(text, options));
    out
}

/// Escaped rendering of `text` used when conversion fails.
#[must_use]
pub fn fallback_html(text: &str) -> String {
    format!(r#"<pre class="markdown-fallback">{}</pre>"#, escape_html(text))
}

/// Returns true if `html` still contains an unresolved placeholder marker.
#[must_use]
pub fn has_placeholder(html: &str) -> bool {
    html.contains(PLACEHOLDER_CLASS)
}
