//! The diagram rendering contract.

use std::future::Future;
use std::sync::Arc;

use crate::language::DiagramLanguage;

/// Why a single diagram could not be rendered.
///
/// The `Display` output is what readers see in the error block's details.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// The renderer rejected the diagram (syntax error and similar).
    #[error("{0}")]
    Render(String),
    /// Diagram rendering is not configured.
    #[error("diagram rendering is disabled ({0})")]
    Disabled(String),
    /// The rendering service answered with an error status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, usually the service's error message.
        body: String,
    },
    /// The request never got an answer.
    #[error("request failed: {0}")]
    Transport(String),
    /// The renderer panicked while handling this diagram.
    #[error("renderer panicked: {0}")]
    Panicked(String),
}

/// One render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderRequest<'a> {
    /// Unique render target name, `{placeholder id}-svg`.
    pub target: &'a str,
    /// Diagram language.
    pub language: DiagramLanguage,
    /// Diagram source, trimmed.
    pub source: &'a str,
}

/// Asynchronously turns diagram source into visual markup (usually SVG).
///
/// Calls for different diagrams may be in flight at the same time.
pub trait DiagramRenderer: Send + Sync {
    /// Render one diagram.
    fn render(
        &self,
        request: RenderRequest<'_>,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send;
}

impl<R: DiagramRenderer> DiagramRenderer for Arc<R> {
    fn render(
        &self,
        request: RenderRequest<'_>,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        (**self).render(request)
    }
}

/// Renderer used when no diagram backend is configured.
///
/// Every diagram resolves to an error block explaining why.
#[derive(Clone, Debug)]
pub struct DisabledRenderer {
    reason: String,
}

impl DisabledRenderer {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for DisabledRenderer {
    fn default() -> Self {
        Self::new("no [diagrams] kroki_url configured")
    }
}

impl DiagramRenderer for DisabledRenderer {
    fn render(
        &self,
        _request: RenderRequest<'_>,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        std::future::ready(Err(DiagramError::Disabled(self.reason.clone())))
    }
}
