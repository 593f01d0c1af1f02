//! Diagram resolution (phase two).
//!
//! Every diagram of a mounted page is rendered concurrently. Results are
//! spliced into their own slot as they complete, in whatever order that is.
//! A result is only applied if the view still belongs to the render that
//! requested it and the slot is still pending; anything else is discarded.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::extract::{DiagramMap, DiagramPlaceholder};
use crate::renderer::{DiagramError, DiagramRenderer, RenderRequest};
use crate::util::escape_html;
use crate::view::{SharedView, lock_view};

/// What happened to the diagrams of one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveReport {
    /// Slots filled with rendered markup.
    pub rendered: usize,
    /// Slots filled with an error block.
    pub failed: usize,
    /// Diagrams not attempted because their slot was not mounted.
    pub skipped: usize,
    /// Results dropped because the view moved on while rendering.
    pub discarded: usize,
}

impl DriveReport {
    /// Number of slots this pass filled.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.rendered + self.failed
    }
}

/// Render all `diagrams` into the slots of `view` mounted for `generation`.
///
/// An empty map is a no-op.
pub async fn resolve_diagrams<R: DiagramRenderer>(
    renderer: &R,
    view: &SharedView,
    generation: u64,
    diagrams: &DiagramMap,
) -> DriveReport {
    let mut report = DriveReport::default();
    if diagrams.is_empty() {
        return report;
    }

    let mut in_flight = FuturesUnordered::new();
    {
        let mounted = lock_view(view);
        for diagram in diagrams {
            if mounted.generation() != generation || !mounted.has_pending(&diagram.id) {
                tracing::debug!(id = %diagram.id, generation, "Placeholder not mounted, skipping");
                report.skipped += 1;
                continue;
            }
            in_flight.push(render_one(renderer, diagram));
        }
    }

    while let Some((diagram, outcome)) = in_flight.next().await {
        let succeeded = outcome.is_ok();
        let content = match outcome {
            Ok(markup) => diagram_html(&markup),
            Err(e) => {
                tracing::warn!(id = %diagram.id, language = %diagram.language, error = %e, "Diagram render failed");
                error_block(diagram, &e)
            }
        };

        let mut mounted = lock_view(view);
        if mounted.generation() != generation || !mounted.fill(&diagram.id, content) {
            tracing::debug!(id = %diagram.id, generation, "Discarding stale diagram result");
            report.discarded += 1;
            continue;
        }
        if succeeded {
            report.rendered += 1;
        } else {
            report.failed += 1;
        }
    }

    report
}

async fn render_one<'a, R: DiagramRenderer>(
    renderer: &'a R,
    diagram: &'a DiagramPlaceholder,
) -> (&'a DiagramPlaceholder, Result<String, DiagramError>) {
    let target = format!("{}-svg", diagram.id);
    let request = RenderRequest {
        target: &target,
        language: diagram.language,
        source: diagram.trimmed_source(),
    };
    // The call itself sits inside the guarded future so a renderer that
    // panics before returning its future is caught too.
    let outcome = AssertUnwindSafe(async { renderer.render(request).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(DiagramError::Panicked(panic_message(payload.as_ref()))));
    (diagram, outcome)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Wrapper for successfully rendered markup.
fn diagram_html(markup: &str) -> String {
    format!(r#"<figure class="diagram">{markup}</figure>"#)
}

/// Terminal error block for a diagram that could not be rendered.
///
/// Shows the source as extracted, not trimmed.
#[must_use]
pub fn error_block(diagram: &DiagramPlaceholder, error: &DiagramError) -> String {
    format!(
        concat!(
            r#"<div class="diagram-error">"#,
            "<h4>⚠️ Diagram Error</h4>",
            "<p>Unable to render the diagram. Here's the original code:</p>",
            "<pre><code>{source}</code></pre>",
            "<details><summary>Error details</summary><pre><code>{message}</code></pre></details>",
            "</div>",
        ),
        source = escape_html(&diagram.source),
        message = escape_html(&error.to_string()),
    )
}
