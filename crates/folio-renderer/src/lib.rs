//! Two-phase markdown rendering for folio.
//!
//! Phase one turns a document into sanitized HTML in which every diagram
//! block has been replaced by an empty placeholder element. Phase two renders
//! the diagrams concurrently and splices each result (or an error block) into
//! its placeholder once the HTML is mounted.
//!
//! # Architecture
//!
//! - [`extract`]: cuts fenced diagram blocks out of the text
//! - [`MarkdownConverter`]: markdown to HTML, then a mandatory [`Sanitizer`]
//! - [`MountedView`]: mounted HTML with one addressable slot per placeholder
//! - [`resolve_diagrams`]: concurrent diagram resolution into a mounted view
//! - [`RenderPipeline`]: generation-tagged orchestration of both phases
//!
//! Diagram backends implement [`DiagramRenderer`]; see the `folio-diagrams`
//! crate for the Kroki implementation.
//!
//! # Example
//!
//! ```ignore
//! use folio_renderer::{DisabledRenderer, RenderOutcome, RenderPipeline};
//!
//! let pipeline = RenderPipeline::new(DisabledRenderer::default());
//! if let RenderOutcome::Completed { html, .. } = pipeline.render(markdown).await {
//!     println!("{html}");
//! }
//! ```

mod convert;
mod driver;
mod extract;
mod language;
mod pipeline;
mod renderer;
mod util;
mod view;

pub use convert::{
    AmmoniaSanitizer, ConvertError, MarkdownConverter, Sanitizer, fallback_html, has_placeholder,
};
pub use driver::{DriveReport, error_block, resolve_diagrams};
pub use extract::{
    DiagramMap, DiagramPlaceholder, Extraction, PLACEHOLDER_CLASS, extract, placeholder_marker,
};
pub use language::DiagramLanguage;
pub use pipeline::{PhaseOne, PipelineState, RenderOutcome, RenderPipeline};
pub use renderer::{DiagramError, DiagramRenderer, DisabledRenderer, RenderRequest};
pub use util::escape_html;
pub use view::{MountedView, SharedView, SlotState, lock_view};
