//! Diagram rendering via Kroki.
//!
//! Provides [`KrokiRenderer`], the [`folio_renderer::DiagramRenderer`]
//! implementation used by the CLI when `[diagrams] kroki_url` is configured.
//! Rendered SVGs are cached under a [`DiagramKey`] hash so unchanged
//! diagrams never hit the network twice.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use folio_cache::{Cache, FileCache};
//! use folio_diagrams::KrokiRenderer;
//! use folio_renderer::RenderPipeline;
//!
//! let cache = FileCache::new(".folio/cache".into(), env!("CARGO_PKG_VERSION"));
//! let renderer = KrokiRenderer::new("https://kroki.io", Duration::from_secs(30))
//!     .with_cache(cache.bucket("diagrams"));
//! let pipeline = RenderPipeline::new(renderer);
//! ```

mod key;
mod kroki;

pub use key::DiagramKey;
pub use kroki::{KrokiRenderer, create_agent};

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
