//! `folio render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use folio_cache::{Cache, FileCache};
use folio_config::Config;
use folio_diagrams::KrokiRenderer;
use folio_renderer::{
    DiagramRenderer, DisabledRenderer, RenderOutcome, RenderPipeline, has_placeholder,
};
use folio_site::PageError;

use super::{CommonArgs, open_site, print_stdout};
use crate::error::CliError;
use crate::output::Output;

/// Cache version; bump to invalidate cached diagrams.
const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Document slug, e.g. `nodes/http` (default: the configured default page).
    #[arg(default_value = "")]
    slug: String,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// A missing document renders a not-found page instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the document cannot be read,
    /// or the output cannot be written.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;
        let site = open_site(&config);

        let document = match site.page(&self.slug) {
            Ok(page) => {
                output.info(&format!("Rendering {}", page.source_path.display()));
                page.content
            }
            Err(PageError::NotFound(slug)) => {
                output.warning(&format!("Page not found: {slug}"));
                not_found_document(&slug)
            }
            Err(e) => return Err(e.into()),
        };

        let html = match &config.diagrams_resolved.kroki_url {
            Some(kroki_url) => {
                let renderer = kroki_renderer(&config, kroki_url)?;
                render_document(renderer, &document, &output).await
            }
            None => render_document(DisabledRenderer::default(), &document, &output).await,
        };

        if has_placeholder(&html) {
            output.warning("Some diagrams were not resolved");
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                output.success(&format!("Wrote {}", path.display()));
                Ok(())
            }
            None => print_stdout(&html),
        }
    }
}

fn kroki_renderer(config: &Config, kroki_url: &str) -> Result<KrokiRenderer, CliError> {
    let renderer = KrokiRenderer::new(kroki_url, config.diagrams_resolved.timeout);
    if !config.docs_resolved.cache_enabled {
        return Ok(renderer);
    }
    let cache_dir = config.docs_resolved.cache_dir();
    ensure_dir(&cache_dir)?;
    let cache = FileCache::new(cache_dir, CACHE_VERSION);
    Ok(renderer.with_cache(cache.bucket("diagrams")))
}

fn ensure_dir(dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Run both rendering phases and return the resolved HTML.
async fn render_document<R: DiagramRenderer>(
    renderer: R,
    document: &str,
    output: &Output,
) -> String {
    let pipeline = RenderPipeline::new(renderer);
    match pipeline.render(document).await {
        RenderOutcome::Completed { html, report, .. } => {
            if report.failed > 0 {
                output.warning(&format!("{} diagram(s) failed to render", report.failed));
            }
            tracing::info!(
                rendered = report.rendered,
                failed = report.failed,
                skipped = report.skipped,
                "Document rendered"
            );
            html
        }
        RenderOutcome::Unchanged | RenderOutcome::Superseded { .. } => pipeline.html(),
    }
}

/// Markdown shown in place of a missing document.
fn not_found_document(slug: &str) -> String {
    format!("# Page not found\n\nNo document exists at `{slug}`.\n")
}
