//! Kroki diagram rendering.
//!
//! Each diagram is POSTed as plain text to `{server}/{endpoint}/svg`. The
//! HTTP call is blocking (`ureq`), so it runs on tokio's blocking pool and
//! many diagrams of one page can be in flight at once. Successful SVGs are
//! stored in a content-addressed cache bucket; failures are never cached.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use folio_cache::{CacheBucket, CacheBucketExt, NullCacheBucket};
use folio_renderer::{DiagramError, DiagramRenderer, RenderRequest};
use ureq::Agent;

use crate::key::DiagramKey;

/// Output format requested from Kroki.
const FORMAT: &str = "svg";

/// Create HTTP agent with the specified timeout.
///
/// Status codes are inspected by the caller so error bodies (Kroki's syntax
/// error messages) can be surfaced.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`DiagramRenderer`] backed by a Kroki server.
#[derive(Clone)]
pub struct KrokiRenderer {
    agent: Agent,
    server_url: String,
    cache: Arc<dyn CacheBucket>,
}

impl KrokiRenderer {
    /// Renderer for `server_url` without caching.
    #[must_use]
    pub fn new(server_url: &str, timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            server_url: server_url.trim_end_matches('/').to_owned(),
            cache: Arc::new(NullCacheBucket),
        }
    }

    /// Cache rendered SVGs in `bucket`.
    #[must_use]
    pub fn with_cache(mut self, bucket: Arc<dyn CacheBucket>) -> Self {
        self.cache = bucket;
        self
    }

    /// Server URL without trailing slash.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

impl DiagramRenderer for KrokiRenderer {
    fn render(
        &self,
        request: RenderRequest<'_>,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        let endpoint = request.language.endpoint();
        let key = DiagramKey {
            endpoint,
            format: FORMAT,
            source: request.source,
        }
        .hash();
        let url = format!("{}/{endpoint}/{FORMAT}", self.server_url);
        let target = request.target.to_owned();
        let source = request.source.to_owned();
        let agent = self.agent.clone();
        let cache = Arc::clone(&self.cache);

        async move {
            if let Some(svg) = cache.get_string(&key) {
                tracing::debug!(%target, "Diagram cache hit");
                return Ok(svg);
            }

            tracing::debug!(%target, %url, "Rendering diagram via Kroki");
            let svg = tokio::task::spawn_blocking(move || fetch(&agent, &url, &source))
                .await
                .map_err(|e| DiagramError::Panicked(e.to_string()))??;

            cache.set_string(&key, &svg);
            Ok(svg)
        }
    }
}

/// POST `source` to `url` and return the response body.
fn fetch(agent: &Agent, url: &str, source: &str) -> Result<String, DiagramError> {
    let response = agent
        .post(url)
        .header("Content-Type", "text/plain")
        .send(source.as_bytes())
        .map_err(|e| DiagramError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(DiagramError::Http {
            status,
            body: body.trim().to_owned(),
        });
    }

    body.read_to_string()
        .map_err(|e| DiagramError::Transport(e.to_string()))
}
