//! CLI error types.

use folio_config::ConfigError;
use folio_site::{PageError, TreeError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
