//! CLI command implementations.

pub(crate) mod nav;
pub(crate) mod render;
pub(crate) mod slugs;
pub(crate) mod toggle;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_nav::{FileStore, NavigationStateStore};
use folio_site::{Site, SiteConfig};
use folio_storage::FsStorage;

pub(crate) use nav::NavArgs;
pub(crate) use render::RenderArgs;
pub(crate) use slugs::SlugsArgs;
pub(crate) use toggle::ToggleArgs;

use crate::error::CliError;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "FOLIO_KROKI_URL")]
    kroki_url: Option<String>,

    /// Enable caching (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable caching.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl CommonArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            cache_enabled: self.resolve_cache_enabled(),
            kroki_url: self.kroki_url.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}

/// Site over the configured source directory.
pub(crate) fn open_site(config: &Config) -> Site {
    let storage = FsStorage::new(config.docs_resolved.source_dir.clone());
    Site::new(Arc::new(storage), SiteConfig::from(config))
}

/// Navigation state persisted in `.folio/state.json`, already loaded.
pub(crate) fn open_nav_state(config: &Config) -> NavigationStateStore {
    let store = FileStore::new(config.docs_resolved.state_file());
    let nav = NavigationStateStore::new(Arc::new(store), config.navigation.state_key.clone());
    nav.load();
    nav
}

/// Write `text` to stdout followed by a newline.
pub(crate) fn print_stdout(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}
