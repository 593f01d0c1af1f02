//! Configuration management for folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.source_dir`
//! - `diagrams.kroki_url`
//! - `navigation.state_key`

mod expand;
mod navigation;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub use navigation::{NavigationConfig, PriorityGroupConfig, PriorityItem};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Project data directory, next to the config file.
const PROJECT_DIR: &str = ".folio";

/// Default Kroki request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Diagram rendering configuration (optional section).
    /// When present, `kroki_url` is required.
    diagrams: Option<DiagramsConfigRaw>,
    /// Navigation and priority configuration.
    pub navigation: NavigationConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    cache_enabled: Option<bool>,
    default_page: Option<String>,
    extension: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Document root directory.
    pub source_dir: PathBuf,
    /// Project directory for folio data (`.folio/`).
    pub project_dir: PathBuf,
    /// Whether caching is enabled.
    pub cache_enabled: bool,
    /// Slug served when none is given (without extension).
    pub default_page: String,
    /// Document file extension, without the dot.
    pub extension: String,
}

impl DocsConfig {
    /// Cache directory path (`.folio/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }

    /// Persisted navigation state (`.folio/state.json`).
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.project_dir.join("state.json")
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    kroki_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug)]
pub struct DiagramsConfig {
    /// Kroki server URL; `None` disables diagram rendering.
    pub kroki_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result doesn't validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.docs_resolved.cache_enabled = cache_enabled;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url = Some(kroki_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            diagrams: None,
            navigation: NavigationConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                project_dir: base.join(PROJECT_DIR),
                cache_enabled: true,
                default_page: "OVERVIEW".to_owned(),
                extension: "md".to_owned(),
            },
            diagrams_resolved: DiagramsConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        self.validate_diagrams()?;
        self.navigation.validate()?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let docs = &self.docs_resolved;
        if docs.extension.is_empty() || docs.extension.contains(['.', '/']) {
            return Err(ConfigError::Validation(
                "docs.extension must be a bare extension like \"md\"".to_owned(),
            ));
        }
        if docs.default_page.split('/').any(|s| s == "..") {
            return Err(ConfigError::Validation(
                "docs.default_page cannot leave the source directory".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        if let Some(kroki_url) = &self.diagrams_resolved.kroki_url {
            if kroki_url.is_empty() {
                return Err(ConfigError::Validation(
                    "diagrams.kroki_url cannot be empty".to_owned(),
                ));
            }
            if !kroki_url.starts_with("http://") && !kroki_url.starts_with("https://") {
                return Err(ConfigError::Validation(
                    "diagrams.kroki_url must start with http:// or https://".to_owned(),
                ));
            }
        }
        if self.diagrams_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(source_dir) = &self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(source_dir, "docs.source_dir")?);
        }

        if let Some(ref mut diagrams) = self.diagrams
            && let Some(ref url) = diagrams.kroki_url
        {
            diagrams.kroki_url = Some(expand::expand_env(url, "diagrams.kroki_url")?);
        }

        self.navigation.state_key =
            expand::expand_env(&self.navigation.state_key, "navigation.state_key")?;

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// Validates that `kroki_url` is provided when `[diagrams]` section exists.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            project_dir: config_dir.join(PROJECT_DIR),
            cache_enabled: self.docs.cache_enabled.unwrap_or(true),
            default_page: self
                .docs
                .default_page
                .clone()
                .unwrap_or_else(|| "OVERVIEW".to_owned()),
            extension: self
                .docs
                .extension
                .as_deref()
                .map_or_else(|| "md".to_owned(), |e| e.trim_start_matches('.').to_owned()),
        };

        self.diagrams_resolved = match &self.diagrams {
            Some(diagrams) => {
                let kroki_url = diagrams.kroki_url.clone().ok_or_else(|| {
                    ConfigError::Validation(
                        "[diagrams] section requires kroki_url to be set".to_owned(),
                    )
                })?;
                DiagramsConfig {
                    kroki_url: Some(kroki_url),
                    timeout: Duration::from_secs(
                        diagrams.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                    ),
                }
            }
            None => DiagramsConfig::default(),
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(
            config.docs_resolved.cache_dir(),
            PathBuf::from("/test/.folio/cache")
        );
        assert_eq!(
            config.docs_resolved.state_file(),
            PathBuf::from("/test/.folio/state.json")
        );
        assert!(config.docs_resolved.cache_enabled);
        assert_eq!(config.docs_resolved.default_page, "OVERVIEW");
        assert_eq!(config.docs_resolved.extension, "md");
        assert_eq!(config.diagrams_resolved.kroki_url, None);
        assert_eq!(config.navigation.state_key, "folio-expanded-folders");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.navigation, NavigationConfig::default());
        assert!(config.diagrams.is_none());
    }

    #[test]
    fn test_load_resolves_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[docs]
source_dir = "content"
cache_enabled = false
default_page = "README"
extension = ".markdown"

[diagrams]
kroki_url = "https://kroki.io"
timeout_secs = 5
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("content"));
        assert_eq!(config.docs_resolved.project_dir, tmp.path().join(".folio"));
        assert!(!config.docs_resolved.cache_enabled);
        assert_eq!(config.docs_resolved.default_page, "README");
        assert_eq!(config.docs_resolved.extension, "markdown");
        assert_eq!(
            config.diagrams_resolved.kroki_url.as_deref(),
            Some("https://kroki.io")
        );
        assert_eq!(config.diagrams_resolved.timeout, Duration::from_secs(5));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/folio.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_diagrams_section_requires_kroki_url() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(tmp.path(), "[diagrams]\ntimeout_secs = 10\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("kroki_url"));
    }

    #[test]
    fn test_validate_kroki_url_invalid_scheme() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(tmp.path(), "[diagrams]\nkroki_url = \"ftp://kroki\"\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validate_extension_with_slash() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(tmp.path(), "[docs]\nextension = \"md/x\"\n");

        assert!(Config::load(Some(&path), None).is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(tmp.path(), "");
        let settings = CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere")),
            cache_enabled: Some(false),
            kroki_url: Some("http://localhost:8000".to_owned()),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/elsewhere"));
        assert!(!config.docs_resolved.cache_enabled);
        assert_eq!(
            config.diagrams_resolved.kroki_url.as_deref(),
            Some("http://localhost:8000")
        );
    }

    #[test]
    fn test_apply_cli_settings_invalid_kroki_url() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(tmp.path(), "");
        let settings = CliSettings {
            kroki_url: Some("kroki:8000".to_owned()),
            ..CliSettings::default()
        };

        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }

    #[test]
    fn test_expand_env_vars_in_file() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_TEST_CONFIG_KROKI", "https://kroki.test.com");
        }
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[diagrams]
kroki_url = "${FOLIO_TEST_CONFIG_KROKI}"

[navigation]
state_key = "${FOLIO_TEST_CONFIG_KEY:-team-docs}"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.diagrams_resolved.kroki_url.as_deref(),
            Some("https://kroki.test.com")
        );
        assert_eq!(config.navigation.state_key, "team-docs");

        unsafe {
            std::env::remove_var("FOLIO_TEST_CONFIG_KROKI");
        }
    }
}
