//! Configuration management for gallerycrawl.
//!
//! Settings come from a config file (the explicit `--config` path, or one
//! discovered by `prefer`), then environment overrides, then CLI flags.

pub mod browser;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use browser::BrowserEngineConfig;

use crate::scrapers::config::{CrawlConfig, SelectorConfig};

/// Name `prefer` searches for.
pub const CONFIG_NAME: &str = "gallerycrawl";

/// File name written by `config init`.
pub const LOCAL_CONFIG_FILE: &str = "gallerycrawl.toml";

/// Errors raised while loading or applying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported config format '{extension}' for {path} (use .toml or .json)")]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("invalid listing URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Spreadsheet output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the spreadsheet is written to.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Leading part of the generated file name.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Rows shown in the terminal preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            file_prefix: default_file_prefix(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "gdhwelfare_photos".to_string()
}

fn default_preview_rows() -> usize {
    20
}

/// Complete application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings, discovering the config file when none is given.
    ///
    /// An explicit path must exist. Discovery goes through `prefer`, which
    /// searches the working directory and the standard config locations for
    /// a `gallerycrawl` file. Defaults are used when nothing is found.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover_config_path().await,
        };

        let settings = match path {
            Some(path) => Self::load_from_path(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        Ok(settings.with_env_overrides())
    }

    /// Read settings from a TOML or JSON file without environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let mut settings: Settings = match ext {
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            other => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension: other.to_string(),
                })
            }
        };
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        self.browser = self.browser.with_env_overrides();
        self
    }

    /// Render settings as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Location `config init` writes to by default.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_NAME).join(LOCAL_CONFIG_FILE))
}

/// Find a config file with `prefer`, returning its path.
pub async fn discover_config_path() -> Option<PathBuf> {
    match prefer::load(CONFIG_NAME).await {
        Ok(found) => found.source_path().map(|path| path.to_path_buf()),
        Err(e) => {
            debug!("Config discovery found nothing: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::config::NavigationFailurePolicy;

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallerycrawl.toml");
        fs::write(
            &path,
            r#"
            [crawl]
            max_pages = 50
            on_navigation_error = "skip"

            [selectors]
            author = ".photo_info > span:nth-child(1)"

            [output]
            directory = "exports"
            "#,
        )
        .unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.crawl.max_pages, 50);
        assert_eq!(
            settings.crawl.on_navigation_error,
            NavigationFailurePolicy::Skip
        );
        assert_eq!(settings.crawl.page_param, "pageIndex");
        assert_eq!(settings.selectors.container, ".list_in");
        assert_eq!(
            settings.selectors.author.as_deref(),
            Some(".photo_info > span:nth-child(1)")
        );
        assert_eq!(settings.output.directory, PathBuf::from("exports"));
        assert_eq!(settings.output.file_prefix, "gdhwelfare_photos");
        assert_eq!(settings.source_path.as_deref(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Settings::load(Some(&missing)).await,
            Err(ConfigError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn test_explicit_path_skips_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[crawl]\nmax_pages = 7\n").unwrap();

        let settings = Settings::load(Some(&path)).await.unwrap();
        assert_eq!(settings.crawl.max_pages, 7);
        assert_eq!(settings.source_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_json_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallerycrawl.json");
        fs::write(&path, r#"{"crawl": {"page_delay_ms": 250}}"#).unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.crawl.page_delay_ms, 250);
        assert_eq!(settings.crawl.max_pages, 100);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallerycrawl.ini");
        fs::write(&path, "max_pages=3").unwrap();
        assert!(matches!(
            Settings::load_from_path(&path),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_user_config_path_uses_discoverable_name() {
        if let Some(path) = user_config_path() {
            assert_eq!(
                path.file_name().and_then(|n| n.to_str()),
                Some(LOCAL_CONFIG_FILE)
            );
        }
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[crawl\nmax_pages = ").unwrap();
        assert!(matches!(
            Settings::load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_defaults_serialize_and_reload() {
        let rendered = Settings::default().to_toml_string().unwrap();
        let reparsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, Settings::default());
    }
}
