//! Browser engine settings.
//!
//! Always compiled, so `config show` and `config init` work in builds
//! without the `browser` feature.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Desktop Chrome user agent. The gallery serves a reduced mobile listing
/// to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How the crawl's browser is started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Hide the browser window. `--no-headless` turns this off.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy for all browser traffic, e.g. `socks5://127.0.0.1:1080`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Limit for one navigation or CDP request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra Chrome command line flags.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// DevTools endpoint of an already running browser, e.g.
    /// `ws://localhost:9222`. Nothing is launched when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Apply `BROWSER_URL` and `SOCKS_PROXY`.
    ///
    /// `BROWSER_URL` always wins over the file. `SOCKS_PROXY` only fills in
    /// a proxy the file left unset.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env("BROWSER_URL") {
            self.remote_url = Some(url);
        }
        if self.proxy.is_none() {
            self.proxy = non_empty_env("SOCKS_PROXY");
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_headless() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_uses_defaults() {
        let config: BrowserEngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, BrowserEngineConfig::default());
        assert!(config.headless);
        assert_eq!(config.navigation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_table() {
        let config: BrowserEngineConfig = toml::from_str(
            r#"
            headless = false
            chrome_args = ["--lang=ko-KR"]
            "#,
        )
        .unwrap();
        assert!(!config.headless);
        assert_eq!(config.chrome_args, vec!["--lang=ko-KR".to_string()]);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let rendered = toml::to_string_pretty(&BrowserEngineConfig::default()).unwrap();
        assert!(!rendered.contains("remote_url"));
        let parsed: BrowserEngineConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, BrowserEngineConfig::default());
    }
}
