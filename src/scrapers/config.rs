//! Crawler configuration types.
//!
//! These structs define the TOML-configurable behavior of a listing crawl:
//! where the listing lives, how far to paginate, how to wait for lazily
//! loaded content, and which selectors identify an entry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigError;

/// Crawl configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Listing endpoint. Existing query parameters are kept.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Query parameter carrying the 1-based page index.
    #[serde(default = "default_page_param")]
    pub page_param: String,
    /// Highest page index visited.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Pause between consecutive pages in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// How long to wait for the listing container, in seconds.
    #[serde(default = "default_listing_timeout_secs")]
    pub listing_timeout_secs: u64,
    /// What a failed page load does to the rest of the crawl.
    #[serde(default)]
    pub on_navigation_error: NavigationFailurePolicy,
    /// Stop at the first entry older than the range start.
    /// Only valid when the listing is ordered newest-first.
    #[serde(default = "default_true")]
    pub assume_newest_first: bool,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_param: default_page_param(),
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            listing_timeout_secs: default_listing_timeout_secs(),
            on_navigation_error: NavigationFailurePolicy::default(),
            assume_newest_first: true,
            scroll: ScrollConfig::default(),
        }
    }
}

impl CrawlConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    /// Build the listing URL for a page index.
    ///
    /// Replaces the page parameter if the base URL already carries one.
    pub fn listing_url(&self, page_index: u32) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != self.page_param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&self.page_param, &page_index.to_string());

        Ok(url)
    }
}

/// Crawl-continuation policy for a page that fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationFailurePolicy {
    /// Stop the crawl and return what was collected so far
    #[default]
    Abort,
    /// Log the failure and move on to the next page
    Skip,
}

/// Scroll strategy used to reveal lazily loaded entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollStrategyType {
    /// Press End until the scroll offset stops changing
    #[default]
    Stability,
    /// Press End a fixed number of times with a fixed pause
    Fixed,
}

/// Render stabilization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default)]
    pub strategy: ScrollStrategyType,
    /// Offset polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Offset must stay unchanged this long to count as stable.
    #[serde(default = "default_stall_timeout_ms")]
    pub stall_timeout_ms: u64,
    /// Upper bound on the whole stabilization, in seconds.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
    /// End presses for the fixed strategy.
    #[serde(default = "default_fixed_presses")]
    pub fixed_presses: u32,
    /// Pause after each press for the fixed strategy, in milliseconds.
    #[serde(default = "default_fixed_pause_ms")]
    pub fixed_pause_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            strategy: ScrollStrategyType::default(),
            poll_interval_ms: default_poll_interval_ms(),
            stall_timeout_ms: default_stall_timeout_ms(),
            max_duration_secs: default_max_duration_secs(),
            fixed_presses: default_fixed_presses(),
            fixed_pause_ms: default_fixed_pause_ms(),
        }
    }
}

/// CSS selectors identifying listing entries and their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One match per listing entry.
    #[serde(default = "default_container_selector")]
    pub container: String,
    /// Title node, relative to the entry.
    #[serde(default = "default_title_selector")]
    pub title: String,
    /// Date node, relative to the entry.
    #[serde(default = "default_date_selector")]
    pub date: String,
    /// Author node, relative to the entry. Leave unset to skip authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: default_container_selector(),
            title: default_title_selector(),
            date: default_date_selector(),
            author: None,
        }
    }
}

fn default_base_url() -> String {
    "https://www.gdhwelfare.or.kr/community/PhotoList.do".to_string()
}
fn default_page_param() -> String {
    "pageIndex".to_string()
}
fn default_max_pages() -> u32 {
    100
}
fn default_page_delay_ms() -> u64 {
    1000
}
fn default_listing_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_poll_interval_ms() -> u64 {
    50
}
fn default_stall_timeout_ms() -> u64 {
    2000
}
fn default_max_duration_secs() -> u64 {
    60
}
fn default_fixed_presses() -> u32 {
    5
}
fn default_fixed_pause_ms() -> u64 {
    500
}
fn default_container_selector() -> String {
    ".list_in".to_string()
}
fn default_title_selector() -> String {
    ".bold.ellipsis".to_string()
}
fn default_date_selector() -> String {
    ".photo_info > span:nth-child(2)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_appends_page_param() {
        let config = CrawlConfig::default();
        let url = config.listing_url(3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.gdhwelfare.or.kr/community/PhotoList.do?pageIndex=3"
        );
    }

    #[test]
    fn test_listing_url_keeps_other_params_and_replaces_page() {
        let config = CrawlConfig {
            base_url: "https://example.org/list.do?bbsNo=7&pageIndex=9&searchKeyword=".to_string(),
            ..Default::default()
        };
        let url = config.listing_url(2).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("bbsNo".to_string(), "7".to_string()),
                ("searchKeyword".to_string(), String::new()),
                ("pageIndex".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_listing_url_rejects_relative_base() {
        let config = CrawlConfig {
            base_url: "/community/PhotoList.do".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.listing_url(1),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_policy_serde_names() {
        let config: CrawlConfig = toml::from_str(
            r#"
            on_navigation_error = "skip"
            [scroll]
            strategy = "fixed"
            fixed_presses = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.on_navigation_error, NavigationFailurePolicy::Skip);
        assert_eq!(config.scroll.strategy, ScrollStrategyType::Fixed);
        assert_eq!(config.scroll.fixed_presses, 3);
        assert_eq!(config.scroll.stall_timeout_ms, 2000);
        assert_eq!(config.max_pages, 100);
    }
}
