//! Browser seam for JavaScript-rendered listings.
//!
//! The crawl only needs a handful of capabilities from a browser, captured by
//! [`ListingBrowser`]. [`ChromeSession`] implements them over chromiumoxide
//! (CDP); tests substitute an in-memory listing.

mod binary;
mod session;
mod types;

pub use binary::chrome_executable;
pub use session::ChromeSession;
pub use types::BrowserError;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::BrowserEngineConfig;

/// Browser operations used by the listing crawl.
///
/// One session holds one open page. Implementations are driven from a single
/// task and never shared.
#[async_trait]
pub trait ListingBrowser: Send {
    /// Load `url` in the session's page.
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Wait until `selector` matches, failing with
    /// [`BrowserError::WaitTimeout`] after `timeout`.
    async fn wait_for_element(&mut self, selector: &str, timeout: Duration)
        -> Result<(), BrowserError>;

    /// Serialized DOM as currently rendered.
    async fn rendered_html(&mut self) -> Result<String, BrowserError>;

    /// Send an "End" key press to the page.
    async fn press_end(&mut self) -> Result<(), BrowserError>;

    /// Current vertical scroll offset in CSS pixels.
    async fn scroll_offset(&mut self) -> Result<i64, BrowserError>;

    /// Release the page and browser. Must be safe to call more than once.
    async fn close(&mut self);
}

/// One-time browser setup for this process.
///
/// Locates the Chrome executable unless a remote browser is configured.
/// Repeated calls are cheap.
pub async fn prepare(config: &BrowserEngineConfig) -> Result<(), BrowserError> {
    if config.remote_url.is_some() {
        return Ok(());
    }
    if !cfg!(feature = "browser") {
        return Err(BrowserError::NotCompiled);
    }
    chrome_executable().await.map(|_| ())
}
