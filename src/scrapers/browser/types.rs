//! Browser error types.

use std::time::Duration;

/// Errors from the browser seam.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Chrome/Chromium not found: {0}")]
    ExecutableNotFound(String),
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("failed to connect to remote browser at {url}: {message}")]
    Connect { url: String, message: String },
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("element '{selector}' not found: {message}")]
    ElementNotFound { selector: String, message: String },
    #[error("timed out after {timeout:?} waiting for '{selector}'")]
    WaitTimeout { selector: String, timeout: Duration },
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("no page is open")]
    NoPage,
    #[error("browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,
}

impl BrowserError {
    /// True for errors meaning the awaited element never showed up.
    pub fn is_missing_element(&self) -> bool {
        matches!(
            self,
            BrowserError::WaitTimeout { .. } | BrowserError::ElementNotFound { .. }
        )
    }
}
