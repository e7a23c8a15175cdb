//! chromiumoxide-backed [`ListingBrowser`].

#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

use super::types::BrowserError;
use super::ListingBrowser;
use crate::config::BrowserEngineConfig;

/// Interval between element presence checks.
#[cfg(feature = "browser")]
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A single-page Chrome session, launched locally or attached remotely.
#[cfg(feature = "browser")]
pub struct ChromeSession {
    config: BrowserEngineConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    /// True when this session started the Chrome process and must stop it.
    owns_process: bool,
}

#[cfg(feature = "browser")]
impl ChromeSession {
    /// Launch or connect to a browser and open a blank page.
    pub async fn open(config: BrowserEngineConfig) -> Result<Self, BrowserError> {
        let (browser, mut handler, owns_process) = match config.remote_url.clone() {
            Some(remote_url) => {
                let (browser, handler) = connect_remote(&remote_url, config.navigation_timeout()).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = launch_local(&config).await?;
                (browser, handler, true)
            }
        };

        // Spawn handler task
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let mut session = Self {
            config,
            browser: Some(browser),
            page: None,
            handler: Some(handler),
            owns_process,
        };

        if let Err(e) = session.open_page().await {
            session.close().await;
            return Err(e);
        }

        Ok(session)
    }

    async fn open_page(&mut self) -> Result<(), BrowserError> {
        let browser = self.browser.as_ref().ok_or(BrowserError::NoPage)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(format!("failed to open page: {}", e)))?;

        page.execute(SetUserAgentOverrideParams::new(
            self.config.user_agent.clone(),
        ))
        .await
        .map_err(|e| BrowserError::Launch(format!("failed to set user agent: {}", e)))?;

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page, BrowserError> {
        self.page.as_ref().ok_or(BrowserError::NoPage)
    }
}

#[cfg(feature = "browser")]
async fn launch_local(
    config: &BrowserEngineConfig,
) -> Result<(Browser, chromiumoxide::Handler), BrowserError> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = super::chrome_executable().await?;

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(config.navigation_timeout());

    // with_head means NOT headless
    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(ref proxy) = config.proxy {
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder = builder
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate");

    for arg in &config.chrome_args {
        builder = builder.arg(arg.as_str());
    }

    let browser_config = builder
        .build()
        .map_err(|e| BrowserError::Launch(format!("failed to build browser config: {}", e)))?;

    Browser::launch(browser_config)
        .await
        .map_err(|e| BrowserError::Launch(e.to_string()))
}

#[cfg(feature = "browser")]
async fn connect_remote(
    url: &str,
    timeout: Duration,
) -> Result<(Browser, chromiumoxide::Handler), BrowserError> {
    info!(
        "Connecting to remote browser at {} (timeout: {:?})",
        url, timeout
    );

    let connect_err = |message: String| BrowserError::Connect {
        url: url.to_string(),
        message,
    };

    // Get WebSocket URL from the /json/version endpoint
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| connect_err(e.to_string()))?
        .json()
        .await
        .map_err(|e| connect_err(format!("bad version info: {}", e)))?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| connect_err("no webSocketDebuggerUrl in response".to_string()))?;

    info!("Connecting to WebSocket: {}", ws_url);

    let handler_config = chromiumoxide::handler::HandlerConfig {
        request_timeout: timeout,
        ..Default::default()
    };

    Browser::connect_with_config(ws_url, handler_config)
        .await
        .map_err(|e| connect_err(e.to_string()))
}

/// Expression that is `true` once `selector` matches a node.
#[cfg(feature = "browser")]
fn presence_script(selector: &str) -> Result<String, BrowserError> {
    let literal = serde_json::to_string(selector)
        .map_err(|e| BrowserError::Script(format!("bad selector '{}': {}", selector, e)))?;
    Ok(format!("document.querySelector({}) !== null", literal))
}

#[cfg(feature = "browser")]
#[async_trait]
impl ListingBrowser for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        let timeout = self.config.navigation_timeout();
        let page = self.page()?;

        debug!("Navigating to {}", url);
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {:?}", timeout),
            }),
        }
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let script = presence_script(selector)?;
        let page = self.page()?;
        let deadline = tokio::time::Instant::now() + timeout;
        let check_failed = |e: String| {
            BrowserError::Script(format!("checking for '{}' failed: {}", selector, e))
        };

        loop {
            // An absent node is `false`; only evaluation failures are errors
            let present: bool = page
                .evaluate(script.as_str())
                .await
                .map_err(|e| check_failed(e.to_string()))?
                .into_value()
                .map_err(|e| check_failed(e.to_string()))?;
            if present {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    async fn rendered_html(&mut self) -> Result<String, BrowserError> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn press_end(&mut self) -> Result<(), BrowserError> {
        let body = self
            .page()?
            .find_element("body")
            .await
            .map_err(|e| BrowserError::ElementNotFound {
                selector: "body".to_string(),
                message: e.to_string(),
            })?;
        body.press_key("End")
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn scroll_offset(&mut self) -> Result<i64, BrowserError> {
        let offset: f64 = self
            .page()?
            .evaluate("window.scrollY")
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(offset.round() as i64)
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            if self.owns_process {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed to wait for browser exit: {}", e);
                }
                info!("Browser closed");
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct ChromeSession {
    _config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl ChromeSession {
    pub async fn open(_config: BrowserEngineConfig) -> Result<Self, BrowserError> {
        Err(BrowserError::NotCompiled)
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl ListingBrowser for ChromeSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn wait_for_element(
        &mut self,
        _selector: &str,
        _timeout: std::time::Duration,
    ) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn rendered_html(&mut self) -> Result<String, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn press_end(&mut self) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn scroll_offset(&mut self) -> Result<i64, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn close(&mut self) {}
}

#[cfg(all(test, feature = "browser"))]
mod tests {
    use super::*;

    #[test]
    fn test_presence_script_quotes_selector() {
        assert_eq!(
            presence_script(".photo_info > span:nth-child(2)").unwrap(),
            r#"document.querySelector(".photo_info > span:nth-child(2)") !== null"#
        );
        assert_eq!(
            presence_script(r#"a[title="x"]"#).unwrap(),
            r#"document.querySelector("a[title=\"x\"]") !== null"#
        );
    }
}
