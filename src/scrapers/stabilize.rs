//! Render stabilization for lazily loaded listings.
//!
//! The listing appends entries as the page is scrolled. Stabilization keeps
//! pressing End until the scroll offset stops moving, which means no more
//! content is being appended.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::browser::{BrowserError, ListingBrowser};
use super::config::{ScrollConfig, ScrollStrategyType};

/// How stabilization finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilizeOutcome {
    /// Offset stayed unchanged for a full stall window.
    Stable { growth_rounds: u32 },
    /// The total budget ran out while content was still growing.
    BudgetExhausted { growth_rounds: u32 },
    /// Fixed strategy completed its presses.
    FixedPressesDone { presses: u32 },
    /// The browser failed mid-way; whatever loaded so far is used.
    Interrupted,
}

/// Drives a page to the end of its dynamically loaded content.
#[derive(Debug, Clone)]
pub struct RenderStabilizer {
    strategy: ScrollStrategyType,
    poll_interval: Duration,
    stall_timeout: Duration,
    max_duration: Duration,
    fixed_presses: u32,
    fixed_pause: Duration,
}

impl RenderStabilizer {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            strategy: config.strategy,
            // Zero would busy-loop against the page
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            stall_timeout: Duration::from_millis(config.stall_timeout_ms),
            max_duration: Duration::from_secs(config.max_duration_secs),
            fixed_presses: config.fixed_presses,
            fixed_pause: Duration::from_millis(config.fixed_pause_ms),
        }
    }

    /// Scroll until content stops growing or the budget runs out.
    ///
    /// Best-effort: browser errors end stabilization early and are logged,
    /// never returned.
    pub async fn stabilize<B: ListingBrowser + ?Sized>(
        &self,
        browser: &mut B,
    ) -> StabilizeOutcome {
        let result = match self.strategy {
            ScrollStrategyType::Stability => self.poll_until_stable(browser).await,
            ScrollStrategyType::Fixed => self.press_fixed(browser).await,
        };

        match result {
            Ok(outcome) => {
                debug!("Render stabilization finished: {:?}", outcome);
                outcome
            }
            Err(e) => {
                warn!("Render stabilization interrupted: {}", e);
                StabilizeOutcome::Interrupted
            }
        }
    }

    async fn poll_until_stable<B: ListingBrowser + ?Sized>(
        &self,
        browser: &mut B,
    ) -> Result<StabilizeOutcome, BrowserError> {
        let started = Instant::now();
        let mut baseline = browser.scroll_offset().await?;
        let mut growth_rounds = 0;

        loop {
            browser.press_end().await?;

            let mut stable_for = Duration::ZERO;
            let mut grew = false;

            while stable_for < self.stall_timeout {
                if started.elapsed() >= self.max_duration {
                    return Ok(StabilizeOutcome::BudgetExhausted { growth_rounds });
                }

                tokio::time::sleep(self.poll_interval).await;
                let offset = browser.scroll_offset().await?;

                if offset != baseline {
                    debug!("Scroll offset moved {} -> {}", baseline, offset);
                    baseline = offset;
                    grew = true;
                    break;
                }

                stable_for += self.poll_interval;
                browser.press_end().await?;
            }

            if !grew {
                return Ok(StabilizeOutcome::Stable { growth_rounds });
            }
            growth_rounds += 1;
        }
    }

    async fn press_fixed<B: ListingBrowser + ?Sized>(
        &self,
        browser: &mut B,
    ) -> Result<StabilizeOutcome, BrowserError> {
        for _ in 0..self.fixed_presses {
            browser.press_end().await?;
            tokio::time::sleep(self.fixed_pause).await;
        }
        Ok(StabilizeOutcome::FixedPressesDone {
            presses: self.fixed_presses,
        })
    }
}
