//! Date-bounded pagination over a newest-first listing.
//!
//! Each page is loaded, stabilized, extracted and filtered, then yields a
//! [`PageOutcome`]. The crawl loop either advances to the next page or ends
//! with a [`StopReason`]. Every ending returns the records collected so far.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::browser::{BrowserError, ListingBrowser};
use super::config::{CrawlConfig, NavigationFailurePolicy};
use super::extract::{Extracted, ItemExtractor, SkipReason};
use super::progress::{ProgressSink, ProgressUpdate};
use super::stabilize::RenderStabilizer;
use crate::models::{DateRange, PageRecord};
use crate::services::parse_listing_date;

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page had no entries, or no in-range entries after page 1.
    Empty,
    /// An entry older than the range start was reached.
    Boundary,
    /// The page ceiling was passed.
    MaxPages,
    /// A page failed to load under the abort policy.
    LoadError,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Empty => "empty",
            StopReason::Boundary => "boundary",
            StopReason::MaxPages => "max_pages",
            StopReason::LoadError => "load_error",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::Empty => "no more posts in range",
            StopReason::Boundary => "reached posts older than the start date",
            StopReason::MaxPages => "reached the page limit",
            StopReason::LoadError => "a page failed to load",
        }
    }

    /// Whether the crawl ended on its own rather than on a failure.
    pub fn is_clean(&self) -> bool {
        !matches!(self, StopReason::LoadError)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue,
    Stop(StopReason),
}

/// Tallies of entries and pages that did not produce records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlCounters {
    pub missing_title: u32,
    pub missing_date: u32,
    pub unparseable_dates: u32,
    /// In-order entries newer than the range end.
    pub newer_than_range: u32,
    /// Entries older than the range start that did not end the crawl.
    pub older_than_range: u32,
    /// Pages skipped after a load failure.
    pub pages_skipped: u32,
    /// Entries dated after the entry before them.
    pub order_violations: u32,
}

impl CrawlCounters {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingTitle => self.missing_title += 1,
            SkipReason::MissingDate => self.missing_date += 1,
        }
    }

    /// Entries dropped because a field was missing or unparseable.
    pub fn malformed_entries(&self) -> u32 {
        self.missing_title + self.missing_date + self.unparseable_dates
    }
}

/// Everything a finished crawl produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub records: Vec<PageRecord>,
    pub stop_reason: StopReason,
    /// Last page index attempted, 0 when no page was.
    pub last_page_index: u32,
    /// Pages that loaded successfully.
    pub pages_visited: u32,
    pub counters: CrawlCounters,
}

/// Mutable state of one crawl. Lives only inside [`PaginationController::run`].
struct CrawlState {
    page_index: u32,
    collected: Vec<PageRecord>,
    pages_visited: u32,
    counters: CrawlCounters,
    last_seen_date: Option<NaiveDate>,
}

impl CrawlState {
    fn new() -> Self {
        Self {
            page_index: 1,
            collected: Vec::new(),
            pages_visited: 0,
            counters: CrawlCounters::default(),
            last_seen_date: None,
        }
    }

    /// Track listing order; a newer date after an older one breaks the
    /// newest-first assumption behind the boundary stop.
    fn observe_date(&mut self, date: NaiveDate) {
        if let Some(previous) = self.last_seen_date {
            if date > previous {
                self.counters.order_violations += 1;
                warn!(
                    "Listing not newest-first on page {}: {} follows {}",
                    self.page_index, date, previous
                );
            }
        }
        self.last_seen_date = Some(date);
    }

    fn into_report(self, stop_reason: StopReason) -> CrawlReport {
        CrawlReport {
            records: self.collected,
            stop_reason,
            last_page_index: self.page_index,
            pages_visited: self.pages_visited,
            counters: self.counters,
        }
    }
}

/// Drives a browser through listing pages and collects in-range records.
pub struct PaginationController {
    config: CrawlConfig,
    extractor: ItemExtractor,
    stabilizer: RenderStabilizer,
}

impl PaginationController {
    pub fn new(config: CrawlConfig, extractor: ItemExtractor) -> Self {
        let stabilizer = RenderStabilizer::new(&config.scroll);
        Self {
            config,
            extractor,
            stabilizer,
        }
    }

    pub fn extractor(&self) -> &ItemExtractor {
        &self.extractor
    }

    /// Crawl the listing for `range`, consuming the browser session.
    ///
    /// The browser is closed before returning, whatever ended the crawl.
    pub async fn run<B: ListingBrowser>(
        &self,
        mut browser: B,
        range: DateRange,
        progress: &dyn ProgressSink,
    ) -> CrawlReport {
        let report = self.crawl(&mut browser, range, progress).await;
        browser.close().await;

        info!(
            "Crawl finished: {} records, {} pages, stopped ({})",
            report.records.len(),
            report.pages_visited,
            report.stop_reason.describe()
        );
        progress.finish(&format!(
            "Done: {} posts ({})",
            report.records.len(),
            report.stop_reason.describe()
        ));

        report
    }

    async fn crawl<B: ListingBrowser>(
        &self,
        browser: &mut B,
        range: DateRange,
        progress: &dyn ProgressSink,
    ) -> CrawlReport {
        let mut state = CrawlState::new();
        let max_pages = self.config.max_pages;

        info!("Crawling {} (max {} pages)", range, max_pages);

        if max_pages == 0 {
            state.page_index = 0;
            return state.into_report(StopReason::MaxPages);
        }

        let stop_reason = loop {
            progress.update(&ProgressUpdate::for_page(state.page_index, max_pages));

            match self.crawl_page(browser, &range, &mut state).await {
                PageOutcome::Stop(reason) => break reason,
                PageOutcome::Continue => {}
            }

            if state.page_index >= max_pages {
                info!("Page limit {} reached", max_pages);
                break StopReason::MaxPages;
            }
            state.page_index += 1;

            tokio::time::sleep(self.config.page_delay()).await;
        };

        state.into_report(stop_reason)
    }

    async fn crawl_page<B: ListingBrowser>(
        &self,
        browser: &mut B,
        range: &DateRange,
        state: &mut CrawlState,
    ) -> PageOutcome {
        let page_index = state.page_index;

        let url = match self.config.listing_url(page_index) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build URL for page {}: {}", page_index, e);
                return PageOutcome::Stop(StopReason::LoadError);
            }
        };

        info!("Loading page {} ({})", page_index, url);
        if let Err(e) = browser.navigate(url.as_str()).await {
            return self.on_load_failure(page_index, &e, state);
        }

        let container = self.extractor.container_selector();
        match browser
            .wait_for_element(container, self.config.listing_timeout())
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_missing_element() => {
                info!("No listing on page {}: {}", page_index, e);
                state.pages_visited += 1;
                return PageOutcome::Stop(StopReason::Empty);
            }
            Err(e) => return self.on_load_failure(page_index, &e, state),
        }
        state.pages_visited += 1;

        self.stabilizer.stabilize(browser).await;

        let html = match browser.rendered_html().await {
            Ok(html) => html,
            Err(e) => return self.on_load_failure(page_index, &e, state),
        };

        let entries = self.extractor.extract(&html);
        if entries.is_empty() {
            info!("No posts on page {}", page_index);
            return PageOutcome::Stop(StopReason::Empty);
        }
        debug!("Page {}: {} entries", page_index, entries.len());

        let mut in_range = 0usize;
        for entry in entries {
            let item = match entry {
                Extracted::Item(item) => item,
                Extracted::Skip(reason) => {
                    debug!("Skipping entry on page {}: {}", page_index, reason.as_str());
                    state.counters.record_skip(reason);
                    continue;
                }
            };

            let date = match parse_listing_date(&item.date_text) {
                Ok(date) => date,
                Err(e) => {
                    warn!("Date parse failed on page {}: {}", page_index, e);
                    state.counters.unparseable_dates += 1;
                    continue;
                }
            };
            state.observe_date(date);

            if range.contains(date) {
                info!("Added: {} | {}", preview(&item.title_text), item.date_text);
                state.collected.push(PageRecord::from_raw(item, date));
                in_range += 1;
            } else if date < range.start() {
                if self.config.assume_newest_first {
                    info!(
                        "Reached {} (before {}) on page {}, stopping",
                        date,
                        range.start(),
                        page_index
                    );
                    return PageOutcome::Stop(StopReason::Boundary);
                }
                state.counters.older_than_range += 1;
            } else {
                state.counters.newer_than_range += 1;
            }
        }

        // Page 1 may sit entirely after the range end
        if in_range == 0 && page_index > 1 {
            info!("No posts in range on page {}", page_index);
            return PageOutcome::Stop(StopReason::Empty);
        }

        PageOutcome::Continue
    }

    fn on_load_failure(
        &self,
        page_index: u32,
        error: &BrowserError,
        state: &mut CrawlState,
    ) -> PageOutcome {
        match self.config.on_navigation_error {
            NavigationFailurePolicy::Abort => {
                warn!("Page {} failed to load, aborting: {}", page_index, error);
                PageOutcome::Stop(StopReason::LoadError)
            }
            NavigationFailurePolicy::Skip => {
                warn!("Page {} failed to load, skipping: {}", page_index, error);
                state.counters.pages_skipped += 1;
                PageOutcome::Continue
            }
        }
    }
}

/// First 30 characters of a title, for log lines.
fn preview(title: &str) -> String {
    let mut chars = title.chars();
    let head: String = chars.by_ref().take(30).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
