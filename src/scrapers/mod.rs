//! Listing crawler: browser seam, render stabilization, entry extraction
//! and the pagination loop that ties them together.

pub mod browser;
pub mod config;
pub mod extract;
pub mod pagination;
pub mod progress;
pub mod stabilize;

pub use browser::{BrowserError, ChromeSession, ListingBrowser};
pub use config::{
    CrawlConfig, NavigationFailurePolicy, ScrollConfig, ScrollStrategyType, SelectorConfig,
};
pub use extract::{Extracted, ItemExtractor, SkipReason};
pub use pagination::{CrawlCounters, CrawlReport, PageOutcome, PaginationController, StopReason};
pub use progress::{NoProgress, ProgressSink, ProgressUpdate};
pub use stabilize::{RenderStabilizer, StabilizeOutcome};
