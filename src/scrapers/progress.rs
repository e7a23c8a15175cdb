//! Crawl progress reporting.

/// Progress at the start of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub page_index: u32,
    pub page_index_max: u32,
    pub label: String,
}

impl ProgressUpdate {
    pub fn for_page(page_index: u32, page_index_max: u32) -> Self {
        Self {
            page_index,
            page_index_max,
            label: format!("Page {}/{}", page_index, page_index_max),
        }
    }

    /// Fraction of the page ceiling reached, clamped to `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.page_index_max == 0 {
            return 1.0;
        }
        (f64::from(self.page_index) / f64::from(self.page_index_max)).clamp(0.0, 1.0)
    }
}

/// Receives page-level progress from a crawl.
pub trait ProgressSink: Send + Sync {
    fn update(&self, update: &ProgressUpdate);

    /// Called once when the crawl ends.
    fn finish(&self, _message: &str) {}
}

/// Sink that discards every update.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _update: &ProgressUpdate) {}
}
