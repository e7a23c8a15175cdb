//! Terminal progress bar for crawls.

use indicatif::{ProgressBar, ProgressStyle};

use gallerycrawl::scrapers::{ProgressSink, ProgressUpdate};

/// [`ProgressSink`] backed by an indicatif bar on stderr.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(max_pages: u32) -> Self {
        let bar = ProgressBar::new(u64::from(max_pages));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn update(&self, update: &ProgressUpdate) {
        self.bar.set_length(u64::from(update.page_index_max));
        self.bar.set_position(u64::from(update.page_index));
        self.bar.set_message(format!(
            "{} ({:.0}%)",
            update.label,
            update.fraction() * 100.0
        ));
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
