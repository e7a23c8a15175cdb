//! Listing entry extraction from rendered HTML.

use scraper::{ElementRef, Html, Selector};

use super::config::SelectorConfig;
use crate::config::ConfigError;
use crate::models::RawItem;

/// Why an entry produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingTitle,
    MissingDate,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingTitle => "missing title",
            SkipReason::MissingDate => "missing date",
        }
    }
}

/// Result of extracting one listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Item(RawItem),
    Skip(SkipReason),
}

/// Pulls raw post records out of a rendered listing page.
#[derive(Debug, Clone)]
pub struct ItemExtractor {
    container: Selector,
    title: Selector,
    date: Selector,
    author: Option<Selector>,
    container_source: String,
}

impl ItemExtractor {
    /// Compile the configured selectors.
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            container: compile(&config.container)?,
            title: compile(&config.title)?,
            date: compile(&config.date)?,
            author: config.author.as_deref().map(compile).transpose()?,
            container_source: config.container.clone(),
        })
    }

    /// Selector text of the listing container, for readiness waits.
    pub fn container_selector(&self) -> &str {
        &self.container_source
    }

    /// Whether an author column is scraped at all.
    pub fn has_author(&self) -> bool {
        self.author.is_some()
    }

    /// Extract every listing entry in document order.
    ///
    /// Entries lacking a title or date are reported as skips. A missing
    /// author falls back to the unknown sentinel when the record is built.
    pub fn extract(&self, html: &str) -> Vec<Extracted> {
        let document = Html::parse_document(html);
        document
            .select(&self.container)
            .map(|entry| self.extract_entry(entry))
            .collect()
    }

    fn extract_entry(&self, entry: ElementRef<'_>) -> Extracted {
        let Some(title_text) = first_text(entry, &self.title) else {
            return Extracted::Skip(SkipReason::MissingTitle);
        };
        let Some(date_text) = first_text(entry, &self.date) else {
            return Extracted::Skip(SkipReason::MissingDate);
        };
        let author_text = self
            .author
            .as_ref()
            .and_then(|selector| first_text(entry, selector));

        Extracted::Item(RawItem {
            title_text,
            date_text,
            author_text,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Visible text of the first match, whitespace-collapsed. None when the
/// node is absent or has no text.
fn first_text(entry: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let node = entry.select(selector).next()?;
    let text = node
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}
