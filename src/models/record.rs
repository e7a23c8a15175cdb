//! Listing record types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Author value used when an entry has no author node.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Text fields scraped from one listing entry, before date parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title_text: String,
    pub date_text: String,
    pub author_text: Option<String>,
}

/// A listing entry that fell inside the requested date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    pub author: String,
    pub raw_date_text: String,
    pub parsed_date: NaiveDate,
}

impl PageRecord {
    /// Build a record from a raw item and its parsed date.
    pub fn from_raw(item: RawItem, parsed_date: NaiveDate) -> Self {
        Self {
            title: item.title_text,
            author: item
                .author_text
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            raw_date_text: item.date_text,
            parsed_date,
        }
    }
}

/// Error for an unusable date range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}
