//! Date parsing for gallery listing entries.
//!
//! Listing dates are naive calendar dates in one of a small set of literal
//! formats. Candidates are tried in order and the first match wins.

use chrono::NaiveDate;

/// Candidate formats, in the order they are tried.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d"];

/// Error returned when no candidate format matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("no date format matched '{input}'")]
    NoFormatMatched { input: String },
}

/// Parse a listing date such as `2024-03-15` or `2024.03.15`.
///
/// Surrounding whitespace is ignored. The whole remaining string must match
/// one of [`DATE_FORMATS`].
pub fn parse_listing_date(text: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| DateParseError::NoFormatMatched {
            input: trimmed.to_string(),
        })
}
