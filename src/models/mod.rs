//! Data models for listing entries and date windows.

mod record;

pub use record::{DateRange, DateRangeError, PageRecord, RawItem, UNKNOWN_AUTHOR};
