//! Domain services: date parsing and spreadsheet export.

pub mod date_detection;
pub mod export;

pub use date_detection::{parse_listing_date, DateParseError, DATE_FORMATS};
pub use export::{ExportedReport, ReportAssembler};
