//! Spreadsheet export of collected records.
//!
//! Records become a single-sheet Excel workbook with a bold header row.
//! Dates are written as the text shown on the listing.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::models::{DateRange, PageRecord};

/// Worksheet holding the records.
pub const SHEET_NAME: &str = "Sheet1";

const TITLE_COLUMN_WIDTH: f64 = 60.0;
const TEXT_COLUMN_WIDTH: f64 = 16.0;

/// Errors from building or saving an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("workbook error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished workbook, ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

impl ExportedReport {
    /// Write the file into `dir`, creating it if needed.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Turns crawl records into a tabular export.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    file_prefix: String,
    include_author: bool,
}

impl ReportAssembler {
    pub fn new(file_prefix: impl Into<String>, include_author: bool) -> Self {
        Self {
            file_prefix: file_prefix.into(),
            include_author,
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        if self.include_author {
            &["Title", "Author", "Date"]
        } else {
            &["Title", "Date"]
        }
    }

    /// `{prefix}_{start}_to_{end}_{timestamp}.xlsx`
    pub fn file_name(&self, range: &DateRange, generated_at: NaiveDateTime) -> String {
        format!(
            "{}_{}_to_{}_{}.xlsx",
            self.file_prefix,
            range.start().format("%Y%m%d"),
            range.end().format("%Y%m%d"),
            generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Build the workbook for `records`, keeping their order.
    pub fn assemble(
        &self,
        records: &[PageRecord],
        range: &DateRange,
        generated_at: NaiveDateTime,
    ) -> Result<ExportedReport, ExportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        let header = Format::new().set_bold();
        for (col, name) in (0u16..).zip(self.headers()) {
            sheet.write_string_with_format(0, col, *name, &header)?;
            let width = if col == 0 {
                TITLE_COLUMN_WIDTH
            } else {
                TEXT_COLUMN_WIDTH
            };
            sheet.set_column_width(col, width)?;
        }

        for (row, record) in (1u32..).zip(records) {
            let mut cells = vec![record.title.as_str()];
            if self.include_author {
                cells.push(record.author.as_str());
            }
            cells.push(record.raw_date_text.as_str());

            for (col, value) in (0u16..).zip(cells) {
                sheet.write_string(row, col, value)?;
            }
        }

        let bytes = workbook.save_to_buffer()?;

        Ok(ExportedReport {
            file_name: self.file_name(range, generated_at),
            bytes,
            rows: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(title: &str, author: &str, date: &str) -> PageRecord {
        PageRecord {
            title: title.to_string(),
            author: author.to_string(),
            raw_date_text: date.to_string(),
            parsed_date: crate::services::parse_listing_date(date).unwrap(),
        }
    }

    fn generated_at() -> NaiveDateTime {
        ymd(2024, 3, 20).and_hms_opt(9, 5, 7).unwrap()
    }

    /// Read the only sheet back as rows of strings.
    fn read_rows(bytes: &[u8]) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_file_name_encodes_range_and_timestamp() {
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 15)).unwrap();
        let assembler = ReportAssembler::new("gdhwelfare_photos", false);
        assert_eq!(
            assembler.file_name(&range, generated_at()),
            "gdhwelfare_photos_20240301_to_20240315_20240320_090507.xlsx"
        );
    }

    #[test]
    fn test_workbook_without_author_column() {
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 15)).unwrap();
        let records = vec![
            record("봄 나들이", "unknown", "2024-03-15"),
            record("Title, with comma", "unknown", "2024.03.02"),
        ];

        let report = ReportAssembler::new("photos", false)
            .assemble(&records, &range, generated_at())
            .unwrap();

        assert_eq!(report.rows, 2);
        assert!(report.bytes.starts_with(b"PK"));
        assert_eq!(
            read_rows(&report.bytes),
            vec![
                vec!["Title", "Date"],
                vec!["봄 나들이", "2024-03-15"],
                vec!["Title, with comma", "2024.03.02"],
            ]
        );
    }

    #[test]
    fn test_workbook_with_author_column() {
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 15)).unwrap();
        let records = vec![
            record("Picnic", "Welfare team", "2024-03-10"),
            record("Choir", "unknown", "2024-03-09"),
        ];

        let report = ReportAssembler::new("photos", true)
            .assemble(&records, &range, generated_at())
            .unwrap();

        assert_eq!(
            read_rows(&report.bytes),
            vec![
                vec!["Title", "Author", "Date"],
                vec!["Picnic", "Welfare team", "2024-03-10"],
                vec!["Choir", "unknown", "2024-03-09"],
            ]
        );
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 15)).unwrap();
        let report = ReportAssembler::new("photos", false)
            .assemble(&[], &range, generated_at())
            .unwrap();

        assert_eq!(report.rows, 0);
        assert_eq!(read_rows(&report.bytes), vec![vec!["Title", "Date"]]);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 15)).unwrap();
        let report = ReportAssembler::new("photos", false)
            .assemble(&[], &range, generated_at())
            .unwrap();

        let path = report.save_to(&dir.path().join("nested")).unwrap();

        assert!(path.is_file());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xlsx"));
        assert_eq!(std::fs::read(&path).unwrap(), report.bytes);
    }
}
