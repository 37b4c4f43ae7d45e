use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use crate::error::{CrawlError, Result};
use crate::models::{JobRecord, Query};

/// Longest text an xlsx cell accepts.
const MAX_CELL_CHARS: usize = 32_767;

pub fn file_name(query: &Query, at: DateTime<Local>) -> String {
    format!("{}-{}.xlsx", query, at.format("%Y%m%d-%H%M%S"))
}

fn cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn write_workbook(records: &[JobRecord], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("jobs")?;

    for (col, title) in (0u16..).zip(JobRecord::COLUMNS) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }
    for (row, record) in (1u32..).zip(records) {
        for (col, value) in (0u16..).zip(record.row()) {
            sheet.write_string(row, col, cell(value))?;
        }
    }

    workbook.save(path)
}

/// Writes `records` in order, one row each, to `<dir>/<query>-<timestamp>.xlsx`.
pub fn save_to_file(records: &[JobRecord], query: &Query, dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(CrawlError::Io {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "output directory does not exist"),
        });
    }

    let path = dir.join(file_name(query, Local::now()));
    write_workbook(records, &path).map_err(|source| match source {
        XlsxError::IoError(source) => CrawlError::Io { path: path.clone(), source },
        source => CrawlError::Export { path: path.clone(), source },
    })?;

    info!(path = %path.display(), rows = records.len(), "Export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(url: &str) -> JobRecord {
        JobRecord {
            url: url.into(),
            name: "Rust developer".into(),
            salary: "~~~".into(),
            company: "Acme".into(),
            address: "Lviv".into(),
            terms: "Remote".into(),
            description: "Write Rust.".into(),
        }
    }

    #[test]
    fn file_name_contains_query_and_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            file_name(&Query::normalize("python developer"), at),
            "python developer-20240309-070501.xlsx"
        );
    }

    #[test]
    fn writes_an_xlsx_file() {
        let dir = tempfile::tempdir().unwrap();
        let query = Query::normalize("rust");
        let path = save_to_file(&[record("https://a"), record("https://a")], &query, dir.path()).unwrap();

        assert_eq!(path.parent().unwrap(), dir.path());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("rust-") && name.ends_with(".xlsx"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_to_file(&[record("https://a")], &Query::normalize("rust"), &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, CrawlError::Io { .. }));
    }

    #[test]
    fn long_text_is_truncated_to_cell_limit() {
        let long = "я".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(cell(&long).chars().count(), MAX_CELL_CHARS);
        assert_eq!(cell("short"), "short");
    }
}
