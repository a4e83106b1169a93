//! Table export to `.xlsx` or `.csv`.
//!
//! Records are mapped onto columns (from a header mapping or the first
//! record's keys), rendered into a single-sheet workbook or delimited text,
//! and handed to a [`FileSaver`].

pub mod columns;
pub mod delimited;
pub mod saver;
pub mod workbook;

pub use columns::{resolve_columns, Column, HeaderMapping, Record, DEFAULT_COLUMN_WIDTH};
pub use saver::{DirectorySaver, FileSaver};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// File name used when the caller does not supply one.
pub const DEFAULT_FILE_NAME: &str = "export";

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to save export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown export format {0:?} (expected xlsx or csv)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_MIME,
            ExportFormat::Csv => CSV_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// A rendered export ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// `<file_name>.<extension>`
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `records` without saving.
///
/// Returns `Ok(None)` (after a warning) when there is nothing to export.
pub fn render_table(
    records: &[Record],
    header_map: Option<&HeaderMapping>,
    file_name: Option<&str>,
    format: ExportFormat,
) -> Result<Option<ExportedFile>, ExportError> {
    if records.is_empty() {
        log::warn!("No data to export");
        return Ok(None);
    }

    let columns = resolve_columns(records, header_map);
    let bytes = match format {
        ExportFormat::Xlsx => workbook::render(records, &columns)?,
        ExportFormat::Csv => delimited::render(records, &columns)?,
    };
    log::debug!(
        "Rendered {} rows x {} columns as {}",
        records.len(),
        columns.len(),
        format
    );

    Ok(Some(ExportedFile {
        file_name: format!(
            "{}.{}",
            file_name.unwrap_or(DEFAULT_FILE_NAME),
            format.extension()
        ),
        mime_type: format.mime_type(),
        bytes,
    }))
}

/// Render `records` and hand the file to `saver`.
///
/// Empty input is a logged no-op: nothing is saved and `Ok(None)` is returned.
pub async fn export_table_data<S: FileSaver>(
    saver: &S,
    records: &[Record],
    header_map: Option<&HeaderMapping>,
    file_name: Option<&str>,
    format: ExportFormat,
) -> Result<Option<PathBuf>, ExportError> {
    match render_table(records, header_map, file_name, format)? {
        Some(file) => Ok(Some(saver.save(&file).await?)),
        None => Ok(None),
    }
}
