//! Comma-delimited `.csv` output. Header labels, then raw values; no styling.

use super::columns::{cell_text, Column, Record};
use super::ExportError;

pub fn render(records: &[Record], columns: &[Column]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.header.as_str()))?;
    for record in records {
        writer.write_record(columns.iter().map(|c| cell_text(record.get(&c.key))))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
