//! Styled `.xlsx` output.
//!
//! One sheet named `Sheet1`. Row 1 is frozen and styled as a header:
//! bold, centered, light-gray fill, thin gray borders. Data rows use a plain
//! 12pt font.

use std::borrow::Cow;

use rust_xlsxwriter::{
    Color, ColNum, Format, FormatAlign, FormatBorder, FormatPattern, RowNum, Workbook,
    Worksheet, XlsxError,
};
use serde_json::Value;

use super::columns::{cell_text, Column, Record};

pub const SHEET_NAME: &str = "Sheet1";

const FONT_SIZE: f64 = 12.0;
const HEADER_ROW_HEIGHT: f64 = 22.0;
const HEADER_FILL: u32 = 0xE8E8E8;
const HEADER_BORDER: u32 = 0xBFBFBF;

/// Longest string a single cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_size(FONT_SIZE)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(HEADER_BORDER))
}

fn body_format() -> Format {
    Format::new().set_font_size(FONT_SIZE)
}

/// Build the workbook and serialize it to an in-memory `.xlsx` buffer.
pub fn render(records: &[Record], columns: &[Column]) -> Result<Vec<u8>, XlsxError> {
    let header = header_format();
    let body = body_format();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_freeze_panes(1, 0)?;
    sheet.set_row_height(0, HEADER_ROW_HEIGHT)?;

    for (idx, column) in columns.iter().enumerate() {
        let col = col_num(idx)?;
        sheet.set_column_width(col, column.width)?;
        sheet.write_string_with_format(0, col, fit_cell(&column.header, 0, col), &header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = row_num(idx + 1)?;
        for (col_idx, column) in columns.iter().enumerate() {
            write_cell(sheet, row, col_num(col_idx)?, record.get(&column.key), &body)?;
        }
    }

    workbook.save_to_buffer()
}

fn write_cell(
    sheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: Option<&Value>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        None | Some(Value::Null) => {
            sheet.write_blank(row, col, format)?;
        }
        Some(Value::Bool(b)) => {
            sheet.write_boolean_with_format(row, col, *b, format)?;
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => {
                sheet.write_number_with_format(row, col, f, format)?;
            }
            None => {
                sheet.write_string_with_format(row, col, n.to_string(), format)?;
            }
        },
        Some(other) => {
            let text = cell_text(Some(other));
            sheet.write_string_with_format(row, col, fit_cell(&text, row, col), format)?;
        }
    }
    Ok(())
}

/// Truncate text that would overflow a cell instead of failing the export.
fn fit_cell(text: &str, row: RowNum, col: ColNum) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            log::warn!(
                "Truncating cell at row {}, column {} to {} characters",
                row + 1,
                col + 1,
                MAX_CELL_CHARS
            );
            Cow::Borrowed(&text[..cut])
        }
        None => Cow::Borrowed(text),
    }
}

fn row_num(idx: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(idx: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
