//! Spreadsheet export of record views.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Per-cell character budget, kept below the format's hard cell limit.
pub const CELL_CHAR_LIMIT: usize = 32_000;

pub const TRUNCATION_MARKER: &str = "...[Truncated]";

/// Cut `text` to [`CELL_CHAR_LIMIT`] characters and append the marker when
/// it is longer; shorter text is returned unchanged.
pub fn truncate_cell(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(CELL_CHAR_LIMIT) {
        Some((byte_idx, _)) => {
            let mut cut = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            cut.push_str(&text[..byte_idx]);
            cut.push_str(TRUNCATION_MARKER);
            Cow::Owned(cut)
        }
        None => Cow::Borrowed(text),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Text cell, truncated to the cell budget.
    pub fn text(value: impl AsRef<str>) -> Self {
        Self::Text(truncate_cell(value.as_ref()).into_owned())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map(Self::text).unwrap_or(Self::Empty)
    }

    pub fn int(value: i64) -> Self {
        Self::Number(value as f64)
    }

    pub fn opt_int(value: Option<i64>) -> Self {
        value.map(Self::int).unwrap_or(Self::Empty)
    }
}

/// One exported column: a human-readable header and how to get the value.
pub struct ExportColumn<R> {
    pub label: &'static str,
    pub value: fn(&R) -> CellValue,
}

impl<R> ExportColumn<R> {
    pub fn new(label: &'static str, value: fn(&R) -> CellValue) -> Self {
        Self { label, value }
    }
}

/// A sheet ready to be written: header row plus flat data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn build<'a, R: 'a>(
        name: impl Into<String>,
        columns: &[ExportColumn<R>],
        records: impl IntoIterator<Item = &'a R>,
    ) -> Self {
        Self {
            name: name.into(),
            header: columns.iter().map(|c| c.label).collect(),
            rows: records
                .into_iter()
                .map(|record| columns.iter().map(|c| (c.value)(record)).collect())
                .collect(),
        }
    }
}

/// Serialize sheets into an `.xlsx` workbook held in memory.
pub fn write_workbook(sheets: &[Sheet]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;

        for (col, label) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *label, &bold)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    CellValue::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text.as_str())?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(row_num, col as u16, *n)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }
    }

    workbook.save_to_buffer()
}

/// File name for a bulk export, stamped with the generation time so repeated
/// exports never collide.
pub fn bulk_file_name(prefix: &str, generated_at: DateTime<Utc>) -> String {
    format!("{}_Export_{}.xlsx", prefix, generated_at.timestamp_millis())
}

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
