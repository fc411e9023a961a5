//! Spreadsheet export.
//!
//! A [`Sheet`] holds the cell text of a list of JSON records together with
//! the styling a renderer needs: a solid header band and zebra-striped rows
//! that callers may recolour row by row.

use std::{collections::HashMap, fs::File, io, path::Path};

use serde_json::{Map, Value};

use crate::error::ExportError;

pub const HEADER_COLOR: &str = "0314B2";
pub const HEADER_FONT_COLOR: &str = "FFFFFF";
pub const EVEN_ROW_COLOR: &str = "EAF3FF";
pub const ODD_ROW_COLOR: &str = "FFFFFF";
pub const DEFAULT_SHEET_NAME: &str = "Sheet 1";

/// Extra characters added to every column width.
const WIDTH_PADDING: usize = 5;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStyle {
    /// RGB hex fill, solid pattern.
    pub fill: String,
    pub font_color: Option<String>,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    /// Characters of the widest cell or label, plus padding. Number and
    /// boolean cells count their rendered text like any other cell.
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    row_fills: Vec<String>,
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl Sheet {
    /// Builds a sheet from `records`.
    ///
    /// Columns are the union of record keys in first-seen order. Header
    /// labels come from `custom_headers` when it has the key. Data rows are
    /// numbered from 1; `row_colors` overrides the fill of a given row.
    pub fn from_records(
        records: &[Record],
        custom_headers: Option<&HashMap<String, String>>,
        row_colors: Option<&HashMap<usize, String>>,
    ) -> Self {
        let mut keys: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }

        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| keys.iter().map(|key| cell_text(record.get(key))).collect())
            .collect();

        let columns = keys
            .into_iter()
            .enumerate()
            .map(|(col, key)| {
                let label = custom_headers
                    .and_then(|headers| headers.get(&key))
                    .cloned()
                    .unwrap_or_else(|| key.clone());
                let content = rows
                    .iter()
                    .map(|row| row[col].chars().count())
                    .max()
                    .unwrap_or(0);
                let width = content.max(label.chars().count()) + WIDTH_PADDING;
                Column { key, label, width }
            })
            .collect();

        let row_fills = (1..=rows.len())
            .map(|row| {
                row_colors
                    .and_then(|colors| colors.get(&row))
                    .cloned()
                    .unwrap_or_else(|| {
                        if row % 2 == 0 {
                            EVEN_ROW_COLOR.to_string()
                        } else {
                            ODD_ROW_COLOR.to_string()
                        }
                    })
            })
            .collect();

        Self {
            name: DEFAULT_SHEET_NAME.to_string(),
            columns,
            rows,
            row_fills,
        }
    }

    pub fn header_style(&self) -> CellStyle {
        CellStyle {
            fill: HEADER_COLOR.to_string(),
            font_color: Some(HEADER_FONT_COLOR.to_string()),
            bold: true,
        }
    }

    /// Style of data row `row` (1-based). `None` past the last row.
    pub fn row_style(&self, row: usize) -> Option<CellStyle> {
        let fill = self.row_fills.get(row.checked_sub(1)?)?;
        Some(CellStyle {
            fill: fill.clone(),
            font_color: None,
            bold: false,
        })
    }

    /// Writes the header and data rows as CSV.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_writer(writer);
        if !self.columns.is_empty() {
            writer.write_record(self.columns.iter().map(|column| column.label.as_str()))?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Reads a JSON array of objects.
pub fn records_from_json(value: Value) -> Result<Vec<Record>, ExportError> {
    let Value::Array(items) = value else {
        return Err(ExportError::NotRecords);
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(ExportError::NotRecords),
        })
        .collect()
}

/// Builds a [`Sheet`] and writes it to `path` as CSV.
pub fn export_to_csv(
    records: &[Record],
    path: &Path,
    custom_headers: Option<&HashMap<String, String>>,
    row_colors: Option<&HashMap<usize, String>>,
) -> Result<Sheet, ExportError> {
    let sheet = Sheet::from_records(records, custom_headers, row_colors);
    sheet.write_csv(File::create(path)?)?;
    tracing::info!(
        path = %path.display(),
        rows = sheet.rows.len(),
        columns = sheet.columns.len(),
        "sheet exported"
    );
    Ok(sheet)
}
