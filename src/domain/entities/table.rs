use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::fieldtype::FieldType;

/// A decoded workbook, held fully in memory. Once built, the source bytes
/// are never consulted again.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Vec<Vec<RawCell>>,
    pub merges: Vec<MergeRange>,
}

impl Sheet {
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn column_count(&self) -> usize {
        self.grid.iter().map(|row| row.len()).max().unwrap_or(0)
    }
}

/// Rectangular merged region, inclusive on both ends. The anchor cell is
/// (start_row, start_col); grid readers populate only the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

/// A cell value after normalization. Missing values are represented as
/// `None` in the row record, never as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Bool(value) => value.to_string(),
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

pub type RowRecord = BTreeMap<String, Option<CellValue>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub max_preview_rows: usize,
    pub skip_empty_rows: bool,
    pub preferred_sheet_name: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_preview_rows: 10,
            skip_empty_rows: true,
            preferred_sheet_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetInfo {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub header_score: f64,
}

/// Descriptive per-column metadata. Never fed back into parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub index: usize,
    pub header: String,
    pub sample_values: Vec<String>,
    pub detected_type: FieldType,
    pub unique_value_count: usize,
    pub empty_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RowRecord>,
    pub header_row_index: usize,
    pub selected_sheet_name: String,
    pub all_sheets_info: Vec<SheetInfo>,
    pub removed_columns: Vec<String>,
    pub skipped_metadata_row_count: usize,
    pub file_hash: String,
    pub column_fingerprint: String,
    pub column_profiles: Vec<ColumnProfile>,
}
