use regex::Regex;

use crate::domain::entities::table::{RawCell, SheetInfo, Workbook};
use crate::domain::fieldtype::{is_date_literal, is_email};
use crate::domain::normalize::normalize_value;

/// Real files place 0-19 metadata and title rows before the true header;
/// scanning unboundedly risks matching a false header deep in the data.
pub const MAX_HEADER_SCAN_ROWS: usize = 20;

const PATTERN_WEIGHT: f64 = 3.0;
const TEXTUAL_WEIGHT: f64 = 2.0;
const CARDINALITY_WEIGHT: f64 = 0.5;
const MIN_NON_EMPTY_CELLS: usize = 2;

const MIN_SHEET_ROWS: usize = 3;
const MIN_SHEET_COLUMNS: usize = 2;

/// Ordered library of known field-name patterns. Locale-specific (Norwegian
/// plus English synonyms by default); inject a different list to support
/// other locales without touching the scoring algorithm.
#[derive(Debug, Clone)]
pub struct HeaderPatternLibrary {
    patterns: Vec<Regex>,
}

impl HeaderPatternLibrary {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

impl Default for HeaderPatternLibrary {
    fn default() -> Self {
        let sources = [
            r"(?i)\b(navn|name|kunde|customer|firma)\b",
            r"(?i)\b(adresse|address|gate|veg|street)\b",
            r"(?i)\b(postnummer|postnr|zip|postal)\b",
            r"(?i)\b(poststed|sted|city|by)\b",
            r"(?i)\b(telefon|tlf|phone|mobil)\b",
            r"(?i)\b(e-?post|email|mail)\b",
            r"(?i)\b(kategori|category|type|gruppe)\b",
            r"(?i)\b(dato|date)\b",
        ];
        let patterns = sources
            .iter()
            .map(|source| Regex::new(source).expect("header pattern"))
            .collect();
        Self { patterns }
    }
}

/// Additive score for how header-like a row looks. Signal ordering is part
/// of the contract on ambiguous files: pattern match > textual uniformity >
/// fill ratio > cardinality.
pub fn score_header_row(row: &[RawCell], library: &HeaderPatternLibrary) -> f64 {
    let texts: Vec<String> = row
        .iter()
        .filter_map(normalize_value)
        .map(|value| value.render())
        .collect();
    if texts.len() < MIN_NON_EMPTY_CELLS || row.is_empty() {
        return 0.0;
    }

    let mut score = texts.len() as f64 / row.len() as f64;

    let all_textual = row.iter().filter(|cell| !cell.is_blank()).all(|cell| {
        match cell {
            RawCell::Text(text) => {
                let trimmed = text.trim();
                trimmed.parse::<f64>().is_err()
                    && !is_date_literal(trimmed)
                    && !is_email(trimmed)
            }
            _ => false,
        }
    });
    if all_textual {
        score += TEXTUAL_WEIGHT;
    }

    let mut distinct = texts.clone();
    distinct.sort();
    distinct.dedup();
    if distinct.len() >= 3 {
        score += CARDINALITY_WEIGHT;
    }

    for pattern in library.patterns() {
        if texts.iter().any(|text| pattern.is_match(text)) {
            score += PATTERN_WEIGHT;
        }
    }

    score
}

/// Index of the maximum-scoring row among the first `MAX_HEADER_SCAN_ROWS`
/// rows; the first occurrence wins ties.
pub fn detect_header_row(rows: &[Vec<RawCell>], library: &HeaderPatternLibrary) -> usize {
    let mut best_index = 0;
    let mut best_score = f64::MIN;
    for (index, row) in rows.iter().take(MAX_HEADER_SCAN_ROWS).enumerate() {
        let score = score_header_row(row, library);
        if score > best_score {
            best_index = index;
            best_score = score;
        }
    }
    best_index
}

/// Pick the sheet most likely to hold the real data table. The caller's
/// preferred sheet name, when it names an existing sheet, wins
/// unconditionally; diagnostic info is computed for every sheet either way.
/// Sheets smaller than 3 rows by 2 columns are treated as cover or notes
/// sheets and score 0. Expects merged cells to be forward-filled already.
pub fn select_best_sheet(
    workbook: &Workbook,
    preferred_sheet_name: Option<&str>,
    library: &HeaderPatternLibrary,
) -> (usize, Vec<SheetInfo>) {
    let mut infos = Vec::with_capacity(workbook.sheets.len());
    let mut best_index = 0;
    let mut best_combined = f64::MIN;

    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let row_count = sheet.row_count();
        let column_count = sheet.column_count();

        let (header_score, combined) =
            if row_count < MIN_SHEET_ROWS || column_count < MIN_SHEET_COLUMNS {
                (0.0, 0.0)
            } else {
                let header_index = detect_header_row(&sheet.grid, library);
                let header_score = score_header_row(&sheet.grid[header_index], library);
                let data_rows = row_count.saturating_sub(header_index + 1);
                let combined = header_score * 10.0 + data_rows as f64 + column_count as f64;
                (header_score, combined)
            };

        if combined > best_combined {
            best_index = index;
            best_combined = combined;
        }

        infos.push(SheetInfo {
            name: sheet.name.clone(),
            row_count,
            column_count,
            header_score,
        });
    }

    if let Some(preferred) = preferred_sheet_name {
        if let Some(index) = workbook
            .sheets
            .iter()
            .position(|sheet| sheet.name == preferred)
        {
            return (index, infos);
        }
    }

    (best_index, infos)
}
