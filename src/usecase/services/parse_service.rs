use std::collections::{BTreeSet, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entities::table::{
    ColumnProfile, ParseOptions, ParsedTable, RawCell, RowRecord, Workbook,
};
use crate::domain::fieldtype::detect_field_type;
use crate::domain::fingerprint::{column_fingerprint, file_hash};
use crate::domain::header::{detect_header_row, select_best_sheet, HeaderPatternLibrary};
use crate::domain::normalize::{forward_fill_merged_cells, is_empty_row, normalize_value};
use crate::infra::import::decode_workbook;

/// A column is dropped when at least this share of its cells is empty.
const EMPTY_COLUMN_RATIO: f64 = 0.95;

/// Terminal validation failures, surfaced to the uploader. Retrying with the
/// same bytes reproduces the same error; the remedy is a different upload.
/// Everything below this tier is encoded into the output instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("workbook contains no sheets; re-export the file and upload again")]
    EmptyWorkbook,
    #[error("sheet '{0}' contains no readable rows; re-export the file and upload again")]
    EmptyFile(String),
    #[error("no headers could be extracted from row {0}")]
    NoHeaders(usize),
    #[error("failed to decode workbook")]
    Decode(#[source] anyhow::Error),
}

/// Parse raw upload bytes into a typed, cleaned table with full provenance,
/// using the default Norwegian/English header pattern library.
pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<ParsedTable, ParseError> {
    parse_with_library(bytes, options, &HeaderPatternLibrary::default())
}

pub fn parse_with_library(
    bytes: &[u8],
    options: &ParseOptions,
    library: &HeaderPatternLibrary,
) -> Result<ParsedTable, ParseError> {
    let file_hash = file_hash(bytes);
    let workbook = decode_workbook(bytes).map_err(ParseError::Decode)?;
    parse_workbook(workbook, file_hash, options, library)
}

/// Parse an already decoded workbook. Exposed so in-memory callers can skip
/// the byte-level decode.
pub fn parse_workbook(
    mut workbook: Workbook,
    file_hash: String,
    options: &ParseOptions,
    library: &HeaderPatternLibrary,
) -> Result<ParsedTable, ParseError> {
    if workbook.sheets.is_empty() {
        return Err(ParseError::EmptyWorkbook);
    }

    for sheet in &mut workbook.sheets {
        forward_fill_merged_cells(sheet);
    }

    let (selected, all_sheets_info) = select_best_sheet(
        &workbook,
        options.preferred_sheet_name.as_deref(),
        library,
    );
    let sheet = &workbook.sheets[selected];
    debug!(sheet = %sheet.name, "selected sheet");

    if sheet.grid.is_empty() {
        return Err(ParseError::EmptyFile(sheet.name.clone()));
    }

    let header_row_index = detect_header_row(&sheet.grid, library);
    let headers = extract_headers(&sheet.grid[header_row_index], sheet.column_count());
    if headers.is_empty() {
        return Err(ParseError::NoHeaders(header_row_index));
    }

    let fingerprint = column_fingerprint(&headers);

    let mut rows: Vec<RowRecord> = Vec::new();
    for raw_row in sheet.grid.iter().skip(header_row_index + 1) {
        if options.skip_empty_rows && is_empty_row(raw_row) {
            continue;
        }
        let record: RowRecord = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = raw_row.get(index).and_then(normalize_value);
                (header.clone(), value)
            })
            .collect();
        rows.push(record);
    }

    let (headers, removed_columns) = prune_empty_columns(headers, &mut rows);
    let column_profiles = profile_columns(&headers, &rows, options.max_preview_rows);

    info!(
        sheet = %sheet.name,
        header_row_index,
        rows = rows.len(),
        removed = removed_columns.len(),
        "parsed workbook"
    );

    Ok(ParsedTable {
        selected_sheet_name: sheet.name.clone(),
        skipped_metadata_row_count: header_row_index,
        headers,
        rows,
        header_row_index,
        all_sheets_info,
        removed_columns,
        file_hash,
        column_fingerprint: fingerprint,
        column_profiles,
    })
}

/// Header names from the detected row: trimmed cell text, a positional
/// placeholder for blank cells, and numeric suffixing on collisions so
/// headers stay unique.
fn extract_headers(header_row: &[RawCell], width: usize) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(width);

    for index in 0..width {
        let base = header_row
            .get(index)
            .and_then(normalize_value)
            .map(|value| value.render())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("kolonne_{}", index + 1));

        let mut name = base.clone();
        let mut suffix = 2;
        while !used.insert(name.clone()) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        headers.push(name);
    }

    headers
}

/// Drop columns that are empty in (near) every row: decorative and legacy
/// columns, without discarding columns that merely have a few gaps. Small
/// tables fall back to a `row_count - 1` threshold.
fn prune_empty_columns(
    headers: Vec<String>,
    rows: &mut Vec<RowRecord>,
) -> (Vec<String>, Vec<String>) {
    let row_count = rows.len();
    if row_count == 0 {
        return (headers, Vec::new());
    }
    let threshold = ((row_count as f64 * EMPTY_COLUMN_RATIO).ceil() as usize)
        .min(row_count - 1)
        .max(1);

    let mut kept = Vec::with_capacity(headers.len());
    let mut removed = Vec::new();
    for header in headers {
        let empty_count = rows
            .iter()
            .filter(|row| row.get(&header).map_or(true, Option::is_none))
            .count();
        if empty_count >= threshold {
            removed.push(header);
        } else {
            kept.push(header);
        }
    }

    for header in &removed {
        for row in rows.iter_mut() {
            row.remove(header);
        }
    }

    (kept, removed)
}

fn profile_columns(
    headers: &[String],
    rows: &[RowRecord],
    max_preview_rows: usize,
) -> Vec<ColumnProfile> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let mut sample_values = Vec::new();
            let mut unique = BTreeSet::new();
            let mut empty_count = 0;
            for row in rows {
                match row.get(header).and_then(|value| value.as_ref()) {
                    Some(value) => {
                        let rendered = value.render();
                        if sample_values.len() < max_preview_rows {
                            sample_values.push(rendered.clone());
                        }
                        unique.insert(rendered);
                    }
                    None => empty_count += 1,
                }
            }
            ColumnProfile {
                index,
                header: header.clone(),
                detected_type: detect_field_type(&sample_values),
                unique_value_count: unique.len(),
                empty_count,
                sample_values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn text(value: &str) -> RawCell {
        RawCell::Text(value.to_string())
    }

    #[test]
    fn blank_and_duplicate_headers_get_stable_names() {
        let row = vec![text("Navn"), RawCell::Empty, text("Navn"), text("  ")];
        let extracted = extract_headers(&row, 4);
        assert_eq!(extracted, headers(&["Navn", "kolonne_2", "Navn_2", "kolonne_4"]));
    }

    #[test]
    fn suffixing_skips_header_names_already_taken() {
        let row = vec![text("Navn"), text("Navn_2"), text("Navn")];
        let extracted = extract_headers(&row, 3);
        assert_eq!(extracted, headers(&["Navn", "Navn_2", "Navn_3"]));
    }

    #[test]
    fn header_extraction_covers_columns_beyond_header_row() {
        let row = vec![text("Navn")];
        let extracted = extract_headers(&row, 3);
        assert_eq!(extracted, headers(&["Navn", "kolonne_2", "kolonne_3"]));
    }

    fn row_with(header: &str, value: Option<&str>) -> RowRecord {
        let mut row = RowRecord::new();
        row.insert(
            header.to_string(),
            value.map(|v| crate::domain::entities::table::CellValue::Text(v.to_string())),
        );
        row
    }

    #[test]
    fn mostly_empty_column_is_pruned() {
        let mut rows: Vec<RowRecord> = (0..100)
            .map(|i| row_with("glemt", if i < 4 { Some("x") } else { None }))
            .collect();
        let (kept, removed) = prune_empty_columns(headers(&["glemt"]), &mut rows);
        assert!(kept.is_empty());
        assert_eq!(removed, headers(&["glemt"]));
        assert!(rows.iter().all(|row| row.is_empty()), "pruned keys leave the rows");
    }

    #[test]
    fn column_with_a_few_gaps_is_retained() {
        let mut rows: Vec<RowRecord> = (0..100)
            .map(|i| row_with("navn", if i < 90 { Some("x") } else { None }))
            .collect();
        let (kept, removed) = prune_empty_columns(headers(&["navn"]), &mut rows);
        assert_eq!(kept, headers(&["navn"]));
        assert!(removed.is_empty());
    }

    #[test]
    fn small_table_uses_row_count_minus_one_threshold() {
        let mut sparse = vec![
            row_with("notat", Some("x")),
            row_with("notat", None),
            row_with("notat", None),
        ];
        let (kept, removed) = prune_empty_columns(headers(&["notat"]), &mut sparse);
        assert!(kept.is_empty());
        assert_eq!(removed, headers(&["notat"]));

        let mut filled = vec![
            row_with("notat", Some("x")),
            row_with("notat", Some("y")),
            row_with("notat", None),
        ];
        let (kept, removed) = prune_empty_columns(headers(&["notat"]), &mut filled);
        assert_eq!(kept, headers(&["notat"]));
        assert!(removed.is_empty());
    }
}
