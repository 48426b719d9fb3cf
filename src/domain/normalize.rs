use crate::domain::entities::table::{CellValue, RawCell, Sheet};

/// Copy each merged region's anchor value into every other cell of the
/// region. Grid readers populate only the anchor, which would otherwise make
/// titles and section headers appear as missing values in non-anchor cells.
/// Mutates the in-memory sheet only.
pub fn forward_fill_merged_cells(sheet: &mut Sheet) {
    let height = sheet.grid.len();
    if height == 0 {
        return;
    }
    let width = sheet.grid.iter().map(|row| row.len()).max().unwrap_or(0);
    if width == 0 {
        return;
    }

    for merge in &sheet.merges {
        let start_row = merge.start_row.min(height - 1);
        let start_col = merge.start_col.min(width - 1);
        let end_row = merge.end_row.min(height - 1);
        let end_col = merge.end_col.min(width - 1);

        let anchor = sheet
            .grid
            .get(start_row)
            .and_then(|row| row.get(start_col))
            .cloned()
            .unwrap_or(RawCell::Empty);
        if anchor.is_blank() {
            continue;
        }

        for row_idx in start_row..=end_row {
            let Some(row) = sheet.grid.get_mut(row_idx) else {
                continue;
            };
            for col_idx in start_col..=end_col {
                if let Some(cell) = row.get_mut(col_idx) {
                    *cell = anchor.clone();
                }
            }
        }
    }
}

/// Coerce a raw cell into its normalized value. Blank text and empty cells
/// become `None`; date-typed cells render to `YYYY-MM-DD`; everything else
/// passes through unchanged.
pub fn normalize_value(raw: &RawCell) -> Option<CellValue> {
    match raw {
        RawCell::Empty => None,
        RawCell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(CellValue::Text(trimmed.to_string()))
            }
        }
        RawCell::Number(value) => Some(CellValue::Number(*value)),
        RawCell::Bool(value) => Some(CellValue::Bool(*value)),
        RawCell::Date(date) => Some(CellValue::Text(date.format("%Y-%m-%d").to_string())),
    }
}

pub fn is_empty_row(row: &[RawCell]) -> bool {
    row.iter().all(|cell| normalize_value(cell).is_none())
}

/// Lower-case, trim, collapse whitespace runs to a single space, and strip
/// punctuation while preserving locale letters. Applied to every field
/// before comparison so formatting differences never masquerade as distinct
/// entities.
pub fn normalize_for_comparison(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else if ch.is_whitespace() {
            pending_space = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::table::MergeRange;
    use chrono::NaiveDate;

    fn text(value: &str) -> RawCell {
        RawCell::Text(value.to_string())
    }

    #[test]
    fn merged_title_cell_fills_both_columns() {
        let mut sheet = Sheet {
            name: "Ark1".to_string(),
            grid: vec![
                vec![text("KUNDELISTE"), RawCell::Empty],
                vec![text("Navn"), text("Adresse")],
            ],
            merges: vec![MergeRange {
                start_row: 0,
                start_col: 0,
                end_row: 0,
                end_col: 1,
            }],
        };

        forward_fill_merged_cells(&mut sheet);

        assert_eq!(sheet.grid[0][0], text("KUNDELISTE"));
        assert_eq!(sheet.grid[0][1], text("KUNDELISTE"));
        assert_eq!(sheet.grid[1][1], text("Adresse"), "cells outside the merge stay put");
    }

    #[test]
    fn out_of_bounds_merge_is_clamped() {
        let mut sheet = Sheet {
            name: "Ark1".to_string(),
            grid: vec![vec![text("a"), RawCell::Empty], vec![RawCell::Empty, RawCell::Empty]],
            merges: vec![MergeRange {
                start_row: 0,
                start_col: 0,
                end_row: 10,
                end_col: 10,
            }],
        };

        forward_fill_merged_cells(&mut sheet);

        assert_eq!(sheet.grid[1][1], text("a"));
    }

    #[test]
    fn blank_anchor_does_not_propagate() {
        let mut sheet = Sheet {
            name: "Ark1".to_string(),
            grid: vec![vec![text("  "), text("x")]],
            merges: vec![MergeRange {
                start_row: 0,
                start_col: 0,
                end_row: 0,
                end_col: 1,
            }],
        };

        forward_fill_merged_cells(&mut sheet);

        assert_eq!(sheet.grid[0][1], text("x"));
    }

    #[test]
    fn normalize_value_trims_and_nulls_blank_text() {
        assert_eq!(
            normalize_value(&text("  Ola  ")),
            Some(CellValue::Text("Ola".to_string()))
        );
        assert_eq!(normalize_value(&text("   ")), None);
        assert_eq!(normalize_value(&RawCell::Empty), None);
    }

    #[test]
    fn normalize_value_renders_dates_iso() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 17)
            .expect("valid date")
            .and_hms_opt(14, 30, 0)
            .expect("valid time");
        assert_eq!(
            normalize_value(&RawCell::Date(date)),
            Some(CellValue::Text("2023-05-17".to_string()))
        );
    }

    #[test]
    fn empty_row_detection_ignores_whitespace() {
        assert!(is_empty_row(&[RawCell::Empty, text("   ")]));
        assert!(!is_empty_row(&[RawCell::Empty, RawCell::Number(0.0)]));
    }

    #[test]
    fn comparison_normalization_collapses_formatting() {
        assert_eq!(normalize_for_comparison("  Ola   NORDMANN "), "ola nordmann");
        assert_eq!(normalize_for_comparison("Storgata 1."), "storgata 1");
        assert_eq!(normalize_for_comparison("O'Brien"), "obrien");
        assert_eq!(normalize_for_comparison("Bjørnstjerne Bjørnson"), "bjørnstjerne bjørnson");
    }
}
