use anyhow::{Context, Result};
use csv::ReaderBuilder;

use crate::domain::entities::table::{RawCell, Sheet, Workbook};

const CSV_SHEET_NAME: &str = "Ark1";

/// Decode CSV bytes into a single-sheet workbook. The reader is flexible and
/// header-less: metadata banners and ragged rows are common in exports, and
/// header detection happens downstream on the grid, exactly as for xlsx.
pub fn decode_csv(bytes: &[u8]) -> Result<Workbook> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid: Vec<Vec<RawCell>> = Vec::new();
    let mut width = 0;
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let row: Vec<RawCell> = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(field.to_string())
                }
            })
            .collect();
        width = width.max(row.len());
        grid.push(row);
    }

    for row in &mut grid {
        row.resize(width, RawCell::Empty);
    }

    Ok(Workbook {
        sheets: vec![Sheet {
            name: CSV_SHEET_NAME.to_string(),
            grid,
            merges: Vec::new(),
        }],
    })
}
