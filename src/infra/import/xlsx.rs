use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Xlsx};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::entities::table::{MergeRange, RawCell, Sheet, Workbook};

/// Decode zip-container spreadsheet bytes. Tries xlsx/xlsm first so merged
/// regions survive; ods falls back to the format-sniffing reader, which
/// yields values only.
pub fn decode_zip_container(bytes: &[u8]) -> Result<Workbook> {
    match Xlsx::new(Cursor::new(bytes)) {
        Ok(workbook) => read_xlsx(workbook),
        Err(_) => decode_legacy(bytes),
    }
}

/// Decode via calamine's format sniffing (xls, ods). These readers expose no
/// merged regions, so such sheets parse with empty merge lists.
pub fn decode_legacy(bytes: &[u8]) -> Result<Workbook> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("failed to open workbook bytes")?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("failed to read sheet: {name}"))?;
        sheets.push(Sheet {
            grid: range_to_grid(&range),
            merges: Vec::new(),
            name,
        });
    }

    Ok(Workbook { sheets })
}

fn read_xlsx(mut workbook: Xlsx<Cursor<&[u8]>>) -> Result<Workbook> {
    workbook
        .load_merged_regions()
        .context("failed to load merged regions")?;
    let merged: Vec<(String, MergeRange)> = workbook
        .merged_regions()
        .iter()
        .map(|(sheet_name, _, dimensions)| {
            let (start_row, start_col) = dimensions.start;
            let (end_row, end_col) = dimensions.end;
            (
                sheet_name.clone(),
                MergeRange {
                    start_row: start_row as usize,
                    start_col: start_col as usize,
                    end_row: end_row as usize,
                    end_col: end_col as usize,
                },
            )
        })
        .collect();

    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("failed to read sheet: {name}"))?;
        let merges = merged
            .iter()
            .filter(|(sheet_name, _)| sheet_name == &name)
            .map(|(_, merge)| *merge)
            .collect();
        sheets.push(Sheet {
            grid: range_to_grid(&range),
            merges,
            name,
        });
    }

    Ok(Workbook { sheets })
}

fn range_to_grid(range: &Range<Data>) -> Vec<Vec<RawCell>> {
    range
        .rows()
        .map(|row| row.iter().map(data_to_raw_cell).collect())
        .collect()
}

fn data_to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(value) => RawCell::Text(value.clone()),
        Data::Float(value) => RawCell::Number(*value),
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Bool(value) => RawCell::Bool(*value),
        Data::DateTime(value) => match excel_serial_to_datetime(value.as_f64()) {
            Some(datetime) => RawCell::Date(datetime),
            None => RawCell::Number(value.as_f64()),
        },
        Data::DateTimeIso(value) => match parse_iso_datetime(value) {
            Some(datetime) => RawCell::Date(datetime),
            None => RawCell::Text(value.clone()),
        },
        Data::DurationIso(value) => RawCell::Text(value.clone()),
        Data::Error(_) => RawCell::Empty,
    }
}

/// Excel stores dates as day serials from an 1899-12-30 epoch (the offset
/// already absorbs the fictitious 1900-02-29).
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor() as u64;
    let seconds = (((serial - serial.floor()) * 86_400.0).round() as u32).min(86_399);
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(NaiveDateTime::new(date, time))
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
