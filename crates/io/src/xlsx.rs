// Spreadsheet survey import (xlsx, xlsm, xls, xlsb, ods)
//
// Only the first worksheet is read, values only. Formulas contribute their
// cached results.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use polecheck_recon::model::CellValue;

use crate::error::IoError;

/// Extensions handled by calamine.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Read the first worksheet into a cell grid anchored at A1. Leading empty
/// rows and columns that calamine trims from the used range are restored so
/// header detection sees the sheet as the user does.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<CellValue>>, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| IoError::Empty(format!("{}: workbook has no sheets", path.display())))?;
    if sheet_names.len() > 1 {
        log::debug!("{}: reading sheet '{}' of {}", path.display(), first, sheet_names.len());
    }

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| IoError::Spreadsheet(format!("{}: sheet '{}': {}", path.display(), first, e)))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_value));
        grid.push(cells);
    }
    Ok(grid)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() { CellValue::Empty } else { CellValue::Text(s.to_string()) }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Serial date; survey sheets carry no date columns the engine reads
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            log::trace!("spreadsheet error cell #{e:?} read as empty");
            CellValue::Empty
        }
    }
}
