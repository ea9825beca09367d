// Grid → header-keyed rows

use polecheck_recon::model::{CellValue, SourceRow};

/// Header row must have at least this many populated cells to be chosen.
pub const MIN_HEADER_CELLS: usize = 5;

/// Only the first two rows are considered for the header.
const HEADER_CANDIDATES: usize = 2;

fn populated(row: &[CellValue]) -> usize {
    row.iter().filter(|c| !c.is_blank()).count()
}

/// Index of the header row: the first of rows 0/1 with at least
/// [`MIN_HEADER_CELLS`] populated cells, otherwise row 0.
pub fn detect_header_row(grid: &[Vec<CellValue>]) -> usize {
    grid.iter()
        .take(HEADER_CANDIDATES)
        .position(|row| populated(row) >= MIN_HEADER_CELLS)
        .unwrap_or(0)
}

/// Header names; blank headers become `column_<n>` (1-based).
fn header_names(row: &[CellValue]) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(i, c)| {
            let name = c.as_text();
            if name.is_empty() { format!("column_{}", i + 1) } else { name }
        })
        .collect()
}

/// Turn a decoded sheet into header-keyed rows. Fully blank rows are dropped;
/// row indexes count data rows below the header, blanks included.
pub fn rows_from_grid(grid: Vec<Vec<CellValue>>) -> Vec<SourceRow> {
    if grid.is_empty() {
        return Vec::new();
    }
    let header_idx = detect_header_row(&grid);
    let headers = header_names(&grid[header_idx]);
    log::debug!("header row {header_idx}: {} columns", headers.len());

    grid.into_iter()
        .skip(header_idx + 1)
        .enumerate()
        .filter_map(|(index, cells)| {
            let mut row = SourceRow::new(index);
            for (i, cell) in cells.into_iter().enumerate() {
                match headers.get(i) {
                    Some(name) => row.cells.push((name.clone(), cell)),
                    None if !cell.is_blank() => row.cells.push((format!("column_{}", i + 1), cell)),
                    None => {}
                }
            }
            (!row.is_blank()).then_some(row)
        })
        .collect()
}
