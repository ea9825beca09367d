// File I/O: survey spreadsheets, analysis JSON, comparison CSV

pub mod csv;
pub mod error;
pub mod json;
pub mod table;
pub mod xlsx;

use std::path::Path;

use polecheck_recon::model::SourceRow;
use serde_json::Value;

pub use error::IoError;

const SURVEY_FORMATS: &str = ".xlsx, .xlsm, .xls, .xlsb, .ods, .csv or .tsv";

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Decode a field-survey export into header-keyed rows. The header row is
/// auto-detected (row 0 or row 1).
pub fn read_survey(path: &Path) -> Result<Vec<SourceRow>, IoError> {
    let ext = extension(path);
    let grid = if xlsx::SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        xlsx::read_grid(path)?
    } else if ext == "csv" || ext == "tsv" {
        csv::read_grid(path)?
    } else {
        return Err(IoError::UnsupportedFormat { path: path.to_path_buf(), expected: SURVEY_FORMATS });
    };

    let rows = table::rows_from_grid(grid);
    if rows.is_empty() {
        return Err(IoError::Empty(path.display().to_string()));
    }
    log::info!("{}: {} survey rows", path.display(), rows.len());
    Ok(rows)
}

/// Load the structural-analysis document. Only `.json` is accepted.
pub fn load_analysis(path: &Path) -> Result<Value, IoError> {
    if extension(path) != "json" {
        return Err(IoError::UnsupportedFormat { path: path.to_path_buf(), expected: ".json" });
    }
    json::load_document(path)
}
