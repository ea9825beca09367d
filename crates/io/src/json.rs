// Analysis document loading

use std::path::Path;

use serde_json::Value;

use crate::csv::read_file_as_utf8;
use crate::error::IoError;

/// Load a structural-analysis document. Text is decoded the same way as
/// delimited surveys (UTF-8, BOM stripped, Windows-1252 fallback).
pub fn load_document(path: &Path) -> Result<Value, IoError> {
    let text = read_file_as_utf8(path)?;
    parse_document(&text).map_err(|e| match e {
        IoError::Json(msg) => IoError::Json(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_document(text: &str) -> Result<Value, IoError> {
    if text.trim().is_empty() {
        return Err(IoError::Empty("analysis document".into()));
    }
    serde_json::from_str(text).map_err(|e| IoError::Json(e.to_string()))
}
