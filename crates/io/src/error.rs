use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened or read.
    Read { path: PathBuf, message: String },
    /// Extension is not one of the accepted survey/analysis formats.
    UnsupportedFormat { path: PathBuf, expected: &'static str },
    /// calamine could not decode the workbook.
    Spreadsheet(String),
    /// Analysis document is not valid JSON.
    Json(String),
    /// CSV decode or encode failure.
    Csv(String),
    /// Input decoded but holds no rows.
    Empty(String),
    /// Output could not be written.
    Write { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn read(path: &Path, err: impl fmt::Display) -> Self {
        Self::Read { path: path.to_path_buf(), message: err.to_string() }
    }

    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::Write { path: path.to_path_buf(), message: err.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::UnsupportedFormat { path, expected } => {
                write!(f, "{}: unsupported file type (expected {expected})", path.display())
            }
            Self::Spreadsheet(msg) => write!(f, "spreadsheet error: {msg}"),
            Self::Json(msg) => write!(f, "invalid JSON: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Empty(what) => write!(f, "{what} contains no data"),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}
