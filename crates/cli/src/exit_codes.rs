//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | Poles exceed the threshold (only with `--fail-on-issues`) |
//! | 2    | Usage error (bad arguments, unsupported file type)        |
//! | 3    | Input file unreadable                                     |
//! | 4    | Malformed input document                                  |
//! | 5    | Missing mandatory field or unsupported structure          |
//! | 6    | Invalid settings file                                     |
//! | 7    | Output could not be written                               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the error mapping below

use polecheck_config::ConfigError;
use polecheck_io::IoError;
use polecheck_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one pole was flagged and `--fail-on-issues` was given.
/// Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_ISSUES: u8 = 1;

/// Usage error - bad arguments, unsupported input extension.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing or unreadable.
pub const EXIT_UNREADABLE: u8 = 3;

/// Input decoded badly: invalid JSON, corrupt workbook, broken CSV.
pub const EXIT_MALFORMED: u8 = 4;

/// Document parsed but lacks a mandatory field (job label, date,
/// locations, any identifying column) or has no rows at all.
pub const EXIT_MISSING_FIELD: u8 = 5;

/// Settings file unreadable, unparsable, or out of range.
pub const EXIT_SETTINGS: u8 = 6;

/// CSV/JSON output could not be written.
pub const EXIT_WRITE: u8 = 7;

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } => EXIT_UNREADABLE,
        IoError::UnsupportedFormat { .. } => EXIT_USAGE,
        IoError::Spreadsheet(_) | IoError::Json(_) | IoError::Csv(_) => EXIT_MALFORMED,
        IoError::Empty(_) => EXIT_MISSING_FIELD,
        IoError::Write { .. } => EXIT_WRITE,
    }
}

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MalformedDocument { .. } => EXIT_MALFORMED,
        ReconError::MissingField { .. } | ReconError::UnsupportedShape { .. } => EXIT_MISSING_FIELD,
        ReconError::ConfigValidation(_) => EXIT_SETTINGS,
    }
}

pub fn config_exit_code(_err: &ConfigError) -> u8 {
    EXIT_SETTINGS
}
