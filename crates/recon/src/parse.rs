//! Value coercion shared by both parsers: numbers, percentages, heights,
//! composed pole specifications and dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::model::CellValue;

pub const FEET_PER_METER: f64 = 3.28084;

/// Parse a number out of loosely formatted text: `"42.5 %"`, `"1,234"`, `"$3"`.
/// Returns `None` when no digits are present.
pub fn parse_number_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let negative = trimmed.starts_with('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: f64 = cleaned.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(if negative { -n } else { n })
}

pub fn cell_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => parse_number_text(s),
        _ => None,
    }
}

pub fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number_text(s),
        _ => None,
    }
}

/// Bring a survey loading value onto the 0..100 scale.
///
/// Values strictly between 0 and 1 are read as fractions and multiplied by
/// 100. Returns the scaled value and whether rescaling happened.
pub fn normalize_percent(value: f64) -> (f64, bool) {
    if value > 0.0 && value < 1.0 {
        (value * 100.0, true)
    } else {
        (value, false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Feet,
    Meters,
}

impl LengthUnit {
    /// Unit named in an export. Anything unrecognized is treated as meters,
    /// the analysis tool's internal unit.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "ft" | "feet" | "foot" | "'" => Self::Feet,
            _ => Self::Meters,
        }
    }
}

/// Whole feet for a height in `unit`.
pub fn height_feet(value: f64, unit: LengthUnit) -> i64 {
    let feet = match unit {
        LengthUnit::Feet => value,
        LengthUnit::Meters => value * FEET_PER_METER,
    };
    feet.round() as i64
}

/// `<height>-<class>` or `<height>-<class> <species>`.
pub fn compose_specification(height_ft: i64, class: &str, species: Option<&str>) -> String {
    match species.map(str::trim).filter(|s| !s.is_empty()) {
        Some(species) => format!("{height_ft}-{} {species}", class.trim()),
        None => format!("{height_ft}-{}", class.trim()),
    }
}

/// Render a job date as `MM/DD/YYYY`.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` and epoch
/// milliseconds. Anything else is returned unchanged. The calendar date is
/// taken as written, without shifting time zones.
pub fn format_job_date(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.format("%m/%d/%Y").to_string())
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Some(format_date_text(s).unwrap_or_else(|| s.to_string()))
        }
        _ => None,
    }
}

fn format_date_text(s: &str) -> Option<String> {
    let date = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.date_naive()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.date()
    } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        d
    } else if s.bytes().all(|b| b.is_ascii_digit()) && s.len() >= 10 {
        let millis: i64 = s.parse().ok()?;
        DateTime::from_timestamp_millis(millis)?.date_naive()
    } else {
        return None;
    };
    Some(date.format("%m/%d/%Y").to_string())
}
