use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as decoded from the field-survey spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Display text. Integral numbers render without a decimal part.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One data row of the field-survey export: header name → cell, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    /// Zero-based index of the row among the data rows (header excluded).
    pub index: usize,
    pub cells: Vec<(String, CellValue)>,
}

impl SourceRow {
    pub fn new(index: usize) -> Self {
        Self { index, cells: Vec::new() }
    }

    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: &str, value: impl Into<CellValue>) {
        self.cells.push((key.to_string(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_blank())
    }
}

// ---------------------------------------------------------------------------
// Canonical pole record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Source A: field-survey spreadsheet export.
    FieldSurvey,
    /// Source B: structural-analysis JSON export.
    StructuralAnalysis,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldSurvey => write!(f, "field_survey"),
            Self::StructuralAnalysis => write!(f, "structural_analysis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoleRecord {
    pub source: Source,
    pub raw_id: String,
    pub normalized_id: String,
    pub numeric_key: String,
    pub specification: String,
    pub existing_loading_pct: f64,
    pub final_loading_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pl_number: Option<String>,
}

impl PoleRecord {
    /// Key used to join records across sources.
    ///
    /// Falls back to the normalized id when the raw id carries no digits, so
    /// such records still land in exactly one comparison row.
    pub fn match_key(&self) -> String {
        if self.numeric_key.is_empty() {
            format!("id:{}", self.normalized_id)
        } else {
            self.numeric_key.clone()
        }
    }
}

/// All records parsed from one source, indexed by match key.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSource {
    pub source: Source,
    /// Every record in input order, duplicates included.
    pub records: Vec<PoleRecord>,
    /// Match key → position in `records`. Last write wins.
    pub index: BTreeMap<String, usize>,
    /// Match keys seen more than once.
    pub duplicates: BTreeSet<String>,
    /// Rows/locations dropped because no identifier resolved.
    pub skipped: usize,
}

impl ParsedSource {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            records: Vec::new(),
            index: BTreeMap::new(),
            duplicates: BTreeSet::new(),
            skipped: 0,
        }
    }

    /// Store a record. Returns true when its match key was already present.
    pub fn insert(&mut self, record: PoleRecord) -> bool {
        let key = record.match_key();
        self.records.push(record);
        let pos = self.records.len() - 1;
        let duplicate = self.index.insert(key.clone(), pos).is_some();
        if duplicate {
            self.duplicates.insert(key);
        }
        duplicate
    }

    pub fn get(&self, key: &str) -> Option<&PoleRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Distinct match keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// (key, record) pairs in key order, one per distinct key.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PoleRecord)> {
        self.index.iter().map(move |(k, &i)| (k, &self.records[i]))
    }
}

// ---------------------------------------------------------------------------
// Comparison output
// ---------------------------------------------------------------------------

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_SPEC: &str = "Unknown";

/// One row per match key across both sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    pub scid: String,
    pub in_survey: bool,
    pub in_analysis: bool,
    pub survey_id: String,
    pub analysis_id: String,
    pub survey_spec: String,
    pub analysis_spec: String,
    pub survey_existing_pct: f64,
    pub analysis_existing_pct: f64,
    pub survey_final_pct: f64,
    pub analysis_final_pct: f64,
    pub existing_delta: f64,
    pub final_delta: f64,
    pub spec_mismatch: bool,
    pub has_issue: bool,
}

impl ComparisonRow {
    /// Id shown for the row: survey id when present, otherwise the analysis id.
    pub fn display_id(&self) -> &str {
        if self.in_survey {
            &self.survey_id
        } else {
            &self.analysis_id
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatMismatch {
    pub raw_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationResult {
    /// Survey raw ids with no analysis counterpart (A-not-B).
    pub missing_in_analysis: BTreeSet<String>,
    /// Analysis raw ids with no survey counterpart (B-not-A).
    pub missing_in_survey: BTreeSet<String>,
    pub format_mismatches: Vec<FormatMismatch>,
    pub survey_duplicates: Vec<String>,
    pub analysis_duplicates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub total_rows: usize,
    pub matched: usize,
    pub issues: usize,
    pub spec_mismatches: usize,
    pub missing_in_survey: usize,
    pub missing_in_analysis: usize,
    pub format_mismatches: usize,
    pub survey_duplicates: usize,
    pub analysis_duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonMeta {
    pub engine_version: String,
    pub threshold_pct: f64,
    pub survey_poles: usize,
    pub analysis_poles: usize,
    pub survey_rows_skipped: usize,
    pub analysis_locations_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub meta: ComparisonMeta,
    pub summary: ComparisonSummary,
    pub rows: Vec<ComparisonRow>,
    pub verification: VerificationResult,
}

impl ComparisonReport {
    pub fn issues(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|r| r.has_issue)
    }
}
