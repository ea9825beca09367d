use serde::Serialize;

use crate::model::ComparisonRow;

/// Threshold-independent measurements of one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deltas {
    pub existing: f64,
    pub final_: f64,
    pub spec_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub deltas: Deltas,
    pub existing_over: bool,
    pub final_over: bool,
    pub has_issue: bool,
}

pub fn measure(row: &ComparisonRow) -> Deltas {
    Deltas {
        existing: (row.survey_existing_pct - row.analysis_existing_pct).abs(),
        final_: (row.survey_final_pct - row.analysis_final_pct).abs(),
        spec_mismatch: row.survey_spec != row.analysis_spec,
    }
}

/// Flag a row whose loading deltas exceed `threshold_pct` (strictly) or
/// whose specifications differ.
pub fn classify(row: &ComparisonRow, threshold_pct: f64) -> Classification {
    let deltas = measure(row);
    let existing_over = deltas.existing > threshold_pct;
    let final_over = deltas.final_ > threshold_pct;
    Classification {
        deltas,
        existing_over,
        final_over,
        has_issue: existing_over || final_over || deltas.spec_mismatch,
    }
}

/// Classify every row in place.
pub fn apply(rows: &mut [ComparisonRow], threshold_pct: f64) {
    for row in rows {
        let c = classify(row, threshold_pct);
        row.existing_delta = c.deltas.existing;
        row.final_delta = c.deltas.final_;
        row.spec_mismatch = c.deltas.spec_mismatch;
        row.has_issue = c.has_issue;
    }
}
