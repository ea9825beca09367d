use serde_json::Value;

use crate::analysis::parse_analysis;
use crate::classify;
use crate::config::CompareOptions;
use crate::error::ReconError;
use crate::matcher::reconcile;
use crate::model::{
    ComparisonMeta, ComparisonReport, ComparisonRow, ComparisonSummary, ParsedSource, SourceRow,
    VerificationResult,
};
use crate::observe::ExtractObserver;
use crate::survey::parse_survey;

/// Parse both documents and compare them. Pure: no IO.
pub fn run(
    survey_rows: &[SourceRow],
    analysis_doc: &Value,
    options: &CompareOptions,
    observer: &mut dyn ExtractObserver,
) -> Result<ComparisonReport, ReconError> {
    options.validate()?;
    let survey = parse_survey(survey_rows, &options.survey_aliases, observer)?;
    let analysis = parse_analysis(analysis_doc, observer)?;
    log::info!(
        "parsed {} survey poles ({} skipped), {} analysis poles ({} skipped)",
        survey.len(),
        survey.skipped,
        analysis.len(),
        analysis.skipped
    );
    Ok(compare(&survey, &analysis, options.threshold_pct))
}

/// Reconcile already-parsed sources and classify every row.
pub fn compare(survey: &ParsedSource, analysis: &ParsedSource, threshold_pct: f64) -> ComparisonReport {
    let (mut rows, verification) = reconcile(survey, analysis);
    classify::apply(&mut rows, threshold_pct);
    let summary = compute_summary(&rows, &verification);

    ComparisonReport {
        meta: ComparisonMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            threshold_pct,
            survey_poles: survey.len(),
            analysis_poles: analysis.len(),
            survey_rows_skipped: survey.skipped,
            analysis_locations_skipped: analysis.skipped,
        },
        summary,
        rows,
        verification,
    }
}

pub fn compute_summary(rows: &[ComparisonRow], verification: &VerificationResult) -> ComparisonSummary {
    ComparisonSummary {
        total_rows: rows.len(),
        matched: rows.iter().filter(|r| r.in_survey && r.in_analysis).count(),
        issues: rows.iter().filter(|r| r.has_issue).count(),
        spec_mismatches: rows.iter().filter(|r| r.spec_mismatch).count(),
        missing_in_survey: verification.missing_in_survey.len(),
        missing_in_analysis: verification.missing_in_analysis.len(),
        format_mismatches: verification.format_mismatches.len(),
        survey_duplicates: verification.survey_duplicates.len(),
        analysis_duplicates: verification.analysis_duplicates.len(),
    }
}
