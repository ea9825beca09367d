use crate::classify::measure;
use crate::model::{
    ComparisonRow, FormatMismatch, ParsedSource, PoleRecord, VerificationResult, NOT_AVAILABLE,
};

fn side_id(rec: Option<&PoleRecord>) -> String {
    rec.map_or_else(|| NOT_AVAILABLE.to_string(), |r| r.raw_id.clone())
}

fn side_spec(rec: Option<&PoleRecord>) -> String {
    rec.map_or_else(|| NOT_AVAILABLE.to_string(), |r| r.specification.clone())
}

fn build_row(key: &str, survey: Option<&PoleRecord>, analysis: Option<&PoleRecord>) -> ComparisonRow {
    let scid = survey
        .and_then(|r| r.scid.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let mut row = ComparisonRow {
        key: key.to_string(),
        scid,
        in_survey: survey.is_some(),
        in_analysis: analysis.is_some(),
        survey_id: side_id(survey),
        analysis_id: side_id(analysis),
        survey_spec: side_spec(survey),
        analysis_spec: side_spec(analysis),
        survey_existing_pct: survey.map_or(0.0, |r| r.existing_loading_pct),
        analysis_existing_pct: analysis.map_or(0.0, |r| r.existing_loading_pct),
        survey_final_pct: survey.map_or(0.0, |r| r.final_loading_pct),
        analysis_final_pct: analysis.map_or(0.0, |r| r.final_loading_pct),
        existing_delta: 0.0,
        final_delta: 0.0,
        spec_mismatch: false,
        has_issue: false,
    };
    let deltas = measure(&row);
    row.existing_delta = deltas.existing;
    row.final_delta = deltas.final_;
    row.spec_mismatch = deltas.spec_mismatch;
    row
}

/// Join survey and analysis records by match key.
///
/// Emits one row per key in either source. Rows come back sorted by display
/// id; `has_issue` is left unset for [`crate::classify::apply`].
pub fn reconcile(survey: &ParsedSource, analysis: &ParsedSource) -> (Vec<ComparisonRow>, VerificationResult) {
    let mut rows = Vec::with_capacity(survey.len() + analysis.len());
    let mut verification = VerificationResult::default();

    for (key, a) in survey.iter() {
        let b = analysis.get(key);
        match b {
            Some(b) if b.raw_id != a.raw_id => {
                verification.format_mismatches.push(FormatMismatch {
                    raw_id: a.raw_id.clone(),
                    message: format!(
                        "pole {key}: survey id '{}' differs from analysis id '{}'",
                        a.raw_id, b.raw_id
                    ),
                });
            }
            Some(_) => {}
            None => {
                verification.missing_in_analysis.insert(a.raw_id.clone());
            }
        }
        rows.push(build_row(key, Some(a), b));
    }

    for (key, b) in analysis.iter() {
        if !survey.contains_key(key) {
            verification.missing_in_survey.insert(b.raw_id.clone());
            rows.push(build_row(key, None, Some(b)));
        }
    }

    rows.sort_by(|x, y| x.display_id().cmp(y.display_id()));

    verification.survey_duplicates = survey.duplicates.iter().cloned().collect();
    verification.analysis_duplicates = analysis.duplicates.iter().cloned().collect();

    (rows, verification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{extract_numeric_key, normalize};
    use crate::model::Source;

    fn rec(source: Source, raw_id: &str, spec: &str, existing: f64, final_: f64) -> PoleRecord {
        PoleRecord {
            source,
            raw_id: raw_id.into(),
            normalized_id: normalize(raw_id),
            numeric_key: extract_numeric_key(raw_id),
            specification: spec.into(),
            existing_loading_pct: existing,
            final_loading_pct: final_,
            scid: None,
            pl_number: None,
        }
    }

    fn source(source: Source, records: Vec<PoleRecord>) -> ParsedSource {
        let mut parsed = ParsedSource::new(source);
        for r in records {
            parsed.insert(r);
        }
        parsed
    }

    #[test]
    fn matched_and_one_sided_rows() {
        let a = source(
            Source::FieldSurvey,
            vec![
                rec(Source::FieldSurvey, "1-PL100", "40-3", 60.0, 70.0),
                rec(Source::FieldSurvey, "1-PL200", "45-2", 10.0, 20.0),
            ],
        );
        let b = source(
            Source::StructuralAnalysis,
            vec![
                rec(Source::StructuralAnalysis, "1-PL100", "40-3", 65.0, 70.0),
                rec(Source::StructuralAnalysis, "1-PL300", "40-4", 30.0, 40.0),
            ],
        );
        let (rows, v) = reconcile(&a, &b);
        assert_eq!(rows.len(), 3);

        let matched = rows.iter().find(|r| r.key == "100").unwrap();
        assert!(matched.in_survey && matched.in_analysis);
        assert_eq!(matched.existing_delta, 5.0);

        let only_a = rows.iter().find(|r| r.key == "200").unwrap();
        assert_eq!(only_a.analysis_id, NOT_AVAILABLE);
        assert_eq!(only_a.analysis_spec, NOT_AVAILABLE);
        assert_eq!(only_a.analysis_existing_pct, 0.0);

        assert!(v.missing_in_analysis.contains("1-PL200"));
        assert!(v.missing_in_survey.contains("1-PL300"));
        assert!(v.format_mismatches.is_empty());
    }

    #[test]
    fn formatting_mismatch_is_informational() {
        let a = source(Source::FieldSurvey, vec![rec(Source::FieldSurvey, "PL0056", "40-3", 1.0, 1.0)]);
        let b = source(
            Source::StructuralAnalysis,
            vec![rec(Source::StructuralAnalysis, "pl-56", "40-3", 1.0, 1.0)],
        );
        let (rows, v) = reconcile(&a, &b);
        assert_eq!(rows.len(), 1);
        assert_eq!(v.format_mismatches.len(), 1);
        assert_eq!(v.format_mismatches[0].raw_id, "PL0056");
        assert!(!rows[0].spec_mismatch);
    }

    #[test]
    fn rows_sorted_by_display_id() {
        let a = source(Source::FieldSurvey, vec![rec(Source::FieldSurvey, "PL9", "x", 0.0, 0.0)]);
        let b = source(
            Source::StructuralAnalysis,
            vec![
                rec(Source::StructuralAnalysis, "PL10", "x", 0.0, 0.0),
                rec(Source::StructuralAnalysis, "AA1", "x", 0.0, 0.0),
            ],
        );
        let (rows, _) = reconcile(&a, &b);
        let ids: Vec<&str> = rows.iter().map(|r| r.display_id()).collect();
        assert_eq!(ids, vec!["AA1", "PL10", "PL9"]);
    }

    #[test]
    fn keyless_records_still_get_a_row() {
        let a = source(Source::FieldSurvey, vec![rec(Source::FieldSurvey, "North", "x", 0.0, 0.0)]);
        let b = source(Source::StructuralAnalysis, vec![]);
        let (rows, _) = reconcile(&a, &b);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "id:north");
    }
}
