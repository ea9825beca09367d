use std::path::PathBuf;

use polecheck_recon::cover_sheet::{extract_cover_sheet, NO_LOCATION_INFO};
use polecheck_recon::model::{ComparisonReport, SourceRow, NOT_AVAILABLE};
use polecheck_recon::observe::{ExtractEvent, NullObserver, RecordingObserver};
use polecheck_recon::{run, CompareOptions, CoverSheetOptions, ReconError};
use serde_json::Value;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn analysis_doc() -> Value {
    let path = fixtures_dir().join("analysis.json");
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

fn survey_row(i: usize, kind: &str, scid: &str, pole: &str) -> SourceRow {
    SourceRow::new(i)
        .with("node_type", kind)
        .with("scid", scid)
        .with("pole_tag", pole)
}

fn survey_rows() -> Vec<SourceRow> {
    vec![
        survey_row(0, "pole", "1001", "PL1")
            .with("pole_spec", "40-4 Southern Pine")
            .with("existing_capacity_%", 0.47)
            .with("final_passing_capacity_%", "62%"),
        survey_row(1, "pole", "1001", "PL0002")
            .with("pole_spec", "45-3 Douglas Fir")
            .with("existing_capacity_%", 60.0)
            .with("final_passing_capacity_%", "80%"),
        survey_row(2, "reference", "1001", "REF9"),
        survey_row(3, "Pole", "1001", "PL3")
            .with("pole_spec", "40-2")
            .with("existing_capacity_%", 30.0)
            .with("final_passing_capacity_%", 35.0),
    ]
}

fn compare_fixture() -> ComparisonReport {
    run(&survey_rows(), &analysis_doc(), &CompareOptions::default(), &mut NullObserver).unwrap()
}

// -------------------------------------------------------------------------
// Comparison
// -------------------------------------------------------------------------

#[test]
fn fixture_summary_counts() {
    let report = compare_fixture();
    assert_eq!(report.meta.threshold_pct, 5.0);
    assert_eq!(report.meta.survey_poles, 3);
    assert_eq!(report.meta.analysis_poles, 3);
    assert_eq!(report.meta.analysis_locations_skipped, 1);

    assert_eq!(report.summary.total_rows, 4);
    assert_eq!(report.summary.matched, 2);
    assert_eq!(report.summary.issues, 3);
    assert_eq!(report.summary.missing_in_analysis, 1);
    assert_eq!(report.summary.missing_in_survey, 1);
    assert_eq!(report.summary.format_mismatches, 1);
}

#[test]
fn fixture_rows_sorted_and_classified() {
    let report = compare_fixture();
    let ids: Vec<&str> = report.rows.iter().map(|r| r.display_id()).collect();
    assert_eq!(ids, vec!["1001-PL0002", "1001-PL1", "1001-PL3", "1001-PL4"]);

    let pl1 = &report.rows[1];
    assert_eq!(pl1.analysis_spec, "40-4 Southern Pine");
    assert!((pl1.survey_existing_pct - 47.0).abs() < 1e-9);
    assert!((pl1.existing_delta - 1.2).abs() < 1e-9);
    assert!(!pl1.has_issue, "{pl1:?}");

    let pl2 = &report.rows[0];
    assert_eq!(pl2.analysis_spec, "45-3");
    assert!(pl2.spec_mismatch);
    assert_eq!(pl2.existing_delta, 10.0);
    assert!(pl2.final_delta < 1e-9);
    assert!(pl2.has_issue);

    let pl4 = &report.rows[3];
    assert!(!pl4.in_survey);
    assert_eq!(pl4.survey_id, NOT_AVAILABLE);
    assert_eq!(pl4.analysis_spec, "35-5");
    assert_eq!(pl4.analysis_existing_pct, 22.5);
}

#[test]
fn fixture_verification_sets() {
    let report = compare_fixture();
    let v = &report.verification;
    assert!(v.missing_in_analysis.contains("1001-PL3"));
    assert!(v.missing_in_survey.contains("1001-PL4"));
    assert_eq!(v.format_mismatches[0].raw_id, "1001-PL0002");
    assert!(v.format_mismatches[0].message.contains("1001-PL2"));
}

#[test]
fn wider_threshold_only_clears_delta_issues() {
    let options = CompareOptions::default().with_threshold(20.0);
    let report = run(&survey_rows(), &analysis_doc(), &options, &mut NullObserver).unwrap();
    // PL2 still differs in specification; one-sided rows differ in spec too.
    assert_eq!(report.summary.issues, 3);
}

#[test]
fn invalid_threshold_rejected_before_parsing() {
    let options = CompareOptions::default().with_threshold(25.0);
    let err = run(&survey_rows(), &analysis_doc(), &options, &mut NullObserver).unwrap_err();
    assert!(matches!(err, ReconError::ConfigValidation(_)));
}

#[test]
fn malformed_analysis_yields_single_error() {
    let doc: Value = serde_json::json!({"label": "no leads here"});
    let err = run(&survey_rows(), &doc, &CompareOptions::default(), &mut NullObserver).unwrap_err();
    assert_eq!(err.to_string(), "structural analysis: missing required field 'leads'");
}

#[test]
fn observer_sees_extraction_decisions() {
    let mut obs = RecordingObserver::new();
    run(&survey_rows(), &analysis_doc(), &CompareOptions::default(), &mut obs).unwrap();

    assert_eq!(obs.count(|e| matches!(e, ExtractEvent::PercentRescaled { row: 0, .. })), 1);
    assert!(obs.events.iter().any(|e| matches!(
        e,
        ExtractEvent::StrategyUsed { field: "final_pct", strategy: "structure.pole.stressRatio", .. }
    )));
    assert!(obs.events.iter().any(|e| matches!(
        e,
        ExtractEvent::RowSkipped { reason, .. } if reason.contains("not pole")
    )));
}

// -------------------------------------------------------------------------
// Cover sheet
// -------------------------------------------------------------------------

#[test]
fn fixture_cover_sheet() {
    let sheet =
        extract_cover_sheet(&analysis_doc(), &CoverSheetOptions::default(), None, &mut NullObserver).unwrap();
    assert_eq!(sheet.header.job_number, "J-1001");
    assert_eq!(sheet.header.date, "03/07/2024");
    assert_eq!(sheet.header.comments, "6 PLAs on 3 poles");
    assert_eq!(sheet.header.location, "33.749000, -84.388000");
    assert_eq!(sheet.header.city, NO_LOCATION_INFO);
    // The unlabeled location is listed but not counted as a pole.
    assert_eq!(sheet.poles.len(), 4);
    assert_eq!(sheet.pole_count, 3);

    let table = sheet.pole_table_block();
    assert!(table.contains("\n1\tPL1\t48.20%\t61.00%\tInstall guy"));
    assert!(table.contains("\n3\tPL4\t22.50%\t25.00%\t"));
    assert!(table.ends_with("\n4\t\t\u{2014}\t\u{2014}\t"), "{table}");
}
