// Property-based tests for identifier normalization and reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use polecheck_recon::engine::compare;
use polecheck_recon::ident::{extract_numeric_key, normalize};
use polecheck_recon::matcher::reconcile;
use polecheck_recon::model::{ParsedSource, PoleRecord, Source};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just("-"), Just(" "), Just(" - ")]
}

/// Pole serial, loading pair and spec for one side.
fn arb_pole() -> impl Strategy<Value = (u32, f64, f64, String)> {
    (
        1u32..5000,
        0.0..120.0f64,
        0.0..120.0f64,
        prop_oneof![Just("40-3".to_string()), Just("45-2".to_string())],
    )
}

fn record(source: Source, raw_id: String, existing: f64, final_: f64, spec: String) -> PoleRecord {
    PoleRecord {
        source,
        normalized_id: normalize(&raw_id),
        numeric_key: extract_numeric_key(&raw_id),
        raw_id,
        specification: spec,
        existing_loading_pct: existing,
        final_loading_pct: final_,
        scid: None,
        pl_number: None,
    }
}

fn parsed(source: Source, poles: &[(u32, f64, f64, String)], format: fn(u32) -> String) -> ParsedSource {
    let mut out = ParsedSource::new(source);
    for (n, e, f, spec) in poles {
        out.insert(record(source, format(*n), *e, *f, spec.clone()));
    }
    out
}

fn survey_id(n: u32) -> String {
    format!("1001-PL{n}")
}

fn analysis_id(n: u32) -> String {
    format!("pl {n:05}")
}

// ---------------------------------------------------------------------------
// Identifier properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn normalize_idempotent(raw in "\\PC{0,40}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalized_charset(raw in "\\PC{0,40}") {
        let n = normalize(&raw);
        prop_assert!(n.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'), "{}", n);
    }

    #[test]
    fn numeric_key_ignores_formatting(
        prefix in "[A-Za-z]{2}",
        sep in arb_separator(),
        zeros in 0usize..4,
        serial in 1u32..1_000_000,
    ) {
        let raw = format!("{prefix}{sep}{}{serial}", "0".repeat(zeros));
        prop_assert_eq!(extract_numeric_key(&raw), serial.to_string());
        prop_assert_eq!(extract_numeric_key(&raw.to_lowercase()), serial.to_string());
        prop_assert_eq!(extract_numeric_key(&format!("77-{raw}")), serial.to_string());
        prop_assert_eq!(extract_numeric_key(&format!("SC9{raw}")), serial.to_string());
    }

    #[test]
    fn numeric_key_is_digits_only(raw in "\\PC{0,40}") {
        let key = extract_numeric_key(&raw);
        prop_assert!(key.chars().all(|c| c.is_ascii_digit()));
        prop_assert!(key == "0" || !key.starts_with('0'), "{}", key);
    }
}

// ---------------------------------------------------------------------------
// Reconciler properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn every_key_in_exactly_one_row(
        a in prop::collection::vec(arb_pole(), 0..30),
        b in prop::collection::vec(arb_pole(), 0..30),
    ) {
        let survey = parsed(Source::FieldSurvey, &a, survey_id);
        let analysis = parsed(Source::StructuralAnalysis, &b, analysis_id);
        let (rows, verification) = reconcile(&survey, &analysis);

        let union: BTreeSet<String> = survey.index.keys().chain(analysis.index.keys()).cloned().collect();
        prop_assert_eq!(rows.len(), union.len());

        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &rows {
            *seen.entry(row.key.as_str()).or_default() += 1;
        }
        prop_assert!(seen.values().all(|&c| c == 1));

        let matched = rows.iter().filter(|r| r.in_survey && r.in_analysis).count();
        prop_assert_eq!(matched + verification.missing_in_analysis.len(), survey.len());
        prop_assert_eq!(matched + verification.missing_in_survey.len(), analysis.len());
        // Ids always differ in formatting between the two generators.
        prop_assert_eq!(verification.format_mismatches.len(), matched);
    }

    #[test]
    fn rows_sorted_by_display_id(
        a in prop::collection::vec(arb_pole(), 0..20),
        b in prop::collection::vec(arb_pole(), 0..20),
    ) {
        let survey = parsed(Source::FieldSurvey, &a, survey_id);
        let analysis = parsed(Source::StructuralAnalysis, &b, analysis_id);
        let (rows, _) = reconcile(&survey, &analysis);
        prop_assert!(rows.windows(2).all(|w| w[0].display_id() <= w[1].display_id()));
    }

    #[test]
    fn raising_threshold_never_adds_issues(
        a in prop::collection::vec(arb_pole(), 0..20),
        b in prop::collection::vec(arb_pole(), 0..20),
        t1 in 1.0..20.0f64,
        gap in 0.0..19.0f64,
    ) {
        let t2 = (t1 + gap).min(20.0);
        let survey = parsed(Source::FieldSurvey, &a, survey_id);
        let analysis = parsed(Source::StructuralAnalysis, &b, analysis_id);
        let low = compare(&survey, &analysis, t1);
        let high = compare(&survey, &analysis, t2);
        prop_assert!(high.summary.issues <= low.summary.issues);
        for (lo, hi) in low.rows.iter().zip(high.rows.iter()) {
            prop_assert!(!hi.has_issue || lo.has_issue, "row {} flagged only at higher threshold", hi.key);
        }
    }
}
