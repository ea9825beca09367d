//! `polecheck compare`: field survey vs structural analysis.

use std::io::{self, Write};
use std::path::PathBuf;

use polecheck_config::{AliasOverrides, Settings};
use polecheck_recon::config::THRESHOLD_RANGE;
use polecheck_recon::model::{ComparisonReport, ComparisonRow};
use polecheck_recon::{CompareOptions, LogObserver, SurveyAliases};

use crate::exit_codes::EXIT_ISSUES;
use crate::{load_settings, CliError};

pub struct CompareArgs {
    pub survey: PathBuf,
    pub analysis: PathBuf,
    pub threshold: Option<f64>,
    pub csv: Option<PathBuf>,
    pub json: bool,
    pub issues_only: bool,
    pub fail_on_issues: bool,
    pub config: Option<PathBuf>,
}

/// Replace each built-in alias list the settings file names.
pub fn apply_alias_overrides(aliases: &mut SurveyAliases, overrides: &AliasOverrides) {
    let pairs: [(&mut Vec<String>, &Option<Vec<String>>); 9] = [
        (&mut aliases.node_type, &overrides.node_type),
        (&mut aliases.scid, &overrides.scid),
        (&mut aliases.pole_number, &overrides.pole_number),
        (&mut aliases.specification, &overrides.specification),
        (&mut aliases.height, &overrides.height),
        (&mut aliases.class, &overrides.class),
        (&mut aliases.species, &overrides.species),
        (&mut aliases.existing_pct, &overrides.existing_pct),
        (&mut aliases.final_pct, &overrides.final_pct),
    ];
    for (target, replacement) in pairs {
        if let Some(list) = replacement {
            *target = list.clone();
        }
    }
}

pub fn compare_options(settings: &Settings, threshold: Option<f64>) -> CompareOptions {
    let mut options = CompareOptions::default().with_threshold(threshold.unwrap_or(settings.compare.threshold_pct));
    apply_alias_overrides(&mut options.survey_aliases, &settings.aliases);
    options
}

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    if let Some(t) = args.threshold {
        if !t.is_finite() || !THRESHOLD_RANGE.contains(&t) {
            return Err(CliError::usage(format!("--threshold must be between 1 and 20, got {t}"))
                .with_hint("the threshold is in percentage points, e.g. --threshold 5"));
        }
    }

    let settings = load_settings(args.config.as_deref())?;
    let options = compare_options(&settings, args.threshold);

    let rows = polecheck_io::read_survey(&args.survey).map_err(CliError::io)?;
    let doc = polecheck_io::load_analysis(&args.analysis).map_err(CliError::io)?;

    let mut observer = LogObserver;
    let report = polecheck_recon::run(&rows, &doc, &options, &mut observer).map_err(CliError::recon)?;

    let shown: Vec<ComparisonRow> = if args.issues_only {
        report.issues().cloned().collect()
    } else {
        report.rows.clone()
    };

    if let Some(path) = &args.csv {
        let written = polecheck_io::csv::export_comparison(&shown, path).map_err(CliError::io)?;
        eprintln!("wrote {}", written.display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::write(format!("JSON serialization error: {e}")))?;
        writeln!(out, "{json}").map_err(|e| CliError::write(e.to_string()))?;
    } else {
        write_table(&mut out, &shown).map_err(|e| CliError::write(e.to_string()))?;
        writeln!(out).map_err(|e| CliError::write(e.to_string()))?;
        write_summary(&mut out, &report).map_err(|e| CliError::write(e.to_string()))?;
    }

    if args.fail_on_issues && report.summary.issues > 0 {
        return Err(CliError { code: EXIT_ISSUES, message: String::new(), hint: None });
    }
    Ok(())
}

// ============================================================================
// Human output
// ============================================================================

const TABLE_HEADERS: [&str; 9] = [
    "Pole",
    "SCID",
    "Survey Spec",
    "Analysis Spec",
    "Existing S/A",
    "Final S/A",
    "dExisting",
    "dFinal",
    "",
];

fn pair(survey: f64, analysis: f64) -> String {
    format!("{survey:.1}/{analysis:.1}")
}

fn flags(row: &ComparisonRow) -> String {
    let mut f = Vec::new();
    if !row.in_analysis {
        f.push("no analysis");
    } else if !row.in_survey {
        f.push("no survey");
    }
    if row.spec_mismatch && row.in_survey && row.in_analysis {
        f.push("spec");
    }
    if row.has_issue {
        f.push("ISSUE");
    }
    f.join(", ")
}

fn table_cells(row: &ComparisonRow) -> [String; 9] {
    [
        row.display_id().to_string(),
        row.scid.clone(),
        row.survey_spec.clone(),
        row.analysis_spec.clone(),
        pair(row.survey_existing_pct, row.analysis_existing_pct),
        pair(row.survey_final_pct, row.analysis_final_pct),
        format!("{:.2}", row.existing_delta),
        format!("{:.2}", row.final_delta),
        flags(row),
    ]
}

/// Fixed-width table, columns sized to their widest cell.
pub fn write_table<W: Write>(out: &mut W, rows: &[ComparisonRow]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "(no rows)");
    }
    let cells: Vec<[String; 9]> = rows.iter().map(table_cells).collect();
    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(TABLE_HEADERS.to_vec()))?;
    for row in &cells {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, report: &ComparisonReport) -> io::Result<()> {
    let s = &report.summary;
    writeln!(out, "threshold:           {:.1}%", report.meta.threshold_pct)?;
    writeln!(out, "rows:                {}", s.total_rows)?;
    writeln!(out, "matched:             {}", s.matched)?;
    writeln!(out, "issues:              {}", s.issues)?;
    writeln!(out, "spec mismatches:     {}", s.spec_mismatches)?;
    writeln!(out, "missing in analysis: {}", s.missing_in_analysis)?;
    writeln!(out, "missing in survey:   {}", s.missing_in_survey)?;
    writeln!(out, "format mismatches:   {}", s.format_mismatches)?;
    writeln!(out, "duplicate keys:      {} survey, {} analysis", s.survey_duplicates, s.analysis_duplicates)?;

    let v = &report.verification;
    if !v.missing_in_analysis.is_empty() {
        let ids: Vec<&str> = v.missing_in_analysis.iter().map(String::as_str).collect();
        writeln!(out, "\nin survey only: {}", ids.join(", "))?;
    }
    if !v.missing_in_survey.is_empty() {
        let ids: Vec<&str> = v.missing_in_survey.iter().map(String::as_str).collect();
        writeln!(out, "in analysis only: {}", ids.join(", "))?;
    }
    for m in &v.format_mismatches {
        writeln!(out, "format: {}", m.message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, issue: bool) -> ComparisonRow {
        ComparisonRow {
            key: id.trim_start_matches("PL").to_string(),
            scid: "1001".into(),
            in_survey: true,
            in_analysis: true,
            survey_id: id.into(),
            analysis_id: id.into(),
            survey_spec: "40-4".into(),
            analysis_spec: "40-4".into(),
            survey_existing_pct: 47.0,
            analysis_existing_pct: 48.2,
            survey_final_pct: 62.0,
            analysis_final_pct: if issue { 70.0 } else { 61.0 },
            existing_delta: 1.2,
            final_delta: if issue { 8.0 } else { 1.0 },
            spec_mismatch: false,
            has_issue: issue,
        }
    }

    #[test]
    fn overrides_replace_named_lists_only() {
        let mut aliases = SurveyAliases::default();
        let overrides = AliasOverrides { scid: Some(vec!["Structure".into()]), ..AliasOverrides::default() };
        apply_alias_overrides(&mut aliases, &overrides);
        assert_eq!(aliases.scid, vec!["Structure".to_string()]);
        assert_eq!(aliases.pole_number, SurveyAliases::default().pole_number);
    }

    #[test]
    fn flag_threshold_beats_settings() {
        let mut settings = Settings::default();
        settings.compare.threshold_pct = 8.0;
        assert_eq!(compare_options(&settings, None).threshold_pct, 8.0);
        assert_eq!(compare_options(&settings, Some(3.0)).threshold_pct, 3.0);
    }

    #[test]
    fn table_aligns_and_flags() {
        let mut out = Vec::new();
        write_table(&mut out, &[row("PL1", false), row("PL22", true)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Pole  SCID"), "{}", lines[0]);
        assert!(lines[1].starts_with("PL1   1001"), "{}", lines[1]);
        assert!(lines[2].ends_with("ISSUE"), "{}", lines[2]);
        assert!(lines[2].contains("62.0/70.0"), "{}", lines[2]);
    }

    #[test]
    fn empty_table() {
        let mut out = Vec::new();
        write_table(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no rows)\n");
    }
}
