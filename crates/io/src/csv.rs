// CSV/TSV survey import and comparison export

use std::io::{Read, Write};
use std::path::Path;

use polecheck_recon::model::{CellValue, ComparisonRow};

use crate::error::IoError;

/// Read a delimited survey export into a cell grid. TSV by extension,
/// otherwise the delimiter is sniffed.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<CellValue>>, IoError> {
    let content = read_file_as_utf8(path)?;
    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
    let delimiter = if is_tsv { b'\t' } else { sniff_delimiter(&content) };
    grid_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Title lines above the header may have one field; score on the widest line
        let target = counts.iter().copied().max().unwrap_or(1);
        if target <= 1 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn grid_from_string(content: &str, delimiter: u8) -> Result<Vec<Vec<CellValue>>, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IoError::Csv(e.to_string()))?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    if field.is_empty() { CellValue::Empty } else { CellValue::Text(field.to_string()) }
                })
                .collect(),
        );
    }
    Ok(grid)
}

// ---------------------------------------------------------------------------
// Comparison export
// ---------------------------------------------------------------------------

pub const DEFAULT_EXPORT_NAME: &str = "pole_comparison_results.csv";

pub const EXPORT_HEADERS: [&str; 11] = [
    "SCID",
    "Analysis Pole #",
    "Survey Pole #",
    "Analysis Spec",
    "Survey Spec",
    "Analysis Existing %",
    "Survey Existing %",
    "Analysis Final %",
    "Survey Final %",
    "Existing Delta",
    "Final Delta",
];

fn pct(v: f64) -> String {
    format!("{v:.2}")
}

/// Write comparison rows in the fixed export column order.
pub fn write_comparison<W: Write>(rows: &[ComparisonRow], writer: W) -> std::io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for row in rows {
        let record = [
            row.scid.clone(),
            row.analysis_id.clone(),
            row.survey_id.clone(),
            row.analysis_spec.clone(),
            row.survey_spec.clone(),
            pct(row.analysis_existing_pct),
            pct(row.survey_existing_pct),
            pct(row.analysis_final_pct),
            pct(row.survey_final_pct),
            pct(row.existing_delta),
            pct(row.final_delta),
        ];
        wtr.write_record(&record)?;
    }
    wtr.flush()
}

fn export_to<W: Write>(rows: &[ComparisonRow], writer: W, target: &Path) -> Result<(), IoError> {
    write_comparison(rows, writer).map_err(|e| IoError::write(target, e))
}

/// Export to `path`. A directory gets [`DEFAULT_EXPORT_NAME`] inside it.
/// Returns the file actually written.
pub fn export_comparison(rows: &[ComparisonRow], path: &Path) -> Result<std::path::PathBuf, IoError> {
    let target = if path.is_dir() { path.join(DEFAULT_EXPORT_NAME) } else { path.to_path_buf() };
    let file = std::fs::File::create(&target).map_err(|e| IoError::write(&target, e))?;
    export_to(rows, std::io::BufWriter::new(file), &target)?;
    Ok(target)
}
