//! Field-survey spreadsheet export (source A).

use crate::config::SurveyAliases;
use crate::error::ReconError;
use crate::fields::{resolve, MatchTier};
use crate::ident::{extract_numeric_key, normalize};
use crate::model::{CellValue, ParsedSource, PoleRecord, Source, SourceRow, UNKNOWN_SPEC};
use crate::observe::{ExtractEvent, ExtractObserver};
use crate::parse::{cell_number, compose_specification, height_feet, normalize_percent, LengthUnit};

const DOCUMENT: &str = "field survey";
const SOURCE: Source = Source::FieldSurvey;

struct RowReader<'a> {
    row: &'a SourceRow,
    observer: &'a mut dyn ExtractObserver,
}

impl RowReader<'_> {
    fn cell(&mut self, field: &'static str, aliases: &[String]) -> Option<&CellValue> {
        self.cell_within(field, aliases, MatchTier::Fuzzy)
    }

    fn cell_within(&mut self, field: &'static str, aliases: &[String], max_tier: MatchTier) -> Option<&CellValue> {
        let row = self.row;
        match resolve(row, aliases, max_tier) {
            Some(hit) => {
                self.observer.on_event(ExtractEvent::FieldResolved {
                    source: SOURCE,
                    row: row.index,
                    field,
                    key: hit.key.to_string(),
                    value: hit.value.as_text(),
                });
                Some(hit.value)
            }
            None => None,
        }
    }

    fn text(&mut self, field: &'static str, aliases: &[String]) -> Option<String> {
        self.cell(field, aliases).map(CellValue::as_text)
    }

    fn percent(&mut self, field: &'static str, aliases: &[String]) -> f64 {
        let index = self.row.index;
        let Some(raw) = self.cell(field, aliases).and_then(cell_number) else {
            self.observer.on_event(ExtractEvent::FieldMissing { source: SOURCE, row: index, field });
            return 0.0;
        };
        let (scaled, rescaled) = normalize_percent(raw);
        if rescaled {
            self.observer.on_event(ExtractEvent::PercentRescaled {
                source: SOURCE,
                row: index,
                field,
                raw,
                scaled,
            });
        }
        scaled
    }

    fn specification(&mut self, aliases: &SurveyAliases) -> String {
        // Fuzzy matching would let "pole_spec" claim a "pole_species" column.
        if let Some(spec) = self
            .cell_within("specification", &aliases.specification, MatchTier::CaseInsensitive)
            .map(CellValue::as_text)
        {
            return spec;
        }
        let height = self
            .cell("height", &aliases.height)
            .and_then(cell_number)
            .map(|ft| height_feet(ft, LengthUnit::Feet));
        let class = self.text("class", &aliases.class);
        match (height, class) {
            (Some(height), Some(class)) => {
                let species = self.text("species", &aliases.species);
                compose_specification(height, &class, species.as_deref())
            }
            _ => {
                self.observer.on_event(ExtractEvent::FieldMissing {
                    source: SOURCE,
                    row: self.row.index,
                    field: "specification",
                });
                UNKNOWN_SPEC.to_string()
            }
        }
    }
}

fn is_pole(value: &CellValue) -> bool {
    value.as_text().eq_ignore_ascii_case("pole")
}

/// Parse survey rows into [`PoleRecord`]s.
///
/// When any row carries a node-type column only rows typed `pole` are
/// kept; otherwise every row is a candidate. Rows resolving neither an
/// SCID nor a pole number are skipped.
pub fn parse_survey(
    rows: &[SourceRow],
    aliases: &SurveyAliases,
    observer: &mut dyn ExtractObserver,
) -> Result<ParsedSource, ReconError> {
    if rows.is_empty() {
        return Err(ReconError::UnsupportedShape {
            document: DOCUMENT,
            reason: "no data rows".into(),
        });
    }

    let typed = rows
        .iter()
        .any(|r| resolve(r, &aliases.node_type, MatchTier::Fuzzy).is_some());
    if !typed {
        log::debug!("{DOCUMENT}: no node type column, accepting all rows");
    }

    let mut parsed = ParsedSource::new(SOURCE);
    let mut identified = false;

    for row in rows {
        if row.is_blank() {
            continue;
        }
        if typed {
            let pole = resolve(row, &aliases.node_type, MatchTier::Fuzzy).is_some_and(|hit| is_pole(hit.value));
            if !pole {
                observer.on_event(ExtractEvent::RowSkipped {
                    source: SOURCE,
                    row: row.index,
                    reason: "node type is not pole".into(),
                });
                continue;
            }
        }

        let mut reader = RowReader { row, observer: &mut *observer };
        let scid = reader.text("scid", &aliases.scid);
        let pl_number = reader.text("pole_number", &aliases.pole_number);

        let raw_id = match (&scid, &pl_number) {
            (Some(scid), Some(pl)) => format!("{scid}-{pl}"),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => {
                parsed.skipped += 1;
                reader.observer.on_event(ExtractEvent::RowSkipped {
                    source: SOURCE,
                    row: row.index,
                    reason: "neither SCID nor pole number present".into(),
                });
                continue;
            }
        };
        identified = true;

        let specification = reader.specification(aliases);
        let existing_loading_pct = reader.percent("existing_pct", &aliases.existing_pct);
        let final_loading_pct = reader.percent("final_pct", &aliases.final_pct);

        // The pole-number component carries the serial; SCIDs are per-job.
        let key_source = pl_number.as_deref().unwrap_or(&raw_id);
        let record = PoleRecord {
            source: SOURCE,
            normalized_id: normalize(&raw_id),
            numeric_key: extract_numeric_key(key_source),
            raw_id,
            specification,
            existing_loading_pct,
            final_loading_pct,
            scid,
            pl_number,
        };
        let key = record.match_key();
        let raw_id = record.raw_id.clone();
        if parsed.insert(record) {
            observer.on_event(ExtractEvent::DuplicateKey { source: SOURCE, key, raw_id });
        }
    }

    if !identified && parsed.skipped > 0 {
        return Err(ReconError::MissingField {
            document: DOCUMENT,
            field: "scid / pole number".into(),
        });
    }

    Ok(parsed)
}
