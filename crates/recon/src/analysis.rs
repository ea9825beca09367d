//! Structural-analysis export (source B).
//!
//! Walks `leads[*].locations[*]`, one location per physical pole. Each
//! location carries a list of designs; the "measured" design holds the
//! as-built state and the "recommended" design the proposed final state.

use serde_json::Value;

use crate::error::ReconError;
use crate::fields::{child, items, json_text, lookup_strict, path};
use crate::ident::{extract_numeric_key, normalize};
use crate::model::{ParsedSource, PoleRecord, Source, UNKNOWN_SPEC};
use crate::observe::{ExtractEvent, ExtractObserver};
use crate::parse::{compose_specification, height_feet, json_number, LengthUnit};
use crate::strategy::{first_match, Strategy};

const DOCUMENT: &str = "structural analysis";
const SOURCE: Source = Source::StructuralAnalysis;

const LOCATION_LABEL_KEYS: &[&str] = &["label", "poleLabel", "name"];

// ---------------------------------------------------------------------------
// Document walk
// ---------------------------------------------------------------------------

/// All locations across all leads, in document order.
///
/// Fails when the document is not an object or has no `leads` array.
pub fn locations(doc: &Value) -> Result<Vec<&Value>, ReconError> {
    if !doc.is_object() {
        return Err(ReconError::MalformedDocument {
            document: DOCUMENT,
            reason: "top-level value is not an object".into(),
        });
    }
    let leads = child(doc, "leads").ok_or_else(|| ReconError::MissingField {
        document: DOCUMENT,
        field: "leads".into(),
    })?;
    let leads = leads.as_array().ok_or_else(|| ReconError::MalformedDocument {
        document: DOCUMENT,
        reason: "'leads' is not an array".into(),
    })?;
    Ok(leads.iter().flat_map(|lead| items(lead, "locations")).collect())
}

/// Pole-identifying label of a location, if any.
pub fn location_label(location: &Value) -> Option<String> {
    let obj = location.as_object()?;
    lookup_strict(obj, LOCATION_LABEL_KEYS).and_then(json_text)
}

// ---------------------------------------------------------------------------
// Design layers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignLayer {
    Measured,
    Recommended,
}

impl DesignLayer {
    fn keyword(self) -> &'static str {
        match self {
            Self::Measured => "measured",
            Self::Recommended => "recommended",
        }
    }
}

/// The location's design for `layer`: discriminator field first, then a
/// label mentioning the layer ("Measured Design").
pub fn find_design(location: &Value, layer: DesignLayer) -> Option<&Value> {
    let designs = items(location, "designs");
    let keyword = layer.keyword();
    designs
        .iter()
        .find(|d| {
            child(d, "layerType")
                .and_then(Value::as_str)
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(keyword))
        })
        .or_else(|| {
            designs.iter().find(|d| {
                child(d, "label")
                    .and_then(Value::as_str)
                    .is_some_and(|l| l.to_lowercase().contains(keyword))
            })
        })
}

// ---------------------------------------------------------------------------
// Pole stress
// ---------------------------------------------------------------------------

fn is_pole_stress(result: &Value) -> bool {
    let text = |key: &str| child(result, key).and_then(Value::as_str).map(str::trim);
    text("component").is_some_and(|c| c.eq_ignore_ascii_case("pole"))
        && text("analysisType").is_some_and(|t| t.eq_ignore_ascii_case("stress"))
}

fn stress_in(results: &[Value]) -> Option<f64> {
    results
        .iter()
        .find(|r| is_pole_stress(r))
        .and_then(|r| child(r, "actual"))
        .and_then(json_number)
}

fn stress_from_analysis_cases(design: &Value) -> Option<f64> {
    items(design, "analysis")
        .iter()
        .find_map(|case| stress_in(items(case, "results")))
}

fn stress_from_results(design: &Value) -> Option<f64> {
    stress_in(items(design, "results"))
}

fn stress_from_analysis_results(design: &Value) -> Option<f64> {
    stress_in(items(design, "analysisResults"))
}

fn stress_from_ratio(design: &Value) -> Option<f64> {
    path(design, &["structure", "pole", "stressRatio"])
        .or_else(|| path(design, &["pole", "stressRatio"]))
        .and_then(json_number)
        .map(|ratio| ratio * 100.0)
}

const STRESS_STRATEGIES: &[Strategy<f64>] = &[
    Strategy::new("analysis.results", stress_from_analysis_cases),
    Strategy::new("results", stress_from_results),
    Strategy::new("analysisResults", stress_from_analysis_results),
    Strategy::new("structure.pole.stressRatio", stress_from_ratio),
];

/// Pole stress percentage of a design and the strategy that found it.
pub fn pole_stress_pct(design: &Value) -> Option<(&'static str, f64)> {
    first_match(design, STRESS_STRATEGIES)
}

// ---------------------------------------------------------------------------
// Pole specification
// ---------------------------------------------------------------------------

fn pole_of(design: &Value) -> Option<&Value> {
    path(design, &["structure", "pole"]).or_else(|| child(design, "pole"))
}

fn height_ft(value: &Value) -> Option<i64> {
    match value {
        Value::Object(_) => {
            let amount = child(value, "value").and_then(json_number)?;
            let unit = child(value, "unit")
                .and_then(Value::as_str)
                .map(LengthUnit::parse)
                .unwrap_or(LengthUnit::Meters);
            Some(height_feet(amount, unit))
        }
        other => json_number(other).map(|m| height_feet(m, LengthUnit::Meters)),
    }
}

fn spec_from_item(item: &Value) -> Option<String> {
    let obj = item.as_object()?;
    let class = lookup_strict(obj, &["classOfPole", "class"]).and_then(json_text)?;
    let height = child(item, "height").and_then(height_ft)?;
    let species = child(item, "species").and_then(json_text);
    Some(compose_specification(height, &class, species.as_deref()))
}

fn spec_from_client_item(design: &Value) -> Option<String> {
    pole_of(design).and_then(|p| child(p, "clientItem")).and_then(spec_from_item)
}

fn spec_from_pole_fields(design: &Value) -> Option<String> {
    pole_of(design).and_then(spec_from_item)
}

fn spec_from_alias(design: &Value) -> Option<String> {
    let pole = pole_of(design)?;
    child(pole, "clientItemAlias")
        .or_else(|| path(pole, &["clientItem", "alias"]))
        .and_then(json_text)
}

const SPEC_STRATEGIES: &[Strategy<String>] = &[
    Strategy::new("structure.pole.clientItem", spec_from_client_item),
    Strategy::new("structure.pole", spec_from_pole_fields),
    Strategy::new("clientItemAlias", spec_from_alias),
];

pub fn design_specification(design: &Value) -> Option<(&'static str, String)> {
    first_match(design, SPEC_STRATEGIES)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

fn loading(
    design: Option<&Value>,
    row: usize,
    field: &'static str,
    observer: &mut dyn ExtractObserver,
) -> f64 {
    match design.and_then(pole_stress_pct) {
        Some((strategy, pct)) => {
            observer.on_event(ExtractEvent::StrategyUsed {
                source: SOURCE,
                row,
                field,
                strategy,
                value: pct.to_string(),
            });
            pct
        }
        None => {
            observer.on_event(ExtractEvent::FieldMissing { source: SOURCE, row, field });
            0.0
        }
    }
}

/// Parse every labelled location into a [`PoleRecord`].
pub fn parse_analysis(doc: &Value, observer: &mut dyn ExtractObserver) -> Result<ParsedSource, ReconError> {
    let mut parsed = ParsedSource::new(SOURCE);

    for (row, location) in locations(doc)?.into_iter().enumerate() {
        let Some(raw_id) = location_label(location) else {
            parsed.skipped += 1;
            observer.on_event(ExtractEvent::RowSkipped {
                source: SOURCE,
                row,
                reason: "location has no label".into(),
            });
            continue;
        };

        let measured = find_design(location, DesignLayer::Measured);
        let recommended = find_design(location, DesignLayer::Recommended);

        let specification = match measured.and_then(design_specification) {
            Some((strategy, spec)) => {
                observer.on_event(ExtractEvent::StrategyUsed {
                    source: SOURCE,
                    row,
                    field: "specification",
                    strategy,
                    value: spec.clone(),
                });
                spec
            }
            None => {
                observer.on_event(ExtractEvent::FieldMissing { source: SOURCE, row, field: "specification" });
                UNKNOWN_SPEC.to_string()
            }
        };

        let existing_loading_pct = loading(measured, row, "existing_pct", observer);
        let final_loading_pct = loading(recommended, row, "final_pct", observer);

        let record = PoleRecord {
            source: SOURCE,
            normalized_id: normalize(&raw_id),
            numeric_key: extract_numeric_key(&raw_id),
            raw_id,
            specification,
            existing_loading_pct,
            final_loading_pct,
            scid: None,
            pl_number: None,
        };
        let key = record.match_key();
        let raw_id = record.raw_id.clone();
        if parsed.insert(record) {
            observer.on_event(ExtractEvent::DuplicateKey { source: SOURCE, key, raw_id });
        }
    }

    Ok(parsed)
}
