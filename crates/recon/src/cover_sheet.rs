//! Cover-sheet extraction from a single structural-analysis export.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::analysis::{find_design, location_label, locations, pole_stress_pct, DesignLayer};
use crate::config::CoverSheetOptions;
use crate::coords::{first_coordinates, Coordinates};
use crate::error::ReconError;
use crate::fields::{child, items, json_text, path};
use crate::geocode::ReverseGeocoder;
use crate::ident::strip_station_prefix;
use crate::model::Source;
use crate::observe::{ExtractEvent, ExtractObserver};
use crate::parse::format_job_date;

const DOCUMENT: &str = "structural analysis";

pub const NO_COORDINATES: &str = "no coordinates available";
pub const NO_LOCATION_INFO: &str = "location information not available";
const MISSING_VALUE: &str = "\u{2014}";

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverSheetHeader {
    pub job_number: String,
    pub client: String,
    pub date: String,
    pub location: String,
    pub city: String,
    pub engineer: String,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverSheetPole {
    pub station: String,
    pub existing_pct: Option<f64>,
    pub final_pct: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverSheet {
    pub header: CoverSheetHeader,
    pub poles: Vec<CoverSheetPole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub design_count: usize,
    pub pole_count: usize,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn first_text(doc: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|p| path(doc, p).and_then(json_text))
}

fn remedy_notes(location: &Value) -> String {
    items(location, "remedies")
        .iter()
        .filter_map(|r| match r {
            Value::String(_) => json_text(r),
            _ => child(r, "description").and_then(json_text),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn stress_of(design: Option<&Value>) -> Option<f64> {
    design.and_then(pole_stress_pct).map(|(_, pct)| pct)
}

/// Build the cover sheet. `geocoder` is consulted at most once, and only
/// when the document leaves the location or city blank.
pub fn extract_cover_sheet(
    doc: &Value,
    options: &CoverSheetOptions,
    geocoder: Option<&dyn ReverseGeocoder>,
    observer: &mut dyn ExtractObserver,
) -> Result<CoverSheet, ReconError> {
    if !doc.is_object() {
        return Err(ReconError::MalformedDocument {
            document: DOCUMENT,
            reason: "top-level value is not an object".into(),
        });
    }

    let job_number = first_text(doc, &[&["label"], &["jobNumber"]]).ok_or_else(|| {
        ReconError::MissingField { document: DOCUMENT, field: "label".into() }
    })?;
    let date = child(doc, "date")
        .and_then(format_job_date)
        .ok_or_else(|| ReconError::MissingField { document: DOCUMENT, field: "date".into() })?;
    let mut location = first_text(doc, &[&["clientData", "generalLocation"], &["generalLocation"]])
        .unwrap_or_default();
    let mut city = first_text(doc, &[&["address", "city"], &["clientData", "city"]]).unwrap_or_default();
    let engineer = first_text(doc, &[&["engineer"], &["clientData", "engineer"]]).unwrap_or_default();

    let all_locations = locations(doc)?;
    let mut poles = Vec::new();
    let mut stations = BTreeSet::new();
    let mut design_count = 0;

    for (row, loc) in all_locations.iter().enumerate() {
        let label = location_label(loc);
        if label.is_none() {
            observer.on_event(ExtractEvent::FieldMissing {
                source: Source::StructuralAnalysis,
                row,
                field: "label",
            });
        }
        design_count += items(loc, "designs").len();
        poles.push(CoverSheetPole {
            station: label.clone().unwrap_or_default(),
            existing_pct: stress_of(find_design(loc, DesignLayer::Measured)),
            final_pct: stress_of(find_design(loc, DesignLayer::Recommended)),
            notes: remedy_notes(loc),
        });
        stations.extend(label);
    }

    let mut coordinates = None;
    if location.is_empty() || city.is_empty() {
        coordinates = first_coordinates(&all_locations, observer);
        match coordinates {
            None => {
                if location.is_empty() {
                    location = NO_COORDINATES.to_string();
                }
                if city.is_empty() {
                    city = NO_LOCATION_INFO.to_string();
                }
            }
            Some(c) => {
                let address = geocoder.and_then(|g| g.reverse_geocode(c.latitude, c.longitude));
                if address.is_none() && geocoder.is_some() {
                    observer.on_event(ExtractEvent::GeocodeFailed {
                        latitude: c.latitude,
                        longitude: c.longitude,
                    });
                }
                match address {
                    Some(addr) => {
                        if location.is_empty() {
                            let street = addr.formatted_address.trim();
                            location = if street.is_empty() { c.to_string() } else { format!("{street} ({c})") };
                        }
                        if city.is_empty() {
                            city = if addr.city.is_empty() { NO_LOCATION_INFO.to_string() } else { addr.city };
                        }
                    }
                    None => {
                        if location.is_empty() {
                            location = c.to_string();
                        }
                        if city.is_empty() {
                            city = NO_LOCATION_INFO.to_string();
                        }
                    }
                }
            }
        }
    }

    let pole_count = stations.len();
    Ok(CoverSheet {
        header: CoverSheetHeader {
            job_number,
            client: options.client.clone(),
            date,
            location,
            city,
            engineer,
            comments: format!("{design_count} PLAs on {pole_count} poles"),
        },
        poles,
        coordinates,
        design_count,
        pole_count,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn pct_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => MISSING_VALUE.to_string(),
    }
}

impl CoverSheet {
    /// `**Label:** value` lines.
    pub fn header_block(&self) -> String {
        let h = &self.header;
        [
            ("Job Number", &h.job_number),
            ("Client", &h.client),
            ("Date", &h.date),
            ("Location of Poles", &h.location),
            ("City", &h.city),
            ("Project Engineer", &h.engineer),
            ("Comments", &h.comments),
        ]
        .iter()
        .map(|(label, value)| format!("**{label}:** {value}"))
        .collect::<Vec<_>>()
        .join("\n")
    }

    /// Tab-separated pole table, ready to paste into a spreadsheet.
    pub fn pole_table_block(&self) -> String {
        let mut lines = vec!["#\tStation\tExisting %\tFinal %\tDescription of Work".to_string()];
        for (i, pole) in self.poles.iter().enumerate() {
            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}",
                i + 1,
                strip_station_prefix(&pole.station),
                pct_cell(pole.existing_pct),
                pct_cell(pole.final_pct),
                pole.notes
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeocodedAddress;
    use crate::observe::{NullObserver, RecordingObserver};
    use serde_json::json;
    use std::cell::Cell;

    struct FixedGeocoder {
        answer: Option<GeocodedAddress>,
        calls: Cell<usize>,
    }

    impl ReverseGeocoder for FixedGeocoder {
        fn reverse_geocode(&self, _lat: f64, _lon: f64) -> Option<GeocodedAddress> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone()
        }
    }

    fn stress(actual: f64) -> Value {
        json!({"component": "Pole", "analysisType": "STRESS", "actual": actual})
    }

    fn doc() -> Value {
        json!({
            "label": "J-1001",
            "date": "2024-03-07",
            "engineer": "R. Ortiz",
            "leads": [{"locations": [
                {
                    "label": "1001-PL1",
                    "geographicCoordinate": {"coordinates": [-84.388, 33.749]},
                    "remedies": [{"description": "Replace pole"}, "Transfer attachments"],
                    "designs": [
                        {"layerType": "Measured", "analysis": [{"results": [stress(45.5)]}]},
                        {"layerType": "Recommended", "analysis": [{"results": [stress(30.0)]}]}
                    ]
                },
                {
                    "label": "1001-PL2",
                    "designs": [
                        {"layerType": "Measured", "analysis": [{"results": [stress(80.123)]}]},
                        {"layerType": "Recommended"}
                    ]
                }
            ]}]
        })
    }

    #[test]
    fn header_and_comment() {
        let sheet = extract_cover_sheet(&doc(), &CoverSheetOptions::default(), None, &mut NullObserver).unwrap();
        assert_eq!(sheet.header.job_number, "J-1001");
        assert_eq!(sheet.header.client, "Charter/Spectrum");
        assert_eq!(sheet.header.date, "03/07/2024");
        assert_eq!(sheet.header.engineer, "R. Ortiz");
        assert_eq!(sheet.header.comments, "4 PLAs on 2 poles");
        assert_eq!(sheet.poles[0].notes, "Replace pole; Transfer attachments");
        assert_eq!(sheet.poles[1].final_pct, None);
    }

    #[test]
    fn missing_label_or_date_is_fatal() {
        let mut d = doc();
        d.as_object_mut().unwrap().remove("date");
        let err = extract_cover_sheet(&d, &CoverSheetOptions::default(), None, &mut NullObserver).unwrap_err();
        assert_eq!(err, ReconError::MissingField { document: DOCUMENT, field: "date".into() });

        let mut d = doc();
        d["label"] = json!("  ");
        assert!(extract_cover_sheet(&d, &CoverSheetOptions::default(), None, &mut NullObserver).is_err());
    }

    #[test]
    fn geocoded_location_keeps_coordinates() {
        let geo = FixedGeocoder {
            answer: Some(GeocodedAddress {
                formatted_address: "12 Peachtree St, Atlanta".into(),
                city: "Atlanta".into(),
                ..Default::default()
            }),
            calls: Cell::new(0),
        };
        let sheet =
            extract_cover_sheet(&doc(), &CoverSheetOptions::default(), Some(&geo), &mut NullObserver).unwrap();
        assert_eq!(sheet.header.location, "12 Peachtree St, Atlanta (33.749000, -84.388000)");
        assert_eq!(sheet.header.city, "Atlanta");
        assert_eq!(geo.calls.get(), 1);
    }

    #[test]
    fn geocoder_failure_falls_back_to_coordinates() {
        let geo = FixedGeocoder { answer: None, calls: Cell::new(0) };
        let mut obs = RecordingObserver::new();
        let sheet = extract_cover_sheet(&doc(), &CoverSheetOptions::default(), Some(&geo), &mut obs).unwrap();
        assert_eq!(sheet.header.location, "33.749000, -84.388000");
        assert_eq!(sheet.header.city, NO_LOCATION_INFO);
        assert_eq!(obs.count(|e| matches!(e, ExtractEvent::GeocodeFailed { .. })), 1);
    }

    #[test]
    fn blank_geocoded_address_uses_bare_coordinates() {
        let geo = FixedGeocoder {
            answer: Some(GeocodedAddress { city: "Atlanta".into(), ..Default::default() }),
            calls: Cell::new(0),
        };
        let sheet =
            extract_cover_sheet(&doc(), &CoverSheetOptions::default(), Some(&geo), &mut NullObserver).unwrap();
        assert_eq!(sheet.header.location, "33.749000, -84.388000");
        assert_eq!(sheet.header.city, "Atlanta");
    }

    #[test]
    fn unlabeled_location_still_listed() {
        let mut d = doc();
        d["leads"][0]["locations"][1].as_object_mut().unwrap().remove("label");
        let mut obs = RecordingObserver::new();
        let sheet = extract_cover_sheet(&d, &CoverSheetOptions::default(), None, &mut obs).unwrap();
        assert_eq!(sheet.poles.len(), 2);
        assert_eq!(sheet.poles[1].station, "");
        assert!(sheet.poles[1].existing_pct.is_some());
        assert_eq!(sheet.design_count, 4);
        assert_eq!(sheet.pole_count, 1);
        assert_eq!(sheet.header.comments, "4 PLAs on 1 poles");
        assert_eq!(
            obs.count(|e| matches!(e, ExtractEvent::FieldMissing { field: "label", row: 1, .. })),
            1
        );
        assert_eq!(sheet.pole_table_block().lines().nth(2), Some("2\t\t80.12%\t\u{2014}\t"));
    }

    #[test]
    fn no_coordinates_placeholders() {
        let mut d = doc();
        d["leads"][0]["locations"][0]
            .as_object_mut()
            .unwrap()
            .remove("geographicCoordinate");
        let sheet = extract_cover_sheet(&d, &CoverSheetOptions::default(), None, &mut NullObserver).unwrap();
        assert_eq!(sheet.header.location, NO_COORDINATES);
        assert_eq!(sheet.header.city, NO_LOCATION_INFO);
        assert!(sheet.coordinates.is_none());
    }

    #[test]
    fn document_location_skips_geocoder() {
        let mut d = doc();
        d["clientData"] = json!({"generalLocation": "Fulton County"});
        d["address"] = json!({"city": "Atlanta"});
        let geo = FixedGeocoder { answer: None, calls: Cell::new(0) };
        let sheet = extract_cover_sheet(&d, &CoverSheetOptions::default(), Some(&geo), &mut NullObserver).unwrap();
        assert_eq!(sheet.header.location, "Fulton County");
        assert_eq!(geo.calls.get(), 0);
    }

    #[test]
    fn text_blocks() {
        let sheet = extract_cover_sheet(
            &doc(),
            &CoverSheetOptions { client: "Acme Fiber".into() },
            None,
            &mut NullObserver,
        )
        .unwrap();
        let header = sheet.header_block();
        assert!(header.starts_with("**Job Number:** J-1001\n**Client:** Acme Fiber\n"));
        assert!(header.ends_with("**Comments:** 4 PLAs on 2 poles"));

        let table = sheet.pole_table_block();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "#\tStation\tExisting %\tFinal %\tDescription of Work");
        assert_eq!(lines[1], "1\tPL1\t45.50%\t30.00%\tReplace pole; Transfer attachments");
        assert_eq!(lines[2], "2\tPL2\t80.12%\t\u{2014}\t");
    }
}
