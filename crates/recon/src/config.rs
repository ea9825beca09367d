use std::ops::RangeInclusive;

use crate::error::ReconError;

pub const DEFAULT_THRESHOLD_PCT: f64 = 5.0;
pub const THRESHOLD_RANGE: RangeInclusive<f64> = 1.0..=20.0;
pub const DEFAULT_CLIENT: &str = "Charter/Spectrum";

// ---------------------------------------------------------------------------
// Comparison options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Loading delta (percentage points) above which a row is flagged.
    pub threshold_pct: f64,
    pub survey_aliases: SurveyAliases,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            threshold_pct: DEFAULT_THRESHOLD_PCT,
            survey_aliases: SurveyAliases::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Field-survey column aliases
// ---------------------------------------------------------------------------

/// Ordered header names tried for each logical survey field.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyAliases {
    pub node_type: Vec<String>,
    pub scid: Vec<String>,
    pub pole_number: Vec<String>,
    pub specification: Vec<String>,
    pub height: Vec<String>,
    pub class: Vec<String>,
    pub species: Vec<String>,
    pub existing_pct: Vec<String>,
    pub final_pct: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SurveyAliases {
    fn default() -> Self {
        Self {
            node_type: names(&["node_type", "Node Type"]),
            scid: names(&["scid", "SCID", "SCID #", "scid_number"]),
            pole_number: names(&[
                "pole_tag",
                "PL_number",
                "pl_number",
                "Pole Number",
                "pole_number",
                "Pole Tag",
                "PL",
            ]),
            specification: names(&[
                "pole_spec",
                "Pole Spec",
                "specification",
                "pole_specification",
                "proposed_pole_spec",
            ]),
            height: names(&["pole_height", "Pole Height", "height"]),
            class: names(&["pole_class", "Pole Class", "class"]),
            species: names(&["pole_species", "Pole Species", "species"]),
            existing_pct: names(&[
                "existing_capacity_%",
                "Existing Loading %",
                "existing_loading",
                "existing_capacity",
                "existing",
            ]),
            final_pct: names(&[
                "final_passing_capacity_%",
                "Final Loading %",
                "final_loading",
                "final_passing_capacity",
                "final",
            ]),
        }
    }
}

impl SurveyAliases {
    fn lists(&self) -> [(&'static str, &Vec<String>); 9] {
        [
            ("node_type", &self.node_type),
            ("scid", &self.scid),
            ("pole_number", &self.pole_number),
            ("specification", &self.specification),
            ("height", &self.height),
            ("class", &self.class),
            ("species", &self.species),
            ("existing_pct", &self.existing_pct),
            ("final_pct", &self.final_pct),
        ]
    }
}

// ---------------------------------------------------------------------------
// Cover sheet options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CoverSheetOptions {
    pub client: String,
}

impl Default for CoverSheetOptions {
    fn default() -> Self {
        Self { client: DEFAULT_CLIENT.to_string() }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl CompareOptions {
    pub fn with_threshold(mut self, threshold_pct: f64) -> Self {
        self.threshold_pct = threshold_pct;
        self
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.threshold_pct.is_finite() || !THRESHOLD_RANGE.contains(&self.threshold_pct) {
            return Err(ReconError::ConfigValidation(format!(
                "threshold_pct must be between {} and {}, got {}",
                THRESHOLD_RANGE.start(),
                THRESHOLD_RANGE.end(),
                self.threshold_pct
            )));
        }

        for (field, list) in self.survey_aliases.lists() {
            if list.iter().all(|name| name.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "aliases.{field} must name at least one column"
                )));
            }
        }

        Ok(())
    }
}
