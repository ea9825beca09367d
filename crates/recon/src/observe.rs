//! Extraction tracing.
//!
//! Parsers report every decision they make (which alias resolved a field,
//! which fallback strategy produced a value, why a row was dropped) through
//! an [`ExtractObserver`]. The CLI logs them; tests record them.

use crate::model::Source;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractEvent {
    FieldResolved { source: Source, row: usize, field: &'static str, key: String, value: String },
    FieldMissing { source: Source, row: usize, field: &'static str },
    RowSkipped { source: Source, row: usize, reason: String },
    DuplicateKey { source: Source, key: String, raw_id: String },
    PercentRescaled { source: Source, row: usize, field: &'static str, raw: f64, scaled: f64 },
    StrategyUsed { source: Source, row: usize, field: &'static str, strategy: &'static str, value: String },
    CoordinatesFound { row: usize, strategy: &'static str, latitude: f64, longitude: f64 },
    GeocodeFailed { latitude: f64, longitude: f64 },
}

pub trait ExtractObserver {
    fn on_event(&mut self, event: ExtractEvent);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl ExtractObserver for NullObserver {
    fn on_event(&mut self, _event: ExtractEvent) {}
}

/// Keeps every event in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<ExtractEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&ExtractEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl ExtractObserver for RecordingObserver {
    fn on_event(&mut self, event: ExtractEvent) {
        self.events.push(event);
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ExtractObserver for LogObserver {
    fn on_event(&mut self, event: ExtractEvent) {
        match event {
            ExtractEvent::FieldResolved { source, row, field, key, value } => {
                log::trace!("{source} row {row}: {field} = '{value}' <- '{key}'");
            }
            ExtractEvent::FieldMissing { source, row, field } => {
                log::debug!("{source} row {row}: no value for {field}");
            }
            ExtractEvent::RowSkipped { source, row, reason } => {
                log::debug!("{source} row {row} skipped: {reason}");
            }
            ExtractEvent::DuplicateKey { source, key, raw_id } => {
                log::warn!("{source}: duplicate pole key {key} ({raw_id}), keeping the later record");
            }
            ExtractEvent::PercentRescaled { source, row, field, raw, scaled } => {
                log::debug!("{source} row {row}: {field} {raw} read as fraction, using {scaled}");
            }
            ExtractEvent::StrategyUsed { source, row, field, strategy, value } => {
                log::trace!("{source} row {row}: {field} = '{value}' via {strategy}");
            }
            ExtractEvent::CoordinatesFound { row, strategy, latitude, longitude } => {
                log::debug!("location {row}: coordinates {latitude:.6}, {longitude:.6} via {strategy}");
            }
            ExtractEvent::GeocodeFailed { latitude, longitude } => {
                log::warn!("reverse geocoding failed for {latitude:.6}, {longitude:.6}");
            }
        }
    }
}
