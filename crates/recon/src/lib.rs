//! `polecheck-recon`: utility-pole reconciliation engine.
//!
//! Pure engine crate: receives decoded survey rows and analysis JSON,
//! returns comparison reports and cover sheets. No CLI or IO dependencies.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod coords;
pub mod cover_sheet;
pub mod engine;
pub mod error;
pub mod fields;
pub mod geocode;
pub mod ident;
pub mod matcher;
pub mod model;
pub mod observe;
pub mod parse;
pub mod strategy;
pub mod survey;

pub use config::{CompareOptions, CoverSheetOptions, SurveyAliases};
pub use cover_sheet::{extract_cover_sheet, CoverSheet};
pub use engine::{compare, run};
pub use error::ReconError;
pub use geocode::{GeocodedAddress, ReverseGeocoder};
pub use model::{CellValue, ComparisonReport, ComparisonRow, PoleRecord, SourceRow};
pub use observe::{ExtractEvent, ExtractObserver, LogObserver, NullObserver, RecordingObserver};
