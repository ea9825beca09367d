//! Reverse geocoding for cover-sheet locations.

pub mod client;
pub mod address;

pub use client::{GeocodeError, NominatimClient, NominatimOptions};
