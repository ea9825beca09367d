//! Pole coordinates in the several shapes analysis exports have used.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::fields::{child, items, lookup_strict};
use crate::observe::{ExtractEvent, ExtractObserver};
use crate::parse::json_number;
use crate::strategy::{first_match, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Usable coordinates: finite, in range, and not the (0, 0) placeholder.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let usable = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
            && !(latitude == 0.0 && longitude == 0.0);
        usable.then_some(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

const LAT_KEYS: &[&str] = &["latitude", "lat"];
const LON_KEYS: &[&str] = &["longitude", "lon", "lng"];

fn number_at(value: &Value, keys: &[&str]) -> Option<f64> {
    let obj = value.as_object()?;
    lookup_strict(obj, keys).and_then(json_number)
}

fn lat_lon_of(value: &Value) -> Option<Coordinates> {
    Coordinates::new(number_at(value, LAT_KEYS)?, number_at(value, LON_KEYS)?)
}

/// GeoJSON order: `[longitude, latitude]`.
fn from_lon_lat_array(array: &[Value]) -> Option<Coordinates> {
    match array {
        [lon, lat, ..] => Coordinates::new(json_number(lat)?, json_number(lon)?),
        _ => None,
    }
}

fn lon_lat_array(location: &Value) -> Option<Coordinates> {
    ["geographicCoordinate", "mapLocation", "geometry"]
        .iter()
        .filter_map(|key| child(location, key))
        .map(|obj| items(obj, "coordinates"))
        .chain(std::iter::once(items(location, "coordinates")))
        .find_map(from_lon_lat_array)
}

fn lat_lon_fields(location: &Value) -> Option<Coordinates> {
    lat_lon_of(location)
}

fn nested_object(location: &Value) -> Option<Coordinates> {
    ["coordinate", "coordinates", "position", "location"]
        .iter()
        .filter_map(|key| child(location, key))
        .filter(|v| v.is_object())
        .find_map(lat_lon_of)
}

fn gps_fields(location: &Value) -> Option<Coordinates> {
    let flat = || {
        Coordinates::new(
            number_at(location, &["gpsLatitude", "gps_latitude", "gpsLat"])?,
            number_at(location, &["gpsLongitude", "gps_longitude", "gpsLng", "gpsLon"])?,
        )
    };
    flat().or_else(|| child(location, "gps").and_then(lat_lon_of))
}

const COORDINATE_STRATEGIES: &[Strategy<Coordinates>] = &[
    Strategy::new("lon_lat_array", lon_lat_array),
    Strategy::new("lat_lon_fields", lat_lon_fields),
    Strategy::new("nested_object", nested_object),
    Strategy::new("gps_fields", gps_fields),
];

pub fn location_coordinates(location: &Value) -> Option<(&'static str, Coordinates)> {
    first_match(location, COORDINATE_STRATEGIES)
}

/// Coordinates of the first location that carries usable ones.
pub fn first_coordinates(locations: &[&Value], observer: &mut dyn ExtractObserver) -> Option<Coordinates> {
    locations.iter().enumerate().find_map(|(row, loc)| {
        let (strategy, c) = location_coordinates(loc)?;
        observer.on_event(ExtractEvent::CoordinatesFound {
            row,
            strategy,
            latitude: c.latitude,
            longitude: c.longitude,
        });
        Some(c)
    })
}
