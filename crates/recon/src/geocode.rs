use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeocodedAddress {
    pub formatted_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Best-effort reverse geocoding. Any failure is `None`; implementations
/// make a single attempt and bound it with their own transport timeout.
pub trait ReverseGeocoder {
    fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<GeocodedAddress>;
}
