//! Nominatim reverse-geocoding client.
//!
//! Blocking reqwest client (no Tokio runtime required). One request per
//! lookup, no retries; the client timeout bounds the call.

use std::time::Duration;

use polecheck_recon::geocode::{GeocodedAddress, ReverseGeocoder};

use crate::address::{assemble, ReverseResponse};

pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Error type for geocoder requests.
#[derive(Debug)]
pub enum GeocodeError {
    /// Could not build the client, connect, or the request timed out
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response body was not the expected JSON
    Parse(String),
    /// The service answered but had no address for the point
    NoResult(String),
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::Network(msg) => write!(f, "Network error: {}", msg),
            GeocodeError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            GeocodeError::Parse(msg) => write!(f, "Parse error: {}", msg),
            GeocodeError::NoResult(msg) => write!(f, "No result: {}", msg),
        }
    }
}

impl std::error::Error for GeocodeError {}

#[derive(Debug, Clone)]
pub struct NominatimOptions {
    /// Full URL of the reverse endpoint
    pub endpoint: String,
    /// Identification header; required by the public service
    pub user_agent: String,
    pub timeout: Duration,
    pub zoom: u8,
}

impl Default for NominatimOptions {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_REVERSE_URL.to_string(),
            user_agent: format!("polecheck/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(10),
            zoom: 18,
        }
    }
}

/// Reverse-geocoding client (blocking).
#[derive(Clone)]
pub struct NominatimClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    zoom: u8,
}

impl NominatimClient {
    pub fn new(options: NominatimOptions) -> Result<Self, GeocodeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: options.endpoint,
            zoom: options.zoom,
        })
    }

    /// Client against a different base URL (mock servers, self-hosted instances).
    pub fn with_base_url(base_url: &str) -> Result<Self, GeocodeError> {
        Self::new(NominatimOptions {
            endpoint: format!("{}/reverse", base_url.trim_end_matches('/')),
            ..NominatimOptions::default()
        })
    }

    /// Look up the nearest address to a point.
    pub fn lookup(&self, latitude: f64, longitude: f64) -> Result<GeocodedAddress, GeocodeError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", self.zoom.to_string()),
            ])
            .send()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeocodeError::Http(status, body));
        }

        let body: ReverseResponse = response.json().map_err(|e| GeocodeError::Parse(e.to_string()))?;
        assemble(&body).ok_or_else(|| {
            GeocodeError::NoResult(body.error.clone().unwrap_or_else(|| "response has no address".to_string()))
        })
    }
}

impl ReverseGeocoder for NominatimClient {
    fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<GeocodedAddress> {
        match self.lookup(latitude, longitude) {
            Ok(address) => {
                log::debug!("geocoded {latitude}, {longitude} -> {}", address.formatted_address);
                Some(address)
            }
            Err(e) => {
                log::warn!("reverse geocoding {latitude}, {longitude} failed: {e}");
                None
            }
        }
    }
}
