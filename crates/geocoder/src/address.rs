//! Nominatim response → [`GeocodedAddress`].

use polecheck_recon::geocode::GeocodedAddress;
use serde::Deserialize;

/// The parts of a Nominatim `/reverse` response that are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<AddressParts>,
    /// Set instead of `address` when nothing is found ("Unable to geocode")
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressParts {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub pedestrian: Option<String>,
    pub street: Option<String>,
    pub path: Option<String>,
    pub footway: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn first<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates.iter().find_map(|v| present(*v))
}

/// Append `part` unless it already appears in `out`.
fn append(out: &mut String, part: Option<&str>, sep: &str) {
    let Some(part) = part else { return };
    if out.contains(part) {
        return;
    }
    if !out.is_empty() {
        out.push_str(sep);
    }
    out.push_str(part);
}

impl AddressParts {
    /// House number plus the first named way, else the neighbourhood/suburb.
    pub fn street_address(&self) -> String {
        let way = first(&[&self.road, &self.pedestrian, &self.street, &self.path, &self.footway]);
        let mut street = match (present(&self.house_number), way) {
            (Some(n), Some(w)) => format!("{n} {w}"),
            (Some(n), None) => n.to_string(),
            (None, Some(w)) => w.to_string(),
            (None, None) => String::new(),
        };
        if street.is_empty() {
            if let Some(area) = first(&[&self.neighbourhood, &self.suburb]) {
                street = area.to_string();
            }
        }
        street
    }

    pub fn city(&self) -> Option<&str> {
        first(&[&self.city, &self.town, &self.village, &self.hamlet, &self.county])
    }
}

/// Assemble the address. `None` when the response carries no address block.
pub fn assemble(response: &ReverseResponse) -> Option<GeocodedAddress> {
    let parts = response.address.as_ref()?;
    let street = parts.street_address();
    let city = parts.city();
    let state = present(&parts.state);
    let postal_code = present(&parts.postcode);

    let mut formatted = street.clone();
    // Only one of neighbourhood / suburb is added
    match (present(&parts.neighbourhood), present(&parts.suburb)) {
        (Some(n), _) if !street.contains(n) => append(&mut formatted, Some(n), ", "),
        (_, Some(s)) if !street.contains(s) => append(&mut formatted, Some(s), ", "),
        _ => {}
    }
    append(&mut formatted, city, ", ");
    append(&mut formatted, state, ", ");
    append(&mut formatted, postal_code, " ");

    if formatted.is_empty() {
        if let Some(display) = present(&response.display_name) {
            formatted = display.to_string();
        }
    }

    Some(GeocodedAddress {
        formatted_address: formatted,
        city: city.unwrap_or_default().to_string(),
        state: state.unwrap_or_default().to_string(),
        postal_code: postal_code.unwrap_or_default().to_string(),
    })
}
