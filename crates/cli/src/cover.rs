//! `polecheck cover-sheet`: header fields and pole table from an analysis export.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use polecheck_config::Settings;
use polecheck_geocoder::{NominatimClient, NominatimOptions};
use polecheck_recon::{extract_cover_sheet, CoverSheetOptions, LogObserver, ReverseGeocoder};

use crate::{load_settings, CliError};

pub fn nominatim_options(settings: &Settings) -> NominatimOptions {
    let g = &settings.geocoder;
    NominatimOptions {
        endpoint: g.endpoint.clone(),
        user_agent: g.user_agent.clone(),
        timeout: Duration::from_secs(g.timeout_secs),
        zoom: g.zoom,
    }
}

/// Geocoder to use, if any. A client that cannot be built is treated like a
/// failed lookup: the cover sheet falls back to raw coordinates.
fn geocoder(settings: &Settings, no_geocode: bool) -> Option<NominatimClient> {
    if no_geocode || !settings.geocoder.enabled {
        log::info!("reverse geocoding disabled");
        return None;
    }
    match NominatimClient::new(nominatim_options(settings)) {
        Ok(client) => Some(client),
        Err(e) => {
            log::warn!("geocoder unavailable: {e}");
            None
        }
    }
}

pub fn cmd_cover_sheet(
    analysis: PathBuf,
    no_geocode: bool,
    client: Option<String>,
    json: bool,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    let options = CoverSheetOptions {
        client: client.unwrap_or_else(|| settings.cover_sheet.client.clone()),
    };

    let doc = polecheck_io::load_analysis(&analysis).map_err(CliError::io)?;
    let geocoder = geocoder(&settings, no_geocode);
    let mut observer = LogObserver;
    let sheet = extract_cover_sheet(
        &doc,
        &options,
        geocoder.as_ref().map(|g| g as &dyn ReverseGeocoder),
        &mut observer,
    )
    .map_err(CliError::recon)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_string_pretty(&sheet)
            .map_err(|e| CliError::write(format!("JSON serialization error: {e}")))
            .and_then(|s| writeln!(out, "{s}").map_err(|e| CliError::write(e.to_string())))
    } else {
        writeln!(out, "{}\n\n{}", sheet.header_block(), sheet.pole_table_block())
            .map_err(|e| CliError::write(e.to_string()))
    }
}
