// User settings
// Loaded from <config_dir>/polecheck/settings.toml

use polecheck_recon::config::{DEFAULT_CLIENT, DEFAULT_THRESHOLD_PCT, THRESHOLD_RANGE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "POLECHECK_CONFIG";

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "invalid settings in {}: {message}", path.display()),
            Self::Validation(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    /// Loading delta (percentage points) above which a pole is flagged
    pub threshold_pct: f64,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self { threshold_pct: DEFAULT_THRESHOLD_PCT }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverSheetSettings {
    pub client: String,
}

impl Default for CoverSheetSettings {
    fn default() -> Self {
        Self { client: DEFAULT_CLIENT.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub enabled: bool,
    pub endpoint: String,
    /// Sent as the User-Agent header; public Nominatim rejects anonymous clients
    pub user_agent: String,
    pub timeout_secs: u64,
    pub zoom: u8,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("polecheck/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            zoom: 18,
        }
    }
}

/// Optional replacements for the field-survey column alias lists.
/// A list that is present replaces the built-in one entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scid: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pole_number: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_pct: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_pct: Option<Vec<String>>,
}

impl AliasOverrides {
    fn named(&self) -> [(&'static str, Option<&Vec<String>>); 9] {
        [
            ("node_type", self.node_type.as_ref()),
            ("scid", self.scid.as_ref()),
            ("pole_number", self.pole_number.as_ref()),
            ("specification", self.specification.as_ref()),
            ("height", self.height.as_ref()),
            ("class", self.class.as_ref()),
            ("species", self.species.as_ref()),
            ("existing_pct", self.existing_pct.as_ref()),
            ("final_pct", self.final_pct.as_ref()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compare: CompareSettings,
    pub cover_sheet: CoverSheetSettings,
    pub geocoder: GeocoderSettings,
    pub aliases: AliasOverrides,
}

impl Settings {
    /// Default settings file path: `$POLECHECK_CONFIG` if set, otherwise
    /// `<config_dir>/polecheck/settings.toml`.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("polecheck")
            .join("settings.toml")
    }

    /// Load from `path`, or from [`Settings::config_path`] when `None`.
    /// A missing file yields defaults; anything unreadable or invalid is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Read { path: path.clone(), message: e.to_string() })?;
        let settings = Self::from_toml(&contents)
            .map_err(|message| ConfigError::Parse { path: path.clone(), message })?;
        settings.validate()?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.compare.threshold_pct;
        if !t.is_finite() || !THRESHOLD_RANGE.contains(&t) {
            return Err(ConfigError::Validation(format!(
                "compare.threshold_pct must be between {} and {}, got {t}",
                THRESHOLD_RANGE.start(),
                THRESHOLD_RANGE.end()
            )));
        }
        if self.geocoder.enabled {
            if self.geocoder.endpoint.trim().is_empty() {
                return Err(ConfigError::Validation("geocoder.endpoint is empty".into()));
            }
            if self.geocoder.user_agent.trim().is_empty() {
                return Err(ConfigError::Validation("geocoder.user_agent is empty".into()));
            }
            if self.geocoder.timeout_secs == 0 {
                return Err(ConfigError::Validation("geocoder.timeout_secs must be at least 1".into()));
            }
        }
        for (name, list) in self.aliases.named() {
            if let Some(list) = list {
                if list.iter().all(|a| a.trim().is_empty()) {
                    return Err(ConfigError::Validation(format!("aliases.{name} has no usable names")));
                }
            }
        }
        Ok(())
    }

    /// Effective settings as TOML, for display.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Write a commented default settings file. Refuses to overwrite.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::Validation(format!("{} already exists", path.display())));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Read { path: parent.to_path_buf(), message: e.to_string() })?;
        }
        fs::write(path, default_file_contents())
            .map_err(|e| ConfigError::Read { path: path.to_path_buf(), message: e.to_string() })
    }
}

fn default_file_contents() -> String {
    let g = GeocoderSettings::default();
    format!(
        r#"# polecheck settings

[compare]
# Loading delta in percentage points ({min}-{max}) above which a pole is flagged
threshold_pct = {threshold:.1}

[cover_sheet]
client = "{client}"

[geocoder]
enabled = true
endpoint = "{endpoint}"
user_agent = "{user_agent}"
timeout_secs = {timeout}
zoom = {zoom}

# Replace the survey column names searched for each field, e.g.
# [aliases]
# pole_number = ["Pole Tag", "PL #"]
"#,
        min = THRESHOLD_RANGE.start(),
        max = THRESHOLD_RANGE.end(),
        threshold = DEFAULT_THRESHOLD_PCT,
        client = DEFAULT_CLIENT,
        endpoint = g.endpoint,
        user_agent = g.user_agent,
        timeout = g.timeout_secs,
        zoom = g.zoom,
    )
}
