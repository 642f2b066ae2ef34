use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::{Coordinate, Location, builtin_locations};

pub const DEFAULT_PROVIDER_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Forecast provider endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// Request timeout; when absent the HTTP client default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            timeout_secs: None,
        }
    }
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// No positioning capability at all.
    #[default]
    None,
    /// Look the position up from the public IP address. This sends the
    /// address to a third-party service, so it has to be opted into.
    Ip,
    /// Always report the configured `latitude`/`longitude`.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeolocationConfig {
    #[serde(default)]
    pub mode: GeolocationMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Override for the IP lookup endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

impl GeolocationConfig {
    pub fn fixed_coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }

    pub fn service_url(&self) -> &str {
        self.service_url
            .as_deref()
            .unwrap_or(DEFAULT_GEOLOCATION_URL)
    }
}

/// One entry of the `[[locations]]` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&LocationEntry> for Location {
    fn from(entry: &LocationEntry) -> Self {
        Location::new(
            entry.title.clone(),
            Coordinate::new(entry.latitude, entry.longitude),
        )
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [provider]
/// base_url = "https://api.open-meteo.com/v1/forecast"
///
/// [geolocation]
/// mode = "fixed"
/// latitude = 64.1355
/// longitude = -21.8954
///
/// [[locations]]
/// title = "Reykjavík"
/// latitude = 64.1355
/// longitude = -21.8954
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub geolocation: GeolocationConfig,

    #[serde(default = "default_location_entries")]
    pub locations: Vec<LocationEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            geolocation: GeolocationConfig::default(),
            locations: default_location_entries(),
        }
    }
}

fn default_location_entries() -> Vec<LocationEntry> {
    builtin_locations()
        .into_iter()
        .filter_map(|loc| {
            let coord = loc.coordinate?;
            Some(LocationEntry {
                title: loc.title,
                latitude: coord.latitude,
                longitude: coord.longitude,
            })
        })
        .collect()
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path, or defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The fixed list of locations offered to the user.
    pub fn locations(&self) -> Vec<Location> {
        self.locations.iter().map(Location::from).collect()
    }

    /// Case-insensitive lookup by title.
    pub fn find_location(&self, title: &str) -> Option<Location> {
        let wanted = title.to_lowercase();
        self.locations
            .iter()
            .find(|entry| entry.title.to_lowercase() == wanted)
            .map(Location::from)
    }
}
