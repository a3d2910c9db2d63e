use crate::models::LatLng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub map: MapConfig,
    pub quick_links: QuickLinksConfig,
    pub location: LocationConfig,
    pub store: StoreConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub limit: Option<u32>,
    pub country_codes: Option<String>, // e.g. "sg,my"
    pub debounce_ms: u64,              // Quiet window before a lookup fires
    pub timeout_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub default_lat: f64,
    pub default_lon: f64,
    pub default_label: String, // Popup text of the selected marker before anything is picked
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub fly_zoom: f64,
    pub fly_duration_ms: u64,
    pub recenter_duration_ms: u64, // Used for the first geolocation fix
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct QuickLinksConfig {
    pub source: String, // File path or http(s) URL
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LocationConfig {
    pub auto_locate: bool, // Look up the live position at startup
    pub ip: String,        // Empty means "the address this request comes from"
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub persist_path: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("locate-tui/", env!("CARGO_PKG_VERSION")).to_string(),
            limit: Some(10),
            country_codes: None,
            debounce_ms: 400,
            timeout_seconds: 10,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: 1.2858644,
            default_lon: 103.85254594021382,
            default_label: "Maybank, 2, Battery Road, Golden Shoe, Downtown Core, Singapore, Central, 049907, Singapore".to_string(),
            default_zoom: 14.0,
            min_zoom: 3.0,
            max_zoom: 14.0,
            fly_zoom: 14.0,
            fly_duration_ms: 2000,
            recenter_duration_ms: 1000,
        }
    }
}

impl Default for QuickLinksConfig {
    fn default() -> Self {
        Self {
            source: "data/quick_links.json".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            auto_locate: true,
            ip: String::new(),
        }
    }
}

impl GeocoderConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl MapConfig {
    pub fn default_center(&self) -> LatLng {
        LatLng::new(self.default_lat, self.default_lon)
    }

    pub fn fly_duration(&self) -> Duration {
        Duration::from_millis(self.fly_duration_ms)
    }

    pub fn recenter_duration(&self) -> Duration {
        Duration::from_millis(self.recenter_duration_ms)
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if let Ok(content) = fs::read_to_string(path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    // Leave a broken file alone so the user can fix it
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    return Config::default();
                }
            }
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}
