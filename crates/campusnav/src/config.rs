use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geo::LatLng;
use crate::map::TileLayer;
use crate::map::viewport::{MAX_ZOOM, MIN_ZOOM};
use crate::workspace::MapSettings;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "campusnav";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CENTER: [f64; 2] = [7.0851, 125.4790];
pub const DEFAULT_ZOOM: f64 = 15.0;
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// `[latitude, longitude]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `campusnav config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# campusnav configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn base_url(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("light")
    }

    /// Initial map placement with defaults filled in.
    pub fn map_settings(&self) -> MapSettings {
        let map = self.map.clone().unwrap_or_default();
        let [lat, lng] = map.center.unwrap_or(DEFAULT_CENTER);
        MapSettings {
            center: LatLng::new(lat, lng),
            zoom: map.zoom.unwrap_or(DEFAULT_ZOOM),
            tiles: TileLayer {
                url_template: map.tile_url.unwrap_or_else(|| DEFAULT_TILE_URL.to_string()),
                attribution: map
                    .attribution
                    .unwrap_or_else(|| DEFAULT_ATTRIBUTION.to_string()),
            },
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server.base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    anyhow::bail!("Invalid base_url: {value}. Must start with http:// or https://.");
                }
                self.server.get_or_insert_with(ServerConfig::default).base_url =
                    Some(value.trim_end_matches('/').to_string());
            }
            "map.center" => {
                let center = parse_center(value)?;
                self.map.get_or_insert_with(MapConfig::default).center = Some(center);
            }
            "map.zoom" => {
                let zoom: f64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid zoom: {value}. Must be a number."))?;
                if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                    anyhow::bail!("Invalid zoom: {value}. Must be between {MIN_ZOOM} and {MAX_ZOOM}.");
                }
                self.map.get_or_insert_with(MapConfig::default).zoom = Some(zoom);
            }
            "map.tile_url" => {
                if !["{z}", "{x}", "{y}"].iter().all(|p| value.contains(p)) {
                    anyhow::bail!("Invalid tile_url: {value}. Must contain {{z}}, {{x}} and {{y}}.");
                }
                self.map.get_or_insert_with(MapConfig::default).tile_url = Some(value.to_string());
            }
            "map.attribution" => {
                self.map.get_or_insert_with(MapConfig::default).attribution =
                    Some(value.to_string());
            }
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: server.base_url, map.center, map.zoom, map.tile_url, map.attribution, defaults.theme"
            ),
        }
        Ok(())
    }
}

/// `"lat,lng"` with both parts in range.
fn parse_center(value: &str) -> Result<[f64; 2]> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [lat, lng] = parts.as_slice() else {
        anyhow::bail!("Invalid center: {value}. Expected 'lat,lng'.");
    };
    let (Ok(lat), Ok(lng)) = (lat.parse::<f64>(), lng.parse::<f64>()) else {
        anyhow::bail!("Invalid center: {value}. Expected 'lat,lng'.");
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        anyhow::bail!("Invalid center: {value}. Latitude or longitude out of range.");
    }
    Ok([lat, lng])
}
