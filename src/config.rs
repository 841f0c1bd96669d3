//! Tool configuration.
//!
//! An optional TOML file under the user config directory tunes storage
//! locations, the fallback quota and the generation endpoint; everything has
//! a sensible default so the tool works with no file at all.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{BannerError, Result};
use crate::store::DEFAULT_QUOTA_BYTES;

/// Environment variable holding the generation API key.
pub const API_KEY_ENV: &str = "BANNERKIT_API_KEY";

/// On-disk config file shape; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    flat_quota_bytes: Option<u64>,
    generate_endpoint: Option<String>,
    autoplay: Option<bool>,
    autoplay_speed: Option<u32>,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for the database and fallback files.
    pub data_dir: PathBuf,
    /// Byte quota for the fallback store (0 = unlimited).
    pub flat_quota_bytes: u64,
    /// Image-generation endpoint, if configured.
    pub generate_endpoint: Option<String>,
    /// Default autoplay setting for exports.
    pub autoplay: bool,
    /// Default autoplay interval in seconds.
    pub autoplay_speed: u32,
}

impl Config {
    /// Loads the config file (if present) and resolves defaults. A data-dir
    /// override (CLI flag) wins over both the file and the default location.
    ///
    /// # Errors
    ///
    /// Returns [`BannerError::ConfigParse`] when an existing config file does
    /// not parse; a missing file is not an error.
    pub fn load(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let file = match default_config_path() {
            Some(path) if path.is_file() => {
                let raw = std::fs::read_to_string(&path)?;
                debug!(path = %path.display(), "Loaded config file");
                toml::from_str(&raw).map_err(|e| BannerError::ConfigParse(e.to_string()))?
            }
            _ => ConfigFile::default(),
        };

        let data_dir = data_dir_override
            .or(file.data_dir)
            .or_else(default_data_dir)
            .ok_or_else(|| {
                BannerError::Other("Could not determine a data directory".to_string())
            })?;

        Ok(Self {
            data_dir,
            flat_quota_bytes: file.flat_quota_bytes.unwrap_or(DEFAULT_QUOTA_BYTES),
            generate_endpoint: file.generate_endpoint,
            autoplay: file.autoplay.unwrap_or(true),
            autoplay_speed: file.autoplay_speed.unwrap_or(5),
        })
    }

    /// Path of the structured store database.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("banners.db")
    }

    /// Directory holding the flat fallback store.
    #[must_use]
    pub fn flat_dir(&self) -> PathBuf {
        self.data_dir.join("fallback")
    }
}

/// `~/.config/bannerkit/config.toml` (platform equivalent).
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bannerkit").join("config.toml"))
}

/// `~/.local/share/bannerkit` (platform equivalent).
fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("bannerkit"))
}
