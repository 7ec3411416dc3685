//! Codec options and the persisted settings file.
//!
//! Settings live in `~/.lsbhide/config.toml`. A missing file means defaults.
//!
//! ```toml
//! depth = 2
//!
//! [codec]
//! audio_scan = "auto"
//! audio_unit = "sample"
//! text_scan = "interleaved"
//! marker = "terminator"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::frame::FrameMarker;
use crate::stego::{AudioScan, AudioUnit, TextScan};

/// Bit depth used when none is given.
pub const DEFAULT_DEPTH: u8 = 1;

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur when reading or writing settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Options that change how carriers are read and payloads framed.
///
/// Encoder and decoder must agree on every field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Terminator granularity for audio carriers.
    pub audio_scan: AudioScan,
    /// Samples or raw PCM bytes as audio units. Applied when a carrier is
    /// loaded and again by the encode and decode entry points.
    pub audio_unit: AudioUnit,
    /// How whitespace bits are read back from text.
    pub text_scan: TextScan,
    /// End-of-payload marker for image and audio carriers.
    pub marker: FrameMarker,
}

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default bit depth, 1 to 8.
    pub depth: u8,
    pub codec: CodecConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            codec: CodecConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from the default location, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path()?)
    }

    /// Loads settings from `path`, or defaults if the file does not exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Saves settings to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Saves settings to `path`, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Renders the settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the path to the settings file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join(CONFIG_FILE))
    }
}

/// Get the lsbhide config directory (`~/.lsbhide`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".lsbhide"))
        .ok_or(ConfigError::NoConfigDir)
}
