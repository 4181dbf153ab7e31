//! Configuration management (~/.config/kiln/config.toml)
//!
//! Handles loading, saving, and providing defaults for runtime settings.
//! Settings are stored in TOML format in the platform-specific config
//! directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::input::KeyboardMapping;

/// Runtime configuration.
///
/// Every section and field has a default, so a missing or partial config
/// file always yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Window and frame pacing settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Audio pacing settings
    #[serde(default)]
    pub audio: AudioConfig,
    /// Input settings
    #[serde(default)]
    pub input: InputConfig,
}

/// Window and frame pacing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Initial window width in pixels (default: 1280)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Initial window height in pixels (default: 720)
    #[serde(default = "default_height")]
    pub height: u32,
    /// Fixed update rate the loop is paced to (default: 30)
    #[serde(default = "default_update_hz")]
    pub update_hz: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            update_hz: default_update_hz(),
        }
    }
}

/// Audio pacing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Output sample rate to request from the device (default: 48000)
    #[serde(default = "default_samples_per_second")]
    pub samples_per_second: u32,
    /// Write quantum divisor: the device queue is kept filled to
    /// `samples_per_second / pace_hz` frames (default: 15)
    #[serde(default = "default_pace_hz")]
    pub pace_hz: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            samples_per_second: default_samples_per_second(),
            pace_hz: default_pace_hz(),
        }
    }
}

/// Input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Keyboard bindings for the virtual controller
    #[serde(default)]
    pub keyboard: KeyboardMapping,
}

fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_update_hz() -> u32 {
    30
}
fn default_samples_per_second() -> u32 {
    48_000
}
fn default_pace_hz() -> u32 {
    15
}

/// Path of the config file, if a config directory can be determined.
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "kiln").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config file, falling back to defaults.
///
/// A missing file is normal (first run). A malformed file is reported and
/// ignored rather than aborting startup.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(text) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str(&text) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("invalid config {}: {err}; using defaults", path.display());
            Config::default()
        }
    }
}

/// Write the config file, creating the config directory if needed.
pub fn save(config: &Config) -> anyhow::Result<()> {
    let path = config_path()
        .ok_or_else(|| anyhow::anyhow!("could not determine a config directory"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    Ok(())
}
