//! Client configuration.
//!
//! Holds the audio profile, login music settings, tuning constants and the
//! asset layout. Configuration can be loaded from and saved to a TOML file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ember_audio::{AssetConfig, AudioProfile, AudioTuning, LoginMusic};
use ember_common::{ConfigError, EmberResult, MusicId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "ember.toml";

/// Client configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Track played on the login screen
    pub login_track: MusicId,
    /// Frames per second of the audio update loop
    pub frame_rate: u32,
    /// Stop after this many seconds (0 = when the music ends)
    pub max_seconds: u32,

    /// The user's audio profile
    pub profile: AudioProfile,
    /// Login-screen music settings
    pub login_music: LoginMusic,
    /// Volume scaling and track limits
    pub tuning: AudioTuning,
    /// Asset locations
    pub assets: AssetConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            login_track: MusicId::new(0),
            frame_rate: 60,
            max_seconds: 0,

            profile: AudioProfile::default(),
            login_music: LoginMusic::default(),
            tuning: AudioTuning::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses a configuration from TOML text.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match Self::parse(&contents, path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("{e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> EmberResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }
}
