//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Server identity and limits.
    pub server: ServerConfig,
    /// Network/transport settings.
    pub network: NetworkConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Server identity and limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Name shown in discovery responses.
    pub name: String,
    /// Maximum number of players.
    pub max_players: u32,
}

/// Network/transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the transport worker binds to.
    pub bind_address: String,
    /// UDP port the transport worker listens on.
    pub port: u16,
    /// Whether the transport answers discovery probes.
    pub discoverable: bool,
    /// Main-loop tick rate (Hz).
    pub tick_rate: u32,
}

/// Debug/development settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g. "debug", "info,riptide_net=trace").
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Riptide Server".to_string(),
            max_players: 20,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 19132,
            discoverable: true,
            tick_rate: 20,
        }
    }
}

impl Config {
    /// Default config file location: `<user config dir>/riptide/config.ron`,
    /// falling back to the working directory when no config dir exists.
    pub fn default_path() -> std::path::PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("riptide").join("config.ron"))
            .unwrap_or_else(|| std::path::PathBuf::from("config.ron"))
    }

    /// Load a config from a RON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config, falling back to defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist this config as pretty-printed RON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::Serialize)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
