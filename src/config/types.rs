//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{
    default_bot_name, default_data_dir, default_gateway_address, default_tags_file,
    default_timezones_file,
};

/// Environment variable overriding `bot.prefix`.
pub const PREFIX_ENV: &str = "BLEP_PREFIX";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and command prefix.
    pub bot: BotConfig,
    /// Line gateway the transport connects to.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Where the JSON stores live.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Trigger scoping.
    #[serde(default)]
    pub triggers: TriggersConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides. Returns `true` if anything changed.
    pub fn apply_env_overrides(&mut self) -> bool {
        match std::env::var(PREFIX_ENV) {
            Ok(prefix) => {
                self.bot.prefix = prefix;
                true
            }
            Err(_) => false,
        }
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Command prefix, e.g. `"!"`.
    pub prefix: String,
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,
}

/// TCP line gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Address to listen on.
    #[serde(default = "default_gateway_address")]
    pub address: SocketAddr,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: default_gateway_address(),
        }
    }
}

/// Store file locations.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON files. Created at startup if missing.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Tag store file name, relative to `data_dir`.
    #[serde(default = "default_tags_file")]
    pub tags_file: String,
    /// Timezone store file name, relative to `data_dir`.
    #[serde(default = "default_timezones_file")]
    pub timezones_file: String,
}

impl StorageConfig {
    /// Full path of the tag store.
    pub fn tags_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.tags_file)
    }

    /// Full path of the timezone store.
    pub fn timezones_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.timezones_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tags_file: default_tags_file(),
            timezones_file: default_timezones_file(),
        }
    }
}

/// Trigger configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggersConfig {
    /// Channels the `dead` trigger answers in. Empty means every channel.
    #[serde(default)]
    pub dead_channels: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration. `RUST_LOG` still controls the filter.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}
