use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::provider::Provider;
use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/reasoning-adapter/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("reasoning-adapter").join("config.toml")
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML.
    ///
    /// The result is not validated, so command-line overrides can still
    /// correct it; call [`Config::validate`] once they are applied.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The bind address is a socket address
    /// - The upstream target is an http(s) URL
    /// - The provider preset exists and names a reasoning field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.proxy
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ValidationError {
                message: format!("Invalid bind address '{}': {}", self.proxy.bind_addr, e),
            })?;

        let target = reqwest::Url::parse(&self.upstream.target).map_err(|e| {
            ConfigError::ValidationError {
                message: format!("Invalid upstream target '{}': {}", self.upstream.target, e),
            }
        })?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Unsupported upstream scheme '{}': only http and https are allowed",
                    target.scheme()
                ),
            });
        }

        Provider::from_config(&self.provider)?;
        Ok(())
    }

    /// Resolved provider conventions for this config.
    pub fn resolve_provider(&self) -> Result<Provider, ConfigError> {
        Provider::from_config(&self.provider)
    }
}
