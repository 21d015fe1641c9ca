//! Configuration file loading and parsing.
//!
//! The tracker supports data-directory configuration through `config.toml`.
//! If no config file exists, the system falls back to sensible defaults.
//! Command-line flags and environment variables (handled by the server
//! binary) take priority over anything read here.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default address the API server binds to.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Default log level when neither `RUST_LOG` nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerConfig {
    /// HTTP server settings (optional).
    pub server: Option<ServerConfig>,
    /// Storage backend settings (optional).
    pub storage: Option<StorageConfig>,
    /// Logging settings (optional).
    pub logging: Option<LoggingConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. "127.0.0.1:8080".
    pub bind: Option<String>,
    /// Allow cross-origin requests from any origin (default: true).
    pub cors: Option<bool>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Which backend holds the issues.
    pub backend: Option<StorageBackend>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Level or `tracing` filter directive, e.g. "debug" or "tracker=debug".
    pub level: Option<String>,
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per issue under the data directory
    #[default]
    Json,
    /// Process memory; everything is lost on shutdown
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!(
                "Unknown storage backend '{}' (expected 'json' or 'memory')",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from `<data_dir>/config.toml` if it exists.
    ///
    /// Returns an empty config (all fields None) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");

        if !config_path.exists() {
            // No config file - return empty config (will use defaults)
            return Ok(TrackerConfig::default());
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;

        let config: TrackerConfig =
            toml::from_str(&content).context("Failed to parse config.toml")?;

        Ok(config)
    }

    /// Configured bind address, or [`DEFAULT_BIND`].
    pub fn bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Whether permissive CORS is enabled (default: true).
    pub fn cors(&self) -> bool {
        self.server.as_ref().and_then(|s| s.cors).unwrap_or(true)
    }

    /// Configured storage backend, or JSON files.
    pub fn storage_backend(&self) -> StorageBackend {
        self.storage
            .as_ref()
            .and_then(|s| s.backend)
            .unwrap_or_default()
    }

    /// Configured log level, or [`DEFAULT_LOG_LEVEL`].
    pub fn log_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }
}
