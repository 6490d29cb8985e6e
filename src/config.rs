//! Configuration for the sync console.
//!
//! Values come from (in order of precedence) an explicit builder, the
//! `EDUSYNC_API_URL` environment variable, or a TOML config file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Cool-down after a triggered synchronization, in seconds.
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;
/// Readiness poll cadence, in seconds.
pub const DEFAULT_READINESS_POLL_SECS: u64 = 10;
/// Status poll cadence, in seconds.
pub const DEFAULT_STATUS_POLL_SECS: u64 = 15;
/// Delay before the post-trigger status re-fetch, in seconds.
pub const DEFAULT_STATUS_REFETCH_DELAY_SECS: u64 = 2;

/// Sync console configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    server_url: String,
    pub cooldown_secs: u64,
    pub readiness_poll_secs: u64,
    pub status_poll_secs: u64,
    pub status_refetch_delay_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let server_url = std::env::var("EDUSYNC_API_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self {
            server_url,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            readiness_poll_secs: DEFAULT_READINESS_POLL_SECS,
            status_poll_secs: DEFAULT_STATUS_POLL_SECS,
            status_refetch_delay_secs: DEFAULT_STATUS_REFETCH_DELAY_SECS,
        }
    }
}

impl SyncConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new SyncConfigBuilder
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        let file: ConfigFile =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut builder = SyncConfigBuilder::default();
        if let Some(url) = file.server_url {
            builder = builder.server_url(url);
        }
        if let Some(secs) = file.cooldown_secs {
            builder = builder.cooldown_secs(secs);
        }
        if let Some(secs) = file.readiness_poll_secs {
            builder = builder.readiness_poll_secs(secs);
        }
        if let Some(secs) = file.status_poll_secs {
            builder = builder.status_poll_secs(secs);
        }
        builder.build()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

/// On-disk configuration shape.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    server_url: Option<String>,
    cooldown_secs: Option<u64>,
    readiness_poll_secs: Option<u64>,
    status_poll_secs: Option<u64>,
}

/// Builder for SyncConfig
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    server_url: Option<String>,
    cooldown_secs: Option<u64>,
    readiness_poll_secs: Option<u64>,
    status_poll_secs: Option<u64>,
    status_refetch_delay_secs: Option<u64>,
}

impl SyncConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = Some(secs);
        self
    }

    pub fn readiness_poll_secs(mut self, secs: u64) -> Self {
        self.readiness_poll_secs = Some(secs);
        self
    }

    pub fn status_poll_secs(mut self, secs: u64) -> Self {
        self.status_poll_secs = Some(secs);
        self
    }

    pub fn status_refetch_delay_secs(mut self, secs: u64) -> Self {
        self.status_refetch_delay_secs = Some(secs);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let defaults = SyncConfig::default();
        let server_url = self.server_url.unwrap_or(defaults.server_url);
        if server_url.is_empty() {
            return Err(ConfigError::MissingValue("server_url"));
        }
        Ok(SyncConfig {
            // Trailing slash would double up in api_url().
            server_url: server_url.trim_end_matches('/').to_string(),
            cooldown_secs: self.cooldown_secs.unwrap_or(defaults.cooldown_secs),
            readiness_poll_secs: self
                .readiness_poll_secs
                .unwrap_or(defaults.readiness_poll_secs),
            status_poll_secs: self.status_poll_secs.unwrap_or(defaults.status_poll_secs),
            status_refetch_delay_secs: self
                .status_refetch_delay_secs
                .unwrap_or(defaults.status_refetch_delay_secs),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(String),
    #[error("invalid config file: {0}")]
    Parse(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
