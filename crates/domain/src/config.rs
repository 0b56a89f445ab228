//! Application configuration structures
//!
//! Loaded by the infra config loader from environment variables or a
//! `config.json`/`config.toml` file.

use serde::{Deserialize, Serialize};

use crate::constants::{
    SYNC_BASE_DELAY_SECS, SYNC_MAX_ATTEMPTS, SYNC_MAX_DELAY_SECS, SYNC_REQUEST_TIMEOUT_SECS,
};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub external_sync: ExternalSyncConfig,
}

/// Local database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// External booking-platform sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSyncConfig {
    /// Whether external sync is attempted at all
    #[serde(default)]
    pub enabled: bool,
    /// API key for the external platform; required when enabled
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the external platform API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum attempts per external call (initial call + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff, in seconds
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,
    /// Cap on the backoff delay, in seconds
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
    /// Per-attempt HTTP timeout, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ExternalSyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: default_base_url(),
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
            max_delay_secs: default_max_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_base_url() -> String {
    "https://api.cal.com/v1".to_string()
}

fn default_max_attempts() -> u32 {
    SYNC_MAX_ATTEMPTS
}

fn default_base_delay() -> u64 {
    SYNC_BASE_DELAY_SECS
}

fn default_max_delay() -> u64 {
    SYNC_MAX_DELAY_SECS
}

fn default_request_timeout() -> u64 {
    SYNC_REQUEST_TIMEOUT_SECS
}
