//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SLOTBOOK_DB_PATH`: Database file path
//! - `SLOTBOOK_DB_POOL_SIZE`: Connection pool size
//! - `SLOTBOOK_SYNC_ENABLED`: Whether external sync is enabled (true/false)
//! - `SLOTBOOK_SYNC_API_KEY`: API key for the external platform
//! - `SLOTBOOK_SYNC_BASE_URL`: Base URL of the external platform API
//! - `SLOTBOOK_SYNC_MAX_ATTEMPTS`: Attempts per external call
//! - `SLOTBOOK_SYNC_BASE_DELAY_SECS`: Base backoff delay in seconds
//! - `SLOTBOOK_SYNC_MAX_DELAY_SECS`: Backoff delay cap in seconds
//! - `SLOTBOOK_SYNC_REQUEST_TIMEOUT_SECS`: Per-attempt HTTP timeout
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./slotbook.json` or `./slotbook.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use slotbook_domain::{Config, DatabaseConfig, ExternalSyncConfig, Result, SlotbookError};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SlotbookError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `SLOTBOOK_DB_PATH` must be present; everything else falls back to a
/// default.
///
/// # Errors
/// Returns `SlotbookError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("SLOTBOOK_DB_PATH")?;
    let db_pool_size = env_parse("SLOTBOOK_DB_POOL_SIZE", 4)?;

    let defaults = ExternalSyncConfig::default();
    let external_sync = ExternalSyncConfig {
        enabled: env_bool("SLOTBOOK_SYNC_ENABLED", false),
        api_key: std::env::var("SLOTBOOK_SYNC_API_KEY").ok(),
        base_url: std::env::var("SLOTBOOK_SYNC_BASE_URL").unwrap_or(defaults.base_url),
        max_attempts: env_parse("SLOTBOOK_SYNC_MAX_ATTEMPTS", defaults.max_attempts)?,
        base_delay_secs: env_parse("SLOTBOOK_SYNC_BASE_DELAY_SECS", defaults.base_delay_secs)?,
        max_delay_secs: env_parse("SLOTBOOK_SYNC_MAX_DELAY_SECS", defaults.max_delay_secs)?,
        request_timeout_secs: env_parse(
            "SLOTBOOK_SYNC_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?,
    };

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        external_sync,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SlotbookError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SlotbookError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SlotbookError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SlotbookError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SlotbookError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SlotbookError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SlotbookError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("slotbook.json"),
            cwd.join("slotbook.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("slotbook.json"),
                exe_dir.join("slotbook.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SlotbookError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse a value from an environment variable, falling back to `default`
/// when the variable is not set.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| SlotbookError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
