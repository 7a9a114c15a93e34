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
//! - `SKYFIT_CALENDAR_ID_FILE`: Path to the file holding the travel calendar id
//! - `SKYFIT_TIMEZONE`: IANA timezone for local times (e.g. `America/Chicago`)
//! - `SKYFIT_OUTBOUND_COLOR`: Calendar color id for outbound previews (optional)
//! - `SKYFIT_INBOUND_COLOR`: Calendar color id for inbound previews (optional)
//! - `SKYFIT_OAUTH_CLIENT_ID`: OAuth client id
//! - `SKYFIT_OAUTH_CLIENT_SECRET`: OAuth client secret
//! - `SKYFIT_OAUTH_REFRESH_TOKEN`: Long-lived OAuth refresh token
//! - `SKYFIT_OAUTH_TOKEN_ENDPOINT`: OAuth token endpoint (optional)
//! - `SKYFIT_SEARCH_PAYLOAD_FILE`: Path to the saved flight-search payload
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./skyfit.json` or `./skyfit.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use skyfit_domain::constants::{
    DEFAULT_INBOUND_COLOR, DEFAULT_OUTBOUND_COLOR, DEFAULT_TOKEN_ENDPOINT,
};
use skyfit_domain::{
    CalendarConfig, Config, OAuthConfig, Result, SearchConfig, SkyfitError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SkyfitError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    // Try loading from environment first
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            // Fall back to file
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `SkyfitError::Config` if required variables are missing.
pub fn load_from_env() -> Result<Config> {
    let id_file = env_var("SKYFIT_CALENDAR_ID_FILE")?;
    let timezone = env_var("SKYFIT_TIMEZONE")?;
    let outbound_color =
        env_var_or("SKYFIT_OUTBOUND_COLOR", DEFAULT_OUTBOUND_COLOR);
    let inbound_color = env_var_or("SKYFIT_INBOUND_COLOR", DEFAULT_INBOUND_COLOR);

    let client_id = env_var("SKYFIT_OAUTH_CLIENT_ID")?;
    let client_secret = env_var("SKYFIT_OAUTH_CLIENT_SECRET")?;
    let refresh_token = env_var("SKYFIT_OAUTH_REFRESH_TOKEN")?;
    let token_endpoint =
        env_var_or("SKYFIT_OAUTH_TOKEN_ENDPOINT", DEFAULT_TOKEN_ENDPOINT);

    let payload_file = env_var("SKYFIT_SEARCH_PAYLOAD_FILE")?;

    Ok(Config {
        calendar: CalendarConfig { id_file, timezone, outbound_color, inbound_color },
        oauth: OAuthConfig { client_id, client_secret, refresh_token, token_endpoint },
        search: SearchConfig { payload_file },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `SkyfitError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SkyfitError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SkyfitError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SkyfitError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Read the travel calendar id from its single-line file
///
/// The calendar id lives outside the main configuration so it can be
/// swapped per machine without touching config files. Surrounding
/// whitespace is trimmed.
///
/// # Errors
/// Returns `SkyfitError::Config` if the file is missing or empty; no
/// calendar means nothing to plan against, so this is fatal.
pub fn read_calendar_id(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SkyfitError::Config(format!("Failed to read calendar id file {}: {}", path.display(), e))
    })?;

    let id = contents.trim();
    if id.is_empty() {
        return Err(SkyfitError::Config(format!(
            "Calendar id file {} is empty",
            path.display()
        )));
    }
    Ok(id.to_string())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SkyfitError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SkyfitError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SkyfitError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SkyfitError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent levels, and
/// the executable's directory.
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
            cwd.join("skyfit.json"),
            cwd.join("skyfit.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("skyfit.json"),
                exe_dir.join("skyfit.toml"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `SkyfitError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SkyfitError::Config(format!("Missing required environment variable: {}", key)))
}

/// Get optional environment variable with a default
fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
