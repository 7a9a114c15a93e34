//! Configuration structures
//!
//! Deserialized from environment variables or a config file by the infra
//! loader. The calendar identifier itself lives in a separate single-line
//! file (`calendar.id_file`), read once at startup.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INBOUND_COLOR, DEFAULT_OUTBOUND_COLOR, DEFAULT_TOKEN_ENDPOINT,
};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub oauth: OAuthConfig,
    pub search: SearchConfig,
}

/// Calendar collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Path to the single-line file holding the target calendar id.
    /// Absence of that file is a fatal configuration error.
    pub id_file: String,
    /// The one fixed IANA zone all naive flight and calendar times are
    /// interpreted in (e.g. "America/Chicago").
    pub timezone: String,
    #[serde(default = "default_outbound_color")]
    pub outbound_color: String,
    #[serde(default = "default_inbound_color")]
    pub inbound_color: String,
}

/// OAuth credentials for the calendar provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
}

/// Flight-search payload input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Path to the already-fetched raw search-result JSON. The search HTTP
    /// call itself is not performed by this system.
    pub payload_file: String,
}

fn default_outbound_color() -> String {
    DEFAULT_OUTBOUND_COLOR.to_string()
}

fn default_inbound_color() -> String {
    DEFAULT_INBOUND_COLOR.to_string()
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}
