//! Error types used throughout the application

use thiserror::Error;

/// Main error type for Skyfit
#[derive(Error, Debug)]
pub enum SkyfitError {
    /// Malformed time string or a record missing a required field. Localized
    /// to one record during extraction; never aborts a whole batch there.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The calendar backend is unreachable or rejected a call. Propagated to
    /// the caller as-is; core components never retry internally.
    #[error("Calendar unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Programming-error guard (e.g. publishing previews without clearing
    /// first) or invalid construction input (empty itinerary).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Skyfit operations
pub type Result<T> = std::result::Result<T, SkyfitError>;
