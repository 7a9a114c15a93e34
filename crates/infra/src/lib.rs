//! # Skyfit Infra
//!
//! Infrastructure adapters for Skyfit:
//! - Google Calendar implementation of the core calendar port
//! - OAuth token provider with cached refresh
//! - Configuration loading (environment variables, config files)
//! - Raw flight-search payload input

pub mod calendar;
pub mod config;
pub mod errors;
pub mod search;

pub use calendar::auth::{RefreshingTokenProvider, StaticTokenProvider, TokenProvider};
pub use calendar::google::GoogleCalendarProvider;
pub use errors::InfraError;
pub use search::{load_payload, load_trip_payload, TripPayload};
