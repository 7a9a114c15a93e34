//! Calendar collaborator adapters
//!
//! Implements the core [`CalendarPort`](skyfit_core::CalendarPort) against
//! the Google Calendar v3 REST API, with OAuth token acquisition behind the
//! [`auth::TokenProvider`] interface.

pub mod auth;
pub mod google;

pub use auth::{RefreshingTokenProvider, StaticTokenProvider, TokenProvider};
pub use google::GoogleCalendarProvider;
