//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Wall-clock format used by flight-search payloads ("2026-01-22 08:30")
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// Calendar marker namespaces. Preview events carry `flight_preview=<tag>`;
// the one-time all-day trip banner carries `trip_block=yes`. The two
// namespaces must never be confused by the resolver or the synchronizer.
pub const PREVIEW_MARKER_KEY: &str = "flight_preview";
pub const TRIP_BLOCK_MARKER_KEY: &str = "trip_block";
pub const TRIP_BLOCK_MARKER_VALUE: &str = "yes";

// Default Google Calendar color ids for preview events
pub const DEFAULT_OUTBOUND_COLOR: &str = "9";
pub const DEFAULT_INBOUND_COLOR: &str = "10";
pub const TRIP_BLOCK_COLOR: &str = "5";

// Carrier fallback when the search payload omits the airline
pub const DEFAULT_CARRIER: &str = "Unknown";

// OAuth defaults
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;
