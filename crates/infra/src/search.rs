//! Flight-search payload input
//!
//! The search itself runs out-of-band; this module only loads the raw JSON
//! payload it produced from disk and hands it to the core extractor.

use std::path::Path;

use serde::Deserialize;
use skyfit_core::RawSearchPayload;
use skyfit_domain::{Result, SkyfitError};
use tracing::debug;

/// A saved round-trip search: one raw payload per direction. The inbound
/// side is absent for one-way planning.
#[derive(Debug, Clone, Deserialize)]
pub struct TripPayload {
    pub outbound_raw: RawSearchPayload,
    #[serde(default)]
    pub inbound_raw: Option<RawSearchPayload>,
}

/// Accept either a saved round-trip file or a bare single search result.
/// Order matters: the wrapper is tried first because a bare payload (all
/// fields defaulted) would match anything.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PayloadFile {
    Trip(TripPayload),
    Single(RawSearchPayload),
}

/// Load a raw flight-search payload from a JSON file.
///
/// # Errors
/// Returns `SkyfitError::Config` if the file cannot be read and
/// `SkyfitError::Parse` if the contents are not valid payload JSON.
pub fn load_payload(path: impl AsRef<Path>) -> Result<RawSearchPayload> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SkyfitError::Config(format!("Failed to read search payload {}: {}", path.display(), e))
    })?;

    let payload: RawSearchPayload = serde_json::from_str(&contents)
        .map_err(|e| SkyfitError::Parse(format!("Invalid search payload JSON: {}", e)))?;

    debug!(
        path = %path.display(),
        ranked = payload.best_flights.len(),
        other = payload.other_flights.len(),
        "loaded flight-search payload"
    );
    Ok(payload)
}

/// Load a saved trip file holding one payload per direction.
///
/// A bare single search result is accepted too and treated as an
/// outbound-only trip.
///
/// # Errors
/// Same taxonomy as [`load_payload`].
pub fn load_trip_payload(path: impl AsRef<Path>) -> Result<TripPayload> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SkyfitError::Config(format!("Failed to read search payload {}: {}", path.display(), e))
    })?;

    let parsed: PayloadFile = serde_json::from_str(&contents)
        .map_err(|e| SkyfitError::Parse(format!("Invalid search payload JSON: {}", e)))?;

    let trip = match parsed {
        PayloadFile::Trip(trip) => trip,
        PayloadFile::Single(single) => TripPayload { outbound_raw: single, inbound_raw: None },
    };

    debug!(
        path = %path.display(),
        has_inbound = trip.inbound_raw.is_some(),
        "loaded trip payload"
    );
    Ok(trip)
}
