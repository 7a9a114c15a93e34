//! Common data types used throughout the application

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::errors::{Result, SkyfitError};

/// One non-stop flight leg.
///
/// Instants are zone-aware in the single canonical zone; the system does not
/// support mixed-zone inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub origin: String,
    pub departure: DateTime<Tz>,
    pub destination: String,
    pub arrival: DateTime<Tz>,
    pub carrier: String,
}

/// One priced, bookable option: a non-empty, chronologically ordered
/// sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    segments: Vec<Segment>,
    price: u32,
}

impl Itinerary {
    /// Create an itinerary, validating the segment sequence.
    ///
    /// # Errors
    /// Returns `SkyfitError::InvalidInput` if the segment list is empty, a
    /// segment arrives before it departs, or segments are out of
    /// chronological order.
    pub fn new(segments: Vec<Segment>, price: u32) -> Result<Self> {
        if segments.is_empty() {
            return Err(SkyfitError::InvalidInput("itinerary has no segments".into()));
        }
        for seg in &segments {
            if seg.arrival < seg.departure {
                return Err(SkyfitError::InvalidInput(format!(
                    "segment {} -> {} arrives before it departs",
                    seg.origin, seg.destination
                )));
            }
        }
        for pair in segments.windows(2) {
            if pair[1].departure < pair[0].arrival {
                return Err(SkyfitError::InvalidInput(format!(
                    "segment {} -> {} departs before the previous leg arrives",
                    pair[1].origin, pair[1].destination
                )));
            }
        }
        Ok(Self { segments, price })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn price(&self) -> u32 {
        self.price
    }

    /// Departure instant of the whole itinerary (first segment).
    pub fn departure(&self) -> DateTime<Tz> {
        // Non-emptiness is a construction invariant
        self.segments[0].departure
    }

    /// Arrival instant of the whole itinerary (last segment).
    pub fn arrival(&self) -> DateTime<Tz> {
        self.segments[self.segments.len() - 1].arrival
    }

    pub fn origin(&self) -> &str {
        &self.segments[0].origin
    }

    pub fn destination(&self) -> &str {
        &self.segments[self.segments.len() - 1].destination
    }
}

/// Busy window derived from one calendar day's non-preview events.
///
/// `None` on either side means no constraining activity was found there; the
/// constraint filters treat an absent bound as "admit everything". Windows
/// are recomputed fresh per query and must never be cached across calendar
/// mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityWindow {
    pub earliest_start: Option<DateTime<Tz>>,
    pub latest_end: Option<DateTime<Tz>>,
}

impl ActivityWindow {
    /// Window for a day with no constraining activity at all.
    pub fn unconstrained() -> Self {
        Self::default()
    }
}

/// Logical selection slot identifier ("outbound", "inbound", "temp").
///
/// Stored on preview events as the value of the `flight_preview` marker.
/// Multiple tags coexist on the same calendar without interfering with each
/// other's filtering or clearing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreviewTag(String);

impl PreviewTag {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(SkyfitError::InvalidInput("preview tag must not be empty".into()));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
