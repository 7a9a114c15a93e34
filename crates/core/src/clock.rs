//! Wall-clock parsing and rendering in the canonical zone
//!
//! Flight payloads and calendar day boundaries use naive local times; this
//! module interprets them all in the single configured IANA zone. Mixed-zone
//! inputs are unsupported (see DESIGN.md for the origin/destination zone
//! limitation).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use skyfit_domain::constants::LOCAL_TIME_FORMAT;
use skyfit_domain::{Result, SkyfitError};

/// Converts naive local-time strings into zone-aware instants.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    zone: Tz,
}

impl LocalClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Create a clock from an IANA zone name (e.g. "America/Chicago").
    ///
    /// # Errors
    /// Returns `SkyfitError::Config` for an unknown zone name.
    pub fn from_zone_name(name: &str) -> Result<Self> {
        let zone = name
            .parse::<Tz>()
            .map_err(|_| SkyfitError::Config(format!("unknown IANA time zone: {name}")))?;
        Ok(Self { zone })
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Interpret a `"YYYY-MM-DD HH:MM"` string as wall-clock time in the
    /// canonical zone.
    ///
    /// # Errors
    /// Returns `SkyfitError::Parse` for malformed input, or for a wall-clock
    /// time that is ambiguous or nonexistent in the zone (DST transitions).
    /// No recovery is attempted; callers must not feed untrusted strings
    /// without prior validation.
    pub fn parse(&self, local: &str) -> Result<DateTime<Tz>> {
        let naive = NaiveDateTime::parse_from_str(local, LOCAL_TIME_FORMAT)
            .map_err(|e| SkyfitError::Parse(format!("invalid local time '{local}': {e}")))?;
        self.localize(naive)
    }

    /// Render an instant as a zone-qualified RFC 3339 timestamp suitable for
    /// calendar event boundaries.
    pub fn to_rfc3339(&self, instant: &DateTime<Tz>) -> String {
        instant.to_rfc3339()
    }

    /// The inclusive `[00:00, 23:59]` interval of a calendar day in the
    /// canonical zone.
    pub fn day_bounds(&self, day: NaiveDate) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
        let start = self.localize(day.and_time(NaiveTime::MIN))?;
        let end_time = NaiveTime::from_hms_opt(23, 59, 0)
            .ok_or_else(|| SkyfitError::Internal("constructing 23:59 failed".into()))?;
        let end = self.localize(day.and_time(end_time))?;
        Ok((start, end))
    }

    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
        self.zone.from_local_datetime(&naive).single().ok_or_else(|| {
            SkyfitError::Parse(format!("local time {naive} is ambiguous or nonexistent in {}", self.zone))
        })
    }
}
