//! Day activity window resolution
//!
//! Reduces one calendar day's timed, non-preview events to a single
//! (earliest-start, latest-end) pair. Preview events are synthetic and would
//! otherwise poison the very window used to judge them, so they are excluded
//! unconditionally, whatever their tag.

use std::sync::Arc;

use chrono::NaiveDate;
use skyfit_domain::constants::PREVIEW_MARKER_KEY;
use skyfit_domain::{ActivityWindow, Result};
use tracing::debug;

use crate::clock::LocalClock;
use crate::ports::CalendarPort;

/// Resolves the busy window for a given calendar day.
pub struct WindowResolver {
    calendar: Arc<dyn CalendarPort>,
    calendar_id: String,
    clock: LocalClock,
}

impl WindowResolver {
    pub fn new(calendar: Arc<dyn CalendarPort>, calendar_id: String, clock: LocalClock) -> Self {
        Self { calendar, calendar_id, clock }
    }

    /// Compute the activity window for `day`.
    ///
    /// Date-only (all-day) entries and events carrying any `flight_preview`
    /// marker are ignored. The result is recomputed fresh on every call;
    /// callers must not cache it across calendar mutations.
    ///
    /// # Errors
    /// Calendar query failure propagates as
    /// `SkyfitError::CollaboratorUnavailable`; resolution is not retried
    /// here.
    pub async fn resolve(&self, day: NaiveDate) -> Result<ActivityWindow> {
        let (day_start, day_end) = self.clock.day_bounds(day)?;
        let events = self
            .calendar
            .list_events(&self.calendar_id, day_start.fixed_offset(), day_end.fixed_offset())
            .await?;

        let zone = self.clock.zone();
        let mut starts = Vec::new();
        let mut ends = Vec::new();

        for event in &events {
            if event.has_marker(PREVIEW_MARKER_KEY) {
                continue;
            }
            if let Some(start) = event.start {
                starts.push(start.with_timezone(&zone));
            }
            if let Some(end) = event.end {
                ends.push(end.with_timezone(&zone));
            }
        }

        let window = ActivityWindow {
            earliest_start: starts.into_iter().min(),
            latest_end: ends.into_iter().max(),
        };

        debug!(
            %day,
            considered = events.len(),
            earliest = ?window.earliest_start,
            latest = ?window.latest_end,
            "resolved day activity window"
        );

        Ok(window)
    }
}
