//! Preview event synchronization
//!
//! Keeps the calendar's preview events for one tag in step with the
//! currently-selected itinerary. The central invariant: at most one
//! itinerary's worth of events may carry a given tag at any time. Callers
//! clear a tag immediately before publishing to it; the clear+publish pair
//! is not atomic, so a failure in between may transiently leave zero events
//! for the tag, but never two itineraries' worth.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use skyfit_domain::constants::{
    PREVIEW_MARKER_KEY, TRIP_BLOCK_COLOR, TRIP_BLOCK_MARKER_KEY, TRIP_BLOCK_MARKER_VALUE,
};
use skyfit_domain::{Itinerary, PreviewTag, Result, SkyfitError};
use tracing::debug;

use crate::ports::{CalendarPort, EventSpan, NewCalendarEvent};

/// Publishes and clears tagged preview events.
pub struct PreviewSynchronizer {
    calendar: Arc<dyn CalendarPort>,
    calendar_id: String,
}

impl PreviewSynchronizer {
    pub fn new(calendar: Arc<dyn CalendarPort>, calendar_id: String) -> Self {
        Self { calendar, calendar_id }
    }

    /// Delete every event currently carrying `flight_preview == tag`.
    ///
    /// Safe to call when none exist; returns the number deleted. Events of
    /// other tags are untouched.
    pub async fn clear(&self, tag: &PreviewTag) -> Result<usize> {
        let stale = self
            .calendar
            .list_events_with_marker(&self.calendar_id, PREVIEW_MARKER_KEY, tag.as_str())
            .await?;

        for event in &stale {
            self.calendar.delete_event(&self.calendar_id, &event.id).await?;
        }

        debug!(%tag, deleted = stale.len(), "cleared preview events");
        Ok(stale.len())
    }

    /// Create one preview event per segment of `itinerary`, tagged with
    /// `tag` and colored `color_id`. Returns the created event ids.
    ///
    /// # Errors
    /// Returns `SkyfitError::InvalidInput` if events already carry the tag:
    /// publishing without an immediately preceding [`clear`](Self::clear) is
    /// a programming error and fails loudly rather than stacking previews.
    /// Backend failures surface as `CollaboratorUnavailable`; callers may
    /// retry the whole clear+publish pair.
    pub async fn publish(
        &self,
        itinerary: &Itinerary,
        tag: &PreviewTag,
        color_id: &str,
    ) -> Result<Vec<String>> {
        let existing = self
            .calendar
            .list_events_with_marker(&self.calendar_id, PREVIEW_MARKER_KEY, tag.as_str())
            .await?;
        if !existing.is_empty() {
            return Err(SkyfitError::InvalidInput(format!(
                "publish called for tag '{tag}' while {} preview event(s) still exist; \
                 clear the tag first",
                existing.len()
            )));
        }

        let mut created = Vec::with_capacity(itinerary.segments().len());
        for segment in itinerary.segments() {
            let mut markers = HashMap::new();
            markers.insert(PREVIEW_MARKER_KEY.to_string(), tag.as_str().to_string());

            let event = NewCalendarEvent {
                summary: format!(
                    "{} → {} (${}, {})",
                    segment.origin,
                    segment.destination,
                    itinerary.price(),
                    segment.carrier
                ),
                span: EventSpan::Timed {
                    start: segment.departure.fixed_offset(),
                    end: segment.arrival.fixed_offset(),
                },
                color_id: Some(color_id.to_string()),
                markers,
            };

            let id = self.calendar.insert_event(&self.calendar_id, event).await?;
            created.push(id);
        }

        debug!(%tag, events = created.len(), "published preview events");
        Ok(created)
    }
}

/// Create the one-time all-day trip banner if it does not exist yet.
///
/// The banner spans `[depart_date, return_date + 1 day)` and carries the
/// `trip_block=yes` marker, a separate namespace from preview markers, so
/// neither the resolver nor the synchronizer ever confuses the two.
pub async fn ensure_trip_block(
    calendar: &dyn CalendarPort,
    calendar_id: &str,
    trip_name: &str,
    depart_date: NaiveDate,
    return_date: NaiveDate,
) -> Result<bool> {
    let existing = calendar
        .list_events_with_marker(calendar_id, TRIP_BLOCK_MARKER_KEY, TRIP_BLOCK_MARKER_VALUE)
        .await?;
    if !existing.is_empty() {
        debug!(trip_name, "trip block already present");
        return Ok(false);
    }

    let mut markers = HashMap::new();
    markers.insert(TRIP_BLOCK_MARKER_KEY.to_string(), TRIP_BLOCK_MARKER_VALUE.to_string());

    let event = NewCalendarEvent {
        summary: trip_name.to_string(),
        span: EventSpan::AllDay {
            start: depart_date,
            end: return_date.succ_opt().ok_or_else(|| {
                SkyfitError::InvalidInput(format!("return date {return_date} has no successor"))
            })?,
        },
        color_id: Some(TRIP_BLOCK_COLOR.to_string()),
        markers,
    };

    calendar.insert_event(calendar_id, event).await?;
    debug!(trip_name, "created trip block banner");
    Ok(true)
}
