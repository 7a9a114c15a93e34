//! Calendar collaborator port interfaces
//!
//! The calendar is an external, shared mutable resource; everything the core
//! needs from it goes through [`CalendarPort`]. The production adapter lives
//! in `skyfit-infra`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use skyfit_domain::Result;

/// Calendar event as observed through the port (simplified representation)
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    /// Timed start instant; `None` for date-only (all-day) boundaries
    pub start: Option<DateTime<FixedOffset>>,
    /// Timed end instant; `None` for date-only (all-day) boundaries
    pub end: Option<DateTime<FixedOffset>>,
    /// Private extended properties carried by the event
    pub markers: HashMap<String, String>,
}

impl CalendarEvent {
    /// Whether the event carries a marker with the given key, any value.
    pub fn has_marker(&self, key: &str) -> bool {
        self.markers.contains_key(key)
    }
}

/// Boundaries of a new calendar event
#[derive(Debug, Clone)]
pub enum EventSpan {
    /// Timed event with instant boundaries
    Timed { start: DateTime<FixedOffset>, end: DateTime<FixedOffset> },
    /// All-day event spanning `[start, end)` in whole dates
    AllDay { start: NaiveDate, end: NaiveDate },
}

/// New calendar event to insert
#[derive(Debug, Clone)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub span: EventSpan,
    pub color_id: Option<String>,
    pub markers: HashMap<String, String>,
}

/// Trait for calendar collaborator operations
///
/// Every call is one blocking round trip against the backend. Failures map
/// to `SkyfitError::CollaboratorUnavailable`; callers decide whether to
/// retry.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// List events whose time range intersects `[time_min, time_max]`
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>>;

    /// List events carrying the private extended property `key = value`
    async fn list_events_with_marker(
        &self,
        calendar_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<CalendarEvent>>;

    /// Insert an event, returning the created event id
    async fn insert_event(&self, calendar_id: &str, event: NewCalendarEvent) -> Result<String>;

    /// Delete an event by id. Deleting an already-removed event is not an
    /// error.
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;
}
