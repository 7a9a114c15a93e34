//! Google Calendar implementation of the calendar port

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use skyfit_core::ports::{CalendarEvent, CalendarPort, EventSpan, NewCalendarEvent};
use skyfit_domain::{Result, SkyfitError};
use tracing::{debug, warn};

use super::auth::TokenProvider;
use crate::errors::InfraError;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar provider
pub struct GoogleCalendarProvider {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleCalendarProvider {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self { client: Client::new(), base_url: GOOGLE_CALENDAR_API_BASE.to_string(), tokens }
    }

    /// Point the provider at a different API base (primarily for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn list(
        &self,
        calendar_id: &str,
        query_params: &[(&str, String)],
    ) -> Result<Vec<CalendarEvent>> {
        let access_token = self.tokens.access_token().await?;
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(query_params)
            .send()
            .await
            .map_err(InfraError::from)?;
        let response = check_status(response, "event list").await?;

        let listed: GoogleEventsResponse =
            response.json().await.map_err(InfraError::from)?;

        Ok(listed.items.into_iter().map(into_port_event).collect())
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendarProvider {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>> {
        debug!(calendar_id, "listing events in range");
        self.list(
            calendar_id,
            &[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
            ],
        )
        .await
    }

    async fn list_events_with_marker(
        &self,
        calendar_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<CalendarEvent>> {
        debug!(calendar_id, key, value, "listing events by private extended property");
        self.list(calendar_id, &[("privateExtendedProperty", format!("{key}={value}"))]).await
    }

    async fn insert_event(&self, calendar_id: &str, event: NewCalendarEvent) -> Result<String> {
        let access_token = self.tokens.access_token().await?;
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);

        let body = InsertEventBody::from(event);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(InfraError::from)?;
        let response = check_status(response, "event insert").await?;

        let created: CreatedEvent = response.json().await.map_err(InfraError::from)?;
        debug!(calendar_id, event_id = %created.id, "inserted calendar event");
        Ok(created.id)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let access_token = self.tokens.access_token().await?;
        let url = format!("{}/calendars/{}/events/{}", self.base_url, calendar_id, event_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        // Already gone counts as deleted
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            warn!(calendar_id, event_id, "event already removed from calendar");
            return Ok(());
        }
        check_status(response, "event delete").await?;
        Ok(())
    }
}

async fn check_status(response: Response, operation: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
    Err(SkyfitError::CollaboratorUnavailable(format!(
        "google {operation} rejected ({status}): {body}"
    )))
}

fn into_port_event(event: GoogleEvent) -> CalendarEvent {
    CalendarEvent {
        id: event.id,
        summary: event.summary.filter(|s| !s.trim().is_empty()),
        start: event.start.and_then(|b| b.date_time),
        end: event.end.and_then(|b| b.date_time),
        markers: event
            .extended_properties
            .and_then(|p| p.private)
            .unwrap_or_default(),
    }
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    start: Option<EventBoundary>,
    end: Option<EventBoundary>,
    #[serde(rename = "extendedProperties")]
    extended_properties: Option<ExtendedProperties>,
}

/// Either a timed `dateTime` or a date-only boundary; date-only events are
/// surfaced with `None` instants so the resolver can discard them.
#[derive(Debug, Default, Serialize, Deserialize)]
struct EventBoundary {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExtendedProperties {
    private: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

#[derive(Debug, Serialize)]
struct InsertEventBody {
    summary: String,
    start: EventBoundary,
    end: EventBoundary,
    #[serde(rename = "colorId", skip_serializing_if = "Option::is_none")]
    color_id: Option<String>,
    #[serde(rename = "extendedProperties")]
    extended_properties: ExtendedProperties,
}

impl From<NewCalendarEvent> for InsertEventBody {
    fn from(event: NewCalendarEvent) -> Self {
        let (start, end) = match event.span {
            EventSpan::Timed { start, end } => (
                EventBoundary { date_time: Some(start), date: None },
                EventBoundary { date_time: Some(end), date: None },
            ),
            EventSpan::AllDay { start, end } => (
                EventBoundary { date_time: None, date: Some(start.format("%Y-%m-%d").to_string()) },
                EventBoundary { date_time: None, date: Some(end.format("%Y-%m-%d").to_string()) },
            ),
        };
        Self {
            summary: event.summary,
            start,
            end,
            color_id: event.color_id,
            extended_properties: ExtendedProperties { private: Some(event.markers) },
        }
    }
}
