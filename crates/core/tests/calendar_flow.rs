//! Integration tests for the resolver, synchronizer and session against an
//! in-memory calendar fake.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chrono_tz::America::Chicago;
use chrono_tz::Tz;
use skyfit_core::{
    ensure_trip_block, CalendarEvent, CalendarPort, CyclePolicy, EventSpan, FilterDirection,
    LocalClock, NewCalendarEvent, PlannerSession, PreviewSynchronizer, SelectionMove, StepOutcome,
    WindowResolver,
};
use skyfit_domain::constants::PREVIEW_MARKER_KEY;
use skyfit_domain::{Itinerary, PreviewTag, Result, Segment, SkyfitError};

const CAL_ID: &str = "travel-calendar";

/// In-memory stand-in for the calendar collaborator.
#[derive(Default)]
struct FakeCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    next_id: AtomicUsize,
}

impl FakeCalendar {
    fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self { events: Mutex::new(events), next_id: AtomicUsize::new(1000) }
    }

    fn snapshot(&self) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().clone()
    }

    fn tagged(&self, tag: &str) -> Vec<CalendarEvent> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.markers.get(PREVIEW_MARKER_KEY).map(String::as_str) == Some(tag))
            .collect()
    }
}

#[async_trait]
impl CalendarPort for FakeCalendar {
    async fn list_events(
        &self,
        _calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|e| match (e.start, e.end) {
                (Some(start), Some(end)) => start <= time_max && end >= time_min,
                // Date-only events are always returned by the backend; the
                // resolver is the one that must discard them
                _ => true,
            })
            .collect())
    }

    async fn list_events_with_marker(
        &self,
        _calendar_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<CalendarEvent>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|e| e.markers.get(key).map(String::as_str) == Some(value))
            .collect())
    }

    async fn insert_event(&self, _calendar_id: &str, event: NewCalendarEvent) -> Result<String> {
        let id = format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let (start, end) = match event.span {
            EventSpan::Timed { start, end } => (Some(start), Some(end)),
            EventSpan::AllDay { .. } => (None, None),
        };
        self.events.lock().unwrap().push(CalendarEvent {
            id: id.clone(),
            summary: Some(event.summary),
            start,
            end,
            markers: event.markers,
        });
        Ok(id)
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<()> {
        self.events.lock().unwrap().retain(|e| e.id != event_id);
        Ok(())
    }
}

fn at(day: u32, hour: u32, min: u32) -> DateTime<Tz> {
    Chicago.with_ymd_and_hms(2026, 1, day, hour, min, 0).unwrap()
}

fn busy_event(id: &str, start: DateTime<Tz>, end: DateTime<Tz>) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some("Meeting".to_string()),
        start: Some(start.fixed_offset()),
        end: Some(end.fixed_offset()),
        markers: HashMap::new(),
    }
}

fn preview_event(id: &str, tag: &str, start: DateTime<Tz>, end: DateTime<Tz>) -> CalendarEvent {
    let mut markers = HashMap::new();
    markers.insert(PREVIEW_MARKER_KEY.to_string(), tag.to_string());
    CalendarEvent {
        id: id.to_string(),
        summary: Some("IAH → GUA".to_string()),
        start: Some(start.fixed_offset()),
        end: Some(end.fixed_offset()),
        markers,
    }
}

fn all_day_event(id: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some("Trip".to_string()),
        start: None,
        end: None,
        markers: HashMap::new(),
    }
}

fn nonstop(price: u32, dep: DateTime<Tz>, arr: DateTime<Tz>) -> Itinerary {
    Itinerary::new(
        vec![Segment {
            origin: "IAH".into(),
            departure: dep,
            destination: "GUA".into(),
            arrival: arr,
            carrier: "United".into(),
        }],
        price,
    )
    .unwrap()
}

fn two_leg(price: u32) -> Itinerary {
    Itinerary::new(
        vec![
            Segment {
                origin: "IAH".into(),
                departure: at(22, 5, 0),
                destination: "MEX".into(),
                arrival: at(22, 6, 30),
                carrier: "United".into(),
            },
            Segment {
                origin: "MEX".into(),
                departure: at(22, 7, 15),
                destination: "GUA".into(),
                arrival: at(22, 8, 30),
                carrier: "Avianca".into(),
            },
        ],
        price,
    )
    .unwrap()
}

fn clock() -> LocalClock {
    LocalClock::from_zone_name("America/Chicago").unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 22).unwrap()
}

#[tokio::test]
async fn clear_then_publish_yields_one_event_per_segment() {
    let calendar = Arc::new(FakeCalendar::default());
    let sync = PreviewSynchronizer::new(calendar.clone(), CAL_ID.to_string());
    let tag = PreviewTag::new("outbound").unwrap();
    let itinerary = two_leg(412);

    sync.clear(&tag).await.unwrap();
    let created = sync.publish(&itinerary, &tag, "9").await.unwrap();
    assert_eq!(created.len(), 2);

    let tagged = calendar.tagged("outbound");
    assert_eq!(tagged.len(), itinerary.segments().len());
    for (event, segment) in tagged.iter().zip(itinerary.segments()) {
        assert_eq!(event.start, Some(segment.departure.fixed_offset()));
        assert_eq!(event.end, Some(segment.arrival.fixed_offset()));
    }
    assert_eq!(
        tagged[0].summary.as_deref(),
        Some("IAH → MEX ($412, United)"),
        "summary encodes origin, destination, price and carrier"
    );
}

#[tokio::test]
async fn clear_removes_only_the_given_tag() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        preview_event("out-1", "outbound", at(22, 6, 0), at(22, 8, 30)),
        preview_event("in-1", "inbound", at(25, 18, 0), at(25, 20, 30)),
        busy_event("mtg-1", at(22, 9, 0), at(22, 17, 0)),
    ]));
    let sync = PreviewSynchronizer::new(calendar.clone(), CAL_ID.to_string());

    let deleted = sync.clear(&PreviewTag::new("outbound").unwrap()).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(calendar.tagged("outbound").is_empty());
    assert_eq!(calendar.tagged("inbound").len(), 1, "other tags are untouched");
    assert_eq!(calendar.snapshot().len(), 2);
}

#[tokio::test]
async fn clear_of_absent_tag_is_a_noop() {
    let calendar = Arc::new(FakeCalendar::default());
    let sync = PreviewSynchronizer::new(calendar, CAL_ID.to_string());

    let deleted = sync.clear(&PreviewTag::new("temp").unwrap()).await.unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn publish_without_clear_fails_loudly() {
    let calendar = Arc::new(FakeCalendar::default());
    let sync = PreviewSynchronizer::new(calendar, CAL_ID.to_string());
    let tag = PreviewTag::new("outbound").unwrap();
    let itinerary = nonstop(300, at(22, 6, 0), at(22, 8, 30));

    sync.publish(&itinerary, &tag, "9").await.unwrap();
    let err = sync.publish(&itinerary, &tag, "9").await.unwrap_err();
    assert!(matches!(err, SkyfitError::InvalidInput(_)));
}

#[tokio::test]
async fn resolver_ignores_preview_events_of_any_tag() {
    // The preview spans the whole day; if it leaked into the window it would
    // dominate both bounds
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        busy_event("mtg-1", at(22, 9, 0), at(22, 17, 0)),
        preview_event("out-1", "outbound", at(22, 1, 0), at(22, 23, 0)),
        preview_event("tmp-1", "temp", at(22, 0, 30), at(22, 23, 30)),
    ]));
    let resolver = WindowResolver::new(calendar, CAL_ID.to_string(), clock());

    let window = resolver.resolve(day()).await.unwrap();
    assert_eq!(window.earliest_start, Some(at(22, 9, 0)));
    assert_eq!(window.latest_end, Some(at(22, 17, 0)));
}

#[tokio::test]
async fn resolver_ignores_date_only_entries() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        all_day_event("banner"),
        busy_event("mtg-1", at(22, 10, 0), at(22, 11, 0)),
    ]));
    let resolver = WindowResolver::new(calendar, CAL_ID.to_string(), clock());

    let window = resolver.resolve(day()).await.unwrap();
    assert_eq!(window.earliest_start, Some(at(22, 10, 0)));
    assert_eq!(window.latest_end, Some(at(22, 11, 0)));
}

#[tokio::test]
async fn resolver_returns_unconstrained_window_for_empty_day() {
    let calendar = Arc::new(FakeCalendar::default());
    let resolver = WindowResolver::new(calendar, CAL_ID.to_string(), clock());

    let window = resolver.resolve(day()).await.unwrap();
    assert!(window.earliest_start.is_none());
    assert!(window.latest_end.is_none());
}

#[tokio::test]
async fn trip_block_is_created_once() {
    let calendar = Arc::new(FakeCalendar::default());
    let depart = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();
    let ret = NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();

    let created =
        ensure_trip_block(calendar.as_ref(), CAL_ID, "Texas → Guatemala", depart, ret)
            .await
            .unwrap();
    assert!(created);

    let created_again =
        ensure_trip_block(calendar.as_ref(), CAL_ID, "Texas → Guatemala", depart, ret)
            .await
            .unwrap();
    assert!(!created_again, "second call finds the existing banner");
    assert_eq!(calendar.snapshot().len(), 1);
}

fn session_over(calendar: &Arc<FakeCalendar>) -> PlannerSession {
    let resolver =
        WindowResolver::new(calendar.clone(), CAL_ID.to_string(), clock());
    let sync = PreviewSynchronizer::new(calendar.clone(), CAL_ID.to_string());
    PlannerSession::new(resolver, sync)
}

#[tokio::test]
async fn step_selects_only_flights_that_fit_the_schedule() {
    // Activity 09:00-17:00 on the travel day; one arrival fits, one does not
    let calendar =
        Arc::new(FakeCalendar::with_events(vec![busy_event("mtg", at(22, 9, 0), at(22, 17, 0))]));
    let mut session = session_over(&calendar);

    let tag = PreviewTag::new("outbound").unwrap();
    session
        .add_slot(
            tag.clone(),
            FilterDirection::ArriveBefore,
            "9",
            vec![nonstop(1, at(22, 6, 0), at(22, 8, 30)), nonstop(2, at(22, 15, 30), at(22, 18, 0))],
            CyclePolicy::Wraparound,
        )
        .unwrap();

    match session.step(&tag, SelectionMove::Stay).await.unwrap() {
        StepOutcome::Selected { itinerary, index, total } => {
            assert_eq!(itinerary.price(), 1);
            assert_eq!(index, 0);
            assert_eq!(total, 1);
        }
        StepOutcome::NoValidOptions => panic!("expected a valid selection"),
    }
    assert_eq!(calendar.tagged("outbound").len(), 1);

    // Cycling over a single valid option wraps back onto it, replacing the
    // previews rather than stacking them
    match session.step(&tag, SelectionMove::Next).await.unwrap() {
        StepOutcome::Selected { itinerary, .. } => assert_eq!(itinerary.price(), 1),
        StepOutcome::NoValidOptions => panic!("expected a valid selection"),
    }
    assert_eq!(calendar.tagged("outbound").len(), 1);
}

#[tokio::test]
async fn step_reports_no_valid_options_and_clears_previews() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        busy_event("mtg", at(22, 7, 0), at(22, 17, 0)),
        preview_event("stale", "outbound", at(22, 6, 0), at(22, 8, 30)),
    ]));
    let mut session = session_over(&calendar);

    let tag = PreviewTag::new("outbound").unwrap();
    session
        .add_slot(
            tag.clone(),
            FilterDirection::ArriveBefore,
            "9",
            vec![nonstop(1, at(22, 6, 0), at(22, 8, 30))],
            CyclePolicy::Reclamp,
        )
        .unwrap();

    let outcome = session.step(&tag, SelectionMove::Stay).await.unwrap();
    assert!(matches!(outcome, StepOutcome::NoValidOptions));
    assert!(calendar.tagged("outbound").is_empty(), "stale previews are removed");
}

#[tokio::test]
async fn departure_slot_uses_latest_end_boundary() {
    let calendar =
        Arc::new(FakeCalendar::with_events(vec![busy_event("mtg", at(25, 9, 0), at(25, 17, 0))]));
    let mut session = session_over(&calendar);

    let tag = PreviewTag::new("inbound").unwrap();
    session
        .add_slot(
            tag.clone(),
            FilterDirection::DepartAfter,
            "10",
            vec![
                nonstop(1, at(25, 12, 0), at(25, 15, 0)),
                nonstop(2, at(25, 18, 0), at(25, 21, 0)),
            ],
            CyclePolicy::Wraparound,
        )
        .unwrap();

    match session.step(&tag, SelectionMove::Stay).await.unwrap() {
        StepOutcome::Selected { itinerary, .. } => assert_eq!(itinerary.price(), 2),
        StepOutcome::NoValidOptions => panic!("expected a valid selection"),
    }
}

#[tokio::test]
async fn cleanup_clears_every_published_tag() {
    let calendar = Arc::new(FakeCalendar::default());
    let mut session = session_over(&calendar);

    let outbound = PreviewTag::new("outbound").unwrap();
    let inbound = PreviewTag::new("inbound").unwrap();
    session
        .add_slot(
            outbound.clone(),
            FilterDirection::ArriveBefore,
            "9",
            vec![nonstop(1, at(22, 6, 0), at(22, 8, 30))],
            CyclePolicy::Wraparound,
        )
        .unwrap();
    session
        .add_slot(
            inbound.clone(),
            FilterDirection::DepartAfter,
            "10",
            vec![nonstop(2, at(25, 18, 0), at(25, 21, 0))],
            CyclePolicy::Wraparound,
        )
        .unwrap();

    session.step(&outbound, SelectionMove::Stay).await.unwrap();
    session.step(&inbound, SelectionMove::Stay).await.unwrap();
    assert_eq!(calendar.snapshot().len(), 2);
    assert_eq!(session.published_tags().count(), 2);

    session.cleanup().await.unwrap();
    assert!(calendar.snapshot().is_empty(), "no orphaned previews after exit");
    assert_eq!(session.published_tags().count(), 0);
}

#[tokio::test]
async fn unknown_slot_is_rejected() {
    let calendar = Arc::new(FakeCalendar::default());
    let mut session = session_over(&calendar);

    let err =
        session.step(&PreviewTag::new("ghost").unwrap(), SelectionMove::Stay).await.unwrap_err();
    assert!(matches!(err, SkyfitError::InvalidInput(_)));
}
