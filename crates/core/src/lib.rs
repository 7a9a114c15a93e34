//! # Skyfit Core
//!
//! Core business logic for calendar-aware flight selection:
//!
//! - [`clock`]: wall-clock parsing in the one canonical zone
//! - [`catalog`]: normalizing raw search payloads into itineraries
//! - [`window`]: deriving a day's busy window from calendar events
//! - [`filter`]: arrival/departure constraint filtering
//! - [`preview`]: keeping preview events in sync with the selection
//! - [`selection`]: cycling a cursor over a filtered list
//! - [`session`]: the interaction-step orchestrator and cleanup
//!
//! All calendar access goes through the [`ports::CalendarPort`] trait;
//! adapters live in `skyfit-infra`.

pub mod catalog;
pub mod clock;
pub mod filter;
pub mod ports;
pub mod preview;
pub mod selection;
pub mod session;
pub mod window;

pub use catalog::{extract, RawSearchPayload};
pub use clock::LocalClock;
pub use filter::{filter_by_earliest_departure, filter_by_latest_arrival};
pub use ports::{CalendarEvent, CalendarPort, EventSpan, NewCalendarEvent};
pub use preview::{ensure_trip_block, PreviewSynchronizer};
pub use selection::{CyclePolicy, SelectionCursor};
pub use session::{FilterDirection, PlannerSession, SelectionMove, StepOutcome};
pub use window::WindowResolver;
