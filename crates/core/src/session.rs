//! Interaction-step orchestration
//!
//! Glues the resolver, filter, cursor and synchronizer into one
//! re-evaluated-per-interaction step. Selection state is an explicit session
//! record (one slot per tag) rather than module globals, so independent
//! outbound/inbound sessions coexist safely.
//!
//! The calendar is shared and may be edited concurrently through other
//! clients, so every step re-resolves the window and re-filters; nothing is
//! cached between interactions.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use skyfit_domain::{Itinerary, PreviewTag, Result, SkyfitError};
use tracing::{error, warn};

use crate::filter::{filter_by_earliest_departure, filter_by_latest_arrival};
use crate::preview::PreviewSynchronizer;
use crate::selection::{CyclePolicy, SelectionCursor};
use crate::window::WindowResolver;

/// Which side of the busy window constrains a slot's flights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDirection {
    /// Arrive no later than the day's earliest activity start (outbound leg)
    ArriveBefore,
    /// Depart no earlier than the day's latest activity end (inbound leg)
    DepartAfter,
}

/// User movement applied during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMove {
    Stay,
    Next,
    Prev,
}

/// Result of one interaction step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// A valid option is selected and its previews are on the calendar
    Selected { itinerary: Itinerary, index: usize, total: usize },
    /// The filter produced an empty list. A normal, expected outcome: the
    /// tag's previews have been cleared and the caller should present a
    /// "no valid options" state.
    NoValidOptions,
}

/// One tag's selection state
struct SelectionSlot {
    tag: PreviewTag,
    direction: FilterDirection,
    color_id: String,
    itineraries: Vec<Itinerary>,
    cursor: SelectionCursor,
    travel_day: Option<NaiveDate>,
}

/// Session state for one planning interaction loop.
///
/// Tracks every tag that was ever published so [`cleanup`](Self::cleanup)
/// can remove all previews on exit, on both normal and error-triggered
/// exit paths.
pub struct PlannerSession {
    resolver: WindowResolver,
    synchronizer: PreviewSynchronizer,
    slots: Vec<SelectionSlot>,
    published: BTreeSet<PreviewTag>,
}

impl PlannerSession {
    pub fn new(resolver: WindowResolver, synchronizer: PreviewSynchronizer) -> Self {
        Self { resolver, synchronizer, slots: Vec::new(), published: BTreeSet::new() }
    }

    /// Register a selection slot for `tag`.
    ///
    /// The slot's travel day is derived from its first itinerary: the
    /// arrival date for [`FilterDirection::ArriveBefore`] slots, the
    /// departure date for [`FilterDirection::DepartAfter`] slots. An empty
    /// list leaves the day unset and the slot permanently unconstrained.
    pub fn add_slot(
        &mut self,
        tag: PreviewTag,
        direction: FilterDirection,
        color_id: impl Into<String>,
        itineraries: Vec<Itinerary>,
        policy: CyclePolicy,
    ) -> Result<()> {
        if self.slots.iter().any(|s| s.tag == tag) {
            return Err(SkyfitError::InvalidInput(format!("slot '{tag}' already registered")));
        }

        let travel_day = itineraries.first().map(|first| match direction {
            FilterDirection::ArriveBefore => first.arrival().date_naive(),
            FilterDirection::DepartAfter => first.departure().date_naive(),
        });
        if travel_day.is_none() {
            warn!(%tag, "slot registered with no itineraries");
        }

        let cursor = SelectionCursor::new(itineraries.len(), policy);
        self.slots.push(SelectionSlot {
            tag,
            direction,
            color_id: color_id.into(),
            itineraries,
            cursor,
            travel_day,
        });
        Ok(())
    }

    /// Run one interaction step for `tag`: re-resolve the window, re-filter,
    /// move the cursor, and replace the tag's previews with the selected
    /// itinerary.
    ///
    /// # Errors
    /// Unknown tags are `SkyfitError::InvalidInput`; calendar failures
    /// propagate as `CollaboratorUnavailable` (the caller decides whether to
    /// retry the step).
    pub async fn step(&mut self, tag: &PreviewTag, movement: SelectionMove) -> Result<StepOutcome> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| &s.tag == tag)
            .ok_or_else(|| SkyfitError::InvalidInput(format!("unknown selection slot: {tag}")))?;

        // Fresh window every step; the calendar may have changed under us
        let window = match slot.travel_day {
            Some(day) => self.resolver.resolve(day).await?,
            None => skyfit_domain::ActivityWindow::unconstrained(),
        };

        let valid = match slot.direction {
            FilterDirection::ArriveBefore => {
                filter_by_latest_arrival(&slot.itineraries, window.earliest_start)
            }
            FilterDirection::DepartAfter => {
                filter_by_earliest_departure(&slot.itineraries, window.latest_end)
            }
        };

        slot.cursor.reindex(valid.len());
        match movement {
            SelectionMove::Stay => {}
            SelectionMove::Next => slot.cursor.advance(),
            SelectionMove::Prev => slot.cursor.retreat(),
        }

        let Some(index) = slot.cursor.current() else {
            // Nothing fits the schedule; make sure no stale preview lingers
            self.synchronizer.clear(tag).await?;
            return Ok(StepOutcome::NoValidOptions);
        };

        let itinerary = valid[index].clone();
        self.synchronizer.clear(tag).await?;
        self.synchronizer.publish(&itinerary, tag, &slot.color_id).await?;
        self.published.insert(tag.clone());

        Ok(StepOutcome::Selected { itinerary, index, total: valid.len() })
    }

    /// Clear every tag this session ever published.
    ///
    /// Best-effort across tags: a failing clear is logged and the remaining
    /// tags are still attempted; the first error is returned afterwards.
    pub async fn cleanup(&mut self) -> Result<()> {
        let mut first_failure = None;
        for tag in &self.published {
            if let Err(err) = self.synchronizer.clear(tag).await {
                error!(%tag, error = %err, "failed to clear preview events during cleanup");
                first_failure.get_or_insert(err);
            }
        }
        match first_failure {
            None => {
                self.published.clear();
                Ok(())
            }
            Some(err) => Err(err),
        }
    }

    /// Tags with previews published during this session.
    pub fn published_tags(&self) -> impl Iterator<Item = &PreviewTag> {
        self.published.iter()
    }
}
