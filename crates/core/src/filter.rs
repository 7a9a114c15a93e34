//! Constraint filtering of itineraries against a day's busy window
//!
//! Both operations are pure and order-preserving: the output is a stable
//! subsequence of the input. An absent boundary means the day is
//! unconstrained on that side and the full input is returned unchanged.
//! That is a required edge case, not an optimization.

use chrono::DateTime;
use chrono_tz::Tz;
use skyfit_domain::Itinerary;

/// Keep itineraries whose final arrival is no later than `boundary`.
///
/// Used when the traveler must arrive before the first scheduled activity of
/// the day.
pub fn filter_by_latest_arrival(
    itineraries: &[Itinerary],
    boundary: Option<DateTime<Tz>>,
) -> Vec<Itinerary> {
    match boundary {
        None => itineraries.to_vec(),
        Some(limit) => {
            itineraries.iter().filter(|i| i.arrival() <= limit).cloned().collect()
        }
    }
}

/// Keep itineraries whose first departure is no earlier than `boundary`.
///
/// Used when the traveler must not depart before the last scheduled activity
/// of the day ends.
pub fn filter_by_earliest_departure(
    itineraries: &[Itinerary],
    boundary: Option<DateTime<Tz>>,
) -> Vec<Itinerary> {
    match boundary {
        None => itineraries.to_vec(),
        Some(limit) => {
            itineraries.iter().filter(|i| i.departure() >= limit).cloned().collect()
        }
    }
}
