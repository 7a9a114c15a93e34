//! Flight catalog extraction
//!
//! Normalizes a raw flight-search payload (two ranked lists of itinerary
//! records) into a flat, ordered list of [`Itinerary`] values. Extraction is
//! a pure transform apart from per-record diagnostics: a record missing a
//! required field is dropped with a warning, never fatal for the batch.

use serde::Deserialize;
use skyfit_domain::constants::DEFAULT_CARRIER;
use skyfit_domain::{Itinerary, Result, Segment, SkyfitError};
use tracing::warn;

use crate::clock::LocalClock;

/// Raw search-result payload as fetched from the flight-search collaborator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchPayload {
    #[serde(default)]
    pub best_flights: Vec<RawItinerary>,
    #[serde(default)]
    pub other_flights: Vec<RawItinerary>,
}

/// One itinerary record in the raw payload
#[derive(Debug, Clone, Deserialize)]
pub struct RawItinerary {
    pub price: Option<u32>,
    #[serde(default)]
    pub flights: Vec<RawLeg>,
}

/// One leg record in the raw payload
#[derive(Debug, Clone, Deserialize)]
pub struct RawLeg {
    pub departure_airport: Option<RawAirportTime>,
    pub arrival_airport: Option<RawAirportTime>,
    pub airline: Option<String>,
}

/// Nested airport + local-time pair
#[derive(Debug, Clone, Deserialize)]
pub struct RawAirportTime {
    pub id: Option<String>,
    pub time: Option<String>,
}

/// Extract itineraries from a raw payload, ranked list first.
///
/// Output order concatenates `best_flights` then `other_flights`, preserving
/// each list's order; no synthetic rank is assigned beyond list position.
/// Itinerary records that fail to parse are dropped with a logged
/// diagnostic.
pub fn extract(payload: &RawSearchPayload, clock: &LocalClock) -> Vec<Itinerary> {
    payload
        .best_flights
        .iter()
        .chain(payload.other_flights.iter())
        .enumerate()
        .filter_map(|(position, raw)| match parse_itinerary(raw, clock) {
            Ok(itinerary) => Some(itinerary),
            Err(err) => {
                warn!(position, error = %err, "dropping malformed itinerary record");
                None
            }
        })
        .collect()
}

fn parse_itinerary(raw: &RawItinerary, clock: &LocalClock) -> Result<Itinerary> {
    let price = raw.price.ok_or_else(|| SkyfitError::Parse("itinerary missing price".into()))?;

    let segments = raw
        .flights
        .iter()
        .map(|leg| parse_leg(leg, clock))
        .collect::<Result<Vec<Segment>>>()?;

    Itinerary::new(segments, price)
}

fn parse_leg(leg: &RawLeg, clock: &LocalClock) -> Result<Segment> {
    let departure = leg
        .departure_airport
        .as_ref()
        .ok_or_else(|| SkyfitError::Parse("leg missing departure airport".into()))?;
    let arrival = leg
        .arrival_airport
        .as_ref()
        .ok_or_else(|| SkyfitError::Parse("leg missing arrival airport".into()))?;

    Ok(Segment {
        origin: required(&departure.id, "departure airport code")?,
        departure: clock.parse(&required(&departure.time, "departure time")?)?,
        destination: required(&arrival.id, "arrival airport code")?,
        arrival: clock.parse(&required(&arrival.time, "arrival time")?)?,
        carrier: leg.airline.clone().unwrap_or_else(|| DEFAULT_CARRIER.to_string()),
    })
}

fn required(field: &Option<String>, name: &str) -> Result<String> {
    field
        .clone()
        .ok_or_else(|| SkyfitError::Parse(format!("leg missing required field: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> LocalClock {
        LocalClock::from_zone_name("America/Chicago").unwrap()
    }

    fn payload(json: &str) -> RawSearchPayload {
        serde_json::from_str(json).unwrap()
    }

    const WELL_FORMED: &str = r#"{
        "best_flights": [{
            "price": 412,
            "flights": [{
                "departure_airport": { "id": "IAH", "time": "2026-01-22 06:00" },
                "arrival_airport": { "id": "GUA", "time": "2026-01-22 08:30" },
                "airline": "United"
            }]
        }]
    }"#;

    #[test]
    fn test_extracts_well_formed_itinerary() {
        let itineraries = extract(&payload(WELL_FORMED), &clock());
        assert_eq!(itineraries.len(), 1);
        assert_eq!(itineraries[0].origin(), "IAH");
        assert_eq!(itineraries[0].destination(), "GUA");
        assert_eq!(itineraries[0].price(), 412);
        assert_eq!(itineraries[0].segments()[0].carrier, "United");
    }

    #[test]
    fn test_malformed_record_is_dropped_not_fatal() {
        // One good record and one leg missing its airport code in the same list
        let raw = payload(
            r#"{
            "best_flights": [
                {
                    "price": 412,
                    "flights": [{
                        "departure_airport": { "id": "IAH", "time": "2026-01-22 06:00" },
                        "arrival_airport": { "id": "GUA", "time": "2026-01-22 08:30" },
                        "airline": "United"
                    }]
                },
                {
                    "price": 350,
                    "flights": [{
                        "departure_airport": { "time": "2026-01-22 07:00" },
                        "arrival_airport": { "id": "GUA", "time": "2026-01-22 09:30" },
                        "airline": "Avianca"
                    }]
                }
            ]
        }"#,
        );

        let itineraries = extract(&raw, &clock());
        assert_eq!(itineraries.len(), 1);
        assert_eq!(itineraries[0].price(), 412);
    }

    #[test]
    fn test_ranked_list_precedes_other_list() {
        let raw = payload(
            r#"{
            "other_flights": [{
                "price": 200,
                "flights": [{
                    "departure_airport": { "id": "IAH", "time": "2026-01-22 10:00" },
                    "arrival_airport": { "id": "GUA", "time": "2026-01-22 12:30" }
                }]
            }],
            "best_flights": [{
                "price": 500,
                "flights": [{
                    "departure_airport": { "id": "IAH", "time": "2026-01-22 06:00" },
                    "arrival_airport": { "id": "GUA", "time": "2026-01-22 08:30" }
                }]
            }]
        }"#,
        );

        let itineraries = extract(&raw, &clock());
        assert_eq!(itineraries.len(), 2);
        assert_eq!(itineraries[0].price(), 500, "best_flights entries come first");
        assert_eq!(itineraries[1].price(), 200);
    }

    #[test]
    fn test_missing_airline_defaults_to_unknown() {
        let raw = payload(
            r#"{
            "best_flights": [{
                "price": 100,
                "flights": [{
                    "departure_airport": { "id": "IAH", "time": "2026-01-22 06:00" },
                    "arrival_airport": { "id": "GUA", "time": "2026-01-22 08:30" }
                }]
            }]
        }"#,
        );

        let itineraries = extract(&raw, &clock());
        assert_eq!(itineraries[0].segments()[0].carrier, DEFAULT_CARRIER);
    }

    #[test]
    fn test_unparseable_time_drops_record() {
        let raw = payload(
            r#"{
            "best_flights": [{
                "price": 100,
                "flights": [{
                    "departure_airport": { "id": "IAH", "time": "tomorrow-ish" },
                    "arrival_airport": { "id": "GUA", "time": "2026-01-22 08:30" }
                }]
            }]
        }"#,
        );

        assert!(extract(&raw, &clock()).is_empty());
    }

    #[test]
    fn test_missing_price_drops_record() {
        let raw = payload(
            r#"{
            "best_flights": [{
                "flights": [{
                    "departure_airport": { "id": "IAH", "time": "2026-01-22 06:00" },
                    "arrival_airport": { "id": "GUA", "time": "2026-01-22 08:30" }
                }]
            }]
        }"#,
        );

        assert!(extract(&raw, &clock()).is_empty());
    }

    #[test]
    fn test_empty_payload_yields_empty_catalog() {
        let raw = payload("{}");
        assert!(extract(&raw, &clock()).is_empty());
    }
}
