//! The immutable timetable snapshot.
//!
//! A [`Timetable`] bundles the four read-only containers the planner
//! consumes: stops, trip schedules, footpath transfers, and the derived
//! stop-to-trips index. It is validated once at construction and then
//! shared read-only across all concurrent queries.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::domain::{Stop, StopId, Time};

pub mod loader;
mod names;

pub use names::NameIndex;

/// A single visit of a trip to a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopTime {
    /// The trip this visit belongs to
    pub trip_id: String,

    /// The visited stop
    pub stop_id: StopId,

    /// Position of this visit within the trip (strictly increasing)
    pub sequence: u32,

    /// Time the vehicle arrives at the stop
    pub arrival: Time,

    /// Time the vehicle departs the stop (never before `arrival`)
    pub departure: Time,
}

/// A directed footpath between two stops with a fixed walking duration.
///
/// No transitive closure is assumed: a path A→B and a path B→C do not
/// imply a usable path A→C.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Walk origin
    pub from: StopId,

    /// Walk destination
    pub to: StopId,

    /// Walking time in seconds
    pub duration_seconds: u32,
}

/// Error from timetable snapshot validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// Two stops share an id
    #[error("duplicate stop id {0}")]
    DuplicateStopId(StopId),

    /// A trip has fewer than two stop-times and cannot be ridden
    #[error("trip {trip_id} has fewer than two stop-times")]
    TripTooShort { trip_id: String },

    /// Stop sequence numbers repeat or decrease within a trip
    #[error("trip {trip_id} repeats stop sequence {sequence}")]
    DuplicateSequence { trip_id: String, sequence: u32 },

    /// A vehicle departs a stop before it arrives there
    #[error("trip {trip_id} departs stop {stop_id} before arriving")]
    DepartureBeforeArrival { trip_id: String, stop_id: StopId },

    /// Departures must be non-decreasing along a trip
    #[error("trip {trip_id} departure goes backwards at stop {stop_id}")]
    DepartureNotMonotone { trip_id: String, stop_id: StopId },

    /// A stop-time references a stop absent from `stops.txt`
    #[error("trip {trip_id} references unknown stop {stop_id}")]
    UnknownStop { trip_id: String, stop_id: StopId },
}

/// The immutable timetable snapshot consumed by the planner.
#[derive(Debug, Default)]
pub struct Timetable {
    stops: HashMap<StopId, Stop>,
    trips: BTreeMap<String, Vec<StopTime>>,
    transfers: HashMap<StopId, Vec<Transfer>>,
    routes_at_stop: HashMap<StopId, Vec<String>>,
}

impl Timetable {
    /// Validate raw feed data and assemble the snapshot.
    ///
    /// Stop-times are grouped by trip and sorted by `sequence`; the
    /// stop-to-trips index is derived here. Inconsistent trips reject the
    /// whole snapshot rather than silently producing wrong journeys.
    /// Transfers whose endpoints are unknown are dropped with a warning,
    /// since a missing footpath only narrows the search space.
    pub fn build(
        stops: Vec<Stop>,
        stop_times: Vec<StopTime>,
        transfers: Vec<Transfer>,
    ) -> Result<Self, TimetableError> {
        let mut stop_map = HashMap::with_capacity(stops.len());
        for stop in stops {
            let id = stop.id;
            if stop_map.insert(id, stop).is_some() {
                return Err(TimetableError::DuplicateStopId(id));
            }
        }

        let mut trips: BTreeMap<String, Vec<StopTime>> = BTreeMap::new();
        for st in stop_times {
            trips.entry(st.trip_id.clone()).or_default().push(st);
        }

        for (trip_id, schedule) in &mut trips {
            schedule.sort_by_key(|st| st.sequence);
            validate_trip(trip_id, schedule, &stop_map)?;
        }

        // Derived index. Iterating the ordered trip map keeps the trip
        // lists at each stop in a stable order across runs.
        let mut routes_at_stop: HashMap<StopId, Vec<String>> = HashMap::new();
        for (trip_id, schedule) in &trips {
            for st in schedule {
                let at_stop = routes_at_stop.entry(st.stop_id).or_default();
                if at_stop.last() != Some(trip_id) {
                    at_stop.push(trip_id.clone());
                }
            }
        }

        let mut transfer_map: HashMap<StopId, Vec<Transfer>> = HashMap::new();
        for transfer in transfers {
            if !stop_map.contains_key(&transfer.from) || !stop_map.contains_key(&transfer.to) {
                warn!(
                    from = %transfer.from,
                    to = %transfer.to,
                    "dropping transfer with unknown endpoint"
                );
                continue;
            }
            transfer_map.entry(transfer.from).or_default().push(transfer);
        }

        Ok(Self {
            stops: stop_map,
            trips,
            transfers: transfer_map,
            routes_at_stop,
        })
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(&id)
    }

    /// Returns true if the stop exists in this snapshot.
    pub fn contains_stop(&self, id: StopId) -> bool {
        self.stops.contains_key(&id)
    }

    /// Iterate over all stops, in no particular order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    /// The ordered schedule of a trip.
    pub fn trip_schedule(&self, trip_id: &str) -> Option<&[StopTime]> {
        self.trips.get(trip_id).map(Vec::as_slice)
    }

    /// Footpaths leaving a stop.
    pub fn transfers_from(&self, id: StopId) -> &[Transfer] {
        self.transfers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Trips whose schedule contains the stop.
    pub fn trips_at(&self, id: StopId) -> &[String] {
        self.routes_at_stop
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of stops in the snapshot.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of trips in the snapshot.
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }
}

/// Check one sorted trip schedule against the snapshot invariants.
fn validate_trip(
    trip_id: &str,
    schedule: &[StopTime],
    stops: &HashMap<StopId, Stop>,
) -> Result<(), TimetableError> {
    if schedule.len() < 2 {
        return Err(TimetableError::TripTooShort {
            trip_id: trip_id.to_string(),
        });
    }

    let mut seen_stops = Vec::with_capacity(schedule.len());
    for (i, st) in schedule.iter().enumerate() {
        if !stops.contains_key(&st.stop_id) {
            return Err(TimetableError::UnknownStop {
                trip_id: trip_id.to_string(),
                stop_id: st.stop_id,
            });
        }
        if st.departure < st.arrival {
            return Err(TimetableError::DepartureBeforeArrival {
                trip_id: trip_id.to_string(),
                stop_id: st.stop_id,
            });
        }
        if i > 0 {
            let prev = &schedule[i - 1];
            if st.sequence == prev.sequence {
                return Err(TimetableError::DuplicateSequence {
                    trip_id: trip_id.to_string(),
                    sequence: st.sequence,
                });
            }
            if st.departure < prev.departure {
                return Err(TimetableError::DepartureNotMonotone {
                    trip_id: trip_id.to_string(),
                    stop_id: st.stop_id,
                });
            }
        }
        // Loop routes revisiting a stop are tolerated; boarding always
        // uses the first occurrence.
        if seen_stops.contains(&st.stop_id) {
            warn!(trip_id, stop_id = %st.stop_id, "trip visits stop more than once");
        } else {
            seen_stops.push(st.stop_id);
        }
    }

    Ok(())
}
