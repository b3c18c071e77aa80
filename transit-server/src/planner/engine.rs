//! Round-based multi-criteria journey search.
//!
//! The planner answers one query by dynamic programming over rounds:
//! round `k` holds, per stop, the Pareto front of journeys using at most
//! `k` transit boardings. Round 0 is seeded by walking from the origin;
//! each later round scans every trip reachable from the stops of the
//! previous round, relaxes arrivals downstream, and fans out footpath
//! transfers. A final pass unions all rounds and applies one terminal
//! walk into the destination.
//!
//! Within a round the trip scan is embarrassingly parallel across the
//! marked stops: workers read the immutable previous round and fill
//! private proposal buffers, which a single thread then folds in a fixed
//! order. Rounds are serial.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::domain::{Journey, Method, Stop, StopId, Time};
use crate::geo::haversine_distance;
use crate::timetable::Timetable;

use super::config::PlannerConfig;
use super::predecessors::Predecessors;
use super::profile::Profile;

/// Error from journey planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The origin or destination stop is not in the timetable.
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),
}

/// A single journey-planning request.
#[derive(Debug, Clone)]
pub struct Query {
    /// Where the traveler starts.
    pub origin: StopId,

    /// Where the traveler wants to go.
    pub destination: StopId,

    /// Earliest time the traveler can leave the origin.
    pub departure: Time,
}

/// Result of one query: per-stop Pareto fronts and the predecessor index.
///
/// A destination absent from `profiles` means no route was found; that is
/// a normal outcome, not an error.
#[derive(Debug)]
pub struct QueryResult {
    /// Non-dominated journeys per reached stop, destination walk included.
    pub profiles: HashMap<StopId, Profile>,

    /// `(stop, legs)` index for path reconstruction.
    pub predecessors: Predecessors,
}

/// Journey planner over one immutable timetable snapshot.
///
/// The planner borrows the snapshot and holds no per-query state, so one
/// instance may serve any number of concurrent queries.
pub struct Planner<'a> {
    timetable: &'a Timetable,
    config: &'a PlannerConfig,
}

impl<'a> Planner<'a> {
    /// Create a planner over a snapshot.
    pub fn new(timetable: &'a Timetable, config: &'a PlannerConfig) -> Self {
        Self { timetable, config }
    }

    /// Compute all Pareto-optimal journeys for one query.
    #[instrument(skip(self), fields(
        origin = %query.origin,
        destination = %query.destination,
        departure = %query.departure,
    ))]
    pub fn plan(&self, query: &Query) -> Result<QueryResult, PlanError> {
        let origin = self
            .timetable
            .stop(query.origin)
            .ok_or(PlanError::UnknownStop(query.origin))?;
        let destination = self
            .timetable
            .stop(query.destination)
            .ok_or(PlanError::UnknownStop(query.destination))?;

        let mut rounds = Vec::with_capacity(usize::from(self.config.max_legs) + 1);
        rounds.push(self.initial_walks(origin, query.departure));

        for round in 1..=self.config.max_legs {
            let next = self.expand_round(&rounds[usize::from(round) - 1], round);
            if next.is_empty() {
                // Nothing was reached with `round` legs, so no later
                // round can reach anything either.
                break;
            }
            rounds.push(next);
        }

        let result = self.finalize(query, destination, rounds);
        info!(
            stops_reached = result.profiles.len(),
            destination_labels = result
                .profiles
                .get(&query.destination)
                .map_or(0, Profile::len),
            "plan complete"
        );
        Ok(result)
    }

    /// Seed round 0: the origin itself, every stop inside the walking
    /// radius, and explicit footpaths leaving the origin. Footpaths are
    /// considered in addition to the radius walk; the Pareto merge keeps
    /// whichever is faster.
    fn initial_walks(&self, origin: &Stop, departure: Time) -> HashMap<StopId, Profile> {
        let mut round: HashMap<StopId, Profile> = HashMap::new();
        let seed = Journey::start(departure);
        round.entry(origin.id).or_default().merge(seed.clone());

        for stop in self.timetable.stops() {
            if stop.id == origin.id {
                continue;
            }
            let dist = haversine_distance(origin.lat, origin.lon, stop.lat, stop.lon);
            if dist <= self.config.max_walk_meters {
                round
                    .entry(stop.id)
                    .or_default()
                    .merge(seed.walk_from(origin.id, self.config.walk_seconds(dist)));
            }
        }

        for transfer in self.timetable.transfers_from(origin.id) {
            round
                .entry(transfer.to)
                .or_default()
                .merge(seed.walk_from(origin.id, transfer.duration_seconds));
        }

        round
    }

    /// Expand one round: scan trips from every marked stop in parallel,
    /// fold the proposals serially, then fan out footpath transfers from
    /// the labels that survived the fold. Footpaths are not chained
    /// within a round.
    fn expand_round(
        &self,
        previous: &HashMap<StopId, Profile>,
        round: u8,
    ) -> HashMap<StopId, Profile> {
        let mut marked: Vec<StopId> = previous.keys().copied().collect();
        marked.sort_unstable();
        debug!(round, marked = marked.len(), "expanding round");

        // Workers read only the previous round and the snapshot; each
        // fills a private buffer. Folding the buffers in (worker index,
        // insertion) order makes the round's outcome deterministic.
        let proposals: Vec<Vec<(StopId, Journey)>> = marked
            .par_iter()
            .map(|&stop| self.scan_trips_from(stop, previous, round))
            .collect();

        let mut current: HashMap<StopId, Profile> = HashMap::new();
        let mut accepted: Vec<(StopId, Journey)> = Vec::new();
        for buffer in proposals {
            for (stop, journey) in buffer {
                if current.entry(stop).or_default().merge(journey.clone()) {
                    accepted.push((stop, journey));
                }
            }
        }

        for (stop, journey) in accepted {
            for transfer in self.timetable.transfers_from(stop) {
                current
                    .entry(transfer.to)
                    .or_default()
                    .merge(journey.walk_from(stop, transfer.duration_seconds));
            }
        }

        debug!(round, stops = current.len(), "round complete");
        current
    }

    /// Relax every trip that calls at `stop` against the previous round.
    ///
    /// The schedule is walked from the first occurrence of `stop`. Along
    /// the way the boarding label may be replaced by any previous-round
    /// label that reaches a later scheduled stop before the vehicle
    /// departs it with an earlier wall-clock arrival; boarding earlier
    /// never worsens any downstream arrival.
    fn scan_trips_from(
        &self,
        stop: StopId,
        previous: &HashMap<StopId, Profile>,
        round: u8,
    ) -> Vec<(StopId, Journey)> {
        let mut proposals = Vec::new();

        for trip_id in self.timetable.trips_at(stop) {
            let schedule = self
                .timetable
                .trip_schedule(trip_id)
                .expect("stop-to-trips index references a trip missing from the snapshot");
            let Some(board_idx) = schedule.iter().position(|st| st.stop_id == stop) else {
                continue;
            };

            let mut boarding: Option<&Journey> = None;
            for (i, st) in schedule.iter().enumerate().skip(board_idx) {
                if let Some(profile) = previous.get(&st.stop_id) {
                    for label in profile {
                        let catches_departure = label.arrival <= st.departure;
                        let boards_earlier =
                            boarding.is_none_or(|current| label.arrival < current.arrival);
                        if catches_departure && boards_earlier {
                            boarding = Some(label);
                        }
                    }
                }

                if let Some(boarded) = boarding {
                    let from = if i > board_idx {
                        Some(schedule[i - 1].stop_id)
                    } else {
                        boarded.from
                    };
                    proposals.push((
                        st.stop_id,
                        Journey {
                            arrival: st.arrival,
                            departure: boarded.departure,
                            legs: round,
                            from,
                            method: Method::Trip(trip_id.clone()),
                        },
                    ));
                }
            }
        }

        proposals
    }

    /// Collapse all rounds into a union profile per stop, extend to the
    /// destination with one terminal bounded walk, and build the
    /// predecessor index from the finished profiles.
    fn finalize(
        &self,
        query: &Query,
        destination: &Stop,
        rounds: Vec<HashMap<StopId, Profile>>,
    ) -> QueryResult {
        let mut union: HashMap<StopId, Profile> = HashMap::new();
        for round in rounds {
            for (stop, profile) in round {
                let entry = union.entry(stop).or_default();
                for journey in profile {
                    entry.merge(journey);
                }
            }
        }

        let mut out: HashMap<StopId, Profile> = HashMap::new();

        // The terminal walk runs once over the union, not per round, so
        // the destination sees every in-network arrival plus at most one
        // trailing walk segment.
        let mut reached: Vec<StopId> = union.keys().copied().collect();
        reached.sort_unstable();
        for stop_id in reached {
            if stop_id == query.destination {
                continue;
            }
            let Some(stop) = self.timetable.stop(stop_id) else {
                continue;
            };
            let dist = haversine_distance(stop.lat, stop.lon, destination.lat, destination.lon);
            if dist > self.config.max_walk_meters {
                continue;
            }
            let walk = self.config.walk_seconds(dist);
            let dest_profile = out.entry(query.destination).or_default();
            for journey in union.get(&stop_id).into_iter().flatten() {
                dest_profile.merge(journey.walk_from(stop_id, walk));
            }
        }

        for (stop, profile) in union {
            let entry = out.entry(stop).or_default();
            for journey in profile {
                entry.merge(journey);
            }
        }

        let mut predecessors = Predecessors::new();
        for (stop, profile) in &out {
            for journey in profile {
                predecessors.insert(*stop, journey.clone());
            }
        }

        QueryResult {
            profiles: out,
            predecessors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::reconstruct_path;
    use crate::timetable::{StopTime, Transfer};

    fn stop(id: u32, lat: f64, lon: f64) -> Stop {
        Stop::new(StopId(id), format!("Stop {id}"), lat, lon)
    }

    /// Build a snapshot from trips given as (trip_id, [(stop, "HH:MM:SS")]).
    /// Arrival and departure coincide at every call.
    fn timetable(
        stops: Vec<Stop>,
        trips: &[(&str, &[(u32, &str)])],
        transfers: Vec<Transfer>,
    ) -> Timetable {
        let mut stop_times = Vec::new();
        for (trip_id, calls) in trips {
            for (seq, (stop_id, at)) in calls.iter().enumerate() {
                let at = Time::parse_hms(at).unwrap();
                stop_times.push(StopTime {
                    trip_id: trip_id.to_string(),
                    stop_id: StopId(*stop_id),
                    sequence: seq as u32 + 1,
                    arrival: at,
                    departure: at,
                });
            }
        }
        Timetable::build(stops, stop_times, transfers).unwrap()
    }

    fn plan(
        timetable: &Timetable,
        origin: u32,
        destination: u32,
        departure: &str,
    ) -> Result<QueryResult, PlanError> {
        let config = PlannerConfig::default();
        Planner::new(timetable, &config).plan(&Query {
            origin: StopId(origin),
            destination: StopId(destination),
            departure: Time::parse_hms(departure).unwrap(),
        })
    }

    fn dest_front(result: &QueryResult, destination: u32) -> Vec<(Time, u8)> {
        result
            .profiles
            .get(&StopId(destination))
            .map(|p| p.iter().map(|j| (j.arrival, j.legs)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn single_trip_keeps_walk_alternative() {
        // A and B are ~1.1 km apart: close enough to walk, but the trip
        // is faster. Both journeys are Pareto-optimal.
        let tt = timetable(
            vec![stop(1, 0.0, 0.0), stop(2, 0.01, 0.0)],
            &[("T1", &[(1, "08:00:00"), (2, "08:10:00")])],
            vec![],
        );

        let result = plan(&tt, 1, 2, "08:00:00").unwrap();

        let walk_secs = PlannerConfig::default()
            .walk_seconds(haversine_distance(0.0, 0.0, 0.01, 0.0));
        let expected_walk_arrival = Time::parse_hms("08:00:00").unwrap().plus_seconds(walk_secs);
        // ~1113 m at 1.4 m/s is a bit over 13 minutes
        assert_eq!(expected_walk_arrival.hour(), 8);
        assert_eq!(expected_walk_arrival.minute(), 13);

        assert_eq!(
            dest_front(&result, 2),
            vec![
                (Time::parse_hms("08:10:00").unwrap(), 1),
                (expected_walk_arrival, 0),
            ]
        );
    }

    #[test]
    fn dominated_trip_is_pruned() {
        // T2 departs later and arrives later than T1: strictly worse.
        let tt = timetable(
            vec![stop(1, 0.0, 0.0), stop(2, 0.01, 0.0)],
            &[
                ("T1", &[(1, "08:00:00"), (2, "08:10:00")]),
                ("T2", &[(1, "08:02:00"), (2, "08:15:00")]),
            ],
            vec![],
        );

        let result = plan(&tt, 1, 2, "08:00:00").unwrap();

        let front = dest_front(&result, 2);
        assert_eq!(front.len(), 2);
        assert_eq!(front[0], (Time::parse_hms("08:10:00").unwrap(), 1));
        assert!(!front.contains(&(Time::parse_hms("08:15:00").unwrap(), 1)));
    }

    #[test]
    fn one_transfer_journey() {
        // A, B, C collinear and pairwise beyond walking range; reaching C
        // requires riding T1 then T2.
        let tt = timetable(
            vec![stop(1, 0.0, 0.0), stop(2, 0.02, 0.0), stop(3, 0.04, 0.0)],
            &[
                ("T1", &[(1, "09:00:00"), (2, "09:20:00")]),
                ("T2", &[(2, "09:25:00"), (3, "09:45:00")]),
            ],
            vec![],
        );

        let result = plan(&tt, 1, 3, "09:00:00").unwrap();

        assert_eq!(
            dest_front(&result, 3),
            vec![(Time::parse_hms("09:45:00").unwrap(), 2)]
        );

        let chosen = result.profiles[&StopId(3)].iter().next().unwrap();
        let path = reconstruct_path(StopId(1), StopId(3), chosen, &result.predecessors);
        assert_eq!(
            path,
            vec![
                (StopId(1), Method::Start),
                (StopId(2), Method::Trip("T1".into())),
                (StopId(3), Method::Trip("T2".into())),
            ]
        );
    }

    #[test]
    fn footpath_beats_walking_radius() {
        // A and B are ~2.2 km apart (beyond the radius) but an explicit
        // 600 s footpath connects them. No trips at all.
        let tt = timetable(
            vec![stop(1, 0.0, 0.0), stop(2, 0.02, 0.0)],
            &[],
            vec![Transfer {
                from: StopId(1),
                to: StopId(2),
                duration_seconds: 600,
            }],
        );

        let result = plan(&tt, 1, 2, "10:00:00").unwrap();

        assert_eq!(
            dest_front(&result, 2),
            vec![(Time::parse_hms("10:10:00").unwrap(), 0)]
        );
        let label = result.profiles[&StopId(2)].iter().next().unwrap();
        assert_eq!(label.method, Method::Walk);
    }

    #[test]
    fn final_walk_to_destination() {
        // D is ~700 m past B with no footpath; the journey rides T1 to B
        // and walks the rest.
        let tt = timetable(
            vec![stop(1, 0.0, 0.0), stop(2, 0.02, 0.0), stop(4, 0.0263, 0.0)],
            &[("T1", &[(1, "07:00:00"), (2, "07:30:00")])],
            vec![],
        );

        let result = plan(&tt, 1, 4, "07:00:00").unwrap();

        let walk_secs = PlannerConfig::default()
            .walk_seconds(haversine_distance(0.02, 0.0, 0.0263, 0.0));
        let expected = Time::parse_hms("07:30:00").unwrap().plus_seconds(walk_secs);
        assert_eq!(expected.hour(), 7);
        assert_eq!(expected.minute(), 38);

        assert_eq!(dest_front(&result, 4), vec![(expected, 1)]);

        let chosen = result.profiles[&StopId(4)].iter().next().unwrap();
        let path = reconstruct_path(StopId(1), StopId(4), chosen, &result.predecessors);
        assert_eq!(
            path,
            vec![
                (StopId(1), Method::Start),
                (StopId(2), Method::Trip("T1".into())),
                (StopId(4), Method::Walk),
            ]
        );
    }

    #[test]
    fn no_route_yields_empty_result() {
        // Z is on the other side of the world with nothing connecting it.
        let tt = timetable(vec![stop(1, 0.0, 0.0), stop(9, 45.0, 90.0)], &[], vec![]);

        let result = plan(&tt, 1, 9, "08:00:00").unwrap();

        assert!(dest_front(&result, 9).is_empty());
    }

    #[test]
    fn unknown_stop_is_rejected() {
        let tt = timetable(vec![stop(1, 0.0, 0.0)], &[], vec![]);

        assert_eq!(
            plan(&tt, 1, 99, "08:00:00").unwrap_err(),
            PlanError::UnknownStop(StopId(99))
        );
        assert_eq!(
            plan(&tt, 99, 1, "08:00:00").unwrap_err(),
            PlanError::UnknownStop(StopId(99))
        );
    }

    #[test]
    fn footpath_transfer_between_rounds() {
        // Ride T1 to B, take the footpath B -> C, ride T2 from C. The
        // footpath fan-out happens inside the round, so T2 is boardable
        // in the following round.
        let tt = timetable(
            vec![
                stop(1, 0.0, 0.0),
                stop(2, 0.2, 0.0),
                stop(3, 0.2, 0.2),
                stop(4, 0.4, 0.2),
            ],
            &[
                ("T1", &[(1, "09:00:00"), (2, "09:20:00")]),
                ("T2", &[(3, "09:40:00"), (4, "10:00:00")]),
            ],
            vec![Transfer {
                from: StopId(2),
                to: StopId(3),
                duration_seconds: 300,
            }],
        );

        let result = plan(&tt, 1, 4, "09:00:00").unwrap();

        assert_eq!(
            dest_front(&result, 4),
            vec![(Time::parse_hms("10:00:00").unwrap(), 2)]
        );
    }

    #[test]
    fn leg_limit_bounds_the_search() {
        // A chain of six trips, each forced by distance; only five legs
        // are allowed, so the final stop is unreachable.
        let stops: Vec<Stop> = (1..=7).map(|i| stop(i, 0.2 * f64::from(i), 0.0)).collect();
        let mut stop_times = Vec::new();
        for i in 1..=6u32 {
            let depart = Time::from_hms(9, (i - 1) * 10, 0);
            let arrive = Time::from_hms(9, (i - 1) * 10 + 5, 0);
            stop_times.push(StopTime {
                trip_id: format!("T{i}"),
                stop_id: StopId(i),
                sequence: 1,
                arrival: depart,
                departure: depart,
            });
            stop_times.push(StopTime {
                trip_id: format!("T{i}"),
                stop_id: StopId(i + 1),
                sequence: 2,
                arrival: arrive,
                departure: arrive,
            });
        }
        let tt = Timetable::build(stops, stop_times, vec![]).unwrap();

        // Six legs needed: unreachable
        let result = plan(&tt, 1, 7, "09:00:00").unwrap();
        assert!(dest_front(&result, 7).is_empty());

        // Five legs needed: reachable, and every label respects the bound
        let result = plan(&tt, 1, 6, "09:00:00").unwrap();
        assert_eq!(
            dest_front(&result, 6),
            vec![(Time::parse_hms("09:45:00").unwrap(), 5)]
        );
        for profile in result.profiles.values() {
            for journey in profile {
                assert!(journey.legs <= 5);
            }
        }
    }

    #[test]
    fn express_needs_single_boarding() {
        // Both the slow trip S and the express E are boardable at A; the
        // express alone reaches C, and one boarding suffices even though
        // S also serves B.
        let tt = timetable(
            vec![stop(1, 0.0, 0.0), stop(2, 0.2, 0.0), stop(3, 0.4, 0.0)],
            &[
                ("S", &[(1, "09:00:00"), (2, "09:30:00")]),
                ("E", &[(1, "09:05:00"), (2, "09:40:00"), (3, "10:00:00")]),
            ],
            vec![],
        );

        let result = plan(&tt, 1, 3, "09:00:00").unwrap();

        // One boarding of E suffices
        assert_eq!(
            dest_front(&result, 3),
            vec![(Time::parse_hms("10:00:00").unwrap(), 1)]
        );
    }

    #[test]
    fn result_invariants_hold() {
        let start = Time::parse_hms("08:00:00").unwrap();
        let tt = timetable(
            vec![
                stop(1, 0.0, 0.0),
                stop(2, 0.01, 0.0),
                stop(3, 0.02, 0.0),
                stop(4, 0.02, 0.01),
            ],
            &[
                ("T1", &[(1, "08:00:00"), (2, "08:10:00"), (3, "08:20:00")]),
                ("T2", &[(2, "08:15:00"), (4, "08:30:00")]),
                ("T3", &[(1, "08:05:00"), (3, "08:18:00")]),
            ],
            vec![Transfer {
                from: StopId(3),
                to: StopId(4),
                duration_seconds: 240,
            }],
        );

        let result = plan(&tt, 1, 4, "08:00:00").unwrap();

        for profile in result.profiles.values() {
            let labels: Vec<&Journey> = profile.iter().collect();

            // Pareto minimality
            for (i, a) in labels.iter().enumerate() {
                for (j, b) in labels.iter().enumerate() {
                    if i != j {
                        assert!(!a.dominates(b), "dominated label in result");
                    }
                }
            }

            // Strict ordering by (arrival, legs)
            for pair in labels.windows(2) {
                assert!((pair[0].arrival, pair[0].legs) < (pair[1].arrival, pair[1].legs));
            }

            for journey in &labels {
                // Leg bound
                assert!(journey.legs <= 5);
                // Departure monotonicity
                assert!(journey.departure >= start);
                assert!(journey.departure <= journey.arrival);
            }
        }
    }
}
