//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::StopId;
use crate::planner::{reconstruct_path, QueryResult};
use crate::timetable::Timetable;

/// Request to compute journeys between two named stops.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    /// Origin stop name
    pub start: String,

    /// Destination stop name
    pub end: String,

    /// Departure time in H:MM format
    pub time: String,
}

/// Response for a journey calculation.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    /// Pareto-optimal journeys, ascending by arrival time
    pub journeys: Vec<JourneyResult>,
}

/// One journey option.
#[derive(Debug, Serialize)]
pub struct JourneyResult {
    /// Arrival time at the destination, "H:M"
    pub arrival: String,

    /// Number of transit boardings
    pub trips: u8,

    /// Stop-by-stop path, beginning at the origin
    pub path: Vec<PathStep>,
}

/// One step of a journey path.
#[derive(Debug, Serialize)]
pub struct PathStep {
    /// Display name of the stop
    pub stop_name: String,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,

    /// How the stop was reached: "Start", "Walk", or "Trip:<id>"
    pub method: String,
}

/// Error payload for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable failure reason
    pub error: String,
}

/// Render the planner output for one destination into the response shape.
///
/// Each label at the destination becomes one journey; its path is rebuilt
/// through the predecessor index. An unreached destination renders as an
/// empty journey list.
pub fn journeys_response(
    timetable: &Timetable,
    origin: StopId,
    destination: StopId,
    result: &QueryResult,
) -> CalculateResponse {
    let mut journeys = Vec::new();

    if let Some(profile) = result.profiles.get(&destination) {
        for label in profile {
            let steps = reconstruct_path(origin, destination, label, &result.predecessors);
            let path = steps
                .into_iter()
                .filter_map(|(stop_id, method)| {
                    timetable.stop(stop_id).map(|stop| PathStep {
                        stop_name: stop.name.clone(),
                        lat: stop.lat,
                        lon: stop.lon,
                        method: method.to_string(),
                    })
                })
                .collect();

            journeys.push(JourneyResult {
                arrival: format!("{}:{}", label.arrival.hour(), label.arrival.minute()),
                trips: label.legs,
                path,
            });
        }
    }

    CalculateResponse { journeys }
}
