//! GTFS-like timetable loading.
//!
//! Reads the three-file on-disk layout (`stops.txt`, `stop_times.txt`,
//! `transfers.txt`) with comma-separated fields and `HH:MM:SS` times, and
//! assembles a validated [`Timetable`] snapshot. `transfers.txt` is
//! optional; a feed without footpaths just has none.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::domain::{Stop, StopId, Time};

use super::{StopTime, Timetable, TimetableError, Transfer};

/// Error from timetable loading.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// A feed file could not be opened
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// A feed row could not be parsed
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: csv::Error },

    /// The parsed feed fails snapshot validation
    #[error(transparent)]
    Malformed(#[from] TimetableError),
}

/// A row of `stops.txt`.
#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: u32,
    stop_name: String,
    stop_lat: f64,
    stop_lon: f64,
}

/// A row of `stop_times.txt`.
#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    #[serde(deserialize_with = "deserialize_time")]
    arrival_time: Time,
    #[serde(deserialize_with = "deserialize_time")]
    departure_time: Time,
    stop_id: u32,
    stop_sequence: u32,
}

/// A row of `transfers.txt`.
#[derive(Debug, Deserialize)]
struct TransferRow {
    from_stop_id: u32,
    to_stop_id: u32,
    min_transfer_time: u32,
}

/// Deserialize an HH:MM:SS string into a [`Time`].
fn deserialize_time<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Time::parse_hms(&s).map_err(serde::de::Error::custom)
}

/// Load a timetable snapshot from a feed directory.
pub fn load_dir(dir: &Path) -> Result<Timetable, LoaderError> {
    let stops: Vec<Stop> = read_rows::<StopRow>(&dir.join("stops.txt"))?
        .into_iter()
        .map(|row| Stop::new(StopId(row.stop_id), row.stop_name, row.stop_lat, row.stop_lon))
        .collect();

    let stop_times: Vec<StopTime> = read_rows::<StopTimeRow>(&dir.join("stop_times.txt"))?
        .into_iter()
        .map(|row| StopTime {
            trip_id: row.trip_id,
            stop_id: StopId(row.stop_id),
            sequence: row.stop_sequence,
            arrival: row.arrival_time,
            departure: row.departure_time,
        })
        .collect();

    let transfers_path = dir.join("transfers.txt");
    let transfers: Vec<Transfer> = if transfers_path.is_file() {
        read_rows::<TransferRow>(&transfers_path)?
            .into_iter()
            .map(|row| Transfer {
                from: StopId(row.from_stop_id),
                to: StopId(row.to_stop_id),
                duration_seconds: row.min_transfer_time,
            })
            .collect()
    } else {
        debug!(path = %transfers_path.display(), "no transfers file");
        Vec::new()
    };

    let timetable = Timetable::build(stops, stop_times, transfers)?;
    info!(
        stops = timetable.stop_count(),
        trips = timetable.trip_count(),
        "timetable loaded"
    );
    Ok(timetable)
}

/// Read and deserialize every row of one comma-separated feed file.
fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let row = result.map_err(|source| LoaderError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
