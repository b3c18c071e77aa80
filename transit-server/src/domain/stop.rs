//! Stop identity and position types.

use std::fmt;

/// A stop identifier from the timetable feed.
///
/// Stop ids are opaque non-negative integers assigned by the feed. The
/// newtype keeps them from being mixed up with other integers (sequence
/// numbers, second counts) at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u32);

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transit stop: identity, display name, and WGS-84 position.
///
/// Immutable for the lifetime of a timetable snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Feed-assigned identifier
    pub id: StopId,

    /// Human-readable display name
    pub name: String,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,
}

impl Stop {
    /// Create a new stop.
    pub fn new(id: StopId, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            name: name.into(),
            lat,
            lon,
        }
    }
}
