//! Journey label types.
//!
//! A `Journey` is a label attached to a stop during the search: it records
//! when the traveler gets there, how they arrived, and how many transit
//! boardings the journey has used so far. Labels are plain values and
//! reference their predecessor by `(from, legs)` rather than by pointer,
//! so they may be copied freely and reconstructed later through the
//! predecessor index.

use std::fmt;

use super::{StopId, Time};

/// How a journey label reached its stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// The query origin itself; no movement has occurred.
    Start,

    /// A walking segment (initial walk, footpath transfer, or final walk).
    Walk,

    /// Riding the identified trip.
    Trip(String),
}

impl Method {
    /// Returns true for walking segments.
    pub fn is_walk(&self) -> bool {
        matches!(self, Method::Walk)
    }

    /// Returns true for transit segments.
    pub fn is_trip(&self) -> bool {
        matches!(self, Method::Trip(_))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Start => f.write_str("Start"),
            Method::Walk => f.write_str("Walk"),
            Method::Trip(trip_id) => write!(f, "Trip:{trip_id}"),
        }
    }
}

/// A journey label: one way of being at a stop at a point in time.
///
/// `arrival` is the moment the traveler reaches the stop this label is
/// attached to. `departure` is the time the whole journey left the origin
/// (the query start time until the first boarding). `legs` counts transit
/// boardings; walking never increments it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    /// Time the traveler reaches the labeled stop
    pub arrival: Time,

    /// Origin departure time of the whole journey
    pub departure: Time,

    /// Number of transit boardings used so far
    pub legs: u8,

    /// Preceding stop in the journey, or `None` for the origin seed
    pub from: Option<StopId>,

    /// How this stop was reached
    pub method: Method,
}

impl Journey {
    /// The origin seed label at the query start time.
    pub fn start(at: Time) -> Self {
        Self {
            arrival: at,
            departure: at,
            legs: 0,
            from: None,
            method: Method::Start,
        }
    }

    /// A walking continuation of `self`, arriving `walk_seconds` later at
    /// a stop reached from `from`.
    pub fn walk_from(&self, from: StopId, walk_seconds: u32) -> Self {
        Self {
            arrival: self.arrival.plus_seconds(walk_seconds),
            departure: self.departure,
            legs: self.legs,
            from: Some(from),
            method: Method::Walk,
        }
    }

    /// Returns true if `self` weakly dominates `other`: at least as early
    /// and with at least as few transit legs.
    pub fn dominates(&self, other: &Self) -> bool {
        self.arrival <= other.arrival && self.legs <= other.legs
    }
}
