//! Predecessor index and path reconstruction.
//!
//! Journey labels reference their predecessor by `(stop, legs)` rather
//! than by pointer, which keeps labels plain copyable values. After a
//! query finishes, the index stores the last label written at each
//! `(stop, legs)` cell; walking the chain backwards from the destination
//! rebuilds the full path.

use std::collections::HashMap;

use crate::domain::{Journey, Method, StopId};

/// Map from `(stop, legs)` to the journey label recorded there.
#[derive(Debug, Clone, Default)]
pub struct Predecessors {
    by_stop: HashMap<StopId, HashMap<u8, Journey>>,
}

impl Predecessors {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label at its `(stop, legs)` cell. Last write wins.
    pub fn insert(&mut self, stop: StopId, journey: Journey) {
        self.by_stop
            .entry(stop)
            .or_default()
            .insert(journey.legs, journey);
    }

    /// Look up the label recorded at `(stop, legs)`.
    pub fn get(&self, stop: StopId, legs: u8) -> Option<&Journey> {
        self.by_stop.get(&stop)?.get(&legs)
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.by_stop.is_empty()
    }
}

/// Rebuild the stop-by-stop path of a journey ending at `destination`.
///
/// Follows the predecessor chain: a walk keeps its leg count, a transit
/// segment was reached from a label with one leg fewer. The chain stops
/// at the origin seed (no predecessor) or at a missing index entry, and
/// the returned path always begins with `(origin, Start)`.
pub fn reconstruct_path(
    origin: StopId,
    destination: StopId,
    chosen: &Journey,
    predecessors: &Predecessors,
) -> Vec<(StopId, Method)> {
    let mut path = Vec::new();
    let mut current = chosen.clone();
    let mut current_stop = destination;

    while let Some(from) = current.from {
        path.push((current_stop, current.method.clone()));

        let prev_legs = if current.method.is_walk() {
            current.legs
        } else {
            current.legs.saturating_sub(1)
        };

        match predecessors.get(from, prev_legs) {
            Some(previous) => {
                current = previous.clone();
                current_stop = from;
            }
            None => break,
        }
    }

    path.push((origin, Method::Start));
    path.reverse();
    path
}
