//! Per-stop Pareto profiles.
//!
//! A [`Profile`] is the set of non-dominated journey labels attached to
//! one stop. Fronts stay short (bounded by the leg limit plus one in
//! practice), so a compact ordered vector beats any pointer-linked
//! structure: merge cost is dominated by comparisons, not allocation.

use std::slice::Iter as SliceIter;

use crate::domain::Journey;

/// An ordered Pareto front of journey labels at one stop.
///
/// # Invariants
///
/// - No label weakly dominates another (Pareto-minimal).
/// - Labels are sorted by ascending `arrival`, ties by ascending `legs`.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    labels: Vec<Journey>,
}

impl Profile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a candidate label, preserving Pareto minimality.
    ///
    /// Returns true if the candidate was inserted. It is rejected when any
    /// existing label weakly dominates it; on insertion, every existing
    /// label it weakly dominates is removed. When two labels tie on both
    /// criteria the first one inserted wins, which makes the outcome
    /// deterministic in the scan order.
    pub fn merge(&mut self, candidate: Journey) -> bool {
        if self.labels.iter().any(|existing| existing.dominates(&candidate)) {
            return false;
        }

        self.labels.retain(|existing| !candidate.dominates(existing));

        let at = self
            .labels
            .partition_point(|l| (l.arrival, l.legs) < (candidate.arrival, candidate.legs));
        self.labels.insert(at, candidate);
        true
    }

    /// Iterate labels in ascending `(arrival, legs)` order.
    pub fn iter(&self) -> SliceIter<'_, Journey> {
        self.labels.iter()
    }

    /// Number of labels in the front.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the front is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<'a> IntoIterator for &'a Profile {
    type Item = &'a Journey;
    type IntoIter = SliceIter<'a, Journey>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

impl IntoIterator for Profile {
    type Item = Journey;
    type IntoIter = std::vec::IntoIter<Journey>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.into_iter()
    }
}
