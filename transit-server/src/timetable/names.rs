//! Stop name lookup.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::StopId;

use super::Timetable;

/// Exact stop-name to stop-id lookup.
///
/// Requests address stops by display name; this index maps them back to
/// feed ids. Built once from a snapshot and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    by_name: HashMap<String, StopId>,
}

impl NameIndex {
    /// Build the index from a timetable snapshot.
    ///
    /// If two stops share a display name, the first one encountered wins
    /// and the collision is logged.
    pub fn from_timetable(timetable: &Timetable) -> Self {
        let mut by_name = HashMap::with_capacity(timetable.stop_count());
        for stop in timetable.stops() {
            if let Some(existing) = by_name.insert(stop.name.clone(), stop.id) {
                warn!(name = %stop.name, kept = %existing, ignored = %stop.id,
                    "duplicate stop name");
                by_name.insert(stop.name.clone(), existing);
            }
        }
        Self { by_name }
    }

    /// Resolve an exact stop name to its id.
    pub fn resolve(&self, name: &str) -> Option<StopId> {
        self.by_name.get(name).copied()
    }

    /// Number of distinct names in the index.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
