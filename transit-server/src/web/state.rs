//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::PlannerConfig;
use crate::timetable::{NameIndex, Timetable};

/// Shared application state.
///
/// The timetable snapshot and the indexes derived from it are immutable
/// once built, so handlers share them by reference count.
#[derive(Clone)]
pub struct AppState {
    /// Immutable timetable snapshot
    pub timetable: Arc<Timetable>,

    /// Stop-name lookup built from the snapshot
    pub names: Arc<NameIndex>,

    /// Journey planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create the app state from a loaded snapshot.
    pub fn new(timetable: Timetable, config: PlannerConfig) -> Self {
        let names = NameIndex::from_timetable(&timetable);
        Self {
            timetable: Arc::new(timetable),
            names: Arc::new(names),
            config: Arc::new(config),
        }
    }
}
