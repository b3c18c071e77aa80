//! Planner configuration.

/// Configuration parameters for journey planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Assumed walking speed in metres per second.
    pub walk_speed_mps: f64,

    /// Maximum straight-line walking radius in metres.
    /// Stops further apart than this are never connected by an implicit walk.
    pub max_walk_meters: f64,

    /// Maximum number of transit boardings in one journey.
    pub max_legs: u8,
}

impl PlannerConfig {
    /// Walking time in whole seconds over the given distance.
    pub fn walk_seconds(&self, meters: f64) -> u32 {
        (meters / self.walk_speed_mps) as u32
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            walk_speed_mps: 1.4,
            max_walk_meters: 1500.0,
            max_legs: 5,
        }
    }
}
