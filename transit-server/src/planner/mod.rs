//! Multi-criteria journey planner.
//!
//! This module implements the core round-based search that answers:
//! "starting here at this time, what are the non-dominated ways to reach
//! every other stop?" Journeys are compared on two criteria, arrival
//! time and number of transit boardings, and each stop keeps the full
//! Pareto front of both.

mod config;
mod engine;
mod predecessors;
mod profile;

pub use config::PlannerConfig;
pub use engine::{PlanError, Planner, Query, QueryResult};
pub use predecessors::{reconstruct_path, Predecessors};
pub use profile::Profile;
