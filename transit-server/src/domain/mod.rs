//! Domain types for the transit journey planner.
//!
//! This module contains the core domain model types that represent
//! validated timetable data. All types enforce their invariants at
//! construction time, so code that receives these types can trust
//! their validity.

mod journey;
mod stop;
mod time;

pub use journey::{Journey, Method};
pub use stop::{Stop, StopId};
pub use time::{Time, TimeError};
