//! HTTP request surface.

mod dto;
mod routes;
mod state;

pub use dto::{CalculateRequest, CalculateResponse, ErrorResponse, JourneyResult, PathStep};
pub use routes::create_router;
pub use state::AppState;
