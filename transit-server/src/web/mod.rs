//! Web layer for the transit journey planner.
//!
//! Thin plumbing over the [`JourneyPlanner`](crate::facade::JourneyPlanner)
//! façade: request validation and status-code mapping, no algorithmic
//! logic.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
