//! Journey search over the transit graph.
//!
//! This module implements the core pathfinding algorithm: a
//! label-correcting, Dijkstra-style search with explicit transfer
//! bookkeeping, plus the fast paths for direct connections and shared
//! routes, and a step-by-step execution trace for visualization.

mod config;
mod search;
mod trace;

pub use config::SearchConfig;
pub use search::{Objective, Pathfinder};
pub use trace::{NeighborAdded, QueuedState, TraceAction, TraceStep};
