//! Search configuration for the journey planner.

/// Configuration parameters for journey search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of transfers before a search branch is pruned.
    pub max_transfers: u32,

    /// Weight of one transfer in the transfers-objective priority key.
    /// Transfer count dominates; accumulated time breaks ties.
    pub transfer_priority_weight: u32,

    /// Estimated minutes per intermediate stop on the shared-route
    /// shortcut, used when a route is not materialised as pairwise
    /// connections.
    pub shared_route_min_per_stop: u32,

    /// Estimated fare per intermediate stop on the shared-route shortcut.
    pub shared_route_cost_per_stop: f64,

    /// Nearest-stop candidates tried per endpoint of a coordinate query.
    pub candidate_stops: usize,

    /// Hard cap on emitted execution-trace steps.
    pub max_trace_steps: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_transfers: 5,
            transfer_priority_weight: 100,
            shared_route_min_per_stop: 3,
            shared_route_cost_per_stop: 2.0,
            candidate_stops: 3,
            max_trace_steps: 100,
        }
    }
}
