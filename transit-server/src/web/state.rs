//! Application state for the web layer.

use std::sync::Arc;

use crate::facade::JourneyPlanner;
use crate::store::JsonStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The journey planning façade.
    pub planner: Arc<JourneyPlanner<JsonStore>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: JourneyPlanner<JsonStore>) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}
