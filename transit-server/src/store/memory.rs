//! In-memory store for tests and demos.

use super::{StoreError, TransitStore};
use crate::domain::{Route, Stop};

/// A [`TransitStore`] holding its network in memory.
///
/// Preserves insertion order, which matters for the stable tie-breaking
/// guarantees of nearest-stop queries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stops: Vec<Stop>,
    routes: Vec<Route>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from prepared stops and routes.
    pub fn from_parts(stops: Vec<Stop>, routes: Vec<Route>) -> Self {
        Self { stops, routes }
    }

    /// Add a stop, returning `self` for chaining.
    pub fn with_stop(mut self, stop: Stop) -> Self {
        self.stops.push(stop);
        self
    }

    /// Add a route, returning `self` for chaining.
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Number of stops held.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}

impl TransitStore for MemoryStore {
    async fn load_stops(&self) -> Result<Vec<Stop>, StoreError> {
        Ok(self.stops.clone())
    }

    async fn load_routes(&self) -> Result<Vec<Route>, StoreError> {
        Ok(self.routes.clone())
    }
}
