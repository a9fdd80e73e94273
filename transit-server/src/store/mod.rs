//! Backing-store contract and implementations.
//!
//! The planner core never talks to storage directly: it reads everything
//! through the [`TransitStore`] trait, which keeps the search testable
//! with fixture data and the storage technology swappable.

mod error;
mod json;
mod memory;

pub use error::StoreError;
pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::domain::{Route, Stop, StopId};

/// Read contract for transit network data.
///
/// Implementations return fully validated domain types; records that
/// fail validation are skipped at the store boundary, not surfaced to
/// the search.
pub trait TransitStore: Send + Sync {
    /// List every stop, with its ordered outbound connections.
    fn load_stops(&self) -> impl Future<Output = Result<Vec<Stop>, StoreError>> + Send;

    /// List every route, with its ordered stop ids.
    fn load_routes(&self) -> impl Future<Output = Result<Vec<Route>, StoreError>> + Send;

    /// Routes whose stop list contains both `a` and `b`.
    ///
    /// The default implementation filters [`load_routes`](Self::load_routes);
    /// stores with native query support may push the filter down.
    fn routes_serving(
        &self,
        a: &StopId,
        b: &StopId,
    ) -> impl Future<Output = Result<Vec<Route>, StoreError>> + Send {
        async move {
            let routes = self.load_routes().await?;
            Ok(routes
                .into_iter()
                .filter(|r| r.serves_both(a, b))
                .collect())
        }
    }
}
