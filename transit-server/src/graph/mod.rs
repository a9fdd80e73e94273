//! In-memory graph snapshot and geometric queries.
//!
//! The [`GraphStore`] holds the authoritative copy of the stop/route
//! network. Reloads build a fresh [`Snapshot`] and swap it in atomically,
//! so a query that grabbed the previous snapshot keeps a consistent view
//! for its whole lifetime and never observes a half-rebuilt cache.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::domain::{GeoPoint, Route, RouteId, Stop, StopId, TransitMode};
use crate::geo::haversine_km;
use crate::store::TransitStore;

/// Tuning parameters for geometric queries and boarding penalties.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Assumed walking speed in km/h.
    pub walking_speed_kmh: f64,

    /// Maximum distance a rider will walk to or from a stop, in km.
    pub max_walking_distance_km: f64,

    /// Maximum distance from any stop for a coordinate to count as
    /// inside the service area, in km.
    pub max_search_radius_km: f64,

    /// Minutes to board a bus (or any non-metro mode).
    pub bus_boarding_min: u32,

    /// Minutes to board a metro.
    pub metro_boarding_min: u32,

    /// Minutes to walk between platforms on a transfer. Mode-independent.
    pub transfer_walk_min: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 5.0,
            max_walking_distance_km: 0.5,
            max_search_radius_km: 50.0,
            bus_boarding_min: 2,
            metro_boarding_min: 1,
            transfer_walk_min: 3,
        }
    }
}

/// A finite walking-leg estimate.
///
/// Walks past the configured maximum distance have no estimate at all
/// (the query returns `None`), so a `WalkEstimate` is always walkable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkEstimate {
    /// Whole minutes of walking, truncated.
    pub minutes: u32,

    /// Distance in kilometres.
    pub distance_km: f64,
}

/// An immutable view of the transit network at one point in time.
#[derive(Debug)]
pub struct Snapshot {
    stops: HashMap<StopId, Stop>,
    routes: HashMap<RouteId, Route>,
    /// Stop and route ids in store order; keeps distance ties and
    /// "first matching route" lookups deterministic.
    stop_order: Vec<StopId>,
    route_order: Vec<RouteId>,
    config: GraphConfig,
}

impl Snapshot {
    fn empty(config: GraphConfig) -> Self {
        Self {
            stops: HashMap::new(),
            routes: HashMap::new(),
            stop_order: Vec::new(),
            route_order: Vec::new(),
            config,
        }
    }

    fn from_network(stops: Vec<Stop>, routes: Vec<Route>, config: GraphConfig) -> Self {
        let stop_order: Vec<StopId> = stops.iter().map(|s| s.id.clone()).collect();
        let route_order: Vec<RouteId> = routes.iter().map(|r| r.id.clone()).collect();
        Self {
            stops: stops.into_iter().map(|s| (s.id.clone(), s)).collect(),
            routes: routes.into_iter().map(|r| (r.id.clone(), r)).collect(),
            stop_order,
            route_order,
            config,
        }
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    /// Look up a route by id.
    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    /// True if no stops are loaded.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Number of stops.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Total number of directed connections.
    pub fn connection_count(&self) -> usize {
        self.stops.values().map(|s| s.connections.len()).sum()
    }

    /// The geometry-and-penalty configuration this snapshot was built with.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Coordinates of a stop, if known.
    pub fn coordinates_of(&self, id: &StopId) -> Option<GeoPoint> {
        self.stops.get(id).map(|s| s.point)
    }

    /// Whether a point is close enough to the network to serve.
    ///
    /// An empty snapshot accepts everything: with no stops loaded there
    /// is nothing to measure against, and rejecting would turn a data
    /// outage into a hard validation failure.
    pub fn is_within_service_area(&self, point: GeoPoint) -> bool {
        if self.stops.is_empty() {
            return true;
        }
        self.stops
            .values()
            .map(|s| haversine_km(point, s.point))
            .fold(f64::INFINITY, f64::min)
            <= self.config.max_search_radius_km
    }

    /// Stops within walking distance of a point, nearest first.
    ///
    /// Returns up to `limit` `(stop, distance_km)` pairs. Equal distances
    /// keep store order.
    pub fn nearest_stops(&self, point: GeoPoint, limit: usize) -> Vec<(StopId, f64)> {
        let mut candidates: Vec<(StopId, f64)> = self
            .stop_order
            .iter()
            .filter_map(|id| {
                let stop = self.stops.get(id)?;
                let distance = haversine_km(point, stop.point);
                (distance <= self.config.max_walking_distance_km)
                    .then(|| (id.clone(), distance))
            })
            .collect();

        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates.truncate(limit);
        candidates
    }

    /// Walking estimate from a point to a stop.
    ///
    /// `None` when the stop is unknown or the distance exceeds the
    /// maximum walking distance.
    pub fn walk_from_point(&self, point: GeoPoint, stop: &StopId) -> Option<WalkEstimate> {
        let target = self.coordinates_of(stop)?;
        self.walk_over(haversine_km(point, target))
    }

    /// Walking estimate between two stops.
    pub fn walk_between(&self, a: &StopId, b: &StopId) -> Option<WalkEstimate> {
        let from = self.coordinates_of(a)?;
        let to = self.coordinates_of(b)?;
        self.walk_over(haversine_km(from, to))
    }

    fn walk_over(&self, distance_km: f64) -> Option<WalkEstimate> {
        if distance_km > self.config.max_walking_distance_km {
            return None;
        }
        let minutes = (distance_km / self.config.walking_speed_kmh * 60.0) as u32;
        Some(WalkEstimate {
            minutes,
            distance_km,
        })
    }

    /// Boarding and transfer-walk penalties for a route, in minutes.
    ///
    /// Metro boards faster than bus; unknown routes are treated as bus.
    /// The transfer-walk penalty is the same for every mode.
    pub fn boarding_penalties(&self, route: &RouteId) -> (u32, u32) {
        let mode = self
            .routes
            .get(route)
            .map(|r| r.mode)
            .unwrap_or_default();
        let boarding = match mode {
            TransitMode::Metro => self.config.metro_boarding_min,
            _ => self.config.bus_boarding_min,
        };
        (boarding, self.config.transfer_walk_min)
    }

    /// Routes whose stop list contains both given stops, in store order.
    pub fn routes_serving_both<'a>(
        &'a self,
        a: &'a StopId,
        b: &'a StopId,
    ) -> impl Iterator<Item = &'a Route> {
        self.route_order
            .iter()
            .filter_map(|id| self.routes.get(id))
            .filter(move |r| r.serves_both(a, b))
    }

    /// Stops whose name contains `query`, case-insensitively, in store
    /// order. Autocomplete read-through.
    pub fn stops_matching(&self, query: &str, limit: usize) -> Vec<&Stop> {
        let needle = query.to_lowercase();
        self.stop_order
            .iter()
            .filter_map(|id| self.stops.get(id))
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }
}

/// Shared, reloadable holder of the current [`Snapshot`].
#[derive(Clone)]
pub struct GraphStore {
    inner: Arc<RwLock<Arc<Snapshot>>>,
    config: GraphConfig,
}

impl GraphStore {
    /// Create a store with an empty snapshot.
    pub fn new(config: GraphConfig) -> Self {
        let snapshot = Arc::new(Snapshot::empty(config.clone()));
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
            config,
        }
    }

    /// The current snapshot. Cheap to call; the returned `Arc` stays
    /// valid across concurrent reloads.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.clone()
    }

    /// Rebuild the snapshot from the backing store and swap it in.
    ///
    /// On any read failure the snapshot is reset to empty and the error
    /// is logged, not returned: queries then see "no stops known" rather
    /// than a partially-populated network.
    pub async fn reload<S: TransitStore>(&self, store: &S) {
        let snapshot = match self.build(store).await {
            Ok(snapshot) => {
                info!(
                    stops = snapshot.stop_count(),
                    routes = snapshot.route_count(),
                    connections = snapshot.connection_count(),
                    "graph data loaded"
                );
                snapshot
            }
            Err(e) => {
                error!(error = %e, "failed to load graph data, resetting to empty");
                Snapshot::empty(self.config.clone())
            }
        };

        let mut guard = self.inner.write().await;
        *guard = Arc::new(snapshot);
    }

    async fn build<S: TransitStore>(&self, store: &S) -> Result<Snapshot, crate::store::StoreError> {
        let stops = store.load_stops().await?;
        let routes = store.load_routes().await?;
        Ok(Snapshot::from_network(stops, routes, self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Connection;
    use crate::store::MemoryStore;

    fn stop_id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn route_id(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    fn stop(id: &str, name: &str, lat: f64, lon: f64) -> Stop {
        Stop::new(stop_id(id), name, GeoPoint::new(lat, lon).unwrap())
    }

    fn sample_store() -> MemoryStore {
        let mut s1 = stop("S1", "Majestic", 12.9716, 77.5946);
        s1.connections
            .push(Connection::new(stop_id("S2"), route_id("R1"), 10, 2.0, 1).unwrap());

        MemoryStore::new()
            .with_stop(s1)
            .with_stop(stop("S2", "Halasuru", 12.9759, 77.6081))
            .with_route(Route {
                id: route_id("R1"),
                name: "Purple Line".to_string(),
                mode: TransitMode::Metro,
                stops: vec![stop_id("S1"), stop_id("S2")],
            })
            .with_route(Route {
                id: route_id("R2"),
                name: "Feeder 12".to_string(),
                mode: TransitMode::Bus,
                stops: vec![stop_id("S2")],
            })
    }

    async fn loaded_store() -> GraphStore {
        let graph = GraphStore::new(GraphConfig::default());
        graph.reload(&sample_store()).await;
        graph
    }

    #[tokio::test]
    async fn reload_populates_snapshot() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        assert_eq!(snapshot.stop_count(), 2);
        assert_eq!(snapshot.route_count(), 2);
        assert_eq!(snapshot.connection_count(), 1);
        assert_eq!(
            snapshot.coordinates_of(&stop_id("S1")),
            Some(GeoPoint::new(12.9716, 77.5946).unwrap())
        );
        assert!(snapshot.coordinates_of(&stop_id("S9")).is_none());
    }

    #[tokio::test]
    async fn old_snapshot_survives_reload() {
        let graph = loaded_store().await;
        let before = graph.snapshot().await;

        graph.reload(&MemoryStore::new()).await;

        // The snapshot taken before the reload is untouched.
        assert_eq!(before.stop_count(), 2);
        assert!(graph.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn empty_snapshot_accepts_any_point() {
        let graph = GraphStore::new(GraphConfig::default());
        let snapshot = graph.snapshot().await;

        assert!(snapshot.is_within_service_area(GeoPoint::new(0.0, 0.0).unwrap()));
        assert!(snapshot.is_within_service_area(GeoPoint::new(-89.0, 170.0).unwrap()));
    }

    #[tokio::test]
    async fn service_area_uses_search_radius() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        // At a stop: inside.
        assert!(snapshot.is_within_service_area(GeoPoint::new(12.9716, 77.5946).unwrap()));
        // Another continent: outside.
        assert!(!snapshot.is_within_service_area(GeoPoint::new(51.5, -0.1).unwrap()));
    }

    #[tokio::test]
    async fn nearest_stops_sorted_and_bounded() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        // A point right next to S1: only S1 is within the 0.5 km walking
        // limit; S2 is ~1.5 km away.
        let near_s1 = GeoPoint::new(12.9714, 77.5944).unwrap();
        let nearest = snapshot.nearest_stops(near_s1, 3);
        assert_eq!(nearest.len(), 1);
        assert_eq!(nearest[0].0, stop_id("S1"));
        assert!(nearest[0].1 < 0.1);
    }

    #[tokio::test]
    async fn nearest_stops_ties_keep_store_order() {
        // Two stops at the same coordinates; the one inserted first wins.
        let store = MemoryStore::new()
            .with_stop(stop("A", "First", 12.97, 77.59))
            .with_stop(stop("B", "Second", 12.97, 77.59));
        let graph = GraphStore::new(GraphConfig::default());
        graph.reload(&store).await;
        let snapshot = graph.snapshot().await;

        let nearest = snapshot.nearest_stops(GeoPoint::new(12.97, 77.59).unwrap(), 2);
        assert_eq!(nearest[0].0, stop_id("A"));
        assert_eq!(nearest[1].0, stop_id("B"));
    }

    #[tokio::test]
    async fn walking_time_truncates_minutes() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        // ~0.117 km from S1 at 5 km/h is ~1.4 minutes: truncates to 1.
        let point = GeoPoint::new(12.9716, 77.5957).unwrap();
        let estimate = snapshot.walk_from_point(point, &stop_id("S1")).unwrap();
        assert_eq!(estimate.minutes, 1);
        assert!(estimate.distance_km > 0.0);
    }

    #[tokio::test]
    async fn walking_time_none_past_limit() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        // S1 to S2 is ~1.5 km, past the 0.5 km maximum.
        assert!(snapshot.walk_between(&stop_id("S1"), &stop_id("S2")).is_none());
        // Unknown stop: also none.
        assert!(snapshot
            .walk_from_point(GeoPoint::new(12.97, 77.59).unwrap(), &stop_id("S9"))
            .is_none());
    }

    #[tokio::test]
    async fn walk_between_close_stops() {
        let store = MemoryStore::new()
            .with_stop(stop("A", "First", 12.9716, 77.5946))
            .with_stop(stop("B", "Second", 12.9716, 77.5975));
        let graph = GraphStore::new(GraphConfig::default());
        graph.reload(&store).await;
        let snapshot = graph.snapshot().await;

        let estimate = snapshot.walk_between(&stop_id("A"), &stop_id("B")).unwrap();
        // ~0.31 km at 5 km/h is ~3.8 minutes: truncates to 3.
        assert_eq!(estimate.minutes, 3);
    }

    #[tokio::test]
    async fn walking_minutes_match_formula() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;
        let config = GraphConfig::default();

        let s1 = GeoPoint::new(12.9716, 77.5946).unwrap();
        for (lat, lon) in [(12.9716, 77.5957), (12.9720, 77.5950), (12.9710, 77.5940)] {
            let point = GeoPoint::new(lat, lon).unwrap();
            let measured = crate::geo::haversine_km(point, s1);
            let expected = (measured / config.walking_speed_kmh * 60.0) as u32;

            let estimate = snapshot.walk_from_point(point, &stop_id("S1")).unwrap();
            assert_eq!(estimate.minutes, expected);
            assert_eq!(estimate.distance_km, measured);
        }
    }

    #[tokio::test]
    async fn boarding_penalties_by_mode() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        // R1 is metro, R2 is bus, R9 is unknown (treated as bus).
        assert_eq!(snapshot.boarding_penalties(&route_id("R1")), (1, 3));
        assert_eq!(snapshot.boarding_penalties(&route_id("R2")), (2, 3));
        assert_eq!(snapshot.boarding_penalties(&route_id("R9")), (2, 3));
    }

    #[tokio::test]
    async fn routes_serving_both_stops() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        let s1 = stop_id("S1");
        let s2 = stop_id("S2");
        let serving: Vec<_> = snapshot
            .routes_serving_both(&s1, &s2)
            .collect();
        assert_eq!(serving.len(), 1);
        assert_eq!(serving[0].id, route_id("R1"));
    }

    #[tokio::test]
    async fn stops_matching_is_case_insensitive() {
        let graph = loaded_store().await;
        let snapshot = graph.snapshot().await;

        assert_eq!(snapshot.stops_matching("maje", 10).len(), 1);
        assert_eq!(snapshot.stops_matching("MAJE", 10).len(), 1);
        assert_eq!(snapshot.stops_matching("xyz", 10).len(), 0);
        assert_eq!(snapshot.stops_matching("a", 1).len(), 1);
    }
}
