//! Journey planning façade: the one entry point external callers use.
//!
//! Orchestrates graph store → pathfinder → enhancer for coordinate
//! queries, memoizes end-to-end results, and exposes the thin stop
//! lookups (autocomplete, nearby stops) the API serves.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{GeoPoint, Itinerary, StopId};
use crate::enhance::enhance;
use crate::graph::{GraphConfig, GraphStore};
use crate::planner::{Objective, Pathfinder, SearchConfig, TraceStep};
use crate::store::TransitStore;

/// Errors a query can fail with before any search runs.
///
/// "No route exists" is not an error: it is the `Ok(None)` outcome.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// A query coordinate is too far from every stop
    #[error("coordinates {0} are outside the service area")]
    OutsideServiceArea(GeoPoint),

    /// A stop id was not found in the network
    #[error("unknown stop id: {0}")]
    UnknownStop(String),
}

/// Configuration for the query result cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached itineraries.
    pub ttl: Duration,

    /// Maximum number of cached itineraries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }
}

/// Cache key: both endpoints rounded to 4 decimal places, plus the
/// objective. Rounding keeps jittery client coordinates (~11 m at 4
/// decimals) from defeating the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    start: (i64, i64),
    end: (i64, i64),
    objective: Objective,
}

impl QueryKey {
    fn new(start: GeoPoint, end: GeoPoint, objective: Objective) -> Self {
        fn round4(value: f64) -> i64 {
            (value * 10_000.0).round() as i64
        }
        Self {
            start: (round4(start.lat()), round4(start.lon())),
            end: (round4(end.lat()), round4(end.lon())),
            objective,
        }
    }
}

/// An autocomplete match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopSuggestion {
    pub stop_id: StopId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A stop near a queried point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStop {
    pub stop_id: StopId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// Size counters for the loaded network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub stops: usize,
    pub routes: usize,
    pub connections: usize,
}

/// The journey planning façade.
pub struct JourneyPlanner<S: TransitStore> {
    store: S,
    graph: GraphStore,
    search: SearchConfig,
    cache: MokaCache<QueryKey, Arc<Itinerary>>,
}

impl<S: TransitStore> JourneyPlanner<S> {
    /// Create a planner with an empty graph; call [`reload`](Self::reload)
    /// to populate it.
    pub fn new(
        store: S,
        graph_config: GraphConfig,
        search_config: SearchConfig,
        cache_config: &CacheConfig,
    ) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(cache_config.ttl)
            .max_capacity(cache_config.max_capacity)
            .build();

        Self {
            store,
            graph: GraphStore::new(graph_config),
            search: search_config,
            cache,
        }
    }

    /// Rebuild the graph snapshot from the backing store and drop every
    /// cached query result.
    pub async fn reload(&self) {
        self.graph.reload(&self.store).await;
        self.cache.invalidate_all();
        info!("journey planner reloaded");
    }

    /// Plan a journey between two coordinates.
    ///
    /// Tries every pairing of the nearest start and end stop candidates
    /// and keeps the itinerary with the lowest objective-specific cost,
    /// with access/egress walking folded in. `Ok(None)` means no pairing
    /// is connected: a definitive negative, never an error.
    pub async fn find_route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        objective: Objective,
    ) -> Result<Option<Itinerary>, PlanError> {
        let snapshot = self.graph.snapshot().await;

        if !snapshot.is_within_service_area(start) {
            return Err(PlanError::OutsideServiceArea(start));
        }
        if !snapshot.is_within_service_area(end) {
            return Err(PlanError::OutsideServiceArea(end));
        }

        let key = QueryKey::new(start, end, objective);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(%start, %end, %objective, "route cache hit");
            return Ok(Some((*hit).clone()));
        }

        let start_candidates = snapshot.nearest_stops(start, self.search.candidate_stops);
        let end_candidates = snapshot.nearest_stops(end, self.search.candidate_stops);
        if start_candidates.is_empty() || end_candidates.is_empty() {
            warn!(%start, %end, "no stops within walking distance");
            return Ok(None);
        }

        let finder = Pathfinder::new(&snapshot, &self.search);
        let mut best: Option<(f64, Itinerary)> = None;

        for (start_stop, _) in &start_candidates {
            for (end_stop, _) in &end_candidates {
                let Some(mut itinerary) = finder.find(start_stop, end_stop, objective) else {
                    debug!(%start_stop, %end_stop, "candidate pair not connected");
                    continue;
                };

                let access = snapshot.walk_from_point(start, start_stop);
                let egress = snapshot.walk_from_point(end, end_stop);
                let (access_min, access_km) =
                    access.map_or((0, 0.0), |w| (w.minutes, w.distance_km));
                let (egress_min, egress_km) =
                    egress.map_or((0, 0.0), |w| (w.minutes, w.distance_km));

                itinerary.walking_time = access_min + egress_min;
                itinerary.walking_distance_km = access_km + egress_km;
                itinerary.total_time += itinerary.walking_time;

                let scalar = self.comparison_cost(&itinerary, objective);
                if best.as_ref().is_none_or(|(lowest, _)| scalar < *lowest) {
                    best = Some((scalar, itinerary));
                }
            }
        }

        let Some((_, winner)) = best else {
            warn!(%start, %end, "no route between any candidate stop pair");
            return Ok(None);
        };

        let enhanced = enhance(&snapshot, winner, start, end);
        info!(
            %start,
            %end,
            %objective,
            total_time = enhanced.total_time,
            transfers = enhanced.transfers,
            "route found"
        );
        self.cache.insert(key, Arc::new(enhanced.clone())).await;
        Ok(Some(enhanced))
    }

    /// Plan a journey between two known stops.
    ///
    /// Unknown ids are a validation failure; no walking legs are added
    /// at this layer, since a stop-to-stop query starts and ends exactly at
    /// the stops.
    pub async fn find_route_by_stops(
        &self,
        start: &StopId,
        end: &StopId,
        objective: Objective,
    ) -> Result<Option<Itinerary>, PlanError> {
        let snapshot = self.graph.snapshot().await;

        if snapshot.stop(start).is_none() {
            return Err(PlanError::UnknownStop(start.to_string()));
        }
        if snapshot.stop(end).is_none() {
            return Err(PlanError::UnknownStop(end.to_string()));
        }

        let finder = Pathfinder::new(&snapshot, &self.search);
        Ok(finder.find(start, end, objective))
    }

    /// Trace the search between two stops for visualization.
    ///
    /// Unknown stops yield an empty trace.
    pub async fn algorithm_trace(
        &self,
        start: &StopId,
        end: &StopId,
        objective: Objective,
    ) -> Vec<TraceStep> {
        let snapshot = self.graph.snapshot().await;
        Pathfinder::new(&snapshot, &self.search).trace(start, end, objective)
    }

    /// Autocomplete: stops whose name contains `query`.
    pub async fn suggest_stops(&self, query: &str, limit: usize) -> Vec<StopSuggestion> {
        let snapshot = self.graph.snapshot().await;
        snapshot
            .stops_matching(query, limit)
            .into_iter()
            .map(|stop| StopSuggestion {
                stop_id: stop.id.clone(),
                name: stop.name.clone(),
                latitude: stop.point.lat(),
                longitude: stop.point.lon(),
            })
            .collect()
    }

    /// Stops within walking distance of a point, nearest first.
    pub async fn nearby_stops(&self, point: GeoPoint, limit: usize) -> Vec<NearbyStop> {
        let snapshot = self.graph.snapshot().await;
        snapshot
            .nearest_stops(point, limit)
            .into_iter()
            .filter_map(|(id, distance_km)| {
                let stop = snapshot.stop(&id)?;
                Some(NearbyStop {
                    stop_id: id,
                    name: stop.name.clone(),
                    latitude: stop.point.lat(),
                    longitude: stop.point.lon(),
                    distance_km,
                })
            })
            .collect()
    }

    /// Size counters for the current snapshot.
    pub async fn stats(&self) -> GraphStats {
        let snapshot = self.graph.snapshot().await;
        GraphStats {
            stops: snapshot.stop_count(),
            routes: snapshot.route_count(),
            connections: snapshot.connection_count(),
        }
    }

    /// The scalar used to compare candidate itineraries.
    ///
    /// `total_time` already includes the walking minutes folded in by
    /// the candidate loop; the time objective still adds `walking_time`
    /// on top, weighting walking-heavy pairings down twice.
    fn comparison_cost(&self, itinerary: &Itinerary, objective: Objective) -> f64 {
        match objective {
            Objective::Time => f64::from(itinerary.total_time + itinerary.walking_time),
            Objective::Cost => itinerary.total_cost,
            Objective::Transfers => f64::from(itinerary.transfers),
        }
    }
}
