//! Label-correcting journey search.
//!
//! Finds the best itinerary between two stops for a given objective.
//! The common cases are served by two fast paths (a direct connection,
//! a route known to serve both stops); everything else goes through a
//! priority-queue search with transfer bookkeeping.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::SearchConfig;
use crate::domain::{Connection, Itinerary, RouteId, Segment, Stop, StopId, TransitMode};
use crate::graph::Snapshot;

/// The scalar a search minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Total travel time including boarding and transfer penalties.
    #[default]
    Time,

    /// Total fare cost.
    Cost,

    /// Transfer count, with travel time as the tie-break.
    Transfers,
}

impl Objective {
    /// The lowercase tag used in queries and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Time => "time",
            Objective::Cost => "cost",
            Objective::Transfers => "transfers",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued search state.
///
/// Ordered by priority key, then by insertion sequence: states are not
/// otherwise comparable, and the monotonic counter keeps equal-priority
/// pops deterministic.
struct SearchState {
    priority: f64,
    seq: u64,
    stop: StopId,
    path: Vec<StopId>,
    segments: Vec<Segment>,
    transfers: u32,
    total_time: u32,
    total_cost: f64,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for SearchState {}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Journey search over a single graph snapshot.
pub struct Pathfinder<'a> {
    pub(super) snapshot: &'a Snapshot,
    pub(super) config: &'a SearchConfig,
}

impl<'a> Pathfinder<'a> {
    /// Create a pathfinder over the given snapshot.
    pub fn new(snapshot: &'a Snapshot, config: &'a SearchConfig) -> Self {
        Self { snapshot, config }
    }

    /// Find the best itinerary from `start` to `end`.
    ///
    /// Returns `None` when either stop is unknown or no route exists.
    /// A missing route is a definitive negative: this never synthesizes
    /// a plausible-looking fallback.
    pub fn find(&self, start: &StopId, end: &StopId, objective: Objective) -> Option<Itinerary> {
        let start_stop = self.snapshot.stop(start)?;
        self.snapshot.stop(end)?;

        if start == end {
            return Some(Itinerary::at_destination(start.clone()));
        }

        // Fast path: the start stop has an edge straight to the end stop.
        if let Some(connection) = start_stop.connection_to(end) {
            return self.direct_itinerary(start_stop, connection);
        }

        // Fast path: some route's stop list contains both endpoints,
        // even if the pairwise edges were never materialised.
        if let Some(itinerary) = self.shared_route_itinerary(start, end) {
            return Some(itinerary);
        }

        debug!(start = %start, end = %end, %objective, "no shortcut applies, running full search");
        self.search(start, end, objective)
    }

    /// Route display name and mode, defaulting for unknown routes.
    pub(super) fn route_meta(&self, id: &RouteId) -> (String, TransitMode) {
        match self.snapshot.route(id) {
            Some(route) => (route.name.clone(), route.mode),
            None => (format!("Route {id}"), TransitMode::default()),
        }
    }

    /// Penalty minutes charged when entering a connection, and whether
    /// doing so is a transfer.
    ///
    /// The first boarding of a journey pays the boarding penalty only; a
    /// route change pays boarding plus the transfer walk; staying on the
    /// same route pays nothing.
    pub(super) fn entry_penalty(&self, last_route: Option<&str>, route: &RouteId) -> (u32, bool) {
        let (boarding, transfer_walk) = self.snapshot.boarding_penalties(route);
        match last_route {
            None => (boarding, false),
            Some(prev) if prev != route.as_str() => (boarding + transfer_walk, true),
            Some(_) => (0, false),
        }
    }

    /// The priority key for a candidate state under an objective.
    pub(super) fn priority_key(
        &self,
        objective: Objective,
        transfers: u32,
        total_time: u32,
        total_cost: f64,
    ) -> f64 {
        match objective {
            Objective::Time => f64::from(total_time),
            Objective::Cost => total_cost,
            Objective::Transfers => {
                f64::from(transfers * self.config.transfer_priority_weight)
                    + f64::from(total_time)
            }
        }
    }

    fn transit_segment(
        &self,
        from: &Stop,
        to: &Stop,
        connection: &Connection,
        sequence_start: u32,
        sequence_end: u32,
        boarding_min: u32,
    ) -> Segment {
        let (route_name, mode) = self.route_meta(&connection.route);
        Segment {
            route_id: connection.route.as_str().to_string(),
            route_name,
            mode,
            from_stop: from.id.as_str().to_string(),
            to_stop: to.id.as_str().to_string(),
            from_stop_name: from.name.clone(),
            to_stop_name: to.name.clone(),
            time_min: connection.time_min,
            cost: connection.cost,
            sequence_start,
            sequence_end,
            boarding_min,
            transfer_min: 0,
            walking_steps: Vec::new(),
        }
    }

    /// Build the one-segment itinerary for a direct connection.
    fn direct_itinerary(&self, start_stop: &Stop, connection: &Connection) -> Option<Itinerary> {
        let end_stop = self.snapshot.stop(&connection.to)?;

        let (boarding, _) = self.snapshot.boarding_penalties(&connection.route);
        let (_, mode) = self.route_meta(&connection.route);
        let segment = self.transit_segment(start_stop, end_stop, connection, 1, 2, boarding);

        Some(Itinerary {
            path: vec![start_stop.id.clone(), end_stop.id.clone()],
            segments: vec![segment],
            total_time: connection.time_min + boarding,
            total_cost: connection.cost,
            transfers: 0,
            walking_time: 0,
            walking_distance_km: 0.0,
            start_walking_time: 0,
            end_walking_time: 0,
            summary: format!("Take {} {} direct", mode, connection.route),
            co2_saved_kg: 0.0,
            calories_burned: 0,
        })
    }

    /// Build a synthesized itinerary for a route that serves both stops.
    ///
    /// The per-stop time/cost estimates are a documented approximation:
    /// the route's real connection data may not be materialised at all.
    fn shared_route_itinerary(&self, start: &StopId, end: &StopId) -> Option<Itinerary> {
        let route = self.snapshot.routes_serving_both(start, end).next()?;
        let start_idx = route.position_of(start)?;
        let end_idx = route.position_of(end)?;
        let stops_between = start_idx.abs_diff(end_idx) as u32;

        let travel_time = stops_between * self.config.shared_route_min_per_stop;
        let travel_cost = f64::from(stops_between) * self.config.shared_route_cost_per_stop;
        let (boarding, _) = self.snapshot.boarding_penalties(&route.id);

        let start_stop = self.snapshot.stop(start)?;
        let end_stop = self.snapshot.stop(end)?;

        let segment = Segment {
            route_id: route.id.as_str().to_string(),
            route_name: route.name.clone(),
            mode: route.mode,
            from_stop: start.as_str().to_string(),
            to_stop: end.as_str().to_string(),
            from_stop_name: start_stop.name.clone(),
            to_stop_name: end_stop.name.clone(),
            time_min: travel_time,
            cost: travel_cost,
            sequence_start: 1,
            sequence_end: stops_between + 1,
            boarding_min: boarding,
            transfer_min: 0,
            walking_steps: Vec::new(),
        };

        Some(Itinerary {
            path: vec![start.clone(), end.clone()],
            segments: vec![segment],
            total_time: travel_time + boarding,
            total_cost: travel_cost,
            transfers: 0,
            walking_time: 0,
            walking_distance_km: 0.0,
            start_walking_time: 0,
            end_walking_time: 0,
            summary: format!(
                "Take {} {} for {} stops",
                route.mode, route.name, stops_between
            ),
            co2_saved_kg: 0.0,
            calories_burned: 0,
        })
    }

    /// The full label-correcting search.
    ///
    /// Cycle avoidance is a path-membership check rather than a global
    /// visited set: a stop rejected on one path may still be the right
    /// step on another, so only revisits within the same path are
    /// blocked.
    fn search(&self, start: &StopId, end: &StopId, objective: Objective) -> Option<Itinerary> {
        let mut queue: BinaryHeap<Reverse<SearchState>> = BinaryHeap::new();
        let mut best: HashMap<StopId, f64> = HashMap::new();
        let mut seq = 0u64;

        best.insert(start.clone(), 0.0);
        queue.push(Reverse(SearchState {
            priority: 0.0,
            seq,
            stop: start.clone(),
            path: vec![start.clone()],
            segments: Vec::new(),
            transfers: 0,
            total_time: 0,
            total_cost: 0.0,
        }));

        while let Some(Reverse(state)) = queue.pop() {
            // A better path to this stop was already settled.
            if best.get(&state.stop).is_some_and(|&b| state.priority > b) {
                continue;
            }

            if &state.stop == end {
                debug!(
                    start = %start,
                    end = %end,
                    transfers = state.transfers,
                    total_time = state.total_time,
                    "found path"
                );
                return Some(Itinerary {
                    summary: format!(
                        "Route with {} segments, {} transfers",
                        state.segments.len(),
                        state.transfers
                    ),
                    path: state.path,
                    segments: state.segments,
                    total_time: state.total_time,
                    total_cost: state.total_cost,
                    transfers: state.transfers,
                    walking_time: 0,
                    walking_distance_km: 0.0,
                    start_walking_time: 0,
                    end_walking_time: 0,
                    co2_saved_kg: 0.0,
                    calories_burned: 0,
                });
            }

            if state.transfers >= self.config.max_transfers {
                continue;
            }

            let Some(current) = self.snapshot.stop(&state.stop) else {
                continue;
            };

            for connection in &current.connections {
                if state.path.contains(&connection.to) {
                    continue;
                }
                let Some(next) = self.snapshot.stop(&connection.to) else {
                    continue;
                };

                let last_route = state.segments.last().map(|s| s.route_id.as_str());
                let (penalty, is_transfer) = self.entry_penalty(last_route, &connection.route);

                let new_time = state.total_time + connection.time_min + penalty;
                let new_cost = state.total_cost + connection.cost;
                let new_transfers = state.transfers + u32::from(is_transfer);
                let priority = self.priority_key(objective, new_transfers, new_time, new_cost);

                if best.get(&connection.to).is_none_or(|&b| priority < b) {
                    best.insert(connection.to.clone(), priority);

                    let segment = self.transit_segment(
                        current,
                        next,
                        connection,
                        connection.sequence,
                        connection.sequence + 1,
                        penalty,
                    );

                    let mut path = state.path.clone();
                    path.push(connection.to.clone());
                    let mut segments = state.segments.clone();
                    segments.push(segment);

                    seq += 1;
                    queue.push(Reverse(SearchState {
                        priority,
                        seq,
                        stop: connection.to.clone(),
                        path,
                        segments,
                        transfers: new_transfers,
                        total_time: new_time,
                        total_cost: new_cost,
                    }));
                }
            }
        }

        debug!(start = %start, end = %end, "no path found");
        None
    }
}
