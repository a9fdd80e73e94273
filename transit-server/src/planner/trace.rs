//! Step-by-step execution trace of the journey search.
//!
//! A parallel implementation of the full search that records what the
//! algorithm does instead of only what it returns, for external
//! visualization. The trace mirrors the search's expansion rules,
//! including the path-membership cycle check, so trace and search never
//! disagree about reachability. Output is an append-only sequence of
//! immutable records, capped at the configured step limit.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::Serialize;

use super::search::{Objective, Pathfinder};
use crate::domain::{RouteId, StopId};

/// What the algorithm did at one trace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceAction {
    Initialize,
    SkipVisited,
    ProcessNode,
    AddNeighbors,
    FoundDestination,
    MaxStepsReached,
    NoRouteFound,
}

/// A queued state as shown in a trace record's queue snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedState {
    /// Stop the state would expand.
    pub stop: StopId,

    /// Priority key of the state.
    pub priority: f64,

    /// Path accumulated so far.
    pub path: Vec<StopId>,
}

/// A neighbor pushed during an `AddNeighbors` step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborAdded {
    /// The pushed stop.
    pub stop: StopId,

    /// Its priority key.
    pub priority: f64,

    /// The route the connection belongs to.
    pub via_route: RouteId,
}

/// One immutable record of the traced search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    /// Zero-based step index.
    pub step: usize,

    /// What happened.
    pub action: TraceAction,

    /// Human-readable description of the step.
    pub description: String,

    /// The stop the algorithm was looking at.
    pub current_stop: StopId,

    /// The best five queued states at this point.
    pub queue: Vec<QueuedState>,

    /// Stops expanded so far, in expansion order.
    pub visited: Vec<StopId>,

    /// Path of the current state.
    pub path: Vec<StopId>,

    /// True only on a `FoundDestination` step.
    pub found_destination: bool,

    /// Neighbors pushed, only populated on `AddNeighbors` steps.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub neighbors_added: Vec<NeighborAdded>,
}

/// Queued trace state. Lighter than the search's state: the trace never
/// builds an itinerary, so tracking the previous route id is enough for
/// transfer bookkeeping.
struct TraceState {
    priority: f64,
    seq: u64,
    stop: StopId,
    path: Vec<StopId>,
    last_route: Option<RouteId>,
    transfers: u32,
    total_time: u32,
    total_cost: f64,
}

impl PartialEq for TraceState {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for TraceState {}

impl PartialOrd for TraceState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TraceState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// The best five queued states, by priority then insertion order.
fn queue_snapshot(queue: &BinaryHeap<Reverse<TraceState>>) -> Vec<QueuedState> {
    let mut entries: Vec<&TraceState> = queue.iter().map(|r| &r.0).collect();
    entries.sort_by(|a, b| {
        a.priority
            .total_cmp(&b.priority)
            .then_with(|| a.seq.cmp(&b.seq))
    });
    entries
        .into_iter()
        .take(5)
        .map(|s| QueuedState {
            stop: s.stop.clone(),
            priority: s.priority,
            path: s.path.clone(),
        })
        .collect()
}

impl Pathfinder<'_> {
    /// Trace the full search from `start` to `end`.
    ///
    /// Returns an empty trace when either stop is unknown. Otherwise the
    /// trace always ends in a terminal record: `FoundDestination`,
    /// `NoRouteFound`, or `MaxStepsReached` when the step cap cut the
    /// trace short while the queue still held work.
    pub fn trace(&self, start: &StopId, end: &StopId, objective: Objective) -> Vec<TraceStep> {
        let mut steps: Vec<TraceStep> = Vec::new();
        if self.snapshot.stop(start).is_none() || self.snapshot.stop(end).is_none() {
            return steps;
        }

        let cap = self.config.max_trace_steps;
        // One slot is reserved for the terminal record.
        let reserve = cap.saturating_sub(1);

        let mut queue: BinaryHeap<Reverse<TraceState>> = BinaryHeap::new();
        let mut visited: Vec<StopId> = Vec::new();
        let mut seq = 0u64;
        let mut found = false;
        let mut last_stop = start.clone();
        let mut last_path = vec![start.clone()];

        queue.push(Reverse(TraceState {
            priority: 0.0,
            seq,
            stop: start.clone(),
            path: vec![start.clone()],
            last_route: None,
            transfers: 0,
            total_time: 0,
            total_cost: 0.0,
        }));

        steps.push(TraceStep {
            step: 0,
            action: TraceAction::Initialize,
            description: format!("Initialize search at start stop {start}"),
            current_stop: start.clone(),
            queue: queue_snapshot(&queue),
            visited: visited.clone(),
            path: vec![start.clone()],
            found_destination: false,
            neighbors_added: Vec::new(),
        });

        loop {
            if steps.len() >= reserve {
                break;
            }
            let Some(Reverse(state)) = queue.pop() else {
                break;
            };
            last_stop = state.stop.clone();
            last_path = state.path.clone();

            if visited.contains(&state.stop) {
                steps.push(TraceStep {
                    step: steps.len(),
                    action: TraceAction::SkipVisited,
                    description: format!("Stop {} already visited, skipping", state.stop),
                    current_stop: state.stop.clone(),
                    queue: queue_snapshot(&queue),
                    visited: visited.clone(),
                    path: state.path.clone(),
                    found_destination: false,
                    neighbors_added: Vec::new(),
                });
                continue;
            }
            visited.push(state.stop.clone());

            if &state.stop == end {
                found = true;
                steps.push(TraceStep {
                    step: steps.len(),
                    action: TraceAction::FoundDestination,
                    description: format!(
                        "Destination {} reached with {} transfers",
                        end, state.transfers
                    ),
                    current_stop: state.stop.clone(),
                    queue: Vec::new(),
                    visited: visited.clone(),
                    path: state.path.clone(),
                    found_destination: true,
                    neighbors_added: Vec::new(),
                });
                break;
            }

            steps.push(TraceStep {
                step: steps.len(),
                action: TraceAction::ProcessNode,
                description: format!("Processing stop {}, exploring neighbors", state.stop),
                current_stop: state.stop.clone(),
                queue: queue_snapshot(&queue),
                visited: visited.clone(),
                path: state.path.clone(),
                found_destination: false,
                neighbors_added: Vec::new(),
            });

            let Some(current) = self.snapshot.stop(&state.stop) else {
                continue;
            };

            let mut neighbors: Vec<NeighborAdded> = Vec::new();
            for connection in &current.connections {
                // Same cycle rule as the search: no stop twice in a path.
                if state.path.contains(&connection.to) {
                    continue;
                }
                if self.snapshot.stop(&connection.to).is_none() {
                    continue;
                }

                let last_route = state.last_route.as_ref().map(|r| r.as_str());
                let (penalty, is_transfer) = self.entry_penalty(last_route, &connection.route);

                let new_time = state.total_time + connection.time_min + penalty;
                let new_cost = state.total_cost + connection.cost;
                let new_transfers = state.transfers + u32::from(is_transfer);
                let priority = self.priority_key(objective, new_transfers, new_time, new_cost);

                let mut path = state.path.clone();
                path.push(connection.to.clone());

                seq += 1;
                queue.push(Reverse(TraceState {
                    priority,
                    seq,
                    stop: connection.to.clone(),
                    path,
                    last_route: Some(connection.route.clone()),
                    transfers: new_transfers,
                    total_time: new_time,
                    total_cost: new_cost,
                }));

                neighbors.push(NeighborAdded {
                    stop: connection.to.clone(),
                    priority,
                    via_route: connection.route.clone(),
                });
            }

            if !neighbors.is_empty() && steps.len() < reserve {
                steps.push(TraceStep {
                    step: steps.len(),
                    action: TraceAction::AddNeighbors,
                    description: format!("Added {} neighbors to the queue", neighbors.len()),
                    current_stop: state.stop.clone(),
                    queue: queue_snapshot(&queue),
                    visited: visited.clone(),
                    path: state.path.clone(),
                    found_destination: false,
                    neighbors_added: neighbors,
                });
            }
        }

        if !found {
            let (action, description) = if queue.is_empty() {
                (
                    TraceAction::NoRouteFound,
                    format!(
                        "All reachable stops explored ({}), no route to destination",
                        visited.len()
                    ),
                )
            } else {
                (
                    TraceAction::MaxStepsReached,
                    "Maximum trace steps reached, the full search continues beyond this point"
                        .to_string(),
                )
            };
            steps.push(TraceStep {
                step: steps.len(),
                action,
                description,
                current_stop: last_stop,
                queue: queue_snapshot(&queue),
                visited: visited.clone(),
                path: last_path,
                found_destination: false,
                neighbors_added: Vec::new(),
            });
        }

        steps
    }
}
