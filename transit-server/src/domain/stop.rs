//! Stops and the directed connections between them.

use serde::Serialize;

use super::{GeoPoint, RouteId, StopId};

/// Error returned when constructing an invalid connection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid connection to {to}: {reason}")]
pub struct InvalidConnection {
    to: StopId,
    reason: &'static str,
}

/// A directed, timed, costed edge from one stop to another.
///
/// Connections are owned by their source [`Stop`] and carry the route
/// they belong to plus their position in that route's stop ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    /// Target stop.
    pub to: StopId,

    /// Route this edge belongs to.
    pub route: RouteId,

    /// Travel time in whole minutes. Always at least 1.
    pub time_min: u32,

    /// Fare cost in currency units. Never negative.
    pub cost: f64,

    /// 1-based position within the owning route's stop ordering.
    pub sequence: u32,
}

impl Connection {
    /// Construct a connection, enforcing the time and cost invariants.
    pub fn new(
        to: StopId,
        route: RouteId,
        time_min: u32,
        cost: f64,
        sequence: u32,
    ) -> Result<Self, InvalidConnection> {
        if time_min < 1 {
            return Err(InvalidConnection {
                to,
                reason: "travel time must be at least 1 minute",
            });
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(InvalidConnection {
                to,
                reason: "cost must be finite and non-negative",
            });
        }
        Ok(Connection {
            to,
            route,
            time_min,
            cost,
            sequence,
        })
    }
}

/// A boardable location in the transit network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// Unique identifier.
    pub id: StopId,

    /// Display name.
    pub name: String,

    /// Geographic position.
    pub point: GeoPoint,

    /// Outbound edges, in route order.
    pub connections: Vec<Connection>,
}

impl Stop {
    /// Construct a stop with no connections.
    pub fn new(id: StopId, name: impl Into<String>, point: GeoPoint) -> Self {
        Stop {
            id,
            name: name.into(),
            point,
            connections: Vec::new(),
        }
    }

    /// The outbound connection targeting `to`, if one exists.
    pub fn connection_to(&self, to: &StopId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.to == to)
    }
}
