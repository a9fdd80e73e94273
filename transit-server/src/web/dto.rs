//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::planner::Objective;

/// A raw coordinate pair, validated into a
/// [`GeoPoint`](crate::domain::GeoPoint) by the handlers.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Request to plan a journey between two coordinates.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Start coordinates
    pub start: Coordinate,

    /// End coordinates
    pub end: Coordinate,

    /// What to optimise for; defaults to time
    #[serde(default)]
    pub optimize_for: Objective,
}

/// Request to plan a journey between two stops.
#[derive(Debug, Deserialize)]
pub struct StopRouteRequest {
    pub start_stop_id: String,
    pub end_stop_id: String,

    /// What to optimise for; defaults to time
    #[serde(default)]
    pub optimize_for: Objective,
}

/// Query parameters for stop-name autocomplete.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Name fragment to match
    pub q: String,

    /// Maximum results (capped server-side)
    pub limit: Option<usize>,
}

/// Query parameters for the nearby-stops listing.
#[derive(Debug, Deserialize)]
pub struct NearbyStopsRequest {
    pub lat: f64,
    pub lon: f64,

    /// Maximum results (capped server-side)
    pub limit: Option<usize>,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stops_loaded: usize,
}
