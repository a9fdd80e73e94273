//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::domain::{GeoPoint, Itinerary, StopId};
use crate::facade::PlanError;
use crate::planner::TraceStep;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/route", post(find_route))
        .route("/api/v1/route/stops", post(find_route_by_stops))
        .route("/api/v1/stops/search", get(search_stops))
        .route("/api/v1/stops/nearby", get(nearby_stops))
        .route("/api/v1/graph/algorithm-steps", post(algorithm_steps))
        .route("/api/v1/graph/stats", get(graph_stats))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.planner.stats().await;
    Json(HealthResponse {
        status: "healthy",
        stops_loaded: stats.stops,
    })
}

/// Plan a journey between two coordinates.
async fn find_route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<Itinerary>, AppError> {
    let start = parse_point(req.start)?;
    let end = parse_point(req.end)?;

    let itinerary = state
        .planner
        .find_route(start, end, req.optimize_for)
        .await?;

    itinerary.map(Json).ok_or_else(|| AppError::NotFound {
        message: "No route found. Check that both points are within walking \
                  distance of a stop."
            .to_string(),
    })
}

/// Plan a journey between two known stops.
async fn find_route_by_stops(
    State(state): State<AppState>,
    Json(req): Json<StopRouteRequest>,
) -> Result<Json<Itinerary>, AppError> {
    let start = parse_stop_id(&req.start_stop_id)?;
    let end = parse_stop_id(&req.end_stop_id)?;

    let itinerary = state
        .planner
        .find_route_by_stops(&start, &end, req.optimize_for)
        .await?;

    itinerary.map(Json).ok_or_else(|| AppError::NotFound {
        message: "No route found between the specified stops".to_string(),
    })
}

/// Stop-name autocomplete.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> impl IntoResponse {
    let limit = req.limit.unwrap_or(10).min(50);
    Json(state.planner.suggest_stops(&req.q, limit).await)
}

/// Stops near a point.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(req): Query<NearbyStopsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let point = parse_point(Coordinate {
        lat: req.lat,
        lon: req.lon,
    })?;
    let limit = req.limit.unwrap_or(5).min(50);
    Ok(Json(state.planner.nearby_stops(point, limit).await))
}

/// Step-by-step search trace for visualization.
async fn algorithm_steps(
    State(state): State<AppState>,
    Json(req): Json<StopRouteRequest>,
) -> Result<Json<Vec<TraceStep>>, AppError> {
    let start = parse_stop_id(&req.start_stop_id)?;
    let end = parse_stop_id(&req.end_stop_id)?;

    Ok(Json(
        state
            .planner
            .algorithm_trace(&start, &end, req.optimize_for)
            .await,
    ))
}

/// Network size counters.
async fn graph_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.planner.stats().await)
}

fn parse_point(coordinate: Coordinate) -> Result<GeoPoint, AppError> {
    GeoPoint::new(coordinate.lat, coordinate.lon).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn parse_stop_id(raw: &str) -> Result<StopId, AppError> {
    StopId::parse(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
