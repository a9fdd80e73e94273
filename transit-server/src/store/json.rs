//! File-backed store reading a JSON network document.
//!
//! The document shape matches the seeded network data:
//!
//! ```json
//! {
//!   "stops": [
//!     {"stop_id": "S1", "name": "Stop 1", "latitude": 12.97, "longitude": 77.59,
//!      "connections": [{"to_stop_id": "S2", "route_id": "R1", "time": 10,
//!                       "cost": 2.0, "sequence": 1}]}
//!   ],
//!   "routes": [
//!     {"route_id": "R1", "name": "Route 1", "route_type": "bus",
//!      "stops": ["S1", "S2"]}
//!   ]
//! }
//! ```
//!
//! Records that fail domain validation are skipped with a warning rather
//! than failing the whole load.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use super::{StoreError, TransitStore};
use crate::domain::{Connection, GeoPoint, Route, RouteId, Stop, StopId, TransitMode};

/// Raw connection record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
struct ConnectionDto {
    to_stop_id: String,
    route_id: String,
    time: u32,
    cost: f64,
    sequence: u32,
}

/// Raw stop record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
struct StopDto {
    stop_id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    connections: Vec<ConnectionDto>,
}

/// Raw route record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
struct RouteDto {
    route_id: String,
    name: String,
    #[serde(default)]
    route_type: Option<String>,
    #[serde(default)]
    stops: Vec<String>,
}

/// The whole network document.
#[derive(Debug, Deserialize)]
struct NetworkDto {
    #[serde(default)]
    stops: Vec<StopDto>,
    #[serde(default)]
    routes: Vec<RouteDto>,
}

/// A [`TransitStore`] backed by a single JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store reading from the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<NetworkDto, StoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl TransitStore for JsonStore {
    async fn load_stops(&self) -> Result<Vec<Stop>, StoreError> {
        let document = self.read_document()?;
        Ok(convert_stops(document.stops))
    }

    async fn load_routes(&self) -> Result<Vec<Route>, StoreError> {
        let document = self.read_document()?;
        Ok(convert_routes(document.routes))
    }
}

fn convert_stops(dtos: Vec<StopDto>) -> Vec<Stop> {
    dtos.into_iter()
        .filter_map(|dto| match convert_stop(&dto) {
            Some(stop) => Some(stop),
            None => {
                warn!(stop_id = %dto.stop_id, "skipping invalid stop record");
                None
            }
        })
        .collect()
}

fn convert_stop(dto: &StopDto) -> Option<Stop> {
    let id = StopId::parse(&dto.stop_id).ok()?;
    let point = GeoPoint::new(dto.latitude, dto.longitude).ok()?;

    let mut stop = Stop::new(id, dto.name.clone(), point);
    for raw in &dto.connections {
        match convert_connection(raw) {
            Some(connection) => stop.connections.push(connection),
            None => {
                warn!(
                    stop_id = %dto.stop_id,
                    to = %raw.to_stop_id,
                    "skipping invalid connection record"
                );
            }
        }
    }
    Some(stop)
}

fn convert_connection(dto: &ConnectionDto) -> Option<Connection> {
    let to = StopId::parse(&dto.to_stop_id).ok()?;
    let route = RouteId::parse(&dto.route_id).ok()?;
    Connection::new(to, route, dto.time, dto.cost, dto.sequence).ok()
}

fn convert_routes(dtos: Vec<RouteDto>) -> Vec<Route> {
    dtos.into_iter()
        .filter_map(|dto| match convert_route(&dto) {
            Some(route) => Some(route),
            None => {
                warn!(route_id = %dto.route_id, "skipping invalid route record");
                None
            }
        })
        .collect()
}

fn convert_route(dto: &RouteDto) -> Option<Route> {
    let id = RouteId::parse(&dto.route_id).ok()?;
    let mode = dto
        .route_type
        .as_deref()
        .map(TransitMode::from_tag)
        .unwrap_or_default();

    // Stop ids that fail to parse are dropped from the ordering; the
    // route itself survives.
    let stops = dto
        .stops
        .iter()
        .filter_map(|s| StopId::parse(s).ok())
        .collect();

    Some(Route {
        id,
        name: dto.name.clone(),
        mode,
        stops,
    })
}
