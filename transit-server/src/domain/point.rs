//! Geographic point type.

use std::fmt;

use serde::Serialize;

/// Error returned when constructing an out-of-range point.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinates ({lat}, {lon}): {reason}")]
pub struct InvalidPoint {
    lat: f64,
    lon: f64,
    reason: &'static str,
}

/// A geographic point with validated coordinates.
///
/// Latitude is in [-90, 90], longitude in [-180, 180]. Non-finite values
/// are rejected.
#[derive(Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Construct a point, validating coordinate ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidPoint> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidPoint {
                lat,
                lon,
                reason: "coordinates must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidPoint {
                lat,
                lon,
                reason: "latitude must be between -90 and 90",
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidPoint {
                lat,
                lon,
                reason: "longitude must be between -180 and 180",
            });
        }
        Ok(GeoPoint { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(self) -> f64 {
        self.lon
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
