//! Great-circle geometry helpers.
//!
//! Distances use the haversine formula on a spherical earth. At city
//! scale it is accurate to well under 1%, plenty for walking-distance
//! and service-area checks.

use std::fmt;

use crate::domain::GeoPoint;

/// Mean earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat().to_radians();
    let lat_b = b.lat().to_radians();
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Initial bearing from `a` to `b` in degrees, normalised to [0, 360).
pub fn bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat().to_radians();
    let lat_b = b.lat().to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();

    let y = d_lon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Eight-way compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CardinalDirection {
    /// Convert a bearing in degrees to the nearest compass direction.
    ///
    /// Each direction owns a 45°-wide sector centred on its heading, so
    /// 337.5°..22.5° is North, 22.5°..67.5° is Northeast, and so on.
    pub fn from_bearing(bearing: f64) -> Self {
        const DIRECTIONS: [CardinalDirection; 8] = [
            CardinalDirection::North,
            CardinalDirection::Northeast,
            CardinalDirection::East,
            CardinalDirection::Southeast,
            CardinalDirection::South,
            CardinalDirection::Southwest,
            CardinalDirection::West,
            CardinalDirection::Northwest,
        ];
        let normalised = bearing.rem_euclid(360.0);
        let index = ((normalised + 22.5) / 45.0) as usize % 8;
        DIRECTIONS[index]
    }

    /// Human-readable name, as used in walking instructions.
    pub fn name(self) -> &'static str {
        match self {
            CardinalDirection::North => "North",
            CardinalDirection::Northeast => "Northeast",
            CardinalDirection::East => "East",
            CardinalDirection::Southeast => "Southeast",
            CardinalDirection::South => "South",
            CardinalDirection::Southwest => "Southwest",
            CardinalDirection::West => "West",
            CardinalDirection::Northwest => "Northwest",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn zero_distance_for_identical_points() {
        let p = point(12.9716, 77.5946);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn known_distance() {
        // Bangalore city centre to Whitefield, roughly 15.5 km.
        let a = point(12.9716, 77.5946);
        let b = point(12.9698, 77.7500);
        let d = haversine_km(a, b);
        assert!((15.0..17.5).contains(&d), "got {d}");
    }

    #[test]
    fn short_hop_distance() {
        // Two stops ~1.55 km apart.
        let a = point(12.9716, 77.5946);
        let b = point(12.9759, 77.6081);
        let d = haversine_km(a, b);
        assert!((1.4..1.7).contains(&d), "got {d}");
    }

    #[test]
    fn bearing_due_north() {
        let a = point(12.0, 77.0);
        let b = point(13.0, 77.0);
        let bearing = bearing_deg(a, b);
        assert!(bearing < 1.0 || bearing > 359.0, "got {bearing}");
    }

    #[test]
    fn bearing_due_east() {
        let a = point(0.0, 77.0);
        let b = point(0.0, 78.0);
        let bearing = bearing_deg(a, b);
        assert!((89.0..91.0).contains(&bearing), "got {bearing}");
    }

    #[test]
    fn cardinal_sector_boundaries() {
        assert_eq!(
            CardinalDirection::from_bearing(0.0),
            CardinalDirection::North
        );
        assert_eq!(
            CardinalDirection::from_bearing(22.4),
            CardinalDirection::North
        );
        assert_eq!(
            CardinalDirection::from_bearing(22.5),
            CardinalDirection::Northeast
        );
        assert_eq!(CardinalDirection::from_bearing(90.0), CardinalDirection::East);
        assert_eq!(
            CardinalDirection::from_bearing(180.0),
            CardinalDirection::South
        );
        assert_eq!(CardinalDirection::from_bearing(270.0), CardinalDirection::West);
        assert_eq!(
            CardinalDirection::from_bearing(359.9),
            CardinalDirection::North
        );
    }

    #[test]
    fn cardinal_names() {
        assert_eq!(CardinalDirection::Northwest.name(), "Northwest");
        assert_eq!(CardinalDirection::South.to_string(), "South");
    }
}
