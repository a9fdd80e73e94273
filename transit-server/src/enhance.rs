//! Route enhancement: turns a bare search result into a user-facing
//! itinerary.
//!
//! Adds walking legs at both ends of the journey, regenerates the
//! human-readable summary, and estimates environmental impact. Transit
//! distances are estimated from segment times and assumed mode speeds;
//! they are deliberately approximate.

use tracing::debug;

use crate::domain::{GeoPoint, Itinerary, Segment, StopId, TransitMode, WalkingStep};
use crate::geo::{CardinalDirection, bearing_deg};
use crate::graph::Snapshot;

/// Assumed walking speed for direction durations, km/h.
const WALKING_SPEED_KMH: f64 = 5.0;

/// Assumed average bus speed for distance estimates, km/h.
const BUS_SPEED_KMH: f64 = 20.0;

/// Assumed average metro speed for distance estimates, km/h.
const METRO_SPEED_KMH: f64 = 35.0;

/// CO2 saved versus a private car, kg per km.
const CO2_SAVED_PER_KM: f64 = 0.21;

/// Calories burned per minute of walking.
const CALORIES_PER_WALKING_MINUTE: f64 = 4.0;

/// Enhance a search result with walking legs, a summary, and impact
/// estimates.
///
/// `origin` and `destination` are the query coordinates; walking legs
/// are added wherever the walk to the first stop or from the last stop
/// takes a positive number of minutes. An itinerary with no segments
/// (same-stop query) is returned unchanged.
pub fn enhance(
    snapshot: &Snapshot,
    mut itinerary: Itinerary,
    origin: GeoPoint,
    destination: GeoPoint,
) -> Itinerary {
    if itinerary.segments.is_empty() {
        return itinerary;
    }

    add_walking_legs(snapshot, &mut itinerary, origin, destination);
    itinerary.summary = build_summary(&itinerary);
    itinerary.co2_saved_kg = estimate_co2_saved(&itinerary);
    itinerary.calories_burned =
        (f64::from(itinerary.walking_time) * CALORIES_PER_WALKING_MINUTE) as u32;

    debug!(
        summary = %itinerary.summary,
        co2_saved_kg = itinerary.co2_saved_kg,
        calories = itinerary.calories_burned,
        "route enhanced"
    );

    itinerary
}

fn add_walking_legs(
    snapshot: &Snapshot,
    itinerary: &mut Itinerary,
    origin: GeoPoint,
    destination: GeoPoint,
) {
    // Access leg: origin to the first stop of the journey.
    if let Some(first) = itinerary.path.first().cloned()
        && let Some(estimate) = snapshot.walk_from_point(origin, &first)
    {
        itinerary.start_walking_time = estimate.minutes;
        if estimate.minutes > 0
            && let Some(stop_point) = snapshot.coordinates_of(&first)
        {
            let name = stop_name(snapshot, &first);
            let step = walking_step(origin, stop_point, &format!("Walk to {name}"));
            itinerary.segments.insert(
                0,
                walking_segment(
                    Segment::ORIGIN_MARKER,
                    first.as_str(),
                    "Your Location",
                    &name,
                    estimate.minutes,
                    0,
                    1,
                    step,
                ),
            );
        }
    }

    // Egress leg: last stop of the journey to the destination.
    if let Some(last) = itinerary.path.last().cloned()
        && let Some(estimate) = snapshot.walk_from_point(destination, &last)
    {
        itinerary.end_walking_time = estimate.minutes;
        if estimate.minutes > 0
            && let Some(stop_point) = snapshot.coordinates_of(&last)
        {
            let name = stop_name(snapshot, &last);
            let step = walking_step(stop_point, destination, "Walk to destination");
            let position = itinerary.segments.len() as u32;
            itinerary.segments.push(walking_segment(
                last.as_str(),
                Segment::DESTINATION_MARKER,
                &name,
                "Your Destination",
                estimate.minutes,
                position,
                position + 1,
                step,
            ));
        }
    }
}

fn stop_name(snapshot: &Snapshot, id: &StopId) -> String {
    snapshot
        .stop(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn walking_step(from: GeoPoint, to: GeoPoint, instruction: &str) -> WalkingStep {
    let distance_km = crate::geo::haversine_km(from, to);
    let distance_meters = (distance_km * 1000.0) as u32;
    let duration_seconds = (distance_km / WALKING_SPEED_KMH * 3600.0) as u32;
    let direction = CardinalDirection::from_bearing(bearing_deg(from, to));

    WalkingStep {
        instruction: format!("{instruction} ({direction}, {distance_meters}m)"),
        distance_meters,
        duration_seconds,
    }
}

#[allow(clippy::too_many_arguments)]
fn walking_segment(
    from_stop: &str,
    to_stop: &str,
    from_name: &str,
    to_name: &str,
    minutes: u32,
    sequence_start: u32,
    sequence_end: u32,
    step: WalkingStep,
) -> Segment {
    Segment {
        route_id: Segment::WALKING_ROUTE.to_string(),
        route_name: "Walking".to_string(),
        mode: TransitMode::Walking,
        from_stop: from_stop.to_string(),
        to_stop: to_stop.to_string(),
        from_stop_name: from_name.to_string(),
        to_stop_name: to_name.to_string(),
        time_min: minutes,
        cost: 0.0,
        sequence_start,
        sequence_end,
        boarding_min: 0,
        transfer_min: 0,
        walking_steps: vec![step],
    }
}

/// Build the journey summary: walk clause, grouped transit clauses, walk
/// clause, joined with arrows.
fn build_summary(itinerary: &Itinerary) -> String {
    let transit: Vec<&Segment> = itinerary
        .segments
        .iter()
        .filter(|s| !s.is_walking())
        .collect();
    if transit.is_empty() {
        return "No route found".to_string();
    }

    let mut clauses: Vec<String> = Vec::new();

    if itinerary.start_walking_time > 0 {
        clauses.push(format!(
            "Walk {}min to {}",
            itinerary.start_walking_time, transit[0].from_stop_name
        ));
    }

    // Consecutive segments on the same route collapse into one clause.
    let mut current: Option<(&Segment, u32)> = None;
    for segment in transit.iter().copied() {
        match current {
            Some((head, count)) if head.route_id == segment.route_id => {
                current = Some((head, count + 1));
            }
            Some((head, count)) => {
                clauses.push(transit_clause(head, count));
                current = Some((segment, 1));
            }
            None => current = Some((segment, 1)),
        }
    }
    if let Some((head, count)) = current {
        clauses.push(transit_clause(head, count));
    }

    if itinerary.end_walking_time > 0 {
        clauses.push(format!(
            "Walk {}min to destination",
            itinerary.end_walking_time
        ));
    }

    clauses.join(" → ")
}

fn transit_clause(segment: &Segment, stops: u32) -> String {
    format!("Take {} {} for {} stops", segment.mode, segment.route_id, stops)
}

/// Estimate CO2 saved versus a private car over the whole journey.
///
/// Transit distance is inferred from segment time minus a per-mode dwell
/// allowance, clamped at zero; walking distance is measured. Only bus
/// and metro segments contribute.
fn estimate_co2_saved(itinerary: &Itinerary) -> f64 {
    let mut total_km = itinerary.walking_distance_km;

    for segment in &itinerary.segments {
        let estimated = match segment.mode {
            TransitMode::Metro => {
                (f64::from(segment.time_min) - 1.0) * (METRO_SPEED_KMH / 60.0)
            }
            TransitMode::Bus => (f64::from(segment.time_min) - 2.0) * (BUS_SPEED_KMH / 60.0),
            _ => continue,
        };
        total_km += estimated.max(0.0);
    }

    (total_km * CO2_SAVED_PER_KM * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Connection, Route, RouteId, Stop};
    use crate::graph::{GraphConfig, GraphStore, Snapshot};
    use crate::planner::{Objective, Pathfinder, SearchConfig};
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn stop_id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn route_id(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    /// Two stops ~330 m apart, connected by one bus edge.
    fn sample_store() -> MemoryStore {
        let mut s1 = Stop::new(
            stop_id("S1"),
            "Majestic",
            GeoPoint::new(12.9716, 77.5946).unwrap(),
        );
        s1.connections
            .push(Connection::new(stop_id("S2"), route_id("R1"), 10, 2.0, 1).unwrap());

        MemoryStore::new()
            .with_stop(s1)
            .with_stop(Stop::new(
                stop_id("S2"),
                "Town Hall",
                GeoPoint::new(12.9716, 77.5976).unwrap(),
            ))
            .with_route(Route {
                id: route_id("R1"),
                name: "Route 1".to_string(),
                mode: TransitMode::Bus,
                stops: Vec::new(),
            })
    }

    async fn snapshot_of(store: MemoryStore) -> Arc<Snapshot> {
        let graph = GraphStore::new(GraphConfig::default());
        graph.reload(&store).await;
        graph.snapshot().await
    }

    fn find(snapshot: &Snapshot, from: &str, to: &str) -> Itinerary {
        let config = SearchConfig::default();
        Pathfinder::new(snapshot, &config)
            .find(&stop_id(from), &stop_id(to), Objective::Time)
            .unwrap()
    }

    #[tokio::test]
    async fn adds_walking_legs_at_both_ends() {
        let snapshot = snapshot_of(sample_store()).await;
        let itinerary = find(&snapshot, "S1", "S2");

        // Origin ~220 m west of S1, destination ~220 m east of S2.
        let origin = GeoPoint::new(12.9716, 77.5926).unwrap();
        let destination = GeoPoint::new(12.9716, 77.5996).unwrap();

        let enhanced = enhance(&snapshot, itinerary, origin, destination);

        let first = enhanced.segments.first().unwrap();
        assert!(first.is_walking());
        assert_eq!(first.from_stop, Segment::ORIGIN_MARKER);
        assert_eq!(first.from_stop_name, "Your Location");
        assert_eq!(first.walking_steps.len(), 1);
        assert!(first.walking_steps[0].instruction.starts_with("Walk to Majestic"));
        assert!(first.walking_steps[0].instruction.contains("m)"));

        let last = enhanced.segments.last().unwrap();
        assert!(last.is_walking());
        assert_eq!(last.to_stop, Segment::DESTINATION_MARKER);
        assert_eq!(last.to_stop_name, "Your Destination");

        assert!(enhanced.start_walking_time > 0);
        assert!(enhanced.end_walking_time > 0);
    }

    #[tokio::test]
    async fn no_walking_leg_when_already_at_stop() {
        let snapshot = snapshot_of(sample_store()).await;
        let itinerary = find(&snapshot, "S1", "S2");

        // Query points exactly at the stops: zero walking minutes.
        let origin = GeoPoint::new(12.9716, 77.5946).unwrap();
        let destination = GeoPoint::new(12.9716, 77.5976).unwrap();

        let enhanced = enhance(&snapshot, itinerary, origin, destination);

        assert!(enhanced.segments.iter().all(|s| !s.is_walking()));
        assert_eq!(enhanced.start_walking_time, 0);
        assert_eq!(enhanced.end_walking_time, 0);
    }

    #[tokio::test]
    async fn summary_brackets_transit_with_walk_clauses() {
        let snapshot = snapshot_of(sample_store()).await;
        let itinerary = find(&snapshot, "S1", "S2");

        let origin = GeoPoint::new(12.9716, 77.5926).unwrap();
        let destination = GeoPoint::new(12.9716, 77.5996).unwrap();

        let enhanced = enhance(&snapshot, itinerary, origin, destination);

        let clauses: Vec<&str> = enhanced.summary.split(" → ").collect();
        assert_eq!(clauses.len(), 3);
        assert!(clauses[0].starts_with("Walk ") && clauses[0].ends_with("to Majestic"));
        assert_eq!(clauses[1], "Take bus R1 for 1 stops");
        assert!(clauses[2].starts_with("Walk ") && clauses[2].ends_with("to destination"));
    }

    #[tokio::test]
    async fn summary_groups_consecutive_same_route_segments() {
        // S1 -R1-> S2 -R1-> S3 -R2-> S4, queried at the stops so no
        // walk clauses appear.
        let store = MemoryStore::new()
            .with_stop({
                let mut s = Stop::new(
                    stop_id("S1"),
                    "One",
                    GeoPoint::new(12.90, 77.50).unwrap(),
                );
                s.connections.push(
                    Connection::new(stop_id("S2"), route_id("R1"), 5, 1.0, 1).unwrap(),
                );
                s
            })
            .with_stop({
                let mut s = Stop::new(
                    stop_id("S2"),
                    "Two",
                    GeoPoint::new(12.95, 77.55).unwrap(),
                );
                s.connections.push(
                    Connection::new(stop_id("S3"), route_id("R1"), 5, 1.0, 2).unwrap(),
                );
                s
            })
            .with_stop({
                let mut s = Stop::new(
                    stop_id("S3"),
                    "Three",
                    GeoPoint::new(13.00, 77.60).unwrap(),
                );
                s.connections.push(
                    Connection::new(stop_id("S4"), route_id("R2"), 5, 1.0, 1).unwrap(),
                );
                s
            })
            .with_stop(Stop::new(
                stop_id("S4"),
                "Four",
                GeoPoint::new(13.05, 77.65).unwrap(),
            ))
            .with_route(Route {
                id: route_id("R1"),
                name: "Route 1".to_string(),
                mode: TransitMode::Bus,
                stops: Vec::new(),
            })
            .with_route(Route {
                id: route_id("R2"),
                name: "Route 2".to_string(),
                mode: TransitMode::Bus,
                stops: Vec::new(),
            });
        let snapshot = snapshot_of(store).await;
        let itinerary = find(&snapshot, "S1", "S4");

        let origin = GeoPoint::new(12.90, 77.50).unwrap();
        let destination = GeoPoint::new(13.05, 77.65).unwrap();
        let enhanced = enhance(&snapshot, itinerary, origin, destination);

        assert_eq!(
            enhanced.summary,
            "Take bus R1 for 2 stops → Take bus R2 for 1 stops"
        );
    }

    #[tokio::test]
    async fn co2_and_calories_estimates() {
        let snapshot = snapshot_of(sample_store()).await;
        let mut itinerary = find(&snapshot, "S1", "S2");
        // Pretend the facade added ten minutes of walking.
        itinerary.walking_time = 10;
        itinerary.walking_distance_km = 0.8;

        let origin = GeoPoint::new(12.9716, 77.5946).unwrap();
        let destination = GeoPoint::new(12.9716, 77.5976).unwrap();
        let enhanced = enhance(&snapshot, itinerary, origin, destination);

        // Bus segment: (10 - 2) min at 20 km/h is 2.667 km; plus 0.8 km
        // walking, times 0.21 kg/km, rounded to 2 decimals.
        let expected = ((0.8 + 8.0 * 20.0 / 60.0) * 0.21 * 100.0_f64).round() / 100.0;
        assert_eq!(enhanced.co2_saved_kg, expected);
        assert_eq!(enhanced.calories_burned, 40);
    }

    #[tokio::test]
    async fn short_bus_hop_clamps_distance_estimate() {
        // A 1-minute bus segment estimates negative distance; clamped to
        // zero so CO2 only counts walking.
        let mut s1 = Stop::new(
            stop_id("A"),
            "A",
            GeoPoint::new(12.9716, 77.5946).unwrap(),
        );
        s1.connections
            .push(Connection::new(stop_id("B"), route_id("R1"), 1, 1.0, 1).unwrap());
        let store = MemoryStore::new()
            .with_stop(s1)
            .with_stop(Stop::new(
                stop_id("B"),
                "B",
                GeoPoint::new(12.9716, 77.5976).unwrap(),
            ))
            .with_route(Route {
                id: route_id("R1"),
                name: "Route 1".to_string(),
                mode: TransitMode::Bus,
                stops: Vec::new(),
            });
        let snapshot = snapshot_of(store).await;
        let itinerary = find(&snapshot, "A", "B");

        let origin = GeoPoint::new(12.9716, 77.5946).unwrap();
        let destination = GeoPoint::new(12.9716, 77.5976).unwrap();
        let enhanced = enhance(&snapshot, itinerary, origin, destination);

        assert_eq!(enhanced.co2_saved_kg, 0.0);
    }

    #[tokio::test]
    async fn empty_itinerary_passes_through() {
        let snapshot = snapshot_of(sample_store()).await;
        let itinerary = Itinerary::at_destination(stop_id("S1"));

        let point = GeoPoint::new(12.9716, 77.5946).unwrap();
        let enhanced = enhance(&snapshot, itinerary.clone(), point, point);

        assert_eq!(enhanced, itinerary);
        assert_eq!(enhanced.summary, "Already at destination");
    }
}
