//! Planned journey records: segments and the itinerary that owns them.
//!
//! These are query results, never persisted. Endpoint fields on a
//! [`Segment`] are plain strings because walking segments use the
//! `START`/`END` markers rather than real stop identifiers.

use serde::Serialize;

use super::{StopId, TransitMode};

/// A single walking instruction attached to a walking segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkingStep {
    /// Human-readable instruction, e.g. "Walk to Majestic (Northeast, 320m)".
    pub instruction: String,

    /// Walk length in whole metres.
    pub distance_meters: u32,

    /// Walk duration in whole seconds.
    pub duration_seconds: u32,
}

/// One traversed edge of a planned journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Route identifier, or [`Segment::WALKING_ROUTE`] for walking legs.
    pub route_id: String,

    /// Route display name.
    pub route_name: String,

    /// Mode of this segment.
    pub mode: TransitMode,

    /// Source stop id, or [`Segment::ORIGIN_MARKER`].
    pub from_stop: String,

    /// Target stop id, or [`Segment::DESTINATION_MARKER`].
    pub to_stop: String,

    /// Source stop display name.
    pub from_stop_name: String,

    /// Target stop display name.
    pub to_stop_name: String,

    /// Travel time in minutes, excluding boarding.
    pub time_min: u32,

    /// Fare cost for this segment.
    pub cost: f64,

    /// Sequence position where the segment starts on its route.
    pub sequence_start: u32,

    /// Sequence position where the segment ends on its route.
    pub sequence_end: u32,

    /// Boarding (and transfer-walk) penalty charged when entering this
    /// segment, in minutes.
    pub boarding_min: u32,

    /// Reserved transfer-dwell minutes. Currently always zero; the
    /// transfer walk is folded into `boarding_min`.
    pub transfer_min: u32,

    /// Walking instructions, only populated on walking segments.
    pub walking_steps: Vec<WalkingStep>,
}

impl Segment {
    /// Synthesized route id carried by walking segments.
    pub const WALKING_ROUTE: &'static str = "WALKING";

    /// `from_stop` marker for the segment leaving the query origin.
    pub const ORIGIN_MARKER: &'static str = "START";

    /// `to_stop` marker for the segment reaching the query destination.
    pub const DESTINATION_MARKER: &'static str = "END";

    /// True if this is a synthesized walking segment.
    pub fn is_walking(&self) -> bool {
        self.route_id == Self::WALKING_ROUTE
    }
}

/// The full planned journey: path, segments, aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    /// Ordered stop ids from boarding stop to alighting stop.
    pub path: Vec<StopId>,

    /// Traversed segments, including any walking legs added by enhancement.
    pub segments: Vec<Segment>,

    /// Total journey time in minutes, including boarding penalties and
    /// (after enhancement) access/egress walking.
    pub total_time: u32,

    /// Total fare cost.
    pub total_cost: f64,

    /// Number of transfers (adjacent segments on differing routes).
    pub transfers: u32,

    /// Total walking time in minutes.
    pub walking_time: u32,

    /// Total walking distance in kilometres.
    pub walking_distance_km: f64,

    /// Walking minutes from the query origin to the first stop.
    pub start_walking_time: u32,

    /// Walking minutes from the last stop to the query destination.
    pub end_walking_time: u32,

    /// Human-readable journey summary.
    pub summary: String,

    /// Estimated CO2 saved versus a private car, in kilograms.
    pub co2_saved_kg: f64,

    /// Estimated calories burned while walking.
    pub calories_burned: u32,
}

impl Itinerary {
    /// The zero-length itinerary for a query whose start and end stop
    /// coincide: single-stop path, no segments, all totals zero.
    pub fn at_destination(stop: StopId) -> Self {
        Itinerary {
            path: vec![stop],
            segments: Vec::new(),
            total_time: 0,
            total_cost: 0.0,
            transfers: 0,
            walking_time: 0,
            walking_distance_km: 0.0,
            start_walking_time: 0,
            end_walking_time: 0,
            summary: "Already at destination".to_string(),
            co2_saved_kg: 0.0,
            calories_burned: 0,
        }
    }

    /// Number of transit (non-walking) segments.
    pub fn transit_segment_count(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_walking()).count()
    }
}
