//! Routes (named transit lines) and their modes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{RouteId, StopId};

/// The mode of a transit route.
///
/// Unknown mode tags in stored data fall back to [`TransitMode::Bus`],
/// matching the network data's default. `Walking` only ever appears on
/// synthesized walking segments, never on stored routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Bus,
    Metro,
    Train,
    Tram,
    Walking,
}

impl TransitMode {
    /// Parse a mode tag, defaulting to `Bus` for anything unrecognised.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "metro" => TransitMode::Metro,
            "train" => TransitMode::Train,
            "tram" => TransitMode::Tram,
            "walking" => TransitMode::Walking,
            _ => TransitMode::Bus,
        }
    }

    /// The lowercase tag, as used in summaries and stored data.
    pub fn tag(self) -> &'static str {
        match self {
            TransitMode::Bus => "bus",
            TransitMode::Metro => "metro",
            TransitMode::Train => "train",
            TransitMode::Tram => "tram",
            TransitMode::Walking => "walking",
        }
    }
}

impl Default for TransitMode {
    fn default() -> Self {
        TransitMode::Bus
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named line with an ordered stop sequence.
///
/// Routes are metadata: the search walks [`Connection`](super::Connection)
/// edges, not route stop lists, except for the shared-route shortcut
/// which consults the ordering directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Unique identifier.
    pub id: RouteId,

    /// Display name.
    pub name: String,

    /// Transit mode.
    pub mode: TransitMode,

    /// Ordered member stops.
    pub stops: Vec<StopId>,
}

impl Route {
    /// Position of a stop within this route's ordering.
    pub fn position_of(&self, stop: &StopId) -> Option<usize> {
        self.stops.iter().position(|s| s == stop)
    }

    /// True if this route's stop list contains both given stops.
    pub fn serves_both(&self, a: &StopId, b: &StopId) -> bool {
        self.stops.contains(a) && self.stops.contains(b)
    }
}
