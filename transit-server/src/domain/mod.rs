//! Domain types for the transit journey planner.
//!
//! These types represent validated transit network data. Invariants are
//! enforced at construction time, so code that receives a `Stop` or a
//! `Connection` can trust it without re-checking.

mod ids;
mod itinerary;
mod point;
mod route;
mod stop;

pub use ids::{InvalidRouteId, InvalidStopId, RouteId, StopId};
pub use itinerary::{Itinerary, Segment, WalkingStep};
pub use point::{GeoPoint, InvalidPoint};
pub use route::{Route, TransitMode};
pub use stop::{Connection, InvalidConnection, Stop};
