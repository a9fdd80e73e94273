//! Multi-modal transit journey planner.
//!
//! Plans journeys between two coordinates (or two named stops) over a
//! network of timed, costed connections grouped into bus and metro
//! routes, optimising for time, fare cost, or transfer count.

pub mod domain;
pub mod enhance;
pub mod facade;
pub mod geo;
pub mod graph;
pub mod planner;
pub mod store;
pub mod web;
