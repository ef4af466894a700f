//! Road geometry

mod spline;
pub mod highway_map;

pub use highway_map::{HighwayMap, Waypoint};
