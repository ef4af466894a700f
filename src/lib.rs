//! highway_planner - trajectory generation for highway driving
//!
//! This crate provides the motion planning core of a highway autonomous
//! driving loop: given a behavior command, the ego vehicle state, sensor
//! fusion traffic and the road map, it emits a smooth fixed-length path of
//! world points for the simulator's path follower on every tick.

// Core modules
pub mod common;
pub mod config;
pub mod map;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{BehaviorCommand, EgoVehicle, Path2D, Point2D, RoadState, TrafficObservation};
pub use common::RoadMap;
pub use common::{PlannerError, PlannerResult};
pub use config::PlannerConfig;
pub use map::HighwayMap;
pub use path_planning::TrajectoryGenerator;
