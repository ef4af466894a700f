//! Trajectory generation for highway driving
//!
//! # Components
//!
//! - `waypoint_history`: road-relative points already handed to the follower
//! - `kinematic_estimator`: finite difference velocity/acceleration estimates
//! - `target_state`: behavior command to target lane offset and speed
//! - `jerk_minimizing`: quintic boundary value solver
//! - `trajectory_generator`: per-tick orchestration of the above
//!
//! # Example
//!
//! ```no_run
//! use highway_planner::common::{BehaviorCommand, EgoVehicle, Path2D, RoadMap};
//! use highway_planner::config::PlannerConfig;
//! use highway_planner::map::HighwayMap;
//! use highway_planner::path_planning::TrajectoryGenerator;
//!
//! let map = HighwayMap::circular(1000.0, 360, 4.0).unwrap();
//! let config = PlannerConfig {
//!     track_length: map.track_length(),
//!     ..PlannerConfig::default()
//! };
//! let mut generator = TrajectoryGenerator::new(config).unwrap();
//! let ego = EgoVehicle::new(1006.0, 0.0, 1.57, 0.0, 0.0, 6.0);
//!
//! let path = generator
//!     .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &map, &Path2D::new())
//!     .unwrap();
//! assert_eq!(path.len(), 50);
//! ```

pub mod waypoint_history;
pub mod kinematic_estimator;
pub mod target_state;
pub mod jerk_minimizing;
pub mod trajectory_generator;

pub use waypoint_history::WaypointHistory;
pub use kinematic_estimator::{estimate_acceleration, estimate_road_state, estimate_velocity};
pub use target_state::{find_lead_vehicle, LeadVehicle, TargetStateResolver};
pub use jerk_minimizing::{full_boundary, velocity_keeping, PolynomialProfile};
pub use trajectory_generator::{wrap_s, SegmentProfiles, TrajectoryGenerator};
