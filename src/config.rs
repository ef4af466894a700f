//! Planner parameters
//!
//! All tunables of the trajectory generator live in [`PlannerConfig`]. The
//! defaults match the highway simulator (50 Hz path follower, three 4 m lanes,
//! 6945.554 m loop). A TOML file may override any subset of them.

use std::convert::TryFrom;
use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{PlannerError, PlannerResult};

/// Parameters of the trajectory generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of points in every emitted path
    pub total_points: usize,

    /// Maximum number of not-yet-driven points re-emitted from the previous
    /// path before new points are appended
    pub retained_points: usize,

    /// Time between consecutive path points.
    ///
    /// Units: seconds
    pub time_step: f64,

    /// Units: meters
    pub lane_width: f64,

    /// Longitudinal acceleration used to cap the target speed.
    ///
    /// Units: meters/second^2
    pub max_acceleration: f64,

    /// Below this gap the lead vehicle is followed slightly slower than its
    /// own speed.
    ///
    /// Units: meters
    pub min_tracking_gap: f64,

    /// Vehicles further ahead than this are ignored.
    ///
    /// Units: meters
    pub max_tracking_gap: f64,

    /// Speed limit of each lane, leftmost first. Its length defines the
    /// number of lanes.
    ///
    /// Units: meters/second
    pub lane_speed_limits: Vec<f64>,

    /// Length of the longitudinal axis before it wraps back to zero.
    ///
    /// Units: meters
    pub track_length: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            total_points: 50,
            retained_points: 15,
            time_step: 0.02,
            lane_width: 4.0,
            max_acceleration: 5.0,
            min_tracking_gap: 15.0,
            max_tracking_gap: 50.0,
            // just under 50 mph
            lane_speed_limits: vec![21.5, 21.5, 21.5],
            track_length: 6945.554,
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a TOML parameter string
    pub fn from_toml_str(params_str: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = toml::from_str(params_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML parameter file
    pub fn load<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let params_str = read_to_string(path)?;
        Self::from_toml_str(&params_str)
    }

    pub fn n_lanes(&self) -> usize {
        self.lane_speed_limits.len()
    }

    /// Speed limit of a lane, failing loudly on an index outside the table
    pub fn speed_limit(&self, lane: i32) -> PlannerResult<f64> {
        usize::try_from(lane)
            .ok()
            .and_then(|i| self.lane_speed_limits.get(i).copied())
            .ok_or(PlannerError::LaneOutOfRange {
                lane,
                n_lanes: self.n_lanes(),
            })
    }

    /// Lateral offset of the centre of a lane
    pub fn lane_center(&self, lane: i32) -> f64 {
        (lane as f64 + 0.5) * self.lane_width
    }

    /// Check the parameters are usable by the generator
    pub fn validate(&self) -> PlannerResult<()> {
        let invalid = |msg: String| -> PlannerResult<()> { Err(PlannerError::InvalidConfig(msg)) };

        if self.total_points == 0 {
            return invalid("total_points must be positive".to_string());
        }
        if self.retained_points >= self.total_points {
            return invalid(format!(
                "retained_points ({}) must be smaller than total_points ({})",
                self.retained_points, self.total_points
            ));
        }
        if !(self.time_step > 0.0) {
            return invalid(format!("time_step must be positive, got {}", self.time_step));
        }
        if !(self.lane_width > 0.0) {
            return invalid(format!("lane_width must be positive, got {}", self.lane_width));
        }
        if !(self.track_length > 0.0) {
            return invalid(format!("track_length must be positive, got {}", self.track_length));
        }
        if !(self.max_acceleration >= 0.0) {
            return invalid(format!(
                "max_acceleration must not be negative, got {}",
                self.max_acceleration
            ));
        }
        if self.lane_speed_limits.is_empty() {
            return invalid("lane_speed_limits must name at least one lane".to_string());
        }
        if self.lane_speed_limits.iter().any(|v| !(*v >= 0.0)) {
            return invalid("lane_speed_limits must not be negative".to_string());
        }
        if !(0.0 <= self.min_tracking_gap && self.min_tracking_gap <= self.max_tracking_gap) {
            return invalid(format!(
                "expected 0 <= min_tracking_gap ({}) <= max_tracking_gap ({})",
                self.min_tracking_gap, self.max_tracking_gap
            ));
        }

        Ok(())
    }
}
