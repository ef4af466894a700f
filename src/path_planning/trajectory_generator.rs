//! Highway trajectory generator
//!
//! Produces the fixed-length path handed to the simulator's path follower on
//! every planning tick. The follower drives a number of points between ticks
//! and reports the ones it has not reached yet; the generator re-emits the
//! first few of those unchanged, so the vehicle always has a continuous
//! reference, and appends freshly sampled points from two jerk minimizing
//! profiles:
//!
//! - longitudinal: velocity keeping towards the target speed
//! - lateral: full boundary towards the target lane offset
//!
//! The road-relative coordinates of every emitted point are kept in a
//! [`WaypointHistory`], from which the current velocity and acceleration are
//! estimated on the next tick.

use log::debug;

use super::jerk_minimizing::{full_boundary, velocity_keeping, PolynomialProfile};
use super::kinematic_estimator::estimate_road_state;
use super::target_state::TargetStateResolver;
use super::waypoint_history::WaypointHistory;
use crate::common::{
    BehaviorCommand, EgoVehicle, Path2D, PlannerError, PlannerResult, Point2D, RoadMap, RoadState,
    TrafficObservation,
};
use crate::config::PlannerConfig;

/// Largest accepted difference between the configured and the map track
/// length [m]
const TRACK_LENGTH_TOLERANCE: f64 = 1e-3;

/// Longitudinal and lateral profiles of one new trajectory segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProfiles {
    pub s: PolynomialProfile,
    pub d: PolynomialProfile,
    /// Duration covered by the new points [s]
    pub duration: f64,
}

/// Trajectory generator for one vehicle.
///
/// Holds the only state carried between planning ticks: the history of
/// emitted road-relative points and the pending lane change target. One call
/// to [`TrajectoryGenerator::generate_trajectory`] per tick.
#[derive(Debug, Clone)]
pub struct TrajectoryGenerator {
    config: PlannerConfig,
    history: WaypointHistory,
    resolver: TargetStateResolver,
}

impl TrajectoryGenerator {
    pub fn new(config: PlannerConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            history: WaypointHistory::new(),
            resolver: TargetStateResolver::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn history(&self) -> &WaypointHistory {
        &self.history
    }

    /// Lateral target remembered from the last lane change command
    pub fn pending_lane_change_d(&self) -> f64 {
        self.resolver.pending_lane_change_d()
    }

    /// Forget all cross-tick state, e.g. after the vehicle was relocated
    pub fn reset(&mut self) {
        self.history.clear();
        self.resolver = TargetStateResolver::new();
    }

    /// Plan the path for this tick.
    ///
    /// `previous_path` holds the points of the last emitted path that the
    /// follower has not driven yet. The returned path always holds
    /// `config.total_points` points. Fails with
    /// [`PlannerError::InvalidConfig`] if `config.track_length` differs from
    /// the track length of `map`.
    pub fn generate_trajectory<M: RoadMap>(
        &mut self,
        command: BehaviorCommand,
        ego: &EgoVehicle,
        traffic: &[TrafficObservation],
        map: &M,
        previous_path: &Path2D,
    ) -> PlannerResult<Path2D> {
        if (map.track_length() - self.config.track_length).abs() > TRACK_LENGTH_TOLERANCE {
            return Err(PlannerError::InvalidConfig(format!(
                "track_length ({}) does not match the road map ({})",
                self.config.track_length,
                map.track_length()
            )));
        }

        let total_points = self.config.total_points;
        let mut output = Path2D::with_capacity(total_points);

        // Forget the points the follower drove over since the last tick
        let n_consumed = total_points.saturating_sub(previous_path.len());
        self.history.trim(n_consumed);

        // Re-emit the start of the pending path unchanged
        let n_keep = previous_path.len().min(self.config.retained_points);
        self.history.truncate(n_keep);
        output.points.extend_from_slice(&previous_path.points[..n_keep]);

        let current = self.current_state(ego, previous_path, map);
        let target = self
            .resolver
            .resolve(command, &current, traffic, map, &self.config)?;

        let n_new = total_points - n_keep;
        let (s0, d0) = self.history.back().unwrap_or((ego.s, ego.d));
        let profiles = self.solve_segment(s0, d0, &current, &target, n_new)?;

        debug!(
            "consumed {}, kept {}, new {} over {:.2} s from s = {:.2}, d = {:.2}",
            n_consumed, n_keep, n_new, profiles.duration, s0, d0
        );

        for i in 0..n_new {
            let t = (i + 1) as f64 * self.config.time_step;
            let s = wrap_s(profiles.s.evaluate(t), self.config.track_length);
            let d = profiles.d.evaluate(t);

            self.history.append(s, d);
            output.push(Point2D::from(map.frenet_to_world(s, d)));
        }

        Ok(output)
    }

    /// State the new segment continues from
    fn current_state<M: RoadMap>(&self, ego: &EgoVehicle, previous_path: &Path2D, map: &M) -> RoadState {
        if previous_path.len() < 2 {
            return ego.to_road_state();
        }

        estimate_road_state(&self.history, self.config.time_step, map).unwrap_or_else(|| ego.to_road_state())
    }

    /// Solve both profiles of a segment of `n_new` points starting at
    /// `(s0, d0)`
    fn solve_segment(
        &self,
        s0: f64,
        d0: f64,
        current: &RoadState,
        target: &RoadState,
        n_new: usize,
    ) -> PlannerResult<SegmentProfiles> {
        let duration = n_new as f64 * self.config.time_step;
        if !(duration > 0.0) {
            return Err(PlannerError::DegenerateDuration(duration));
        }

        // Do not ask for more speed than reachable at maximum acceleration
        let v_max = current.s_dot + self.config.max_acceleration * duration;
        let v_target = target.s_dot.min(v_max);

        let s = velocity_keeping(s0, current.s_dot, v_target, duration)?;
        let d = full_boundary(
            d0,
            current.d_dot,
            current.d_ddot,
            target.d,
            target.d_dot,
            target.d_ddot,
            duration,
        )?;

        Ok(SegmentProfiles { s, d, duration })
    }
}

/// Map a longitudinal coordinate into `[0, track_length)`
pub fn wrap_s(s: f64, track_length: f64) -> f64 {
    let wrapped = s.rem_euclid(track_length);
    // rem_euclid rounds tiny negative inputs up to track_length
    if wrapped >= track_length {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::wrapped_difference;
    use approx::assert_abs_diff_eq;

    /// Straight road along x with d pointing to -y
    struct StraightRoad {
        lane_width: f64,
        length: f64,
    }

    impl RoadMap for StraightRoad {
        fn lane_index(&self, d: f64) -> i32 {
            (d / self.lane_width).floor() as i32
        }

        fn frenet_to_world(&self, s: f64, d: f64) -> (f64, f64) {
            (s, -d)
        }

        fn circular_distance(&self, s_a: f64, s_b: f64) -> f64 {
            wrapped_difference(s_a, s_b, self.length)
        }

        fn track_length(&self) -> f64 {
            self.length
        }
    }

    fn road() -> StraightRoad {
        StraightRoad { lane_width: 4.0, length: 1000.0 }
    }

    fn generator() -> TrajectoryGenerator {
        TrajectoryGenerator::new(PlannerConfig {
            track_length: 1000.0,
            ..PlannerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_first_tick_from_rest() {
        let mut gen = generator();
        let ego = EgoVehicle::new(100.0, -6.0, 0.0, 0.0, 100.0, 6.0);

        let path = gen
            .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &road(), &Path2D::new())
            .unwrap();

        assert_eq!(path.len(), 50);
        assert_eq!(gen.history().len(), 50);
        // starting from rest the vehicle creeps forward
        let xs = path.x_coords();
        assert!(xs.windows(2).all(|w| w[1] >= w[0]));
        assert!(xs[0] > 100.0);
        assert!(path.y_coords().iter().all(|y| (*y + 6.0).abs() < 1e-9));
    }

    #[test]
    fn test_retained_points_are_reemitted() {
        let mut gen = generator();
        let ego = EgoVehicle::new(100.0, -6.0, 0.0, 0.0, 100.0, 6.0);
        let map = road();

        let mut pending = gen
            .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &map, &Path2D::new())
            .unwrap();
        pending.consume(5);
        let expected_history_front = gen.history().s_values()[5];

        let path = gen
            .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &map, &pending)
            .unwrap();

        assert_eq!(path.len(), 50);
        assert_eq!(&path.points[..15], &pending.points[..15]);
        assert_eq!(gen.history().len(), 50);
        assert_eq!(gen.history().front().unwrap().0, expected_history_front);
    }

    #[test]
    fn test_history_matches_emitted_points() {
        let mut gen = generator();
        let map = road();
        let ego = EgoVehicle::new(200.0, -2.0, 0.0, 10.0, 200.0, 2.0);

        let mut pending = Path2D::new();
        for _ in 0..20 {
            pending = gen
                .generate_trajectory(BehaviorCommand::ChangeLaneRight, &ego, &[], &map, &pending)
                .unwrap();
            for (p, (s, d)) in pending
                .points
                .iter()
                .zip(gen.history().s_values().iter().zip(gen.history().d_values().iter()))
            {
                assert_abs_diff_eq!(p.x, *s, epsilon = 1e-9);
                assert_abs_diff_eq!(p.y, -*d, epsilon = 1e-9);
            }
            pending.consume(3);
        }
    }

    #[test]
    fn test_speed_builds_up_smoothly() {
        let mut gen = generator();
        let map = road();
        let ego = EgoVehicle::new(0.0, -6.0, 0.0, 0.0, 0.0, 6.0);

        let mut pending = Path2D::new();
        for _ in 0..200 {
            pending = gen
                .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &map, &pending)
                .unwrap();
            pending.consume(10);
        }

        let s = gen.history().s_values();
        let dt = gen.config().time_step;
        let speeds: Vec<f64> = (1..s.len())
            .map(|i| wrapped_difference(s[i], s[i - 1], 1000.0) / dt)
            .collect();

        // settles at the lane limit, never above it
        assert!(speeds.iter().all(|v| *v <= 21.5 + 1e-6));
        assert_abs_diff_eq!(*speeds.last().unwrap(), 21.5, epsilon = 0.05);
    }

    #[test]
    fn test_s_wraps_at_track_length() {
        let mut gen = generator();
        let ego = EgoVehicle::new(999.0, -6.0, 0.0, 20.0, 999.0, 6.0);

        let path = gen
            .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &road(), &Path2D::new())
            .unwrap();

        assert_eq!(path.len(), 50);
        let s = gen.history().s_values();
        assert!(s.iter().all(|s| (0.0..1000.0).contains(s)));
        assert!(s.iter().any(|s| *s < 10.0));
    }

    #[test]
    fn test_lane_change_completion_uses_stored_target() {
        let mut gen = generator();
        let map = road();
        let ego = EgoVehicle::new(0.0, -6.0, 0.0, 15.0, 0.0, 6.0);

        let mut pending = gen
            .generate_trajectory(BehaviorCommand::ChangeLaneLeft, &ego, &[], &map, &Path2D::new())
            .unwrap();
        assert_eq!(gen.pending_lane_change_d(), 2.0);

        for _ in 0..150 {
            pending.consume(3);
            let traffic = [TrafficObservation::new(1, 30.0, -6.0, 5.0, 0.0, 30.0, 6.0)];
            pending = gen
                .generate_trajectory(BehaviorCommand::CompleteLaneChange, &ego, &traffic, &map, &pending)
                .unwrap();
        }

        assert_eq!(gen.pending_lane_change_d(), 2.0);
        let (_, d) = gen.history().back().unwrap();
        assert_abs_diff_eq!(d, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_wrap_s() {
        assert_eq!(wrap_s(1005.0, 1000.0), 5.0);
        assert_eq!(wrap_s(-5.0, 1000.0), 995.0);
        assert_eq!(wrap_s(-1e-18, 1000.0), 0.0);
        assert_eq!(wrap_s(250.0, 1000.0), 250.0);
    }

    #[test]
    fn test_track_length_mismatch_rejected() {
        let mut gen = generator();
        let map = StraightRoad { lane_width: 4.0, length: 1200.0 };
        let ego = EgoVehicle::new(1195.0, -6.0, 0.0, 20.0, 1195.0, 6.0);

        let result = gen.generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &map, &Path2D::new());

        assert!(matches!(result, Err(PlannerError::InvalidConfig(_))));
        assert!(gen.history().is_empty());
    }

    #[test]
    fn test_pending_path_without_history_starts_from_ego() {
        let mut gen = generator();
        let map = road();
        let ego = EgoVehicle::new(300.0, -6.0, 0.0, 10.0, 300.0, 6.0);
        let pending = Path2D::from_xy(&[299.0, 299.5, 300.0], &[-6.0, -6.0, -6.0]);

        let path = gen
            .generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &map, &pending)
            .unwrap();

        assert_eq!(path.len(), 50);
        assert_eq!(&path.points[..3], &pending.points[..]);
        assert_eq!(gen.history().len(), 47);
        // continues from the ego position at the ego speed
        let (s, d) = gen.history().front().unwrap();
        assert_abs_diff_eq!(s, 300.0 + 10.0 * 0.02, epsilon = 1e-3);
        assert_abs_diff_eq!(d, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reset_restarts_from_ego() {
        let mut gen = generator();
        let map = road();
        let ego = EgoVehicle::new(100.0, -6.0, 0.0, 15.0, 100.0, 6.0);

        let mut pending = Path2D::new();
        for _ in 0..10 {
            pending = gen
                .generate_trajectory(BehaviorCommand::ChangeLaneLeft, &ego, &[], &map, &pending)
                .unwrap();
            pending.consume(5);
        }
        assert_eq!(gen.pending_lane_change_d(), 2.0);

        gen.reset();
        assert!(gen.history().is_empty());
        assert_eq!(gen.pending_lane_change_d(), 0.0);

        let relocated = EgoVehicle::new(500.0, -10.0, 0.0, 0.0, 500.0, 10.0);
        let path = gen
            .generate_trajectory(BehaviorCommand::GoStraight, &relocated, &[], &map, &Path2D::new())
            .unwrap();

        assert_eq!(path.len(), 50);
        let (s, d) = gen.history().front().unwrap();
        assert!(s > 500.0 && s < 500.01);
        assert_abs_diff_eq!(d, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_off_road_ego_fails_loudly() {
        let mut gen = generator();
        let ego = EgoVehicle::new(0.0, 1.0, 0.0, 0.0, 0.0, -1.0);

        let result = gen.generate_trajectory(BehaviorCommand::GoStraight, &ego, &[], &road(), &Path2D::new());

        assert!(matches!(result, Err(PlannerError::LaneOutOfRange { lane: -1, .. })));
    }
}
