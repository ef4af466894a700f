//! Behavior command to target state
//!
//! Turns the maneuver requested by the behavior layer into the end state of
//! the next trajectory segment: a lateral offset and a longitudinal speed.
//! Lateral velocity and acceleration of the target are always zero, so every
//! maneuver ends with the vehicle settled in its lane.

use log::debug;
use ordered_float::OrderedFloat;

use crate::common::{BehaviorCommand, PlannerResult, RoadMap, RoadState, TrafficObservation};
use crate::config::PlannerConfig;

/// Slow-down factor applied to the lead vehicle's speed when following it
/// closer than the minimum tracking gap
pub const CLOSE_FOLLOW_FACTOR: f64 = 0.9;

/// Nearest same-lane vehicle ahead of the ego vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadVehicle {
    pub id: i32,
    pub gap: f64,
    pub speed: f64,
}

/// Resolves behavior commands, remembering the lateral target of the lane
/// change in progress across ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetStateResolver {
    pending_lane_change_d: f64,
}

impl TargetStateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lateral target stored by the last lane change command
    pub fn pending_lane_change_d(&self) -> f64 {
        self.pending_lane_change_d
    }

    /// Target state for `command`, starting from `current`.
    ///
    /// Only `d` and `s_dot` of the result are meaningful.
    pub fn resolve<M: RoadMap>(
        &mut self,
        command: BehaviorCommand,
        current: &RoadState,
        traffic: &[TrafficObservation],
        map: &M,
        config: &PlannerConfig,
    ) -> PlannerResult<RoadState> {
        let lane = map.lane_index(current.d);
        let leftmost_d = config.lane_center(0);
        let rightmost_d = config.lane_center(config.n_lanes() as i32 - 1);

        let (d, s_dot) = match command {
            BehaviorCommand::GoStraight => {
                let s_dot = match find_lead_vehicle(current, traffic, map, config) {
                    Some(lead) if lead.gap < config.min_tracking_gap => {
                        CLOSE_FOLLOW_FACTOR * lead.speed
                    }
                    Some(lead) => lead.speed,
                    None => f64::INFINITY,
                };
                (config.lane_center(lane), s_dot)
            }
            BehaviorCommand::ChangeLaneLeft => {
                let d = config.lane_center(lane - 1).max(leftmost_d);
                self.pending_lane_change_d = d;
                (d, f64::INFINITY)
            }
            BehaviorCommand::ChangeLaneRight => {
                let d = config.lane_center(lane + 1).min(rightmost_d);
                self.pending_lane_change_d = d;
                (d, f64::INFINITY)
            }
            BehaviorCommand::CompleteLaneChange => (self.pending_lane_change_d, f64::INFINITY),
        };

        let limit = config.speed_limit(map.lane_index(d))?;
        let target = RoadState {
            d,
            s_dot: s_dot.min(limit),
            ..RoadState::default()
        };

        debug!(
            "{:?} from lane {}: target d = {:.2}, s_dot = {:.2}",
            command, lane, target.d, target.s_dot
        );

        Ok(target)
    }
}

/// Closest vehicle in the ego lane that is ahead by less than the maximum
/// tracking gap
pub fn find_lead_vehicle<M: RoadMap>(
    current: &RoadState,
    traffic: &[TrafficObservation],
    map: &M,
    config: &PlannerConfig,
) -> Option<LeadVehicle> {
    let ego_lane = map.lane_index(current.d);

    traffic
        .iter()
        .filter(|car| map.lane_index(car.d) == ego_lane)
        .map(|car| LeadVehicle {
            id: car.id,
            gap: map.circular_distance(car.s, current.s),
            speed: car.speed(),
        })
        .filter(|lead| lead.gap > 0.0 && lead.gap < config.max_tracking_gap)
        .min_by_key(|lead| OrderedFloat(lead.gap))
}
