//! Finite-difference velocity and acceleration estimates
//!
//! Derivatives are taken between consecutive samples of one coordinate of the
//! waypoint history. The distance between samples is measured with a
//! caller-supplied metric, so the wrapping longitudinal axis and the plain
//! lateral axis share the same code.

use std::collections::VecDeque;

use log::warn;

use super::waypoint_history::WaypointHistory;
use crate::common::{RoadMap, RoadState};

/// Velocity at `index`: `distance(seq[index], seq[index - 1]) / dt`.
///
/// Returns `None` unless `1 <= index < seq.len()`.
pub fn estimate_velocity<F>(seq: &VecDeque<f64>, index: usize, dt: f64, distance: F) -> Option<f64>
where
    F: Fn(f64, f64) -> f64,
{
    if index < 1 || index >= seq.len() {
        warn!(
            "Cannot estimate velocity at index {} from {} samples",
            index,
            seq.len()
        );
        return None;
    }

    Some(distance(seq[index], seq[index - 1]) / dt)
}

/// Acceleration at `index` from the two velocities ending there.
///
/// Returns `None` unless `2 <= index < seq.len()`.
pub fn estimate_acceleration<F>(seq: &VecDeque<f64>, index: usize, dt: f64, distance: F) -> Option<f64>
where
    F: Fn(f64, f64) -> f64,
{
    if index < 2 || index >= seq.len() {
        warn!(
            "Cannot estimate acceleration at index {} from {} samples",
            index,
            seq.len()
        );
        return None;
    }

    let v1 = estimate_velocity(seq, index, dt, &distance)?;
    let v2 = estimate_velocity(seq, index - 1, dt, &distance)?;
    Some((v1 - v2) / dt)
}

/// Road state at the newest point of the history.
///
/// Returns `None` for an empty history. Derivatives that cannot be estimated
/// from too short a history are reported as zero.
pub fn estimate_road_state<M: RoadMap>(history: &WaypointHistory, dt: f64, map: &M) -> Option<RoadState> {
    let (s, d) = history.back()?;
    let last = history.len() - 1;

    let circular = |a: f64, b: f64| map.circular_distance(a, b);
    let s_seq = history.s_values();
    let d_seq = history.d_values();

    Some(RoadState {
        s,
        s_dot: estimate_velocity(s_seq, last, dt, circular).unwrap_or(0.0),
        s_ddot: estimate_acceleration(s_seq, last, dt, circular).unwrap_or(0.0),
        d,
        d_dot: estimate_velocity(d_seq, last, dt, circular).unwrap_or(0.0),
        d_ddot: estimate_acceleration(d_seq, last, dt, circular).unwrap_or(0.0),
    })
}
