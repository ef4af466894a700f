//! Common traits defining the planner's collaborator interfaces

/// Road geometry service.
///
/// Converts road-relative coordinates to world coordinates and answers lane
/// queries. The longitudinal axis is circular: `s` wraps back to zero after
/// `track_length()`.
pub trait RoadMap {
    /// Lane number for a lateral offset. Lane 0 is the leftmost lane; offsets
    /// off the road give negative or out-of-table indices.
    fn lane_index(&self, d: f64) -> i32;

    /// World position of the road-relative point `(s, d)`
    fn frenet_to_world(&self, s: f64, d: f64) -> (f64, f64);

    /// Signed longitudinal distance from `s_b` to `s_a`, taking the shorter way
    /// around the track.
    fn circular_distance(&self, s_a: f64, s_b: f64) -> f64;

    /// Length of the longitudinal axis before it wraps
    fn track_length(&self) -> f64;
}

/// Wrap-aware signed difference `a - b` on a circular axis of length `period`,
/// mapped into `[-period / 2, period / 2)`.
pub fn wrapped_difference(a: f64, b: f64, period: f64) -> f64 {
    let half = 0.5 * period;
    (a - b + half).rem_euclid(period) - half
}
