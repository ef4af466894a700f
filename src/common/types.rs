//! Common types used throughout highway_planner

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

/// Path represented as a sequence of 2D world points
#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        assert_eq!(x.len(), y.len());
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Drop the first `n` points, as the path follower does when it drives
    /// over them.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.points.len());
        self.points.drain(..n);
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Kinematic state in road-relative (Frenet) coordinates.
///
/// `s` runs along the track centerline and wraps at the track length,
/// `d` is the lateral offset from the left edge of the road.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoadState {
    pub s: f64,
    pub s_dot: f64,
    pub s_ddot: f64,
    pub d: f64,
    pub d_dot: f64,
    pub d_ddot: f64,
}

impl RoadState {
    /// State at rest at the given road position
    pub fn at(s: f64, d: f64) -> Self {
        Self { s, d, ..Self::default() }
    }
}

/// The ego vehicle as reported by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EgoVehicle {
    pub x: f64,
    pub y: f64,
    /// Heading [rad]
    pub yaw: f64,
    /// Speed [m/s]
    pub speed: f64,
    pub s: f64,
    pub d: f64,
}

impl EgoVehicle {
    pub fn new(x: f64, y: f64, yaw: f64, speed: f64, s: f64, d: f64) -> Self {
        Self { x, y, yaw, speed, s, d }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Road-relative state; only the longitudinal speed is known, the
    /// remaining derivatives are taken as zero.
    pub fn to_road_state(&self) -> RoadState {
        RoadState {
            s: self.s,
            s_dot: self.speed,
            d: self.d,
            ..RoadState::default()
        }
    }
}

/// One vehicle reported by sensor fusion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficObservation {
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub s: f64,
    pub d: f64,
}

impl TrafficObservation {
    pub fn new(id: i32, x: f64, y: f64, vx: f64, vy: f64, s: f64, d: f64) -> Self {
        Self { id, x, y, vx, vy, s, d }
    }

    /// Scalar speed from the world velocity components
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Maneuver requested by the behavior layer for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorCommand {
    GoStraight,
    ChangeLaneLeft,
    ChangeLaneRight,
    CompleteLaneChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_xy(&[0.0, 1.0, 1.0], &[0.0, 0.0, 1.0]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_path2d_consume() {
        let mut path = Path2D::from_xy(&[0.0, 1.0, 2.0], &[0.0, 0.0, 0.0]);
        path.consume(2);
        assert_eq!(path.x_coords(), vec![2.0]);
        path.consume(5);
        assert!(path.is_empty());
    }

    #[test]
    fn test_traffic_speed() {
        let car = TrafficObservation::new(3, 0.0, 0.0, 6.0, 8.0, 100.0, 6.0);
        assert!((car.speed() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_ego_to_road_state() {
        let ego = EgoVehicle::new(1.0, 2.0, 0.3, 12.0, 40.0, 6.0);
        let state = ego.to_road_state();
        assert_eq!(state.s, 40.0);
        assert_eq!(state.s_dot, 12.0);
        assert_eq!(state.d, 6.0);
        assert_eq!(state.d_dot, 0.0);
        assert_eq!(state.s_ddot, 0.0);
    }
}
