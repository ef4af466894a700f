//! Highway road map
//!
//! Closed-loop track described by sparse centerline waypoints. Each waypoint
//! carries its longitudinal coordinate `s` and the unit normal `(dx, dy)`
//! pointing to the right of the direction of travel, so that a road-relative
//! point `(s, d)` lies at `centerline(s) + d * normal(s)`.

use std::f64::consts::PI;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::spline::CubicSpline;
use crate::common::{wrapped_difference, PlannerError, PlannerResult, RoadMap};

/// One track waypoint, in the column order of the simulator's map file
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub dx: f64,
    pub dy: f64,
}

/// Spline-interpolated highway loop
#[derive(Debug, Clone)]
pub struct HighwayMap {
    waypoints: Vec<Waypoint>,
    lane_width: f64,
    track_length: f64,
    spline_x: CubicSpline,
    spline_y: CubicSpline,
    spline_dx: CubicSpline,
    spline_dy: CubicSpline,
}

impl HighwayMap {
    /// Build the map from waypoints sorted by `s`. The loop is closed by
    /// repeating the first waypoint at `s = track_length`.
    pub fn new(waypoints: Vec<Waypoint>, lane_width: f64, track_length: f64) -> PlannerResult<Self> {
        if waypoints.len() < 2 {
            return Err(PlannerError::InvalidMap(format!(
                "a track needs at least two waypoints, got {}",
                waypoints.len()
            )));
        }
        if !(lane_width > 0.0) {
            return Err(PlannerError::InvalidMap(format!(
                "lane width must be positive, got {}",
                lane_width
            )));
        }
        let last_s = waypoints[waypoints.len() - 1].s;
        if !(track_length > last_s) {
            return Err(PlannerError::InvalidMap(format!(
                "track length {} must exceed the last waypoint s {}",
                track_length, last_s
            )));
        }

        let first = waypoints[0];
        let closing = Waypoint {
            s: first.s + track_length,
            ..first
        };
        let closed = waypoints.iter().chain(std::iter::once(&closing));

        let mut s = Vec::with_capacity(waypoints.len() + 1);
        let mut x = Vec::with_capacity(waypoints.len() + 1);
        let mut y = Vec::with_capacity(waypoints.len() + 1);
        let mut dx = Vec::with_capacity(waypoints.len() + 1);
        let mut dy = Vec::with_capacity(waypoints.len() + 1);
        for wp in closed {
            s.push(wp.s);
            x.push(wp.x);
            y.push(wp.y);
            dx.push(wp.dx);
            dy.push(wp.dy);
        }

        Ok(HighwayMap {
            spline_x: CubicSpline::new(&s, &x)?,
            spline_y: CubicSpline::new(&s, &y)?,
            spline_dx: CubicSpline::new(&s, &dx)?,
            spline_dy: CubicSpline::new(&s, &dy)?,
            waypoints,
            lane_width,
            track_length,
        })
    }

    /// Parse whitespace separated `x y s dx dy` rows
    pub fn from_reader<R: Read>(reader: R, lane_width: f64, track_length: f64) -> PlannerResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let waypoints = rdr
            .deserialize()
            .collect::<Result<Vec<Waypoint>, csv::Error>>()?;

        Self::new(waypoints, lane_width, track_length)
    }

    /// Load a map file in the simulator's format
    pub fn load<P: AsRef<Path>>(path: P, lane_width: f64, track_length: f64) -> PlannerResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, lane_width, track_length)
    }

    /// Ring track of the given centerline radius, driven counter-clockwise.
    /// The right-hand normal points away from the centre, so lane offsets
    /// grow outwards.
    pub fn circular(radius: f64, n_waypoints: usize, lane_width: f64) -> PlannerResult<Self> {
        let track_length = 2.0 * PI * radius;
        let waypoints = (0..n_waypoints)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / n_waypoints as f64;
                Waypoint {
                    x: radius * theta.cos(),
                    y: radius * theta.sin(),
                    s: radius * theta,
                    dx: theta.cos(),
                    dy: theta.sin(),
                }
            })
            .collect();

        Self::new(waypoints, lane_width, track_length)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Heading of the centerline at `s` [rad]
    pub fn heading(&self, s: f64) -> f64 {
        let s = self.wrap_s(s);
        self.spline_y.calc_d(s).atan2(self.spline_x.calc_d(s))
    }

    fn wrap_s(&self, s: f64) -> f64 {
        let first_s = self.waypoints[0].s;
        first_s + (s - first_s).rem_euclid(self.track_length)
    }
}

impl RoadMap for HighwayMap {
    fn lane_index(&self, d: f64) -> i32 {
        (d / self.lane_width).floor() as i32
    }

    fn frenet_to_world(&self, s: f64, d: f64) -> (f64, f64) {
        let s = self.wrap_s(s);

        let mut nx = self.spline_dx.calc(s);
        let mut ny = self.spline_dy.calc(s);
        let norm = nx.hypot(ny);
        if norm > 0.0 {
            nx /= norm;
            ny /= norm;
        }

        (
            self.spline_x.calc(s) + d * nx,
            self.spline_y.calc(s) + d * ny,
        )
    }

    fn circular_distance(&self, s_a: f64, s_b: f64) -> f64 {
        wrapped_difference(s_a, s_b, self.track_length)
    }

    fn track_length(&self) -> f64 {
        self.track_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_circular_frenet_to_world() {
        let map = HighwayMap::circular(500.0, 360, 4.0).unwrap();
        let quarter = 0.25 * map.track_length();

        let (x, y) = map.frenet_to_world(quarter, 6.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(y, 506.0, epsilon = 1e-3);

        // s wraps
        let (xw, yw) = map.frenet_to_world(quarter + map.track_length(), 6.0);
        assert_abs_diff_eq!(x, xw, epsilon = 1e-6);
        assert_abs_diff_eq!(y, yw, epsilon = 1e-6);
    }

    #[test]
    fn test_lane_index() {
        let map = HighwayMap::circular(500.0, 36, 4.0).unwrap();
        assert_eq!(map.lane_index(2.0), 0);
        assert_eq!(map.lane_index(6.0), 1);
        assert_eq!(map.lane_index(11.9), 2);
        assert_eq!(map.lane_index(-0.5), -1);
    }

    #[test]
    fn test_circular_distance() {
        let map = HighwayMap::circular(100.0, 36, 4.0).unwrap();
        let length = map.track_length();
        assert_abs_diff_eq!(map.circular_distance(30.0, 10.0), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(map.circular_distance(5.0, length - 5.0), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(map.circular_distance(length - 5.0, 5.0), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_reader() {
        let rows = "0 0 0 0 -1\n\
                    100 0 100 0 -1\n\
                    100 100 200 1 0\n\
                    0 100 300 0 1\n";
        let map = HighwayMap::from_reader(rows.as_bytes(), 4.0, 400.0).unwrap();
        assert_eq!(map.waypoints().len(), 4);
        assert_eq!(map.waypoints()[2], Waypoint { x: 100.0, y: 100.0, s: 200.0, dx: 1.0, dy: 0.0 });

        let (x, y) = map.frenet_to_world(0.0, 0.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_reader_rejects_bad_rows() {
        let rows = "0 0 0 0\n";
        assert!(matches!(
            HighwayMap::from_reader(rows.as_bytes(), 4.0, 400.0),
            Err(PlannerError::MapParse(_))
        ));
    }

    #[test]
    fn test_track_length_must_close_the_loop() {
        let wps = vec![
            Waypoint { x: 0.0, y: 0.0, s: 0.0, dx: 0.0, dy: -1.0 },
            Waypoint { x: 10.0, y: 0.0, s: 10.0, dx: 0.0, dy: -1.0 },
        ];
        assert!(HighwayMap::new(wps, 4.0, 5.0).is_err());
    }
}
