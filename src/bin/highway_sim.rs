// Closed-loop highway simulation
//
// Drives the ego vehicle around a ring track with the trajectory generator in
// the loop. Every tick the path follower consumes a few points of the last
// emitted path, a scripted behavior layer picks the maneuver, and the
// generator plans the next path.
//
// usage: highway_sim [--config params.toml] [--map highway_map.csv]
//                    [--ticks N] [--log-level LEVEL] [--plot out.svg]

use std::error::Error;
use std::f64::consts::PI;

use gnuplot::{AxesCommon, Caption, Color, Figure, PointSize, PointSymbol};
use itertools::Itertools;
use log::{debug, info, LevelFilter};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use highway_planner::common::{BehaviorCommand, EgoVehicle, Path2D, TrafficObservation};
use highway_planner::{HighwayMap, PlannerConfig, RoadMap, TrajectoryGenerator};

// Parameters
const RING_RADIUS: f64 = 1000.0; // centerline radius of the default track [m]
const RING_WAYPOINTS: usize = 360;
const POINTS_PER_TICK: usize = 5; // points driven by the follower between ticks
const N_TRAFFIC: usize = 8;
const SPEED_NOISE: f64 = 0.2; // sensor fusion speed noise [m/s]

struct Args {
    config: Option<String>,
    map: Option<String>,
    ticks: usize,
    log_level: LevelFilter,
    plot: Option<String>,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = Args {
        config: None,
        map: None,
        ticks: 2000,
        log_level: LevelFilter::Info,
        plot: None,
    };

    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().ok_or_else(|| format!("missing value for {}", flag));
        match flag.as_str() {
            "--config" => args.config = Some(value()?),
            "--map" => args.map = Some(value()?),
            "--ticks" => args.ticks = value()?.parse()?,
            "--log-level" => args.log_level = value()?.parse()?,
            "--plot" => args.plot = Some(value()?),
            other => return Err(format!("unknown argument {}", other).into()),
        }
    }

    Ok(args)
}

fn logger_init(min_level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:<5}] {}: {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(min_level)
        .chain(std::io::stdout())
        .apply()
}

/// Simulated vehicle driving at constant speed in its lane
struct TrafficCar {
    id: i32,
    s: f64,
    d: f64,
    speed: f64,
}

impl TrafficCar {
    fn advance(&mut self, dt: f64, track_length: f64) {
        self.s = (self.s + self.speed * dt).rem_euclid(track_length);
    }

    fn observe<R: Rng>(&self, map: &HighwayMap, noise: &Normal<f64>, rng: &mut R) -> TrafficObservation {
        let (x, y) = map.frenet_to_world(self.s, self.d);
        let heading = map.heading(self.s);
        let speed = self.speed + noise.sample(rng);
        TrafficObservation::new(
            self.id,
            x,
            y,
            speed * heading.cos(),
            speed * heading.sin(),
            self.s,
            self.d,
        )
    }
}

/// Scripted behavior layer: cruise, then move one lane left and later one
/// lane right. A lane change counts as done once the ego vehicle is within
/// half a meter of the target lane centre.
struct ScriptedBehavior {
    next_change: usize,
    changing_to: Option<f64>,
}

impl ScriptedBehavior {
    const SCRIPT: [(usize, BehaviorCommand); 2] = [
        (300, BehaviorCommand::ChangeLaneLeft),
        (900, BehaviorCommand::ChangeLaneRight),
    ];

    fn new() -> Self {
        Self { next_change: 0, changing_to: None }
    }

    fn decide(&mut self, tick: usize, ego: &EgoVehicle) -> BehaviorCommand {
        if let Some(target_d) = self.changing_to {
            if (ego.d - target_d).abs() < 0.5 {
                self.changing_to = None;
                return BehaviorCommand::GoStraight;
            }
            return BehaviorCommand::CompleteLaneChange;
        }

        match Self::SCRIPT.get(self.next_change) {
            Some(&(at, command)) if tick >= at => {
                self.next_change += 1;
                info!("tick {}: {:?}", tick, command);
                command
            }
            _ => BehaviorCommand::GoStraight,
        }
    }

    /// Track the lane change target stored by the generator
    fn started(&mut self, target_d: f64) {
        self.changing_to = Some(target_d);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    logger_init(args.log_level)?;

    info!("Highway simulation start!");

    let config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    let map = match &args.map {
        Some(path) => HighwayMap::load(path, config.lane_width, config.track_length)?,
        None => {
            let map = HighwayMap::circular(RING_RADIUS, RING_WAYPOINTS, config.lane_width)?;
            info!("Using a {:.1} m ring track", map.track_length());
            map
        }
    };
    let config = PlannerConfig {
        track_length: map.track_length(),
        ..config
    };
    let dt = config.time_step;
    let mut generator = TrajectoryGenerator::new(config)?;
    debug!("Planner parameters:\n{}", toml::to_string(generator.config())?);

    let mut rng = rand::thread_rng();
    let noise = Normal::new(0.0, SPEED_NOISE)?;
    let lane_dist = Uniform::new(0, generator.config().n_lanes());
    let mut traffic: Vec<TrafficCar> = (0..N_TRAFFIC)
        .map(|i| TrafficCar {
            id: i as i32,
            s: rng.gen_range(50.0..map.track_length()),
            d: generator.config().lane_center(lane_dist.sample(&mut rng) as i32),
            speed: rng.gen_range(12.0..20.0),
        })
        .collect();

    let start_d = generator.config().lane_center(1);
    let (x0, y0) = map.frenet_to_world(0.0, start_d);
    let mut ego = EgoVehicle::new(x0, y0, map.heading(0.0), 0.0, 0.0, start_d);
    let mut behavior = ScriptedBehavior::new();
    let mut pending = Path2D::new();
    let mut driven = Path2D::new();
    driven.push(ego.position());

    for tick in 0..args.ticks {
        let observations: Vec<TrafficObservation> = traffic
            .iter()
            .map(|car| car.observe(&map, &noise, &mut rng))
            .collect();

        let command = behavior.decide(tick, &ego);
        let path = generator.generate_trajectory(command, &ego, &observations, &map, &pending)?;
        if let BehaviorCommand::ChangeLaneLeft | BehaviorCommand::ChangeLaneRight = command {
            behavior.started(generator.pending_lane_change_d());
        }

        // Follower drives the first points of the new path
        let n_driven = POINTS_PER_TICK.min(path.len());
        let history = generator.history();
        let (s, d) = (history.s_values()[n_driven - 1], history.d_values()[n_driven - 1]);
        let last = path.points[n_driven - 1];
        let before = if n_driven >= 2 { path.points[n_driven - 2] } else { ego.position() };
        ego = EgoVehicle::new(
            last.x,
            last.y,
            (last.y - before.y).atan2(last.x - before.x),
            last.distance(&before) / dt,
            s,
            d,
        );
        for p in &path.points[..n_driven] {
            driven.push(*p);
        }

        pending = path;
        pending.consume(n_driven);

        for car in traffic.iter_mut() {
            car.advance(n_driven as f64 * dt, map.track_length());
        }

        if tick % 100 == 0 {
            info!(
                "tick {:5}: s = {:8.2}, d = {:5.2}, speed = {:5.2} m/s, lane {}",
                tick,
                ego.s,
                ego.d,
                ego.speed,
                map.lane_index(ego.d)
            );
        }
    }

    let max_speed = driven
        .points
        .iter()
        .tuple_windows()
        .map(|(a, b)| a.distance(b) / dt)
        .fold(0.0, f64::max);
    info!(
        "Drove {:.1} m, max speed {:.2} m/s",
        driven.total_length(),
        max_speed
    );

    if let Some(out) = &args.plot {
        let ref_x: Vec<f64> = (0..=RING_WAYPOINTS)
            .map(|i| map.frenet_to_world(map.track_length() * i as f64 / RING_WAYPOINTS as f64, 0.0).0)
            .collect();
        let ref_y: Vec<f64> = (0..=RING_WAYPOINTS)
            .map(|i| map.frenet_to_world(map.track_length() * i as f64 / RING_WAYPOINTS as f64, 0.0).1)
            .collect();
        let car_x: Vec<f64> = traffic.iter().map(|c| map.frenet_to_world(c.s, c.d).0).collect();
        let car_y: Vec<f64> = traffic.iter().map(|c| map.frenet_to_world(c.s, c.d).1).collect();

        let mut fig = Figure::new();
        fig.axes2d()
            .set_title("Highway Trajectory", &[])
            .set_x_label("x [m]", &[])
            .set_y_label("y [m]", &[])
            .set_aspect_ratio(gnuplot::AutoOption::Fix(1.0))
            .lines(&ref_x, &ref_y, &[Caption("Road edge"), Color("gray")])
            .lines(&driven.x_coords(), &driven.y_coords(), &[Caption("Ego"), Color("green")])
            .points(&car_x, &car_y, &[Caption("Traffic"), Color("black"), PointSymbol('O'), PointSize(2.0)])
            .points(&[ego.x], &[ego.y], &[Caption("Vehicle"), Color("red"), PointSymbol('*'), PointSize(3.0)]);
        fig.save_to_svg(out.as_str(), 640, 640)
            .map_err(|e| format!("cannot save plot: {:?}", e))?;
        info!("Plot saved to {}", out);
    }

    info!("Done! heading {:.1} deg", ego.yaw * 180.0 / PI);
    Ok(())
}
