//! Error types for highway_planner

use thiserror::Error;

/// Main error type for the planner
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A lane index fell outside the per-lane speed limit table
    #[error("Lane {lane} is outside the speed limit table ({n_lanes} lanes)")]
    LaneOutOfRange { lane: i32, n_lanes: usize },

    /// Polynomial solve requested over a zero, negative or non-finite duration
    #[error("Cannot solve a jerk minimizing trajectory over a duration of {0} s")]
    DegenerateDuration(f64),

    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid road map data
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse the configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot parse the map file: {0}")]
    MapParse(#[from] csv::Error),
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::LaneOutOfRange { lane: 4, n_lanes: 3 };
        assert_eq!(
            format!("{}", err),
            "Lane 4 is outside the speed limit table (3 lanes)"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io(_)));
    }
}
