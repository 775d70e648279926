// src/error.rs
use std::fmt;

/// Errors raised by the route simulator and its configuration.
///
/// Route data is static, so every variant here means the configuration is
/// broken rather than that a tick hit a transient condition.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The route has no waypoints at all.
    EmptyRoute,
    /// Interpolation needs at least two waypoints.
    TooFewWaypoints(usize),
    /// A waypoint holds a NaN or infinite coordinate.
    NonFiniteCoordinate { index: usize },
    /// A stop index (handoff or initial position) points past the list.
    StopIndexOutOfRange { index: usize, len: usize },
    /// The stop statuses break the completed/current/upcoming ordering.
    InvalidStopSequence(String),
    /// A scheduled stop time is not `HH:MM`.
    InvalidScheduledTime { stop: String, value: String },
    /// The speed range is empty.
    InvalidSpeedRange { min: u32, max: u32 },
    /// The progress step must lie in (0, 1).
    InvalidStep(f64),
    /// Route progress came out NaN or infinite.
    NonFiniteProgress(f64),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::EmptyRoute => write!(f, "Route has no waypoints"),
            SimulationError::TooFewWaypoints(n) => {
                write!(f, "Route needs at least 2 waypoints, found {n}")
            }
            SimulationError::NonFiniteCoordinate { index } => {
                write!(f, "Waypoint {index} has a non-finite coordinate")
            }
            SimulationError::StopIndexOutOfRange { index, len } => {
                write!(f, "Index {index} is out of range for {len} entries")
            }
            SimulationError::InvalidStopSequence(msg) => {
                write!(f, "Invalid stop sequence: {msg}")
            }
            SimulationError::InvalidScheduledTime { stop, value } => {
                write!(f, "Stop '{stop}' has invalid scheduled time '{value}'")
            }
            SimulationError::InvalidSpeedRange { min, max } => {
                write!(f, "Speed range [{min}, {max}) is empty")
            }
            SimulationError::InvalidStep(step) => {
                write!(f, "Progress step {step} must be in (0, 1)")
            }
            SimulationError::NonFiniteProgress(progress) => {
                write!(f, "Route progress {progress} is not a finite number")
            }
        }
    }
}

impl std::error::Error for SimulationError {}
