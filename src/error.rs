use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("limit `{name}` must be strictly positive and finite, got {value}")]
    InvalidLimit { name: &'static str, value: f64 },

    #[error("infeasible segment: {reason}")]
    InfeasibleSegment { reason: String },

    #[error("infeasible cruise configuration: {reason}")]
    InfeasibleCruiseConfiguration { reason: String },

    /// never returned, the sample is clamped and this is only logged
    #[error("sample time {time}s is outside of [0, {duration}]s, clamped")]
    SampleOutOfRange { time: f64, duration: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't parse trajectory request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}
