//! JSON description of a move, as handed to the binaries.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ConfigError, TrajectoryError},
    limits::Limits,
    math::{constrained_attitude, to_quaternion, Vec3},
    trajectories::{AnyTrajectory, LongTrajectory, SimultaneousTrajectory},
    waypoint::Waypoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttitudeConfig {
    Quaternion { w: f64, x: f64, y: f64, z: f64 },
    /// radians
    Euler { roll: f64, pitch: f64, yaw: f64 },
}

impl Default for AttitudeConfig {
    fn default() -> Self {
        AttitudeConfig::Quaternion {
            w: 1.,
            x: 0.,
            y: 0.,
            z: 0.,
        }
    }
}

impl AttitudeConfig {
    fn to_quaternion(self) -> na::Quaternion<f64> {
        match self {
            AttitudeConfig::Quaternion { w, x, y, z } => na::Quaternion::new(w, x, y, z),
            AttitudeConfig::Euler { roll, pitch, yaw } => {
                let rpy = constrained_attitude(&Vec3::new(roll, pitch, yaw));
                to_quaternion(rpy.z, rpy.y, rpy.x).into_inner()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointConfig {
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default)]
    pub acceleration: [f64; 3],
    #[serde(default)]
    pub attitude: AttitudeConfig,
    #[serde(default)]
    pub angular_velocity: [f64; 3],
}

impl From<WaypointConfig> for Waypoint {
    fn from(c: WaypointConfig) -> Self {
        Waypoint::new(
            Vec3::from(c.position),
            Vec3::from(c.velocity),
            Vec3::from(c.acceleration),
            c.attitude.to_quaternion(),
            Vec3::from(c.angular_velocity),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CruiseConfig {
    pub ratio: f64,
    pub speed: f64,
}

/// A move between two waypoints. With `cruise` it becomes a [`LongTrajectory`],
/// otherwise a single [`SimultaneousTrajectory`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRequest {
    pub start: WaypointConfig,
    pub end: WaypointConfig,
    pub limits: Limits,
    #[serde(default)]
    pub cruise: Option<CruiseConfig>,
}

impl TrajectoryRequest {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded trajectory request");
        Self::from_json(&json)
    }

    pub fn build(&self) -> Result<AnyTrajectory, TrajectoryError> {
        let start = Waypoint::from(self.start);
        let end = Waypoint::from(self.end);
        Ok(match self.cruise {
            Some(cruise) => {
                LongTrajectory::plan(start, end, self.limits, cruise.ratio, cruise.speed)
                    .init_trajectory()?
                    .into()
            }
            None => SimultaneousTrajectory::new(start, end, &self.limits)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectories::Trajectory;
    use approx::assert_relative_eq;

    const LONG: &str = r#"{
        "start": { "position": [0, 0, 0], "attitude": { "roll": 0, "pitch": 0, "yaw": 0 } },
        "end": { "position": [100, 0, 0], "attitude": { "w": 1, "x": 0, "y": 0, "z": 0 } },
        "limits": { "max_vel": 2, "max_accel": 1, "max_jerk": 1,
                    "max_rot_vel": 1, "max_rot_accel": 1, "max_rot_jerk": 1 },
        "cruise": { "ratio": 0.6, "speed": 2 }
    }"#;

    #[test]
    fn parses_a_long_move() {
        let request = TrajectoryRequest::from_json(LONG).expect("valid request");
        assert_eq!(request.cruise, Some(CruiseConfig { ratio: 0.6, speed: 2. }));
        assert_eq!(request.start.velocity, [0.; 3]);

        let traj = request.build().expect("feasible");
        assert!(matches!(traj, AnyTrajectory::Long(_)));
        assert_relative_eq!(traj.compute_state(traj.get_duration())[0], 100., epsilon = 1e-12);
    }

    #[test]
    fn without_cruise_builds_a_simultaneous_trajectory() {
        let mut request = TrajectoryRequest::from_json(LONG).expect("valid request");
        request.cruise = None;
        request.end.position = [1., 0., 0.];
        assert!(matches!(request.build(), Ok(AnyTrajectory::Simultaneous(_))));
    }

    #[test]
    fn euler_attitudes_are_wrapped() {
        let c = AttitudeConfig::Euler {
            roll: 0.,
            pitch: 0.,
            yaw: 3. * std::f64::consts::PI,
        };
        let q = Waypoint::from(WaypointConfig {
            position: [0.; 3],
            velocity: [0.; 3],
            acceleration: [0.; 3],
            attitude: c,
            angular_velocity: [0.; 3],
        })
        .attitude();
        assert_relative_eq!(q.angle(), std::f64::consts::PI, epsilon = 1e-9);
    }

    #[test]
    fn invalid_limits_fail_to_parse() {
        let bad = LONG.replace("\"max_accel\": 1", "\"max_accel\": 0");
        assert!(matches!(
            TrajectoryRequest::from_json(&bad),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TrajectoryRequest::from_path("/nonexistent/request.json").expect_err("no file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
