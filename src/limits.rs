use serde::{Deserialize, Serialize};

use crate::error::TrajectoryError;

fn check(name: &'static str, value: f64) -> Result<f64, TrajectoryError> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(TrajectoryError::InvalidLimit { name, value })
    }
}

/// Bounds for one scalar axis. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    max_vel: f64,
    max_accel: f64,
    max_jerk: f64,
}

impl AxisLimits {
    pub fn new(max_vel: f64, max_accel: f64, max_jerk: f64) -> Result<Self, TrajectoryError> {
        Ok(Self {
            max_vel: check("max_vel", max_vel)?,
            max_accel: check("max_accel", max_accel)?,
            max_jerk: check("max_jerk", max_jerk)?,
        })
    }

    pub fn max_vel(&self) -> f64 {
        self.max_vel
    }

    pub fn max_accel(&self) -> f64 {
        self.max_accel
    }

    pub fn max_jerk(&self) -> f64 {
        self.max_jerk
    }
}

/// Motion limits of the vehicle, translational (m, m/s, ...) and rotational (rad, rad/s, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LimitsConfig", into = "LimitsConfig")]
pub struct Limits {
    translation: AxisLimits,
    rotation: AxisLimits,
}

impl Limits {
    pub fn new(
        max_vel: f64,
        max_accel: f64,
        max_jerk: f64,
        max_rot_vel: f64,
        max_rot_accel: f64,
        max_rot_jerk: f64,
    ) -> Result<Self, TrajectoryError> {
        Ok(Self {
            translation: AxisLimits {
                max_vel: check("max_vel", max_vel)?,
                max_accel: check("max_accel", max_accel)?,
                max_jerk: check("max_jerk", max_jerk)?,
            },
            rotation: AxisLimits {
                max_vel: check("max_rot_vel", max_rot_vel)?,
                max_accel: check("max_rot_accel", max_rot_accel)?,
                max_jerk: check("max_rot_jerk", max_rot_jerk)?,
            },
        })
    }

    pub fn translation(&self) -> AxisLimits {
        self.translation
    }

    pub fn rotation(&self) -> AxisLimits {
        self.rotation
    }
}

/// flat on-disk shape of [`Limits`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LimitsConfig {
    max_vel: f64,
    max_accel: f64,
    max_jerk: f64,
    max_rot_vel: f64,
    max_rot_accel: f64,
    max_rot_jerk: f64,
}

impl TryFrom<LimitsConfig> for Limits {
    type Error = TrajectoryError;

    fn try_from(c: LimitsConfig) -> Result<Self, Self::Error> {
        Limits::new(
            c.max_vel,
            c.max_accel,
            c.max_jerk,
            c.max_rot_vel,
            c.max_rot_accel,
            c.max_rot_jerk,
        )
    }
}

impl From<Limits> for LimitsConfig {
    fn from(l: Limits) -> Self {
        LimitsConfig {
            max_vel: l.translation.max_vel,
            max_accel: l.translation.max_accel,
            max_jerk: l.translation.max_jerk,
            max_rot_vel: l.rotation.max_vel,
            max_rot_accel: l.rotation.max_accel,
            max_rot_jerk: l.rotation.max_jerk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_limits() {
        assert_eq!(
            Limits::new(1., 1., 1., 1., 0., 1.),
            Err(TrajectoryError::InvalidLimit {
                name: "max_rot_accel",
                value: 0.
            })
        );
        assert!(Limits::new(-1., 1., 1., 1., 1., 1.).is_err());
        assert!(AxisLimits::new(1., f64::INFINITY, 1.).is_err());
        assert!(AxisLimits::new(1., 1., f64::NAN).is_err());
    }

    #[test]
    fn splits_translation_and_rotation() {
        let limits = Limits::new(2., 1., 0.5, 0.8, 0.4, 0.2).expect("valid limits");
        assert_eq!(limits.translation().max_vel(), 2.);
        assert_eq!(limits.translation().max_jerk(), 0.5);
        assert_eq!(limits.rotation().max_accel(), 0.4);
    }

    #[test]
    fn deserialization_validates() {
        let ok = r#"{"max_vel": 2, "max_accel": 1, "max_jerk": 1,
                     "max_rot_vel": 1, "max_rot_accel": 1, "max_rot_jerk": 1}"#;
        let limits: Limits = serde_json::from_str(ok).expect("valid limits");
        assert_eq!(limits.translation().max_vel(), 2.);

        let bad = ok.replace("\"max_jerk\": 1", "\"max_jerk\": -1");
        let err = serde_json::from_str::<Limits>(&bad).expect_err("negative jerk");
        assert!(err.to_string().contains("max_jerk"));
    }

    #[test]
    fn serializes_flat() {
        let limits = Limits::new(2., 1., 0.5, 0.8, 0.4, 0.2).expect("valid limits");
        let json = serde_json::to_value(limits).expect("serializable");
        assert_eq!(json["max_rot_vel"], 0.8);
        let back: Limits = serde_json::from_value(json).expect("round trip");
        assert_eq!(back, limits);
    }
}
