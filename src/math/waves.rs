//! Range wrapping for Euler angles.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::Vec3;

/// sawtooth of amplitude `max`, e.g. wraps angles into `[-max, max]`
pub fn sawtooth_wave(x: f64, period: f64, max: f64) -> f64 {
    max * 2. * (x / period - (0.5 + x / period).floor())
}

/// triangle of amplitude `max`, folds back instead of jumping
pub fn triangular_wave(x: f64, period: f64, max: f64) -> f64 {
    let f = (0.5 + 2. * x / period).floor();
    let flip = if f.rem_euclid(2.) == 0. { 1. } else { -1. };
    max * 2. * (2. * x / period - f) * flip
}

/// roll and yaw live in [-pi, pi]
pub fn roll_yaw_map(x: f64) -> f64 {
    sawtooth_wave(x, TAU, PI)
}

/// pitch lives in [-pi/2, pi/2]
pub fn pitch_map(x: f64) -> f64 {
    triangular_wave(x, TAU, FRAC_PI_2)
}

/// (roll, pitch, yaw) brought back into their conventional ranges
pub fn constrained_attitude(attitude: &Vec3) -> Vec3 {
    Vec3::new(
        roll_yaw_map(attitude.x),
        pitch_map(attitude.y),
        roll_yaw_map(attitude.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn roll_yaw_wraps_around() {
        assert_relative_eq!(roll_yaw_map(0.3), 0.3, epsilon = 1e-12);
        assert_relative_eq!(roll_yaw_map(PI + 0.1), -PI + 0.1, epsilon = 1e-12);
        assert_relative_eq!(roll_yaw_map(-PI - 0.1), PI - 0.1, epsilon = 1e-12);
        assert_relative_eq!(roll_yaw_map(3. * TAU + 1.), 1., epsilon = 1e-9);
    }

    #[test]
    fn pitch_folds_back() {
        assert_relative_eq!(pitch_map(0.2), 0.2, epsilon = 1e-12);
        assert_relative_eq!(pitch_map(FRAC_PI_2 + 0.2), FRAC_PI_2 - 0.2, epsilon = 1e-12);
        assert_relative_eq!(pitch_map(-FRAC_PI_2 - 0.2), -FRAC_PI_2 + 0.2, epsilon = 1e-12);
        assert_relative_eq!(pitch_map(PI), 0., epsilon = 1e-12);
    }

    #[test]
    fn constrained_attitude_maps_each_angle() {
        let a = constrained_attitude(&Vec3::new(TAU + 0.5, 0.1, -TAU - 0.5));
        assert_relative_eq!(a, Vec3::new(0.5, 0.1, -0.5), epsilon = 1e-9);
    }
}
