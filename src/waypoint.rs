use crate::math::{to_quaternion, Quat, Vec3, Vector13};

/// Pose and derivatives of the vehicle at one instant.
///
/// Position, velocity and acceleration are expressed in the world frame, the
/// angular velocity in the body frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    attitude: Quat,
    angular_velocity: Vec3,
}

impl Waypoint {
    /// `attitude` doesn't need to be normalized
    pub fn new(
        position: Vec3,
        velocity: Vec3,
        acceleration: Vec3,
        attitude: na::Quaternion<f64>,
        angular_velocity: Vec3,
    ) -> Self {
        Self {
            position,
            velocity,
            acceleration,
            attitude: Quat::new_normalize(attitude),
            angular_velocity,
        }
    }

    pub fn at_rest(position: Vec3, attitude: Quat) -> Self {
        Self::new(
            position,
            Vec3::zeros(),
            Vec3::zeros(),
            attitude.into_inner(),
            Vec3::zeros(),
        )
    }

    pub fn from_euler(position: Vec3, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::at_rest(position, to_quaternion(yaw, pitch, roll))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn attitude(&self) -> Quat {
        self.attitude
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn is_at_rest(&self, epsilon: f64) -> bool {
        self.velocity.norm() <= epsilon
            && self.acceleration.norm() <= epsilon
            && self.angular_velocity.norm() <= epsilon
    }

    /// same waypoint with the opposite quaternion, i.e. the same attitude
    pub(crate) fn antipodal(&self) -> Self {
        Self {
            attitude: Quat::new_unchecked(-self.attitude.into_inner()),
            ..*self
        }
    }

    /// the 13 component state a trajectory resting on this waypoint reports
    pub fn state(&self) -> Vector13 {
        state_vector(
            &self.position,
            &self.velocity,
            &self.attitude,
            &self.angular_velocity,
        )
    }
}

pub(crate) fn state_vector(
    position: &Vec3,
    velocity: &Vec3,
    attitude: &Quat,
    angular_velocity: &Vec3,
) -> Vector13 {
    let mut state = Vector13::zeros();
    state.fixed_rows_mut::<3>(0).copy_from(position);
    state.fixed_rows_mut::<3>(3).copy_from(velocity);
    state[6] = attitude.w;
    state[7] = attitude.i;
    state[8] = attitude.j;
    state[9] = attitude.k;
    state.fixed_rows_mut::<3>(10).copy_from(angular_velocity);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn attitude_is_normalized() {
        let w = Waypoint::new(
            Vec3::zeros(),
            Vec3::zeros(),
            Vec3::zeros(),
            na::Quaternion::new(2., 0., 0., 2.),
            Vec3::zeros(),
        );
        assert_relative_eq!(w.attitude().norm(), 1., epsilon = 1e-12);
        assert_relative_eq!(w.attitude().w, 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn state_layout() {
        let w = Waypoint::new(
            Vec3::new(1., 2., 3.),
            Vec3::new(4., 5., 6.),
            Vec3::zeros(),
            na::Quaternion::identity(),
            Vec3::new(7., 8., 9.),
        );
        let s = w.state();
        assert_eq!(s.fixed_rows::<3>(0), Vec3::new(1., 2., 3.));
        assert_eq!(s.fixed_rows::<3>(3), Vec3::new(4., 5., 6.));
        assert_eq!(s[6], 1.);
        assert_eq!(s.fixed_rows::<3>(7), Vec3::zeros());
        assert_eq!(s.fixed_rows::<3>(10), Vec3::new(7., 8., 9.));
        assert!(!w.is_at_rest(1e-9));
    }

    #[test]
    fn from_euler_is_at_rest() {
        let w = Waypoint::from_euler(Vec3::x(), 0., 0., std::f64::consts::FRAC_PI_2);
        assert!(w.is_at_rest(0.));
        assert_relative_eq!(w.attitude() * Vec3::x(), Vec3::y(), epsilon = 1e-12);
    }
}
