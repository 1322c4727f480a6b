//! x, y, z and attitude moving together, all axes finishing at the same time.

use std::iter;

use tracing::debug;

use crate::{
    error::TrajectoryError,
    limits::Limits,
    math::{angle_axis_to_quaternion, quaternion_to_angle_axis, AngleAxis, Quat, Vec3, Vector13, Vector6},
    waypoint::{state_vector, Waypoint},
};

use super::{
    clamp_time,
    min_jerk::{BoundaryConditions, MinJerkTrajectory},
    min_jerk_time_solver::MinJerkTimeSolver,
    Trajectory,
};

/// rotations smaller than this (rad) have no usable axis
const ROTATION_EPSILON: f64 = 1e-9;

struct AxesBoundaries {
    translation: [BoundaryConditions; 3],
    rotation: BoundaryConditions,
    rotation_axis: Vec3,
    /// the short way round reaches `-q_end`
    end_flipped: bool,
}

/// The attitude is interpolated as a rotation by a time varying angle about a
/// fixed axis, the axis of `q_end * q_start^-1` taken the short way round. In the
/// body frame that axis is constant during the whole motion, so the body angular
/// velocity is simply `theta'(t) * axis`. Waypoint angular velocities are projected
/// on that axis.
///
/// Going the short way round may land on `-q_end`, the same attitude; the end
/// waypoint is then re-signed so the sampled quaternion doesn't jump at the end.
fn axes_boundaries(start: &Waypoint, end: &Waypoint) -> AxesBoundaries {
    let q_rel = end.attitude() * start.attitude().inverse();
    let end_flipped = q_rel.w < 0.;
    let q_rel = if end_flipped {
        Quat::new_unchecked(-q_rel.into_inner())
    } else {
        q_rel
    };
    let angle_axis = quaternion_to_angle_axis(&q_rel);
    let angle = angle_axis[0];

    let rotation_axis = if angle > ROTATION_EPSILON {
        let world_axis = Vec3::new(angle_axis[1], angle_axis[2], angle_axis[3]);
        start.attitude().inverse() * world_axis
    } else {
        [start.angular_velocity(), end.angular_velocity()]
            .into_iter()
            .find_map(|w| w.try_normalize(ROTATION_EPSILON))
            .unwrap_or_else(Vec3::z)
    };

    let rotation = BoundaryConditions::new(
        0.,
        start.angular_velocity().dot(&rotation_axis),
        0.,
        angle,
        end.angular_velocity().dot(&rotation_axis),
        0.,
    );

    let translation = std::array::from_fn(|i| {
        BoundaryConditions::new(
            start.position()[i],
            start.velocity()[i],
            start.acceleration()[i],
            end.position()[i],
            end.velocity()[i],
            end.acceleration()[i],
        )
    });

    AxesBoundaries {
        translation,
        rotation,
        rotation_axis,
        end_flipped,
    }
}

#[derive(Debug, Clone)]
pub struct SimultaneousTrajectory {
    start: Waypoint,
    end: Waypoint,
    translation: [MinJerkTrajectory; 3],
    rotation: MinJerkTrajectory,
    /// unit, body frame
    rotation_axis: Vec3,
    duration: f64,
}

impl SimultaneousTrajectory {
    /// Shortest duration for which every axis, stretched to it, stays inside its limits.
    pub fn new(start: Waypoint, end: Waypoint, limits: &Limits) -> Result<Self, TrajectoryError> {
        let boundaries = axes_boundaries(&start, &end);
        let translation_solver = MinJerkTimeSolver::new(limits.translation());
        let rotation_solver = MinJerkTimeSolver::new(limits.rotation());

        let [x, y, z] = boundaries.translation;
        let duration = MinJerkTimeSolver::solve_synchronized(&[
            (translation_solver, x),
            (translation_solver, y),
            (translation_solver, z),
            (rotation_solver, boundaries.rotation),
        ])?;
        debug!(duration, angle = boundaries.rotation.final_pos, "synchronized axes");
        Ok(Self::build(start, end, boundaries, duration))
    }

    /// Every axis takes exactly `duration`, limits aren't checked.
    pub fn with_duration(start: Waypoint, end: Waypoint, duration: f64) -> Self {
        let boundaries = axes_boundaries(&start, &end);
        Self::build(start, end, boundaries, duration)
    }

    fn build(start: Waypoint, end: Waypoint, boundaries: AxesBoundaries, duration: f64) -> Self {
        let end = if boundaries.end_flipped { end.antipodal() } else { end };
        let rotation = MinJerkTrajectory::new(boundaries.rotation, duration);
        Self {
            start,
            end,
            translation: boundaries
                .translation
                .map(|b| MinJerkTrajectory::new(b, duration)),
            duration: rotation.duration(),
            rotation,
            rotation_axis: boundaries.rotation_axis,
        }
    }

    pub fn start(&self) -> &Waypoint {
        &self.start
    }

    /// the end waypoint, its quaternion possibly negated to follow the rotation
    pub fn end(&self) -> &Waypoint {
        &self.end
    }

    /// x, y, z then the rotation angle
    pub fn axes(&self) -> impl Iterator<Item = &MinJerkTrajectory> {
        self.translation.iter().chain(iter::once(&self.rotation))
    }

    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation_axis
    }

    pub fn rotation_angle(&self) -> f64 {
        self.rotation.boundary().final_pos
    }
}

impl Trajectory for SimultaneousTrajectory {
    fn get_duration(&self) -> f64 {
        self.duration
    }

    fn compute_state(&self, time: f64) -> Vector13 {
        let t = clamp_time(time, self.duration);
        if t >= self.duration {
            return self.end.state();
        }
        if t <= 0. {
            return self.start.state();
        }

        let position = Vec3::from_fn(|i, _| self.translation[i].position(t));
        let velocity = Vec3::from_fn(|i, _| self.translation[i].velocity(t));
        let axis = self.rotation_axis;
        let partial_rotation =
            angle_axis_to_quaternion(&AngleAxis::new(self.rotation.position(t), axis.x, axis.y, axis.z));
        let attitude = self.start.attitude() * partial_rotation;
        let angular_velocity = axis * self.rotation.velocity(t);

        state_vector(&position, &velocity, &attitude, &angular_velocity)
    }

    fn compute_accel(&self, time: f64) -> Vector6 {
        let t = clamp_time(time, self.duration);
        let mut accel = Vector6::zeros();
        accel
            .fixed_rows_mut::<3>(0)
            .copy_from(&Vec3::from_fn(|i, _| self.translation[i].acceleration(t)));
        accel
            .fixed_rows_mut::<3>(3)
            .copy_from(&(self.rotation_axis * self.rotation.acceleration(t)));
        accel
    }

    fn get_time_sections(&self) -> impl Iterator<Item = f64> {
        iter::once(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{to_euler_angle, to_quaternion};
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn limits() -> Limits {
        Limits::new(1., 0.5, 0.5, 0.6, 0.4, 0.4).expect("valid limits")
    }

    fn attitude_of(state: &Vector13) -> Quat {
        Quat::new_normalize(na::Quaternion::new(state[6], state[7], state[8], state[9]))
    }

    #[test]
    fn axes_share_the_slowest_duration() {
        let start = Waypoint::at_rest(Vec3::zeros(), Quat::identity());
        let end = Waypoint::at_rest(Vec3::new(4., -1., 0.5), to_quaternion(1., 0., 0.));
        let traj = SimultaneousTrajectory::new(start, end, &limits()).expect("feasible");

        let x_alone = MinJerkTimeSolver::new(limits().translation())
            .solve(&BoundaryConditions::rest_to_rest(0., 4.))
            .expect("feasible");
        assert!(traj.get_duration() >= x_alone);
        assert!(traj.axes().all(|a| a.duration() == traj.get_duration()));
        assert_eq!(traj.axes().count(), 4);
    }

    #[test]
    fn stretched_axes_respect_their_limits() {
        let l = limits();
        let start = Waypoint::at_rest(Vec3::zeros(), Quat::identity());
        let end = Waypoint::at_rest(Vec3::new(0.2, 3., -2.), to_quaternion(-2., 0.3, 0.));
        let traj = SimultaneousTrajectory::new(start, end, &l).expect("feasible");

        let axes: Vec<_> = traj.axes().collect();
        for axis in &axes[..3] {
            assert!(axis.peak_velocity() <= l.translation().max_vel() + 1e-9);
            assert!(axis.peak_acceleration() <= l.translation().max_accel() + 1e-9);
            assert!(axis.peak_jerk() <= l.translation().max_jerk() + 1e-9);
        }
        assert!(axes[3].peak_velocity() <= l.rotation().max_vel() + 1e-9);
        assert!(axes[3].peak_jerk() <= l.rotation().max_jerk() + 1e-9);
    }

    #[test]
    fn no_motion_has_zero_duration() {
        let w = Waypoint::from_euler(Vec3::new(1., 2., 3.), 0.1, 0.2, 0.3);
        let traj = SimultaneousTrajectory::new(w, w, &limits()).expect("still is fine");
        assert_eq!(traj.get_duration(), 0.);
        for t in [-1., 0., 0.5, 10.] {
            assert_eq!(traj.compute_state(t), w.state());
        }
        assert_eq!(traj.compute_accel(1.), Vector6::zeros());
    }

    #[test]
    fn pure_yaw_rotation_ends_on_the_end_attitude() {
        let start = Waypoint::at_rest(Vec3::zeros(), Quat::identity());
        let end = Waypoint::at_rest(Vec3::zeros(), to_quaternion(FRAC_PI_2, 0., 0.));
        let traj = SimultaneousTrajectory::new(start, end, &limits()).expect("feasible");
        let duration = traj.get_duration();

        assert!(duration > 0.);
        assert_relative_eq!(traj.rotation_angle(), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(traj.rotation_axis(), Vec3::z(), epsilon = 1e-12);
        let last = traj.compute_state(duration);
        let q = end.attitude();
        assert_eq!([last[6], last[7], last[8], last[9]], [q.w, q.i, q.j, q.k]);

        let mid = traj.compute_state(duration / 2.);
        assert_relative_eq!(to_euler_angle(&attitude_of(&mid)).z, PI / 4., epsilon = 1e-9);
        assert!(mid[12] > 0.);
        assert_relative_eq!(mid.fixed_rows::<3>(0).norm(), 0., epsilon = 1e-12);
    }

    #[test]
    fn takes_the_short_way_round() {
        let start = Waypoint::at_rest(Vec3::zeros(), to_quaternion(PI - 0.1, 0., 0.));
        let end = Waypoint::at_rest(Vec3::zeros(), to_quaternion(-PI + 0.1, 0., 0.));
        let traj = SimultaneousTrajectory::new(start, end, &limits()).expect("feasible");
        assert_relative_eq!(traj.rotation_angle(), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn angular_velocity_matches_attitude_derivative() {
        let start = Waypoint::from_euler(Vec3::zeros(), 0.3, -0.2, 0.5);
        let end = Waypoint::from_euler(Vec3::new(1., 1., 0.), -0.4, 0.1, 2.);
        let traj = SimultaneousTrajectory::new(start, end, &limits()).expect("feasible");

        let dt = 1e-6;
        for frac in [0.2, 0.5, 0.8] {
            let t = frac * traj.get_duration();
            let s0 = traj.compute_state(t);
            let s1 = traj.compute_state(t + dt);
            let body_delta = attitude_of(&s0).inverse() * attitude_of(&s1);
            let omega = body_delta.scaled_axis() / dt;
            assert_relative_eq!(omega, s0.fixed_rows::<3>(10).into_owned(), epsilon = 1e-4);
            assert_relative_eq!(attitude_of(&s0).norm(), 1., epsilon = 1e-12);
        }
    }

    #[test]
    fn accel_is_derivative_of_velocity() {
        let start = Waypoint::at_rest(Vec3::zeros(), Quat::identity());
        let end = Waypoint::at_rest(Vec3::new(2., 0., -1.), to_quaternion(0.8, 0., 0.));
        let traj = SimultaneousTrajectory::new(start, end, &limits()).expect("feasible");

        let (t, dt) = (0.3 * traj.get_duration(), 1e-6);
        let v0 = traj.compute_state(t);
        let v1 = traj.compute_state(t + dt);
        let a = traj.compute_accel(t);
        for i in 0..3 {
            assert_relative_eq!((v1[3 + i] - v0[3 + i]) / dt, a[i], epsilon = 1e-4);
            assert_relative_eq!((v1[10 + i] - v0[10 + i]) / dt, a[3 + i], epsilon = 1e-4);
        }
    }

    fn accelerating_start(accel: Vec3, end: Vec3) -> (Waypoint, Waypoint) {
        let start = Waypoint::new(
            Vec3::zeros(),
            Vec3::zeros(),
            accel,
            na::Quaternion::identity(),
            Vec3::zeros(),
        );
        (start, Waypoint::at_rest(end, Quat::identity()))
    }

    fn assert_within_limits(traj: &SimultaneousTrajectory, l: &Limits) {
        let t = l.translation();
        for axis in traj.axes().take(3) {
            assert!(axis.peak_velocity() <= t.max_vel() * (1. + 1e-9));
            assert!(axis.peak_acceleration() <= t.max_accel() * (1. + 1e-9));
            assert!(axis.peak_jerk() <= t.max_jerk() * (1. + 1e-9));
        }
    }

    #[test]
    fn accelerating_axis_is_checked_at_the_shared_duration() {
        let l = Limits::new(1., 0.5, 0.5, 0.6, 0.4, 0.4).expect("valid limits");
        let (start, end) = accelerating_start(Vec3::new(0., 0.1, 0.), Vec3::new(4., 0., 0.));
        let traj = SimultaneousTrajectory::new(start, end, &l).expect("feasible");

        assert_within_limits(&traj, &l);
        assert_relative_eq!(traj.compute_accel(0.)[1], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn axes_that_cant_share_a_duration_are_rejected() {
        // x needs at least 75s to cover 40m at 1 m/s, y's initial acceleration
        // turns into more than 1 m/s of drift over such a long segment
        let l = Limits::new(1., 0.5, 0.5, 0.6, 0.4, 0.4).expect("valid limits");
        let (start, end) = accelerating_start(Vec3::new(0., 0.4, 0.), Vec3::new(40., 0., 0.));
        assert!(matches!(
            SimultaneousTrajectory::new(start, end, &l),
            Err(TrajectoryError::InfeasibleSegment { .. })
        ));
    }

    #[test]
    fn quaternion_is_continuous_when_the_end_is_in_the_other_hemisphere() {
        let start = Waypoint::at_rest(Vec3::zeros(), Quat::identity());
        let flipped_end = Quat::new_unchecked(-to_quaternion(FRAC_PI_2, 0., 0.).into_inner());
        let end = Waypoint::at_rest(Vec3::zeros(), flipped_end);
        let traj = SimultaneousTrajectory::new(start, end, &limits()).expect("feasible");
        let duration = traj.get_duration();

        let before = traj.compute_state(duration - 1e-7);
        let last = traj.compute_state(duration);
        for i in 6..10 {
            assert_relative_eq!(before[i], last[i], epsilon = 1e-6);
        }
        // same attitude as asked, opposite sign
        let q = end.attitude();
        assert_eq!([last[6], last[7], last[8], last[9]], [-q.w, -q.i, -q.j, -q.k]);
        assert_eq!(traj.end().attitude().coords, -q.coords);
    }

    #[test]
    fn fixed_duration_is_kept() {
        let start = Waypoint::at_rest(Vec3::zeros(), Quat::identity());
        let end = Waypoint::at_rest(Vec3::new(1., 0., 0.), Quat::identity());
        let traj = SimultaneousTrajectory::with_duration(start, end, 12.);
        assert_eq!(traj.get_duration(), 12.);
        assert_relative_eq!(traj.compute_state(6.)[0], 0.5, epsilon = 1e-12);
    }
}
