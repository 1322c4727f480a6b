pub mod long;
pub mod min_jerk;
pub mod min_jerk_time_solver;
pub mod simultaneous;

pub use long::{LongTrajectory, LongTrajectoryPlan, PhaseDurations, PhaseKind};
pub use min_jerk::{BoundaryConditions, MinJerkTrajectory};
pub use min_jerk_time_solver::MinJerkTimeSolver;
pub use simultaneous::SimultaneousTrajectory;

use serde::Serialize;
use tracing::trace;

use crate::{
    error::TrajectoryError,
    math::{euler_rotation_mat, pqr_to_euler_dot, to_euler_angle, Quat, Vec3, Vector13, Vector6},
};

/// What a controller needs from a reference trajectory.
///
/// Sampling outside of `[0, get_duration()]` is allowed and returns the state at the
/// closest end.
pub trait Trajectory {
    fn get_duration(&self) -> f64;
    /// [position(3), velocity(3), quaternion(4) as (w, x, y, z), body angular velocity(3)]
    fn compute_state(&self, time: f64) -> Vector13;
    /// [linear acceleration(3), body angular acceleration(3)]
    fn compute_accel(&self, time: f64) -> Vector6;
    /// times at which the trajectory switches to its next piece, the last one being the duration
    fn get_time_sections(&self) -> impl Iterator<Item = f64>;
}

/// Clamps `time` into `[0, duration]`, tracing the out of range samples.
pub(crate) fn clamp_time(time: f64, duration: f64) -> f64 {
    if (0.0..=duration).contains(&time) {
        return time;
    }
    let err = TrajectoryError::SampleOutOfRange { time, duration };
    trace!(%err, "clamping sample time");
    time.clamp(0., duration.max(0.))
}

/// Every shape of trajectory this crate produces.
#[derive(Debug, Clone)]
pub enum AnyTrajectory {
    Simultaneous(SimultaneousTrajectory),
    Long(LongTrajectory),
}

impl From<SimultaneousTrajectory> for AnyTrajectory {
    fn from(t: SimultaneousTrajectory) -> Self {
        AnyTrajectory::Simultaneous(t)
    }
}

impl From<LongTrajectory> for AnyTrajectory {
    fn from(t: LongTrajectory) -> Self {
        AnyTrajectory::Long(t)
    }
}

impl Trajectory for AnyTrajectory {
    fn get_duration(&self) -> f64 {
        match self {
            AnyTrajectory::Simultaneous(t) => t.get_duration(),
            AnyTrajectory::Long(t) => t.get_duration(),
        }
    }

    fn compute_state(&self, time: f64) -> Vector13 {
        match self {
            AnyTrajectory::Simultaneous(t) => t.compute_state(time),
            AnyTrajectory::Long(t) => t.compute_state(time),
        }
    }

    fn compute_accel(&self, time: f64) -> Vector6 {
        match self {
            AnyTrajectory::Simultaneous(t) => t.compute_accel(time),
            AnyTrajectory::Long(t) => t.compute_accel(time),
        }
    }

    fn get_time_sections(&self) -> impl Iterator<Item = f64> {
        let sections: Vec<f64> = match self {
            AnyTrajectory::Simultaneous(t) => t.get_time_sections().collect(),
            AnyTrajectory::Long(t) => t.get_time_sections().collect(),
        };
        sections.into_iter()
    }
}

/// One reference handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub state: Vector13,
    pub accel: Vector6,
}

impl Sample {
    pub fn at(trajectory: &impl Trajectory, time: f64) -> Self {
        Self {
            time,
            state: trajectory.compute_state(time),
            accel: trajectory.compute_accel(time),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.state.fixed_rows::<3>(0).into_owned()
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.fixed_rows::<3>(3).into_owned()
    }

    pub fn attitude(&self) -> Quat {
        Quat::new_normalize(na::Quaternion::new(
            self.state[6],
            self.state[7],
            self.state[8],
            self.state[9],
        ))
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.state.fixed_rows::<3>(10).into_owned()
    }

    /// velocity expressed in the body frame
    pub fn body_velocity(&self) -> Vec3 {
        euler_rotation_mat(&to_euler_angle(&self.attitude())) * self.velocity()
    }

    /// (roll, pitch, yaw) rates from the body angular velocity
    pub fn euler_rates(&self) -> Vec3 {
        pqr_to_euler_dot(&to_euler_angle(&self.attitude()), &self.angular_velocity())
    }
}
