//! Travel over a long distance: turn towards the goal, speed up, cruise, slow down, turn to the final attitude.
//!
//! Speed up and slow down are mirrored S-curves around the cruise, the vehicle
//! being at rest before and after them. Each phase starts exactly on the
//! waypoint the previous one ends on, which keeps the whole reference continuous.

use tracing::{debug, info};

use crate::{
    error::TrajectoryError,
    limits::Limits,
    math::{to_quaternion, Quat, Vec3, Vector13, Vector6},
    waypoint::Waypoint,
};

use super::{clamp_time, simultaneous::SimultaneousTrajectory, Trajectory};

/// shorter translations are treated as none
const DISTANCE_EPSILON: f64 = 1e-9;
/// rad
const HEADING_EPSILON: f64 = 1e-9;
const REST_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    PreRotation,
    SpeedUp,
    Cruise,
    SlowDown,
    PostRotation,
}

/// Duration of each phase, zero for the skipped ones.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseDurations {
    pub pre_rotation: f64,
    pub speed_up: f64,
    pub cruise: f64,
    pub slow_down: f64,
    pub post_rotation: f64,
}

impl PhaseDurations {
    pub fn total(&self) -> f64 {
        self.pre_rotation + self.speed_up + self.cruise + self.slow_down + self.post_rotation
    }

    fn set(&mut self, kind: PhaseKind, duration: f64) {
        let slot = match kind {
            PhaseKind::PreRotation => &mut self.pre_rotation,
            PhaseKind::SpeedUp => &mut self.speed_up,
            PhaseKind::Cruise => &mut self.cruise,
            PhaseKind::SlowDown => &mut self.slow_down,
            PhaseKind::PostRotation => &mut self.post_rotation,
        };
        *slot = duration;
    }
}

#[derive(Debug, Clone)]
struct Phase {
    kind: PhaseKind,
    start_time: f64,
    trajectory: SimultaneousTrajectory,
}

impl Phase {
    fn end_time(&self) -> f64 {
        self.start_time + self.trajectory.get_duration()
    }
}

/// Inputs of a [`LongTrajectory`] waiting for [`LongTrajectoryPlan::init_trajectory`].
#[derive(Debug, Clone)]
pub struct LongTrajectoryPlan {
    start: Waypoint,
    end: Waypoint,
    limits: Limits,
    cruise_ratio: f64,
    cruise_speed: f64,
}

#[derive(Debug, Clone)]
pub struct LongTrajectory {
    start: Waypoint,
    end: Waypoint,
    phases: Vec<Phase>,
    durations: PhaseDurations,
    total_duration: f64,
    total_distance: f64,
    cruise_distance: f64,
    ramp_distance: f64,
    cruise_ratio: f64,
    cruise_speed: f64,
    travel_direction: Vec3,
    cruise_attitude: Quat,
    keeps_travel_heading: bool,
}

/// Level attitude facing the horizontal part of `delta`, `fallback` when travelling vertically.
/// The quaternion is taken in the same hemisphere as `fallback` so that turning
/// from it doesn't flip the sign of the sampled quaternion.
fn travel_attitude(delta: &Vec3, fallback: Quat) -> Quat {
    if delta.xy().norm() < DISTANCE_EPSILON {
        return fallback;
    }
    let attitude = to_quaternion(delta.y.atan2(delta.x), 0., 0.);
    if attitude.coords.dot(&fallback.coords) < 0. {
        Quat::new_unchecked(-attitude.into_inner())
    } else {
        attitude
    }
}

fn needs_rotation_phase(from: &Waypoint, to: &Waypoint) -> bool {
    let rotation = from.attitude().rotation_to(&to.attitude());
    let angle = 2. * rotation.imag().norm().atan2(rotation.w.abs());
    angle > HEADING_EPSILON
        || !from.is_at_rest(REST_EPSILON)
        || !to.is_at_rest(REST_EPSILON)
}

fn infeasible(reason: String) -> TrajectoryError {
    TrajectoryError::InfeasibleCruiseConfiguration { reason }
}

impl LongTrajectoryPlan {
    /// Validates the cruise configuration and builds every phase.
    pub fn init_trajectory(self) -> Result<LongTrajectory, TrajectoryError> {
        let LongTrajectoryPlan {
            start,
            end,
            limits,
            cruise_ratio,
            cruise_speed,
        } = self;

        if !(cruise_ratio > 0. && cruise_ratio < 1.) {
            return Err(infeasible(format!("cruise ratio {cruise_ratio} is not in (0, 1)")));
        }
        if !(cruise_speed.is_finite() && cruise_speed > 0.) {
            return Err(infeasible(format!("cruise speed {cruise_speed} must be strictly positive")));
        }
        let max_vel = limits.translation().max_vel();
        if cruise_speed > max_vel {
            return Err(infeasible(format!(
                "cruise speed {cruise_speed} exceeds max velocity {max_vel}"
            )));
        }

        let delta = end.position() - start.position();
        let total_distance = delta.norm();
        let mut traj = LongTrajectory {
            start,
            end,
            phases: Vec::with_capacity(5),
            durations: PhaseDurations::default(),
            total_duration: 0.,
            total_distance,
            cruise_distance: 0.,
            ramp_distance: 0.,
            cruise_ratio,
            cruise_speed,
            travel_direction: Vec3::zeros(),
            cruise_attitude: start.attitude(),
            keeps_travel_heading: false,
        };

        if total_distance < DISTANCE_EPSILON {
            debug!("no translation, rotating in place");
            let rotation = SimultaneousTrajectory::new(start, end, &limits)?;
            traj.push(PhaseKind::PreRotation, rotation);
            traj.keeps_travel_heading = traj.phases.is_empty();
        } else {
            traj.init_travel(delta, &limits)?;
        }

        info!(
            distance = traj.total_distance,
            duration = traj.total_duration,
            phases = ?traj.phases.iter().map(|p| p.kind).collect::<Vec<_>>(),
            "long trajectory ready"
        );
        Ok(traj)
    }
}

impl LongTrajectory {
    pub fn plan(
        start: Waypoint,
        end: Waypoint,
        limits: Limits,
        cruise_ratio: f64,
        cruise_speed: f64,
    ) -> LongTrajectoryPlan {
        LongTrajectoryPlan {
            start,
            end,
            limits,
            cruise_ratio,
            cruise_speed,
        }
    }

    /// `plan` then `init_trajectory`
    pub fn new(
        start: Waypoint,
        end: Waypoint,
        limits: Limits,
        cruise_ratio: f64,
        cruise_speed: f64,
    ) -> Result<Self, TrajectoryError> {
        Self::plan(start, end, limits, cruise_ratio, cruise_speed).init_trajectory()
    }

    fn init_travel(&mut self, delta: Vec3, limits: &Limits) -> Result<(), TrajectoryError> {
        let speed = self.cruise_speed;
        let unit = delta / self.total_distance;
        let attitude = travel_attitude(&delta, self.start.attitude());

        // shortest S-curve from rest to `speed`: peak accel 3v/2T, peak jerk 6v/T^2
        let translation = limits.translation();
        let min_ramp_duration = (1.5 * speed / translation.max_accel())
            .max((6. * speed / translation.max_jerk()).sqrt());
        let min_ramps_distance = speed * min_ramp_duration;
        let ramps_distance = (1. - self.cruise_ratio) * self.total_distance;
        if min_ramps_distance > ramps_distance {
            return Err(infeasible(format!(
                "speeding up to {speed} and back needs {min_ramps_distance} but only \
                 {ramps_distance} of the {} travelled is left outside of the cruise",
                self.total_distance
            )));
        }

        self.travel_direction = unit;
        self.cruise_attitude = attitude;
        self.ramp_distance = ramps_distance / 2.;
        self.cruise_distance = self.cruise_ratio * self.total_distance;
        // mean speed over an S-curve from rest is half the final speed
        let ramp_duration = 2. * self.ramp_distance / speed;
        let cruise_duration = self.cruise_distance / speed;

        let cruise_vel = unit * speed;
        let pre_translate = Waypoint::at_rest(self.start.position(), attitude);
        let cruise_start = Waypoint::new(
            self.start.position() + unit * self.ramp_distance,
            cruise_vel,
            Vec3::zeros(),
            attitude.into_inner(),
            Vec3::zeros(),
        );
        let cruise_end = Waypoint::new(
            self.end.position() - unit * self.ramp_distance,
            cruise_vel,
            Vec3::zeros(),
            attitude.into_inner(),
            Vec3::zeros(),
        );
        let post_translate = Waypoint::at_rest(self.end.position(), attitude);

        let pre_rotation = needs_rotation_phase(&self.start, &pre_translate);
        let post_rotation = needs_rotation_phase(&post_translate, &self.end);
        self.keeps_travel_heading = !pre_rotation && !post_rotation;

        if pre_rotation {
            let phase = SimultaneousTrajectory::new(self.start, pre_translate, limits)?;
            self.push(PhaseKind::PreRotation, phase);
        }
        self.push(
            PhaseKind::SpeedUp,
            SimultaneousTrajectory::with_duration(pre_translate, cruise_start, ramp_duration),
        );
        self.push(
            PhaseKind::Cruise,
            SimultaneousTrajectory::with_duration(cruise_start, cruise_end, cruise_duration),
        );
        self.push(
            PhaseKind::SlowDown,
            SimultaneousTrajectory::with_duration(cruise_end, post_translate, ramp_duration),
        );
        if post_rotation {
            let phase = SimultaneousTrajectory::new(post_translate, self.end, limits)?;
            self.push(PhaseKind::PostRotation, phase);
        }
        Ok(())
    }

    /// appends a phase right after the last one, zero length ones are dropped
    fn push(&mut self, kind: PhaseKind, trajectory: SimultaneousTrajectory) {
        let duration = trajectory.get_duration();
        if duration <= 0. {
            return;
        }
        debug!(?kind, start = self.total_duration, duration, "phase");
        self.phases.push(Phase {
            kind,
            start_time: self.total_duration,
            trajectory,
        });
        self.durations.set(kind, duration);
        self.total_duration += duration;
    }

    /// phase running at `t` and the time elapsed in it, the end snapping to the last phase's end
    fn find_phase(&self, t: f64) -> Option<(&Phase, f64)> {
        let phase = self
            .phases
            .iter()
            .find(|p| t < p.end_time())
            .or(self.phases.last())?;
        let local_time = if t >= self.total_duration {
            phase.trajectory.get_duration()
        } else {
            t - phase.start_time
        };
        Some((phase, local_time))
    }

    pub fn start(&self) -> &Waypoint {
        &self.start
    }

    pub fn end(&self) -> &Waypoint {
        &self.end
    }

    pub fn phase_durations(&self) -> PhaseDurations {
        self.durations
    }

    /// kinds of the phases actually present, in time order
    pub fn phase_kinds(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        self.phases.iter().map(|p| p.kind)
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn cruise_distance(&self) -> f64 {
        self.cruise_distance
    }

    /// distance covered by each of the speed up and slow down phases
    pub fn ramp_distance(&self) -> f64 {
        self.ramp_distance
    }

    pub fn cruise_speed(&self) -> f64 {
        self.cruise_speed
    }

    /// unit vector from start to end, zero without translation
    pub fn travel_direction(&self) -> Vec3 {
        self.travel_direction
    }

    pub fn cruise_attitude(&self) -> Quat {
        self.cruise_attitude
    }

    /// true when neither a pre nor a post rotation is needed
    pub fn keeps_travel_heading(&self) -> bool {
        self.keeps_travel_heading
    }
}

impl Trajectory for LongTrajectory {
    fn get_duration(&self) -> f64 {
        self.total_duration
    }

    fn compute_state(&self, time: f64) -> Vector13 {
        let t = clamp_time(time, self.total_duration);
        match self.find_phase(t) {
            Some((phase, local_time)) => phase.trajectory.compute_state(local_time),
            None => self.start.state(),
        }
    }

    fn compute_accel(&self, time: f64) -> Vector6 {
        let t = clamp_time(time, self.total_duration);
        match self.find_phase(t) {
            Some((phase, local_time)) => phase.trajectory.compute_accel(local_time),
            None => Vector6::zeros(),
        }
    }

    fn get_time_sections(&self) -> impl Iterator<Item = f64> {
        self.phases.iter().map(Phase::end_time)
    }
}
