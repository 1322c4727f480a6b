//! Shortest duration of min jerk segments under velocity, acceleration and jerk limits.

use tracing::trace;

use crate::{error::TrajectoryError, limits::AxisLimits};

use super::min_jerk::{BoundaryConditions, MinJerkTrajectory};

/// relative slack when comparing a peak against its limit
const LIMIT_TOLERANCE: f64 = 1e-9;
/// smallest duration ever tried
const MIN_DURATION: f64 = 1e-6;
/// ratio between two consecutive durations of the forward scan
const SCAN_GROWTH: f64 = 1.002;
/// the scan gives up past `max(MAX_DURATION, MAX_STRETCH * lower bound)`
const MAX_DURATION: f64 = 1e4;
const MAX_STRETCH: f64 = 1e3;
/// fixed bisection budget, relative precision ~2^-60 of one scan step
const BISECTION_STEPS: usize = 60;

fn within(value: f64, limit: f64) -> bool {
    value <= limit * (1. + LIMIT_TOLERANCE)
}

/// Smallest duration from `lower_bound` on for which `feasible` holds.
///
/// Feasibility isn't monotonic in the duration once the ends move: a longer
/// segment can break a limit a shorter one respects. The durations are thus
/// scanned forward on a geometric grid and the first feasible step is refined
/// by bisection against the step before it. Returns the give up duration on failure.
fn earliest_feasible(lower_bound: f64, feasible: impl Fn(f64) -> bool) -> Result<f64, f64> {
    if feasible(lower_bound) {
        return Ok(lower_bound);
    }
    let give_up = (lower_bound * MAX_STRETCH).max(MAX_DURATION);

    let mut infeasible = lower_bound;
    let mut found = infeasible * SCAN_GROWTH;
    while !feasible(found) {
        if found > give_up {
            return Err(give_up);
        }
        infeasible = found;
        found *= SCAN_GROWTH;
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (infeasible + found);
        if feasible(mid) {
            found = mid;
        } else {
            infeasible = mid;
        }
    }
    Ok(found)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinJerkTimeSolver {
    limits: AxisLimits,
}

impl MinJerkTimeSolver {
    pub fn new(limits: AxisLimits) -> Self {
        Self { limits }
    }

    pub fn from_limits(max_vel: f64, max_accel: f64, max_jerk: f64) -> Result<Self, TrajectoryError> {
        Ok(Self::new(AxisLimits::new(max_vel, max_accel, max_jerk)?))
    }

    pub fn limits(&self) -> AxisLimits {
        self.limits
    }

    /// whether the quintic of length `duration` stays inside the limits everywhere
    pub fn is_feasible(&self, boundary: &BoundaryConditions, duration: f64) -> bool {
        let traj = MinJerkTrajectory::new(*boundary, duration);
        within(traj.peak_velocity(), self.limits.max_vel())
            && within(traj.peak_acceleration(), self.limits.max_accel())
            && within(traj.peak_jerk(), self.limits.max_jerk())
    }

    /// time needed to cover the displacement at max velocity
    fn lower_bound(&self, boundary: &BoundaryConditions) -> f64 {
        (boundary.displacement().abs() / self.limits.max_vel()).max(MIN_DURATION)
    }

    /// Ends breaking the limits can't be fixed by any duration.
    fn check_ends(&self, b: &BoundaryConditions) -> Result<(), TrajectoryError> {
        let limits = &self.limits;
        if !within(b.initial_vel.abs(), limits.max_vel()) || !within(b.final_vel.abs(), limits.max_vel()) {
            return Err(TrajectoryError::InfeasibleSegment {
                reason: format!(
                    "end velocities ({}, {}) exceed max velocity {}",
                    b.initial_vel,
                    b.final_vel,
                    limits.max_vel()
                ),
            });
        }
        if !within(b.initial_accel.abs(), limits.max_accel())
            || !within(b.final_accel.abs(), limits.max_accel())
        {
            return Err(TrajectoryError::InfeasibleSegment {
                reason: format!(
                    "end accelerations ({}, {}) exceed max acceleration {}",
                    b.initial_accel,
                    b.final_accel,
                    limits.max_accel()
                ),
            });
        }
        Ok(())
    }

    /// Smallest duration satisfying every limit.
    ///
    /// A segment that doesn't move at all has no meaningful duration and is
    /// rejected, as are ends that already break the limits.
    pub fn solve(&self, boundary: &BoundaryConditions) -> Result<f64, TrajectoryError> {
        if boundary.is_still() {
            return Err(TrajectoryError::InfeasibleSegment {
                reason: "no displacement and no motion at either end".to_string(),
            });
        }
        self.check_ends(boundary)?;

        let duration = earliest_feasible(self.lower_bound(boundary), |t| self.is_feasible(boundary, t))
            .map_err(|give_up| TrajectoryError::InfeasibleSegment {
                reason: format!("no duration up to {give_up}s satisfies the limits"),
            })?;
        trace!(?boundary, duration, "solved min jerk duration");
        Ok(duration)
    }

    /// Smallest duration shared by several axes, each one staying inside its own limits.
    ///
    /// Still axes are feasible at any duration. Zero when every axis is still.
    pub fn solve_synchronized(axes: &[(MinJerkTimeSolver, BoundaryConditions)]) -> Result<f64, TrajectoryError> {
        let mut lower_bound = 0.;
        for (solver, boundary) in axes.iter().filter(|(_, b)| !b.is_still()) {
            lower_bound = solver.solve(boundary)?.max(lower_bound);
        }
        if lower_bound == 0. {
            return Ok(0.);
        }

        let duration = earliest_feasible(lower_bound, |t| {
            axes.iter().all(|(solver, boundary)| solver.is_feasible(boundary, t))
        })
        .map_err(|give_up| TrajectoryError::InfeasibleSegment {
            reason: format!("no duration up to {give_up}s satisfies the limits of every axis at once"),
        })?;
        trace!(lower_bound, duration, "synchronized min jerk duration");
        Ok(duration)
    }
}
