//! Quintic (minimum jerk) profile of a single scalar axis.

use crate::math::roots::{cubic_roots, linear_roots, quadratic_roots};

/// below this an axis is considered to not move at all
pub const STILL_EPSILON: f64 = 1e-9;

/// Value and first two derivatives of one axis at both ends of a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundaryConditions {
    pub initial_pos: f64,
    pub initial_vel: f64,
    pub initial_accel: f64,
    pub final_pos: f64,
    pub final_vel: f64,
    pub final_accel: f64,
}

impl BoundaryConditions {
    pub fn new(
        initial_pos: f64,
        initial_vel: f64,
        initial_accel: f64,
        final_pos: f64,
        final_vel: f64,
        final_accel: f64,
    ) -> Self {
        Self {
            initial_pos,
            initial_vel,
            initial_accel,
            final_pos,
            final_vel,
            final_accel,
        }
    }

    pub fn rest_to_rest(initial_pos: f64, final_pos: f64) -> Self {
        Self::new(initial_pos, 0., 0., final_pos, 0., 0.)
    }

    pub fn displacement(&self) -> f64 {
        self.final_pos - self.initial_pos
    }

    /// no displacement and no motion at either end
    pub fn is_still(&self) -> bool {
        [
            self.displacement(),
            self.initial_vel,
            self.initial_accel,
            self.final_vel,
            self.final_accel,
        ]
        .iter()
        .all(|x| x.abs() < STILL_EPSILON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinJerkTrajectory {
    boundary: BoundaryConditions,
    duration: f64,
    coeffs: [f64; 6],
}

impl MinJerkTrajectory {
    /// A non positive (or NaN) `duration` gives a zero length segment sitting on the final values.
    pub fn new(boundary: BoundaryConditions, duration: f64) -> Self {
        let duration = if duration > 0. { duration } else { 0. };
        let b = boundary;
        let mut coeffs = [b.initial_pos, b.initial_vel, b.initial_accel / 2., 0., 0., 0.];

        if duration > 0. {
            let h = b.displacement();
            let (v0, v1, a0, a1) = (b.initial_vel, b.final_vel, b.initial_accel, b.final_accel);
            let t = duration;
            let t2 = t * t;
            coeffs[3] = (20. * h - (8. * v1 + 12. * v0) * t - (3. * a0 - a1) * t2) / (2. * t2 * t);
            coeffs[4] =
                (-30. * h + (14. * v1 + 16. * v0) * t + (3. * a0 - 2. * a1) * t2) / (2. * t2 * t2);
            coeffs[5] = (12. * h - 6. * (v1 + v0) * t + (a1 - a0) * t2) / (2. * t2 * t2 * t);
        }

        Self {
            boundary,
            duration,
            coeffs,
        }
    }

    pub fn boundary(&self) -> &BoundaryConditions {
        &self.boundary
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn position(&self, t: f64) -> f64 {
        self.clamped(
            t,
            self.boundary.initial_pos,
            self.boundary.final_pos,
            |c, t| c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * (c[4] + t * c[5])))),
        )
    }

    pub fn velocity(&self, t: f64) -> f64 {
        self.clamped(
            t,
            self.boundary.initial_vel,
            self.boundary.final_vel,
            |c, t| c[1] + t * (2. * c[2] + t * (3. * c[3] + t * (4. * c[4] + t * 5. * c[5]))),
        )
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        self.clamped(
            t,
            self.boundary.initial_accel,
            self.boundary.final_accel,
            |c, t| 2. * c[2] + t * (6. * c[3] + t * (12. * c[4] + t * 20. * c[5])),
        )
    }

    /// zero outside of the segment, the ends are held still
    pub fn jerk(&self, t: f64) -> f64 {
        self.clamped(t, 0., 0., |c, t| {
            6. * c[3] + t * (24. * c[4] + t * 60. * c[5])
        })
    }

    /// Largest |velocity| over the segment.
    pub fn peak_velocity(&self) -> f64 {
        let [_, _, c2, c3, c4, c5] = self.coeffs;
        let t = self.duration;
        // acceleration = 0, in normalized time
        let roots = cubic_roots(20. * c5 * t.powi(3), 12. * c4 * t * t, 6. * c3 * t, 2. * c2);
        self.peak_over(roots, self.boundary.final_vel, |c, t| {
            c[1] + t * (2. * c[2] + t * (3. * c[3] + t * (4. * c[4] + t * 5. * c[5])))
        })
    }

    /// Largest |acceleration| over the segment.
    pub fn peak_acceleration(&self) -> f64 {
        let [_, _, _, c3, c4, c5] = self.coeffs;
        let t = self.duration;
        let roots = quadratic_roots(60. * c5 * t * t, 24. * c4 * t, 6. * c3);
        self.peak_over(roots, self.boundary.final_accel, |c, t| {
            2. * c[2] + t * (6. * c[3] + t * (12. * c[4] + t * 20. * c[5]))
        })
    }

    /// Largest |jerk| over the segment.
    pub fn peak_jerk(&self) -> f64 {
        let [_, _, _, _, c4, c5] = self.coeffs;
        let roots = linear_roots(120. * c5 * self.duration, 24. * c4);
        self.peak_over(roots, 0., |c, t| 6. * c[3] + t * (24. * c[4] + t * 60. * c[5]))
    }

    fn clamped(&self, t: f64, before: f64, after: f64, poly: impl Fn(&[f64; 6], f64) -> f64) -> f64 {
        if t >= self.duration {
            after
        } else if t < 0. {
            before
        } else {
            poly(&self.coeffs, t)
        }
    }

    /// Max of |poly| over both ends and the normalized critical points inside the segment.
    /// A zero length segment only ever reports `at_end`, like [`Self::clamped`].
    fn peak_over(
        &self,
        normalized_roots: Vec<f64>,
        at_end: f64,
        poly: impl Fn(&[f64; 6], f64) -> f64,
    ) -> f64 {
        if self.duration == 0. {
            return at_end.abs();
        }
        normalized_roots
            .into_iter()
            .filter(|tau| (0.0..=1.0).contains(tau))
            .chain([0., 1.])
            .map(|tau| poly(&self.coeffs, tau * self.duration).abs())
            .fold(0., f64::max)
    }
}
