//! Real roots of low order polynomials, coefficients given highest degree first.
//!
//! Leading coefficients that are negligible relative to the others drop the
//! polynomial to the next lower degree, so callers can feed raw coefficients.

use std::f64::consts::TAU;

const DEGENERATE_EPSILON: f64 = 1e-12;

fn is_negligible(lead: f64, rest: &[f64]) -> bool {
    let scale = rest.iter().fold(lead.abs(), |m, c| m.max(c.abs()));
    scale == 0. || lead.abs() <= DEGENERATE_EPSILON * scale
}

/// `a*x + b = 0`
pub fn linear_roots(a: f64, b: f64) -> Vec<f64> {
    if is_negligible(a, &[b]) {
        return vec![];
    }
    vec![-b / a]
}

/// `a*x^2 + b*x + c = 0`
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if is_negligible(a, &[b, c]) {
        return linear_roots(b, c);
    }
    let disc = b * b - 4. * a * c;
    if disc < -DEGENERATE_EPSILON * b * b {
        return vec![];
    }
    let sqrt_disc = disc.max(0.).sqrt();
    // avoids cancellation between b and sqrt_disc
    let q = -0.5 * (b + sqrt_disc.copysign(b));
    if q == 0. {
        return vec![0.];
    }
    vec![q / a, c / q]
}

/// `a*x^3 + b*x^2 + c*x + d = 0`
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if is_negligible(a, &[b, c, d]) {
        return quadratic_roots(b, c, d);
    }
    let (b, c, d) = (b / a, c / a, d / a);

    // depressed cubic y^3 + p*y + q = 0 with x = y - b/3
    let shift = b / 3.;
    let p = c - b * b / 3.;
    let q = 2. * b * b * b / 27. - b * c / 3. + d;
    let disc = (q / 2.).powi(2) + (p / 3.).powi(3);

    let ys = if disc.abs() < DEGENERATE_EPSILON {
        if p.abs() < DEGENERATE_EPSILON {
            vec![0.]
        } else {
            vec![3. * q / p, -3. * q / (2. * p)]
        }
    } else if disc > 0. {
        let sqrt_disc = disc.sqrt();
        vec![(-q / 2. + sqrt_disc).cbrt() + (-q / 2. - sqrt_disc).cbrt()]
    } else {
        let r = 2. * (-p / 3.).sqrt();
        let phi = ((3. * q / (2. * p)) * (-3. / p).sqrt()).clamp(-1., 1.).acos();
        (0..3)
            .map(|k| r * (phi / 3. - TAU * k as f64 / 3.).cos())
            .collect()
    };

    ys.into_iter().map(|y| y - shift).collect()
}
