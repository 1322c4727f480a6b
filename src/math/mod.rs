pub mod rotation;
pub mod roots;
pub mod waves;

pub use rotation::*;
pub use waves::*;

use std::f64::consts::{PI, TAU};

pub type Vec3 = na::Vector3<f64>;
pub type Mat3 = na::Matrix3<f64>;
pub type Quat = na::UnitQuaternion<f64>;

/// [position(3), velocity(3), quaternion(4) as (w, x, y, z), angular velocity(3)]
pub type Vector13 = na::SVector<f64, 13>;
/// [linear acceleration(3), angular acceleration(3)]
pub type Vector6 = na::Vector6<f64>;

pub fn sign(x: f64) -> f64 {
    match x {
        x if x > 0. => 1.,
        x if x < 0. => -1.,
        _ => 0.,
    }
}

/// element-wise [`sign`]
pub fn sign_mat<const R: usize, const C: usize>(
    mat: &na::SMatrix<f64, R, C>,
) -> na::SMatrix<f64, R, C> {
    mat.map(sign)
}

/// cross product matrix: `skew_sym(a) * b == a.cross(&b)`
pub fn skew_sym(v: &Vec3) -> Mat3 {
    Mat3::new(
        0., -v.z, v.y, //
        v.z, 0., -v.x, //
        -v.y, v.x, 0.,
    )
}

pub fn angle_difference(alpha1: f64, alpha2: f64) -> f64 {
    let diff = alpha1 - alpha2;
    match diff {
        d if d > PI => d - TAU,
        d if d < -PI => d + TAU,
        d => d,
    }
}
