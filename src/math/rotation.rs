//! Rotation matrices and attitude representation conversions.
//!
//! Euler angles are always (roll, pitch, yaw) in radians, applied in the
//! z-y-x order. Quaternions rotate body-frame vectors into the world frame.

use super::{Mat3, Quat, Vec3};

/// `[angle, axis_x, axis_y, axis_z]`
pub type AngleAxis = na::Vector4<f64>;

/// below this `sin(angle / 2)` is treated as zero
const AXIS_EPSILON: f64 = 1e-12;

/// Frame rotation about a single axis (1 = x, 2 = y, 3 = z), `angle` in radians.
/// Any other axis gives the identity.
pub fn rotation_mat(axis: usize, angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    match axis {
        1 => Mat3::new(
            1., 0., 0., //
            0., c, s, //
            0., -s, c,
        ),
        2 => Mat3::new(
            c, 0., -s, //
            0., 1., 0., //
            s, 0., c,
        ),
        3 => Mat3::new(
            c, s, 0., //
            -s, c, 0., //
            0., 0., 1.,
        ),
        _ => Mat3::identity(),
    }
}

/// World-frame to body-frame rotation: `v_body = euler_rotation_mat(rpy) * v_world`
pub fn euler_rotation_mat(attitude: &Vec3) -> Mat3 {
    (0..3).fold(Mat3::identity(), |r, i| r * rotation_mat(i + 1, attitude[i]))
}

/// body rates (p, q, r) from Euler angle rates
pub fn euler_dot_to_pqr(attitude: &Vec3, euler_dot: &Vec3) -> Vec3 {
    let (s_phi, c_phi) = attitude.x.sin_cos();
    let (s_theta, c_theta) = attitude.y.sin_cos();
    let mat = Mat3::new(
        1., 0., -s_theta, //
        0., c_phi, s_phi * c_theta, //
        0., -s_phi, c_phi * c_theta,
    );
    mat * euler_dot
}

/// Euler angle rates from body rates (p, q, r). Singular at pitch = ±pi/2.
pub fn pqr_to_euler_dot(attitude: &Vec3, pqr: &Vec3) -> Vec3 {
    let (s_phi, c_phi) = attitude.x.sin_cos();
    let (s_theta, c_theta) = attitude.y.sin_cos();
    let t_theta = s_theta / c_theta;
    let mat = Mat3::new(
        1., s_phi * t_theta, c_phi * t_theta, //
        0., c_phi, -s_phi, //
        0., s_phi / c_theta, c_phi / c_theta,
    );
    mat * pqr
}

/// Angle in `[0, 2pi]` and unit axis. A null rotation reports the x axis.
pub fn quaternion_to_angle_axis(quaternion: &Quat) -> AngleAxis {
    let vector = quaternion.imag();
    let half_sin = vector.norm();
    // atan2 stays accurate near the identity where acos(w) doesn't
    let angle = 2. * half_sin.atan2(quaternion.w);
    let axis = if half_sin > AXIS_EPSILON {
        vector / half_sin
    } else {
        Vec3::x()
    };
    AngleAxis::new(angle, axis.x, axis.y, axis.z)
}

/// Inverse of [`quaternion_to_angle_axis`]. The axis does not need to be unit length;
/// a null axis gives the identity.
pub fn angle_axis_to_quaternion(angle_axis: &AngleAxis) -> Quat {
    let angle = angle_axis[0];
    let Some(axis) = angle_axis.fixed_rows::<3>(1).into_owned().try_normalize(AXIS_EPSILON) else {
        return Quat::identity();
    };
    let (s, c) = (angle / 2.).sin_cos();
    Quat::from_quaternion(na::Quaternion::new(c, axis.x * s, axis.y * s, axis.z * s))
}

pub fn to_quaternion(yaw: f64, pitch: f64, roll: f64) -> Quat {
    let (sy, cy) = (yaw * 0.5).sin_cos();
    let (sp, cp) = (pitch * 0.5).sin_cos();
    let (sr, cr) = (roll * 0.5).sin_cos();

    Quat::from_quaternion(na::Quaternion::new(
        cy * cp * cr + sy * sp * sr,
        cy * cp * sr - sy * sp * cr,
        sy * cp * sr + cy * sp * cr,
        sy * cp * cr - cy * sp * sr,
    ))
}

/// (roll, pitch, yaw); pitch saturates at ±pi/2 in gimbal lock
pub fn to_euler_angle(quaternion: &Quat) -> Vec3 {
    let (w, x, y, z) = (quaternion.w, quaternion.i, quaternion.j, quaternion.k);

    let sinr_cosp = 2. * (w * x + y * z);
    let cosr_cosp = 1. - 2. * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2. * (w * y - z * x);
    let pitch = if sinp.abs() >= 1. {
        std::f64::consts::FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2. * (w * z + x * y);
    let cosy_cosp = 1. - 2. * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    Vec3::new(roll, pitch, yaw)
}
