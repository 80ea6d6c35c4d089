use crate::types::{Axis, Quaternion, RotationOrder};
use cgmath::{Deg, Matrix3, Rotation3};

/// Below this distance from |sin(middle angle)| == 1 the decomposition is treated as gimbal locked.
const GIMBAL_EPSILON: f64 = 1e-7;

/// Quaternion of a single rotation of `angle` DEGREES about `axis`.
pub(crate) fn __axis_quat(axis: Axis, angle: f64) -> Quaternion {
    match axis {
        Axis::X => Quaternion::from_angle_x(Deg(angle)),
        Axis::Y => Quaternion::from_angle_y(Deg(angle)),
        Axis::Z => Quaternion::from_angle_z(Deg(angle)),
    }
}

/// Convert euler angles in DEGREES to quaternion.
/// Intrinsic composition: `angles[0]` about the first axis of `order`, then `angles[1]` about the
/// rotated second axis and so on, i.e. q = q1 * q2 * q3.
pub(crate) fn __from_euler_to_quat(angles: [f64; 3], order: RotationOrder) -> Quaternion {
    let [a1, a2, a3] = order.axes();
    __axis_quat(a1, angles[0]) * __axis_quat(a2, angles[1]) * __axis_quat(a3, angles[2])
}

/// Decompose a rotation into intrinsic euler angles in RADIANS for the given order.
/// The middle angle is in [-pi/2, pi/2], the outer two in [-pi, pi].
/// When gimbal locked the third angle is 0 and the first one carries the remaining rotation.
pub(crate) fn __from_quat_to_euler(q: Quaternion, order: RotationOrder) -> [f64; 3] {
    let m = Matrix3::from(q);
    // cgmath matrices are column major
    let r = |row: usize, col: usize| m[col][row];

    let [i, j, k] = order.axes().map(Axis::index);
    let sign = if order.is_cyclic() { 1.0 } else { -1.0 };

    let sin_middle = (sign * r(i, k)).clamp(-1.0, 1.0);
    let middle = sin_middle.asin();

    if sin_middle.abs() < 1.0 - GIMBAL_EPSILON {
        let first = (-sign * r(j, k)).atan2(r(k, k));
        let third = (-sign * r(i, j)).atan2(r(i, i));
        [first, middle, third]
    } else {
        //// R = R_i(first) * R_j(middle), so column j of R is axis j rotated about axis i
        let first = (sign * r(k, j)).atan2(r(j, j));
        [first, middle, 0.0]
    }
}

/// [x, y, z, w] layout (scalar last).
pub(crate) fn __quat_to_xyzw(q: Quaternion) -> [f64; 4] {
    [q.v.x, q.v.y, q.v.z, q.s]
}

/////////////////////////////////////////////////////////////////////////////////////////////////
