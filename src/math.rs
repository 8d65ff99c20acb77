//! Vector and angle helpers.
//!
//! Angle arithmetic and numeric guards used by the integrator and the
//! motion-vector transform. Vector algebra comes straight from glam.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Tolerance used for approximate zero checks on vectors and scalars.
pub const CMP_EPSILON: f32 = 1e-5;

/// Tolerance for deciding that a rotation already matches its target (radians).
pub const ROTATION_TOLERANCE: f32 = 1e-4;

/// Whether every component of `v` is finite (no NaN, no infinity).
#[inline]
pub fn is_finite_vec(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Whether both components of `v` are within [`CMP_EPSILON`] of zero.
#[inline]
pub fn is_zero_approx(v: Vec2) -> bool {
    v.x.abs() < CMP_EPSILON && v.y.abs() < CMP_EPSILON
}

/// Moves `from` toward `to` by at most `delta`, never overshooting.
///
/// Scalar counterpart of `Vec2::move_towards`.
pub fn move_toward_scalar(from: f32, to: f32, delta: f32) -> f32 {
    let diff = to - from;
    if diff.abs() <= delta {
        to
    } else {
        from + diff.signum() * delta
    }
}

/// Wraps an angle into `[-π, π)`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Shortest signed angular distance from `from` to `to`.
pub fn angle_difference(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    (2.0 * diff).rem_euclid(TAU) - diff
}

/// Interpolates between two angles along the shortest arc.
#[inline]
pub fn lerp_angle(from: f32, to: f32, weight: f32) -> f32 {
    from + angle_difference(from, to) * weight
}

/// Whether two angles describe the same orientation within [`ROTATION_TOLERANCE`].
#[inline]
pub fn is_angle_equal_approx(a: f32, b: f32) -> bool {
    angle_difference(a, b).abs() < ROTATION_TOLERANCE
}

/// Sinusoidal ease-in-out curve over `t` in `[0, 1]`.
#[inline]
pub fn sine_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    -((PI * t).cos() - 1.0) / 2.0
}
