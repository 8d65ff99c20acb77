//! Motion-vector coordinate transform.
//!
//! A *motion vector* is the body's velocity expressed in a caller-selected
//! reference frame. The transform is stateless: it maps stored velocity to a
//! logical vector and back, and never holds a copy of either.

use bevy::prelude::*;

use crate::math::{is_finite_vec, is_zero_approx};

/// The reference "up" of the world. A body whose up direction equals this
/// vector has an up-direction rotation of zero.
pub const WORLD_UP: Vec2 = Vec2::Y;

/// Reference frame in which the motion vector is expressed.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotionVectorDirection {
    /// Relative to the up direction: logical `x` runs along the ground
    /// tangent and logical `y` along the up direction.
    #[default]
    UpDirection,
    /// Relative to the body's global rotation.
    GlobalRotation,
    /// World space. The motion vector is the velocity itself.
    Default,
}

/// Signed angle from [`WORLD_UP`] to `up_direction`, in `[-π, π]`.
///
/// Degenerate input (zero vector) yields `0.0` instead of NaN.
pub fn up_direction_rotation(up_direction: Vec2) -> f32 {
    if !is_finite_vec(up_direction) || is_zero_approx(up_direction) {
        return 0.0;
    }
    WORLD_UP.angle_to(up_direction)
}

/// Rotation of the frame selected by `direction`.
pub fn frame_rotation(direction: MotionVectorDirection, up_direction: Vec2, global_rotation: f32) -> f32 {
    match direction {
        MotionVectorDirection::UpDirection => up_direction_rotation(up_direction),
        MotionVectorDirection::GlobalRotation => global_rotation,
        MotionVectorDirection::Default => 0.0,
    }
}

/// Expresses a world-space `velocity` in the logical frame.
pub fn to_logical(
    velocity: Vec2,
    direction: MotionVectorDirection,
    up_direction: Vec2,
    global_rotation: f32,
) -> Vec2 {
    if direction == MotionVectorDirection::Default {
        return velocity;
    }
    let angle = frame_rotation(direction, up_direction, global_rotation);
    Vec2::from_angle(-angle).rotate(velocity)
}

/// Converts a logical `value` back into world-space velocity.
///
/// Exact inverse of [`to_logical`] for the same frame parameters.
pub fn from_logical(
    value: Vec2,
    direction: MotionVectorDirection,
    up_direction: Vec2,
    global_rotation: f32,
) -> Vec2 {
    if direction == MotionVectorDirection::Default {
        return value;
    }
    let angle = frame_rotation(direction, up_direction, global_rotation);
    Vec2::from_angle(angle).rotate(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-3;

    const MODES: [MotionVectorDirection; 3] = [
        MotionVectorDirection::UpDirection,
        MotionVectorDirection::GlobalRotation,
        MotionVectorDirection::Default,
    ];

    #[test]
    fn world_up_has_zero_rotation() {
        assert_eq!(up_direction_rotation(Vec2::Y), 0.0);
    }

    #[test]
    fn up_direction_rotation_quadrants() {
        assert!((up_direction_rotation(Vec2::NEG_X) - FRAC_PI_2).abs() < EPS);
        assert!((up_direction_rotation(Vec2::X) + FRAC_PI_2).abs() < EPS);
        assert!((up_direction_rotation(Vec2::NEG_Y).abs() - PI).abs() < EPS);
    }

    #[test]
    fn degenerate_up_direction_has_zero_rotation() {
        assert_eq!(up_direction_rotation(Vec2::ZERO), 0.0);
    }

    #[test]
    fn default_mode_is_identity() {
        let v = Vec2::new(12.0, -7.5);
        assert_eq!(to_logical(v, MotionVectorDirection::Default, Vec2::X, 1.3), v);
        assert_eq!(from_logical(v, MotionVectorDirection::Default, Vec2::X, 1.3), v);
    }

    #[test]
    fn up_direction_mode_maps_tangent_to_x() {
        // Standing on a wall to the left: up points right, tangent points down.
        let up = Vec2::X;
        let logical = to_logical(Vec2::new(0.0, -10.0), MotionVectorDirection::UpDirection, up, 0.0);
        assert!((logical - Vec2::new(10.0, 0.0)).length() < EPS);

        let logical = to_logical(Vec2::new(5.0, 0.0), MotionVectorDirection::UpDirection, up, 0.0);
        assert!((logical - Vec2::new(0.0, 5.0)).length() < EPS);
    }

    #[test]
    fn global_rotation_mode_unrotates() {
        let logical = to_logical(
            Vec2::new(0.0, 3.0),
            MotionVectorDirection::GlobalRotation,
            Vec2::Y,
            FRAC_PI_2,
        );
        assert!((logical - Vec2::new(3.0, 0.0)).length() < EPS);
    }

    #[test]
    fn round_trip_all_modes() {
        let velocities = [
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(-350.0, 1200.5),
            Vec2::new(0.001, -0.002),
        ];
        let ups = [
            Vec2::Y,
            Vec2::NEG_Y,
            Vec2::X,
            Vec2::new(0.6, 0.8),
            Vec2::new(-0.28, -0.96),
        ];
        let rotations = [0.0, 0.7, -2.9, PI];

        for mode in MODES {
            for v in velocities {
                for up in ups {
                    for rotation in rotations {
                        let logical = to_logical(v, mode, up, rotation);
                        let back = from_logical(logical, mode, up, rotation);
                        let tolerance = EPS * v.length().max(1.0);
                        assert!(
                            (back - v).length() < tolerance,
                            "round trip failed for {mode:?}: {v} -> {logical} -> {back}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn transform_preserves_length() {
        let v = Vec2::new(30.0, -40.0);
        for mode in MODES {
            let logical = to_logical(v, mode, Vec2::new(0.6, 0.8), 1.1);
            assert!((logical.length() - 50.0).abs() < EPS);
        }
    }
}
