//! Configuration for synchronizing the global rotation to the up direction.

use std::f32::consts::TAU;

use bevy::prelude::*;

/// Strategy used to rotate the body toward its up direction.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum RotationSync {
    /// Snap while on (or just left) the floor, otherwise close the shortest
    /// arc to the target by the fraction `speed * delta` each tick.
    Lerp {
        /// Fraction of the remaining arc covered per second (1/s). The
        /// per-tick weight is clamped to `[0, 1]`.
        speed: f32,
    },
    /// Animate toward the target over `duration` seconds with a sinusoidal
    /// ease. Requests made while an animation is running are dropped.
    Tween {
        /// Animation length (seconds).
        duration: f32,
    },
}

impl Default for RotationSync {
    fn default() -> Self {
        Self::Lerp { speed: TAU }
    }
}

impl RotationSync {
    /// Return a copy with negative or non-finite rates clamped to zero,
    /// or `None` if the value is already valid.
    pub fn sanitized(&self) -> Option<Self> {
        let fix = |v: f32| if v.is_finite() && v >= 0.0 { v } else { 0.0 };
        match *self {
            Self::Lerp { speed } if fix(speed) != speed => Some(Self::Lerp { speed: fix(speed) }),
            Self::Tween { duration } if fix(duration) != duration => Some(Self::Tween {
                duration: fix(duration),
            }),
            _ => None,
        }
    }
}
