//! Body configuration components.
//!
//! Configuration is validated at use, not at assignment: out-of-range values
//! are clamped to a safe minimum by [`KineBodyConfig::sanitized`] (run by the
//! plugin whenever a config changes) and guarded again inside the integrator.

mod gravity;
mod motion;
mod rotation_sync;
mod slide;

pub use gravity::GravityOverride;
pub use motion::MotionMode;
pub use rotation_sync::RotationSync;
pub use slide::SlideConfig;

use bevy::prelude::*;

/// Default cap on falling speed (world units/second).
pub const DEFAULT_MAX_FALLING_SPEED: f32 = 1500.0;

/// Tuning for a kinematic body.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct KineBodyConfig {
    /// Grounded or floating motion.
    pub motion_mode: MotionMode,

    /// Multiplier on the environment gravity. `0` disables gravity.
    pub gravity_scale: f32,

    /// Cap on the gravity-aligned speed while falling. `0` means unlimited.
    pub max_falling_speed: f32,

    /// How the global rotation follows the up direction.
    pub rotation_sync: RotationSync,

    /// Whether the plugin's automatic step synchronizes rotation.
    pub sync_rotation: bool,

    /// Speed scale used by the plugin's automatic step.
    pub speed_scale: f32,

    /// Whether the plugin steps this body every fixed tick. Disable to drive
    /// the body manually through [`crate::step_entity`].
    pub auto_step: bool,

    /// Slide resolution parameters passed to the backend.
    pub slide: SlideConfig,
}

impl Default for KineBodyConfig {
    fn default() -> Self {
        Self {
            motion_mode: MotionMode::Grounded,
            gravity_scale: 1.0,
            max_falling_speed: DEFAULT_MAX_FALLING_SPEED,
            rotation_sync: RotationSync::default(),
            sync_rotation: true,
            speed_scale: 1.0,
            auto_step: true,
            slide: SlideConfig::default(),
        }
    }
}

impl KineBodyConfig {
    /// Configuration for side-on platformer characters.
    pub fn platformer() -> Self {
        Self::default()
    }

    /// Configuration for top-down characters: floating, no gravity, no
    /// rotation sync, and a motion vector that is plain velocity.
    pub fn top_down() -> Self {
        Self {
            motion_mode: MotionMode::Floating,
            gravity_scale: 0.0,
            max_falling_speed: 0.0,
            sync_rotation: false,
            ..default()
        }
    }

    /// Builder: set the motion mode.
    pub fn with_motion_mode(mut self, motion_mode: MotionMode) -> Self {
        self.motion_mode = motion_mode;
        self
    }

    /// Builder: set the gravity scale.
    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    /// Builder: set the maximum falling speed.
    pub fn with_max_falling_speed(mut self, max_falling_speed: f32) -> Self {
        self.max_falling_speed = max_falling_speed;
        self
    }

    /// Builder: set the rotation sync strategy.
    pub fn with_rotation_sync(mut self, rotation_sync: RotationSync) -> Self {
        self.rotation_sync = rotation_sync;
        self
    }

    /// Return a copy with out-of-range values clamped, or `None` if every
    /// value is already valid.
    pub fn sanitized(&self) -> Option<Self> {
        let mut fixed = *self;

        let non_negative = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        fixed.gravity_scale = non_negative(self.gravity_scale);
        fixed.max_falling_speed = non_negative(self.max_falling_speed);
        if !self.speed_scale.is_finite() || self.speed_scale < 0.0 {
            fixed.speed_scale = 0.0;
        }
        if let Some(sync) = self.rotation_sync.sanitized() {
            fixed.rotation_sync = sync;
        }
        let floor_max_angle = self.slide.floor_max_angle;
        fixed.slide.floor_max_angle = if floor_max_angle.is_finite() {
            floor_max_angle.clamp(0.0, std::f32::consts::PI)
        } else {
            SlideConfig::default().floor_max_angle
        };
        fixed.slide.skin_width = non_negative(self.slide.skin_width);

        (fixed != *self).then_some(fixed)
    }
}
