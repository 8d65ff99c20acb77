//! Configuration handed to the move-and-slide backend.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;

/// Parameters for the backend's slide resolution.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SlideConfig {
    /// Maximum angle (radians) between a surface normal and the up direction
    /// for that surface to count as floor.
    pub floor_max_angle: f32,

    /// Maximum number of sweep-and-redirect iterations per slide.
    pub max_slides: u32,

    /// Gap (world units) kept between the body and the surfaces it touches.
    pub skin_width: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            floor_max_angle: FRAC_PI_4,
            max_slides: 4,
            skin_width: 0.05,
        }
    }
}
