//! Per-body gravity override.

use bevy::prelude::*;

/// Replaces the environment gravity for a single body.
///
/// Backends read this in place of their global gravity, which lets bodies
/// walk around planets or on ceilings without touching the physics world.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct GravityOverride(pub Vec2);
