//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement to
//! drive kinematic bodies. The backend owns collision resolution, gravity
//! lookup and the mass store; the controller owns everything else.

use bevy::prelude::*;

use crate::collision::{MoveCollision, SlideContacts};
use crate::config::SlideConfig;

/// Smallest mass a body may have. Keeps momentum helpers free of division
/// by zero.
pub const MIN_MASS: f32 = 0.01;

/// Result of a single move-and-slide call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlideOutput {
    /// Velocity after sliding along every touched surface.
    pub velocity: Vec2,
    /// Whether anything was hit.
    pub collided: bool,
    /// Surfaces touched during the slide.
    pub contacts: SlideContacts,
}

impl SlideOutput {
    /// Output for a slide that moved the full distance without touching
    /// anything.
    pub fn unobstructed(velocity: Vec2) -> Self {
        Self {
            velocity,
            collided: false,
            contacts: SlideContacts::default(),
        }
    }
}

/// Trait for physics backend implementations.
///
/// Implement this trait to drive kinematic bodies with a physics engine.
/// Every method addresses the body by entity; the controller never caches
/// backend state between calls.
///
/// The Avian2D implementation lives in the `avian` module (feature `avian2d`).
pub trait KineBodyBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Gravity acting on the entity at its current location.
    fn get_gravity(world: &World, entity: Entity) -> Vec2;

    /// Mass of the entity, never below [`MIN_MASS`].
    fn get_mass(world: &World, entity: Entity) -> f32;

    /// Store a new mass for the entity. Values below [`MIN_MASS`] are
    /// clamped.
    fn set_mass(world: &mut World, entity: Entity, mass: f32);

    /// Current global rotation of the entity (radians).
    fn get_rotation(world: &World, entity: Entity) -> f32;

    /// Write the global rotation of the entity (radians).
    fn set_rotation(world: &mut World, entity: Entity, rotation: f32);

    /// Move the entity along `velocity * delta`, stopping at and sliding
    /// along obstacles. Surfaces are classified against `up_direction`.
    fn move_and_slide(
        world: &mut World,
        entity: Entity,
        velocity: Vec2,
        up_direction: Vec2,
        delta: f32,
        config: &SlideConfig,
    ) -> SlideOutput;

    /// Sweep the entity's shape along `motion` without moving it.
    fn test_move(world: &World, entity: Entity, motion: Vec2) -> Option<MoveCollision>;

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}
