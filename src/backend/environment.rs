//! The environment contract consumed by the integrator.
//!
//! [`SlideEnvironment`] is the per-body view of the physics world: gravity,
//! contact flags, slide resolution, trial moves and the mass store. The
//! integrator only ever talks to this trait, so it can be driven by a real
//! backend through [`WorldEnvironment`] or by a hand-written fixture.

use std::marker::PhantomData;

use bevy::prelude::*;

use super::traits::{KineBodyBackend, MIN_MASS};
use crate::collision::{MoveCollision, SlideContacts};
use crate::config::SlideConfig;

/// Per-body view of the physics environment.
pub trait SlideEnvironment {
    /// Gravity acting on the body at its current location.
    fn gravity(&self) -> Vec2;

    /// Contact flags from the most recent slide.
    fn contacts(&self) -> SlideContacts;

    /// Move the body along `velocity`, sliding along obstacles.
    ///
    /// `velocity` is updated in place to the post-slide velocity. Returns
    /// whether anything was hit.
    fn move_and_slide(&mut self, velocity: &mut Vec2, up_direction: Vec2, delta: f32) -> bool;

    /// Sweep the body's shape along `motion` without moving it.
    fn test_move(&self, motion: Vec2) -> Option<MoveCollision>;

    /// Mass from the environment's body-parameter store.
    fn mass(&self) -> f32;

    /// Write a new mass to the body-parameter store.
    fn set_mass(&mut self, mass: f32);

    fn is_on_floor(&self) -> bool {
        self.contacts().on_floor
    }

    fn is_on_wall(&self) -> bool {
        self.contacts().on_wall
    }

    fn is_on_ceiling(&self) -> bool {
        self.contacts().on_ceiling
    }

    /// Normal of the floor touched by the last slide, zero when airborne.
    fn floor_normal(&self) -> Vec2 {
        self.contacts().floor_normal
    }
}

/// Friction coefficient of the surface directly beneath the body.
///
/// Probes with a trial move against the floor normal. Returns `0.0` when the
/// body is not on the floor or nothing with a friction coefficient is found.
pub fn floor_friction<E: SlideEnvironment + ?Sized>(env: &E) -> f32 {
    if !env.is_on_floor() {
        return 0.0;
    }
    env.test_move(-env.floor_normal())
        .and_then(|hit| hit.friction)
        .unwrap_or(0.0)
}

/// [`SlideEnvironment`] over a Bevy [`World`] and a [`KineBodyBackend`].
///
/// Contact flags are stored in the entity's [`SlideContacts`] component.
pub struct WorldEnvironment<'w, B: KineBodyBackend> {
    world: &'w mut World,
    entity: Entity,
    config: SlideConfig,
    _marker: PhantomData<B>,
}

impl<'w, B: KineBodyBackend> WorldEnvironment<'w, B> {
    pub fn new(world: &'w mut World, entity: Entity, config: SlideConfig) -> Self {
        Self {
            world,
            entity,
            config,
            _marker: PhantomData,
        }
    }
}

impl<B: KineBodyBackend> SlideEnvironment for WorldEnvironment<'_, B> {
    fn gravity(&self) -> Vec2 {
        B::get_gravity(&*self.world, self.entity)
    }

    fn contacts(&self) -> SlideContacts {
        self.world
            .get::<SlideContacts>(self.entity)
            .copied()
            .unwrap_or_default()
    }

    fn move_and_slide(&mut self, velocity: &mut Vec2, up_direction: Vec2, delta: f32) -> bool {
        let output = B::move_and_slide(
            self.world,
            self.entity,
            *velocity,
            up_direction,
            delta,
            &self.config,
        );
        *velocity = output.velocity;

        if let Ok(mut entity) = self.world.get_entity_mut(self.entity) {
            entity.insert(output.contacts);
        }
        output.collided
    }

    fn test_move(&self, motion: Vec2) -> Option<MoveCollision> {
        B::test_move(&*self.world, self.entity, motion)
    }

    fn mass(&self) -> f32 {
        B::get_mass(&*self.world, self.entity).max(MIN_MASS)
    }

    fn set_mass(&mut self, mass: f32) {
        if mass.is_nan() || mass < MIN_MASS {
            warn!(
                "Mass {} for {:?} is below the minimum, clamping to {}",
                mass, self.entity, MIN_MASS
            );
        }
        B::set_mass(self.world, self.entity, mass.max(MIN_MASS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnvironment;

    /// Drop the body onto the floor at y = 0.
    fn land(env: &mut TestEnvironment) {
        let mut velocity = Vec2::new(0.0, -10.0);
        env.move_and_slide(&mut velocity, Vec2::Y, 1.0);
        assert!(env.is_on_floor());
    }

    #[test]
    fn floor_friction_reads_surface_coefficient() {
        let mut env = TestEnvironment::default()
            .with_floor(0.0)
            .at(Vec2::new(0.0, 1.0));
        env.friction = Some(0.6);
        land(&mut env);

        assert_eq!(floor_friction(&env), 0.6);
    }

    #[test]
    fn floor_without_friction_reads_zero() {
        let mut env = TestEnvironment::default()
            .with_floor(0.0)
            .at(Vec2::new(0.0, 1.0));
        land(&mut env);

        assert_eq!(floor_friction(&env), 0.0);
    }

    #[test]
    fn airborne_body_has_no_floor_friction() {
        let mut env = TestEnvironment::default()
            .with_floor(0.0)
            .at(Vec2::new(0.0, 50.0));
        env.friction = Some(0.6);

        assert!(!env.is_on_floor());
        assert_eq!(floor_friction(&env), 0.0);
    }
}
