//! In-memory environment used by unit tests.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;

use crate::backend::SlideEnvironment;
use crate::collision::{MoveCollision, SlideContacts};

/// Axis-aligned test world: an optional floor plane, ceiling plane and a wall
/// plane on the right, with a point-sized body.
#[derive(Debug, Clone)]
pub(crate) struct TestEnvironment {
    pub gravity: Vec2,
    pub position: Vec2,
    pub floor_y: Option<f32>,
    pub ceiling_y: Option<f32>,
    pub wall_x: Option<f32>,
    pub contacts: SlideContacts,
    pub mass: f32,
    pub friction: Option<f32>,
    /// Velocities handed to `move_and_slide`, in call order.
    pub slide_velocities: Vec<Vec2>,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -1000.0),
            position: Vec2::ZERO,
            floor_y: None,
            ceiling_y: None,
            wall_x: None,
            contacts: SlideContacts::default(),
            mass: 1.0,
            friction: None,
            slide_velocities: Vec::new(),
        }
    }
}

impl TestEnvironment {
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..default()
        }
    }

    pub fn with_floor(mut self, floor_y: f32) -> Self {
        self.floor_y = Some(floor_y);
        self
    }

    pub fn with_ceiling(mut self, ceiling_y: f32) -> Self {
        self.ceiling_y = Some(ceiling_y);
        self
    }

    pub fn with_wall(mut self, wall_x: f32) -> Self {
        self.wall_x = Some(wall_x);
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }
}

impl SlideEnvironment for TestEnvironment {
    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn contacts(&self) -> SlideContacts {
        self.contacts
    }

    fn move_and_slide(&mut self, velocity: &mut Vec2, up_direction: Vec2, delta: f32) -> bool {
        self.slide_velocities.push(*velocity);
        self.contacts = SlideContacts::default();

        let mut target = self.position + *velocity * delta;
        let mut collided = false;

        if let Some(floor) = self.floor_y {
            if velocity.y < 0.0 && target.y <= floor {
                target.y = floor;
                velocity.y = 0.0;
                self.contacts.record(Vec2::Y, None, up_direction, FRAC_PI_4);
                collided = true;
            }
        }
        if let Some(ceiling) = self.ceiling_y {
            if velocity.y > 0.0 && target.y >= ceiling {
                target.y = ceiling;
                velocity.y = 0.0;
                self.contacts.record(Vec2::NEG_Y, None, up_direction, FRAC_PI_4);
                collided = true;
            }
        }
        if let Some(wall) = self.wall_x {
            if velocity.x > 0.0 && target.x >= wall {
                target.x = wall;
                velocity.x = 0.0;
                self.contacts.record(Vec2::NEG_X, None, up_direction, FRAC_PI_4);
                collided = true;
            }
        }

        self.position = target;
        collided
    }

    fn test_move(&self, motion: Vec2) -> Option<MoveCollision> {
        let floor = self.floor_y?;
        let target = self.position + motion;
        if target.y > floor {
            return None;
        }
        let hit = MoveCollision::hit(
            self.position.y - floor,
            Vec2::Y,
            Vec2::new(target.x, floor),
            None,
        );
        Some(match self.friction {
            Some(friction) => hit.with_friction(friction),
            None => hit,
        })
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }
}
