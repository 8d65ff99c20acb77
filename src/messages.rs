//! Collision messages written by the step system.
//!
//! One message of each kind is written at most once per body per tick, and
//! only when the slide actually hit something.

use bevy::prelude::*;

use crate::body::CollisionEvent;

/// The body slid into a wall.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollidedWall {
    pub entity: Entity,
}

/// The body slid into a ceiling.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollidedCeiling {
    pub entity: Entity,
}

/// The body slid onto a floor.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollidedFloor {
    pub entity: Entity,
}

/// Write the message matching `event` for `entity`.
pub(crate) fn write_collision_message(world: &mut World, entity: Entity, event: CollisionEvent) {
    match event {
        CollisionEvent::Wall => {
            world.write_message(CollidedWall { entity });
        }
        CollisionEvent::Ceiling => {
            world.write_message(CollidedCeiling { entity });
        }
        CollisionEvent::Floor => {
            world.write_message(CollidedFloor { entity });
        }
    }
}
