//! Errors returned by the entity-addressed API.

use bevy::prelude::*;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum KineBodyError {
    #[error("entity {0:?} does not exist")]
    EntityNotFound(Entity),

    #[error("entity {entity:?} has no {component} component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },
}
