//! Avian2D physics backend implementation.
//!
//! This module provides the physics backend for Avian2D (avian2d).
//! Enable with the `avian2d` feature.
//!
//! Bodies are expected to be [`RigidBody::Kinematic`] with a [`Collider`] on
//! the body entity itself. Slides are resolved with shape casts against
//! Avian's [`SpatialQueryPipeline`] in world space. Avian's `Position` and
//! `Rotation` receive the world-space result; the `Transform` receives it in
//! the parent's space when the body is a child entity.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::backend::{KineBodyBackend, SlideOutput, MIN_MASS};
use crate::body::KineBody;
use crate::collision::{MoveCollision, SlideContacts};
use crate::config::{GravityOverride, SlideConfig};
use crate::KineBodySet;

/// Sweeps shorter than this are skipped.
const MIN_SWEEP_DISTANCE: f32 = 1e-4;

/// Lower bound for the cosine used when pulling a hit back by the skin width.
const DOT_EPSILON: f32 = 0.005;

/// Avian2D physics backend for kinematic bodies.
pub struct Avian2dBackend;

impl KineBodyBackend for Avian2dBackend {
    fn plugin() -> impl Plugin {
        Avian2dBackendPlugin
    }

    fn get_gravity(world: &World, entity: Entity) -> Vec2 {
        // A per-body override takes precedence over the global gravity.
        world
            .get::<GravityOverride>(entity)
            .map(|g| g.0)
            .or_else(|| world.get_resource::<Gravity>().map(|g| g.0))
            .unwrap_or(Vec2::ZERO)
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        let mass = world
            .get::<Mass>(entity)
            .map(|m| m.0)
            .or_else(|| world.get::<ComputedMass>(entity).map(|m| m.value()))
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(1.0);
        mass.max(MIN_MASS)
    }

    fn set_mass(world: &mut World, entity: Entity, mass: f32) {
        let mass = if mass.is_finite() { mass.max(MIN_MASS) } else { MIN_MASS };
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert(Mass(mass));
        }
    }

    fn get_rotation(world: &World, entity: Entity) -> f32 {
        // Transform first: Avian's Rotation is only synced by the physics
        // step, which runs after the controller.
        world
            .get::<Transform>(entity)
            .map(|t| z_rotation(t.rotation) + parent_rotation(world, entity))
            .or_else(|| world.get::<Rotation>(entity).map(|r| r.as_radians()))
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| z_rotation(t.rotation()))
            })
            .unwrap_or(0.0)
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: f32) {
        let local = rotation - parent_rotation(world, entity);
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = Quat::from_rotation_z(local);
        }
        if let Some(mut rot) = world.get_mut::<Rotation>(entity) {
            *rot = Rotation::radians(rotation);
        }
    }

    fn move_and_slide(
        world: &mut World,
        entity: Entity,
        velocity: Vec2,
        up_direction: Vec2,
        delta: f32,
        config: &SlideConfig,
    ) -> SlideOutput {
        let Some(start) = get_position(world, entity) else {
            return SlideOutput::unobstructed(velocity);
        };

        let (position, output) = match world.get::<Collider>(entity) {
            Some(collider) => sweep_and_slide(
                world,
                entity,
                collider,
                start,
                velocity,
                up_direction,
                delta,
                config,
            ),
            // Nothing to collide with: move the full distance.
            None => (start + velocity * delta, SlideOutput::unobstructed(velocity)),
        };

        set_position(world, entity, position);
        output
    }

    fn test_move(world: &World, entity: Entity, motion: Vec2) -> Option<MoveCollision> {
        let position = get_position(world, entity)?;
        let collider = world.get::<Collider>(entity)?;
        let (direction, distance) = Dir2::new_and_length(motion).ok()?;
        let rotation = Self::get_rotation(world, entity);

        let hit = cast_solid(world, entity, collider, position, rotation, direction, distance)?;
        let collision = MoveCollision::hit(hit.distance, hit.normal1, hit.point1, Some(hit.entity));
        Some(match collider_friction(world, hit.entity) {
            Some(friction) => collision.with_friction(friction),
            None => collision,
        })
    }
}

/// Plugin that sets up Avian2D-specific systems for kinematic bodies.
pub struct Avian2dBackendPlugin;

impl Plugin for Avian2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            check_kine_body_setup.in_set(KineBodySet::Prepare),
        );
    }
}

/// Warn about bodies that Avian would fight over or cannot collide.
fn check_kine_body_setup(
    q_bodies: Query<(Entity, Option<&RigidBody>, Has<Collider>), Added<KineBody>>,
) {
    for (entity, rigid_body, has_collider) in &q_bodies {
        if !has_collider {
            warn!(
                "KineBody {:?} has no Collider on its own entity; it will move without colliding",
                entity
            );
        }
        if let Some(rigid_body) = rigid_body {
            if !matches!(rigid_body, RigidBody::Kinematic) {
                warn!(
                    "KineBody {:?} uses {:?}; use RigidBody::Kinematic so the solver does not move it",
                    entity, rigid_body
                );
            }
        }
    }
}

fn z_rotation(rotation: Quat) -> f32 {
    let (_, _, z) = rotation.to_euler(EulerRot::XYZ);
    z
}

/// World transform of the body's parent, for child bodies.
fn parent_transform(world: &World, entity: Entity) -> Option<GlobalTransform> {
    let parent = world.get::<ChildOf>(entity)?.parent();
    world.get::<GlobalTransform>(parent).copied()
}

fn parent_rotation(world: &World, entity: Entity) -> f32 {
    parent_transform(world, entity)
        .map(|parent| z_rotation(parent.rotation()))
        .unwrap_or(0.0)
}

/// World-space position of the body.
fn get_position(world: &World, entity: Entity) -> Option<Vec2> {
    world
        .get::<Transform>(entity)
        .map(|t| match parent_transform(world, entity) {
            Some(parent) => parent.transform_point(t.translation).xy(),
            None => t.translation.xy(),
        })
        .or_else(|| world.get::<Position>(entity).map(|p| p.0))
        .or_else(|| {
            world
                .get::<GlobalTransform>(entity)
                .map(|t| t.translation().xy())
        })
}

/// Write a world-space position to the body.
fn set_position(world: &mut World, entity: Entity, position: Vec2) {
    let parent = parent_transform(world, entity);
    if let Some(mut transform) = world.get_mut::<Transform>(entity) {
        let target = position.extend(transform.translation.z);
        let local = match parent {
            Some(parent) => parent.affine().inverse().transform_point3(target),
            None => target,
        };
        transform.translation.x = local.x;
        transform.translation.y = local.y;
    }
    if let Some(mut pos) = world.get_mut::<Position>(entity) {
        pos.0 = position;
    }
}

/// Spatial query filter for the body: its own collision layers, minus itself.
fn body_filter(world: &World, entity: Entity) -> SpatialQueryFilter {
    let filter = match world.get::<CollisionLayers>(entity) {
        Some(layers) => SpatialQueryFilter::from_mask(layers.filters),
        None => SpatialQueryFilter::default(),
    };
    filter.with_excluded_entities([entity])
}

/// Cast the body's shape, ignoring sensors and the body itself.
fn cast_solid(
    world: &World,
    entity: Entity,
    collider: &Collider,
    origin: Vec2,
    rotation: f32,
    direction: Dir2,
    max_distance: f32,
) -> Option<ShapeHitData> {
    let pipeline = world.get_resource::<SpatialQueryPipeline>()?;
    let filter = body_filter(world, entity);
    pipeline.cast_shape_predicate(
        collider,
        origin,
        rotation,
        direction,
        &ShapeCastConfig {
            ignore_origin_penetration: true,
            ..ShapeCastConfig::from_max_distance(max_distance)
        },
        &filter,
        &|hit| world.get::<Sensor>(hit).is_none(),
    )
}

/// Collide-and-slide: sweep along the remaining motion, stop `skin_width`
/// short of the first hit, then redirect the motion along the surface.
#[allow(clippy::too_many_arguments)]
fn sweep_and_slide(
    world: &World,
    entity: Entity,
    collider: &Collider,
    start: Vec2,
    velocity: Vec2,
    up_direction: Vec2,
    delta: f32,
    config: &SlideConfig,
) -> (Vec2, SlideOutput) {
    let rotation = Avian2dBackend::get_rotation(world, entity);
    let mut position = start;
    let mut velocity = velocity;
    let mut remaining = velocity * delta;
    let mut contacts = SlideContacts::default();
    let mut collided = false;

    for _ in 0..config.max_slides.max(1) {
        let Ok((direction, distance)) = Dir2::new_and_length(remaining) else {
            break;
        };
        if distance < MIN_SWEEP_DISTANCE {
            break;
        }

        let Some(hit) = cast_solid(
            world,
            entity,
            collider,
            position,
            rotation,
            direction,
            distance + config.skin_width,
        ) else {
            position += remaining;
            remaining = Vec2::ZERO;
            break;
        };

        let normal = hit.normal1;
        let dot = direction.dot(-normal).max(DOT_EPSILON);
        let safe_distance = (hit.distance - config.skin_width / dot).clamp(0.0, distance);
        position += *direction * safe_distance;
        remaining -= *direction * safe_distance;

        collided = true;
        let kind = contacts.record(normal, Some(hit.entity), up_direction, config.floor_max_angle);
        trace!("slide hit {:?} ({:?}) normal {:?}", hit.entity, kind, normal);

        // Remove the components pointing into the surface.
        let into = velocity.dot(normal);
        if into < 0.0 {
            velocity -= normal * into;
        }
        let into = remaining.dot(normal);
        if into < 0.0 {
            remaining -= normal * into;
        }
    }

    let output = SlideOutput {
        velocity,
        collided,
        contacts,
    };
    (position, output)
}

/// Friction coefficient of a hit collider, or of the body it belongs to.
fn collider_friction(world: &World, collider: Entity) -> Option<f32> {
    world
        .get::<Friction>(collider)
        .or_else(|| {
            world
                .get::<ColliderOf>(collider)
                .and_then(|of| world.get::<Friction>(of.body))
        })
        .map(|f| f.dynamic_coefficient)
}
