//! Systems added by [`crate::KineBodyPlugin`].
//!
//! Stepping a body needs the body, the backend and the physics world at the
//! same time, so the step runs as an exclusive system over `&mut World`.

use bevy::prelude::*;

use crate::backend::{KineBodyBackend, WorldEnvironment};
use crate::body::{KineBody, StepOutcome};
use crate::config::KineBodyConfig;
use crate::error::KineBodyError;
use crate::messages::write_collision_message;

/// Step a single body by `delta` seconds.
///
/// This is the same step the plugin runs every fixed tick, exposed for
/// bodies with [`KineBodyConfig::auto_step`] disabled. The body's global
/// rotation is written to the entity afterwards and collision messages are
/// written for every event in the returned outcome.
///
/// Must not be called from inside a handler reacting to this body's own
/// messages during the same tick.
pub fn step_entity<B: KineBodyBackend>(
    world: &mut World,
    entity: Entity,
    delta: f32,
    speed_scale: f32,
    sync_rotation: bool,
) -> Result<StepOutcome, KineBodyError> {
    let entity_ref = world
        .get_entity(entity)
        .map_err(|_| KineBodyError::EntityNotFound(entity))?;
    let mut body = entity_ref
        .get::<KineBody>()
        .cloned()
        .ok_or(KineBodyError::MissingComponent {
            entity,
            component: "KineBody",
        })?;
    let config = entity_ref
        .get::<KineBodyConfig>()
        .copied()
        .ok_or(KineBodyError::MissingComponent {
            entity,
            component: "KineBodyConfig",
        })?;

    if !body.rotation_initialized() {
        body.set_global_rotation(B::get_rotation(world, entity));
    }

    let outcome = {
        let mut env = WorldEnvironment::<B>::new(world, entity, config.slide);
        body.step(&config, &mut env, delta, speed_scale, sync_rotation)
    };

    B::set_rotation(world, entity, body.global_rotation());
    if let Some(mut stored) = world.get_mut::<KineBody>(entity) {
        *stored = body;
    }

    for event in outcome.events() {
        write_collision_message(world, entity, event);
    }

    Ok(outcome)
}

/// Step every auto-stepped body once with the fixed timestep.
pub fn step_kine_bodies<B: KineBodyBackend>(world: &mut World) {
    let delta = B::get_fixed_timestep(world);

    let bodies: Vec<(Entity, KineBodyConfig)> = world
        .query_filtered::<(Entity, &KineBodyConfig), With<KineBody>>()
        .iter(world)
        .filter(|(_, config)| config.auto_step)
        .map(|(entity, config)| (entity, *config))
        .collect();

    for (entity, config) in bodies {
        if let Err(err) = step_entity::<B>(
            world,
            entity,
            delta,
            config.speed_scale,
            config.sync_rotation,
        ) {
            warn!("Skipping kine body step: {}", err);
        }
    }
}

/// Clamp invalid configuration values as soon as they are written.
pub fn sanitize_configs(mut configs: Query<(Entity, &mut KineBodyConfig), Changed<KineBodyConfig>>) {
    for (entity, mut config) in &mut configs {
        if let Some(fixed) = config.sanitized() {
            warn!(
                "Invalid KineBodyConfig on {:?} clamped: {:?} -> {:?}",
                entity, *config, fixed
            );
            *config = fixed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;
    use std::f32::consts::FRAC_PI_2;

    use crate::collision::{MoveCollision, SlideContacts};
    use crate::config::{RotationSync, SlideConfig};
    use crate::backend::{SlideOutput, MIN_MASS};
    use crate::messages::{CollidedCeiling, CollidedFloor, CollidedWall};

    /// Gravity used by [`PlaneBackend`].
    #[derive(Resource)]
    struct PlaneGravity(Vec2);

    #[derive(Component)]
    struct PlaneMass(f32);

    /// Backend over a world with a single floor plane at `y = 0`.
    struct PlaneBackend;

    impl KineBodyBackend for PlaneBackend {
        fn plugin() -> impl Plugin {
            |_: &mut App| {}
        }

        fn get_gravity(world: &World, _entity: Entity) -> Vec2 {
            world
                .get_resource::<PlaneGravity>()
                .map(|g| g.0)
                .unwrap_or(Vec2::new(0.0, -1000.0))
        }

        fn get_mass(world: &World, entity: Entity) -> f32 {
            world
                .get::<PlaneMass>(entity)
                .map(|m| m.0)
                .unwrap_or(1.0)
                .max(MIN_MASS)
        }

        fn set_mass(world: &mut World, entity: Entity, mass: f32) {
            world.entity_mut(entity).insert(PlaneMass(mass.max(MIN_MASS)));
        }

        fn get_rotation(world: &World, entity: Entity) -> f32 {
            world
                .get::<Transform>(entity)
                .map(|t| t.rotation.to_euler(EulerRot::XYZ).2)
                .unwrap_or(0.0)
        }

        fn set_rotation(world: &mut World, entity: Entity, rotation: f32) {
            if let Some(mut transform) = world.get_mut::<Transform>(entity) {
                transform.rotation = Quat::from_rotation_z(rotation);
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
            let Some(mut transform) = world.get_mut::<Transform>(entity) else {
                return SlideOutput::unobstructed(velocity);
            };
            let mut target = transform.translation.xy() + velocity * delta;
            let mut output = SlideOutput::unobstructed(velocity);
            if velocity.y < 0.0 && target.y <= 0.0 {
                target.y = 0.0;
                output.velocity.y = 0.0;
                output.collided = true;
                output
                    .contacts
                    .record(Vec2::Y, None, up_direction, config.floor_max_angle);
            }
            transform.translation = target.extend(transform.translation.z);
            output
        }

        fn test_move(_world: &World, _entity: Entity, _motion: Vec2) -> Option<MoveCollision> {
            None
        }
    }

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<Messages<CollidedWall>>();
        world.init_resource::<Messages<CollidedCeiling>>();
        world.init_resource::<Messages<CollidedFloor>>();
        world
    }

    fn spawn_body(world: &mut World, position: Vec2, config: KineBodyConfig) -> Entity {
        world
            .spawn((
                KineBody::new(),
                config,
                Transform::from_translation(position.extend(0.0)),
            ))
            .id()
    }

    fn floor_messages(world: &mut World) -> Vec<CollidedFloor> {
        world
            .resource_mut::<Messages<CollidedFloor>>()
            .drain()
            .collect()
    }

    #[test]
    fn despawned_entity_is_reported() {
        let mut world = test_world();
        let entity = world.spawn_empty().id();
        world.despawn(entity);

        let result = step_entity::<PlaneBackend>(&mut world, entity, 1.0 / 60.0, 1.0, true);

        assert_eq!(result, Err(KineBodyError::EntityNotFound(entity)));
    }

    #[test]
    fn missing_body_is_reported() {
        let mut world = test_world();
        let entity = world.spawn(Transform::default()).id();

        let result = step_entity::<PlaneBackend>(&mut world, entity, 1.0 / 60.0, 1.0, true);

        assert_eq!(
            result,
            Err(KineBodyError::MissingComponent {
                entity,
                component: "KineBody",
            })
        );
    }

    #[test]
    fn required_components_are_inserted() {
        let mut world = test_world();
        let entity = world.spawn(KineBody::new()).id();

        assert!(world.get::<KineBodyConfig>(entity).is_some());
        assert!(world.get::<SlideContacts>(entity).is_some());
        assert!(world.get::<Transform>(entity).is_some());
    }

    #[test]
    fn landing_writes_one_floor_message() {
        let mut world = test_world();
        let entity = spawn_body(&mut world, Vec2::new(0.0, 1.0), KineBodyConfig::default());

        let mut landed_at = None;
        for frame in 0..30 {
            step_kine_bodies::<PlaneBackend>(&mut world);
            let messages = floor_messages(&mut world);
            if !messages.is_empty() {
                assert_eq!(messages, vec![CollidedFloor { entity }]);
                landed_at = Some(frame);
                break;
            }
        }

        assert!(landed_at.is_some(), "PROOF: body never landed");
        let contacts = world.get::<SlideContacts>(entity).unwrap();
        assert!(contacts.on_floor);
        assert!(world.resource::<Messages<CollidedWall>>().is_empty());
    }

    #[test]
    fn manual_bodies_are_not_auto_stepped() {
        let mut world = test_world();
        let config = KineBodyConfig {
            auto_step: false,
            ..default()
        };
        let entity = spawn_body(&mut world, Vec2::new(0.0, 10.0), config);

        step_kine_bodies::<PlaneBackend>(&mut world);

        let transform = world.get::<Transform>(entity).unwrap();
        assert_eq!(transform.translation.y, 10.0);

        step_entity::<PlaneBackend>(&mut world, entity, 1.0 / 60.0, 1.0, true).unwrap();
        let transform = world.get::<Transform>(entity).unwrap();
        assert!(transform.translation.y < 10.0);
    }

    #[test]
    fn rotation_is_written_to_transform() {
        let mut world = test_world();
        world.insert_resource(PlaneGravity(Vec2::new(1000.0, 0.0)));
        let config =
            KineBodyConfig::default().with_rotation_sync(RotationSync::Lerp { speed: 1.0e6 });
        let entity = spawn_body(&mut world, Vec2::new(0.0, 10.0), config);

        step_kine_bodies::<PlaneBackend>(&mut world);

        let body = world.get::<KineBody>(entity).unwrap();
        assert!((body.global_rotation() - FRAC_PI_2).abs() < 1e-3);
        let transform = world.get::<Transform>(entity).unwrap();
        let z = transform.rotation.to_euler(EulerRot::XYZ).2;
        assert!((z - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn initial_rotation_is_read_from_transform() {
        let mut world = test_world();
        let config = KineBodyConfig {
            sync_rotation: false,
            ..default()
        };
        let entity = spawn_body(&mut world, Vec2::new(0.0, 10.0), config);
        world.get_mut::<Transform>(entity).unwrap().rotation = Quat::from_rotation_z(0.5);

        step_kine_bodies::<PlaneBackend>(&mut world);

        let body = world.get::<KineBody>(entity).unwrap();
        assert!((body.global_rotation() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn invalid_config_is_sanitized() {
        let mut world = test_world();
        let entity = spawn_body(
            &mut world,
            Vec2::ZERO,
            KineBodyConfig::default()
                .with_gravity_scale(-1.0)
                .with_max_falling_speed(f32::NAN),
        );

        world.run_system_once(sanitize_configs).unwrap();

        let config = world.get::<KineBodyConfig>(entity).unwrap();
        assert_eq!(config.gravity_scale, 0.0);
        assert_eq!(config.max_falling_speed, 0.0);
    }

    #[test]
    fn mass_goes_through_backend_store() {
        let mut world = test_world();
        let entity = spawn_body(&mut world, Vec2::ZERO, KineBodyConfig::default());
        let mut body = KineBody::new();

        {
            use crate::backend::SlideEnvironment;
            let mut env = WorldEnvironment::<PlaneBackend>::new(&mut world, entity, default());
            env.set_mass(4.0);
            body.set_momentum(&env, Vec2::new(8.0, 0.0));
            assert!((body.velocity.x - 2.0).abs() < 1e-4);

            env.set_mass(-3.0);
            assert_eq!(env.mass(), MIN_MASS);
        }

        assert_eq!(world.get::<PlaneMass>(entity).unwrap().0, MIN_MASS);
    }
}
