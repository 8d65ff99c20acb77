//! # `kinebody_controller`
//!
//! A 2D kinematic character body with physics backend abstraction.
//!
//! This crate layers character motion on top of a physics engine's
//! move-and-slide primitive:
//! - Gravity with a cap on gravity-aligned falling speed
//! - An up direction that follows gravity, so bodies can walk on walls,
//!   ceilings and planets
//! - Global rotation synchronized to the up direction, either snapped/lerped
//!   or animated over a fixed duration
//! - A "motion vector" view over velocity, expressed in world space, relative
//!   to the up direction, or relative to the body's rotation
//! - Helpers for momentum, jumping, turning back, bouncing and walking
//! - Wall, ceiling and floor collision messages
//!
//! ## System Order
//!
//! Systems run in `FixedUpdate` in the phases of [`KineBodySet`]:
//!
//! 1. **Prepare** - Gameplay systems write velocity or motion vectors
//! 2. **Step** - Every auto-stepped body is integrated and slid
//! 3. **React** - Gameplay systems read collision messages
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use kinebody_controller::prelude::*;
//!
//! // A side-on platformer body
//! let body = KineBody::new();
//! let config = KineBodyConfig::platformer();
//!
//! // A top-down body whose motion vector is plain velocity
//! let top_down = KineBody::new().with_motion_vector_direction(MotionVectorDirection::Default);
//! let top_down_config = KineBodyConfig::top_down();
//!
//! // These are spawned together with the backend's collider components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod body;
pub mod collision;
pub mod config;
pub mod error;
pub mod math;
pub mod messages;
pub mod motion_vector;
pub mod sync;

// Systems are internal - they're added automatically by the plugin
pub(crate) mod systems;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "avian2d")]
pub mod avian;

pub use systems::step_entity;

/// System sets for kinematic body phases, all in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KineBodySet {
    /// Gameplay systems that set velocity before the step.
    Prepare,
    /// Integration and slide resolution.
    Step,
    /// Gameplay systems that react to collision messages.
    React,
}

pub mod prelude {
    //! Convenient re-exports for common usage.
    //!
    //! ```rust,no_run
    //! use avian2d::prelude::*;
    //! use bevy::prelude::*;
    //! use kinebody_controller::prelude::*;
    //!
    //! fn spawn_character(mut commands: Commands) {
    //!     commands.spawn((
    //!         Transform::from_xyz(0.0, 100.0, 0.0),
    //!         KineBody::new(),
    //!         KineBodyConfig::platformer(),
    //!         RigidBody::Kinematic,
    //!         Collider::capsule(4.0, 8.0),
    //!     ));
    //! }
    //!
    //! App::new()
    //!     .add_plugins(MinimalPlugins)
    //!     .add_plugins(PhysicsPlugins::default())
    //!     .add_plugins(KineBodyPlugin::<Avian2dBackend>::default())
    //!     .add_systems(Startup, spawn_character)
    //!     .run();
    //! ```

    pub use crate::backend::{floor_friction, KineBodyBackend, SlideEnvironment, WorldEnvironment};
    pub use crate::body::{CollisionEvent, KineBody, StepOutcome};
    pub use crate::collision::{MoveCollision, SlideContacts, SurfaceKind};
    pub use crate::config::{
        GravityOverride, KineBodyConfig, MotionMode, RotationSync, SlideConfig,
    };
    pub use crate::error::KineBodyError;
    pub use crate::messages::{CollidedCeiling, CollidedFloor, CollidedWall};
    pub use crate::motion_vector::MotionVectorDirection;
    pub use crate::step_entity;
    pub use crate::sync::SyncTask;
    pub use crate::{KineBodyPlugin, KineBodySet};

    #[cfg(feature = "avian2d")]
    pub use crate::avian::Avian2dBackend;
}

/// Main plugin for kinematic bodies.
///
/// Generic over a physics backend `B` which performs slide resolution and
/// owns gravity, mass and rotation storage.
///
/// # Examples
///
/// With the Avian2D backend:
/// ```rust,no_run
/// use avian2d::prelude::*;
/// use bevy::prelude::*;
/// use kinebody_controller::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(PhysicsPlugins::default())
///     .add_plugins(KineBodyPlugin::<Avian2dBackend>::default())
///     .run();
/// ```
pub struct KineBodyPlugin<B: backend::KineBodyBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::KineBodyBackend> Default for KineBodyPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::KineBodyBackend> KineBodyPlugin<B> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: backend::KineBodyBackend> Plugin for KineBodyPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<body::KineBody>();
        app.register_type::<config::KineBodyConfig>();
        app.register_type::<config::MotionMode>();
        app.register_type::<config::RotationSync>();
        app.register_type::<config::SlideConfig>();
        app.register_type::<config::GravityOverride>();
        app.register_type::<collision::SlideContacts>();
        app.register_type::<motion_vector::MotionVectorDirection>();
        app.register_type::<sync::SyncTask>();

        app.add_message::<messages::CollidedWall>();
        app.add_message::<messages::CollidedCeiling>();
        app.add_message::<messages::CollidedFloor>();

        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (KineBodySet::Prepare, KineBodySet::Step, KineBodySet::React).chain(),
        );

        // Configs are sanitized before the step so it never sees a negative rate.
        app.add_systems(
            FixedUpdate,
            (systems::sanitize_configs, systems::step_kine_bodies::<B>)
                .chain()
                .in_set(KineBodySet::Step),
        );
    }
}
