//! Kinematic body state and the per-tick motion integrator.
//!
//! [`KineBody`] owns the velocity, up direction and global rotation of a
//! body. Everything that touches the physics world goes through a
//! [`SlideEnvironment`], so the integrator itself is plain data plus math.

use bevy::prelude::*;

use crate::backend::{SlideEnvironment, MIN_MASS};
use crate::collision::SlideContacts;
use crate::config::{KineBodyConfig, MotionMode, RotationSync};
use crate::math::{
    is_angle_equal_approx, is_finite_vec, is_zero_approx, lerp_angle, move_toward_scalar, wrap_angle,
};
use crate::motion_vector::{self, from_logical, to_logical, MotionVectorDirection, WORLD_UP};
use crate::sync::SyncTask;

/// A collision notification raised by [`KineBody::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEvent {
    Wall,
    Ceiling,
    Floor,
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the slide hit anything.
    pub collided: bool,
    pub hit_wall: bool,
    pub hit_ceiling: bool,
    pub hit_floor: bool,
}

impl StepOutcome {
    fn from_slide(collided: bool, contacts: SlideContacts) -> Self {
        Self {
            collided,
            hit_wall: collided && contacts.on_wall,
            hit_ceiling: collided && contacts.on_ceiling,
            hit_floor: collided && contacts.on_floor,
        }
    }

    /// Events raised this step, in wall, ceiling, floor order.
    pub fn events(&self) -> impl Iterator<Item = CollisionEvent> {
        [
            (self.hit_wall, CollisionEvent::Wall),
            (self.hit_ceiling, CollisionEvent::Ceiling),
            (self.hit_floor, CollisionEvent::Floor),
        ]
        .into_iter()
        .filter_map(|(hit, event)| hit.then_some(event))
    }
}

/// State of a kinematic character body.
///
/// `velocity` is the single source of truth for motion. The motion vector is
/// a view over it in the frame chosen by [`KineBody::motion_vector_direction`];
/// reading and writing it never stores a second copy.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use kinebody_controller::prelude::*;
///
/// let mut body = KineBody::default();
/// body.set_up_direction(Vec2::NEG_X);
///
/// // Standing on a wall to the right: walking forward climbs it.
/// body.set_motion_vector(Vec2::new(100.0, 0.0));
/// assert!((body.velocity - Vec2::new(0.0, 100.0)).length() < 1e-3);
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(KineBodyConfig, SlideContacts, Transform)]
pub struct KineBody {
    /// Linear velocity in world units per second.
    pub velocity: Vec2,
    up_direction: Vec2,
    global_rotation: f32,
    motion_vector_direction: MotionVectorDirection,
    prev_velocity: Vec2,
    prev_on_floor: bool,
    sync_task: SyncTask,
    /// Set once the global rotation has been read from, or written to, the
    /// entity. Until then the integrator adopts the entity's rotation.
    #[reflect(ignore)]
    rotation_initialized: bool,
}

impl Default for KineBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            up_direction: WORLD_UP,
            global_rotation: 0.0,
            motion_vector_direction: MotionVectorDirection::default(),
            prev_velocity: Vec2::ZERO,
            prev_on_floor: false,
            sync_task: SyncTask::Idle,
            rotation_initialized: false,
        }
    }
}

impl KineBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: set the initial up direction. Degenerate vectors are ignored.
    pub fn with_up_direction(mut self, up_direction: Vec2) -> Self {
        self.set_up_direction(up_direction);
        self
    }

    /// Builder: set the motion vector frame without converting velocity.
    pub fn with_motion_vector_direction(mut self, direction: MotionVectorDirection) -> Self {
        self.motion_vector_direction = direction;
        self
    }

    // ==================== Up direction & rotation ====================

    /// Unit vector pointing "up" for this body.
    pub fn up_direction(&self) -> Vec2 {
        self.up_direction
    }

    /// Set the up direction. Returns `false` and leaves the field unchanged
    /// for zero or non-finite input.
    pub fn set_up_direction(&mut self, up_direction: Vec2) -> bool {
        let normalized = up_direction.normalize_or_zero();
        if normalized == Vec2::ZERO || !is_finite_vec(normalized) {
            return false;
        }
        self.up_direction = normalized;
        true
    }

    /// Signed angle from world up to the body's up direction.
    pub fn up_direction_rotation(&self) -> f32 {
        motion_vector::up_direction_rotation(self.up_direction)
    }

    /// Global rotation of the body (radians).
    pub fn global_rotation(&self) -> f32 {
        self.global_rotation
    }

    /// Overwrite the global rotation. Non-finite values are ignored.
    pub fn set_global_rotation(&mut self, rotation: f32) {
        if rotation.is_finite() {
            self.global_rotation = wrap_angle(rotation);
            self.rotation_initialized = true;
        }
    }

    pub(crate) fn rotation_initialized(&self) -> bool {
        self.rotation_initialized
    }

    /// The rotation animation currently owned by this body.
    pub fn sync_task(&self) -> &SyncTask {
        &self.sync_task
    }

    // ==================== Motion vector ====================

    pub fn motion_vector_direction(&self) -> MotionVectorDirection {
        self.motion_vector_direction
    }

    /// Change the motion vector frame.
    ///
    /// The logical motion vector is read through the old frame and written
    /// back through the new one, so its value is continuous across the
    /// switch while `velocity` is rewritten.
    pub fn set_motion_vector_direction(&mut self, direction: MotionVectorDirection) {
        let motion_vector = self.motion_vector();
        self.motion_vector_direction = direction;
        self.set_motion_vector(motion_vector);
    }

    /// Velocity expressed in the current motion vector frame.
    pub fn motion_vector(&self) -> Vec2 {
        to_logical(
            self.velocity,
            self.motion_vector_direction,
            self.up_direction,
            self.global_rotation,
        )
    }

    /// Set velocity from a value in the current motion vector frame.
    ///
    /// Side effect: overwrites `velocity`.
    pub fn set_motion_vector(&mut self, value: Vec2) {
        self.velocity = from_logical(
            value,
            self.motion_vector_direction,
            self.up_direction,
            self.global_rotation,
        );
    }

    pub fn add_motion_vector(&mut self, added: Vec2) {
        let motion_vector = self.motion_vector();
        self.set_motion_vector(motion_vector + added);
    }

    /// Move the motion vector toward `to` by at most `rate`.
    pub fn add_motion_vector_to(&mut self, rate: f32, to: Vec2) {
        let motion_vector = self.motion_vector();
        self.set_motion_vector(motion_vector.move_towards(to, rate));
    }

    /// Move the logical x component toward `to` by at most `rate`.
    pub fn add_motion_vector_x_speed_to(&mut self, rate: f32, to: f32) {
        let mut motion_vector = self.motion_vector();
        motion_vector.x = move_toward_scalar(motion_vector.x, to, rate);
        self.set_motion_vector(motion_vector);
    }

    /// Move the logical y component toward `to` by at most `rate`.
    pub fn add_motion_vector_y_speed_to(&mut self, rate: f32, to: f32) {
        let mut motion_vector = self.motion_vector();
        motion_vector.y = move_toward_scalar(motion_vector.y, to, rate);
        self.set_motion_vector(motion_vector);
    }

    /// Accelerate the walking speed toward `to`.
    pub fn walking_speed_up(&mut self, acceleration: f32, to: f32) {
        self.add_motion_vector_x_speed_to(acceleration, to);
    }

    /// Decelerate the walking speed toward zero.
    pub fn walking_slow_down_to_zero(&mut self, deceleration: f32) {
        self.add_motion_vector_x_speed_to(deceleration, 0.0);
    }

    // ==================== Integration ====================

    /// Velocity at the start of the last step.
    pub fn previous_velocity(&self) -> Vec2 {
        self.prev_velocity
    }

    /// Whether the body was on the floor at the start of the last step.
    pub fn was_on_floor(&self) -> bool {
        self.prev_on_floor
    }

    /// Advance the body by one tick.
    ///
    /// Applies gravity and the fall-speed clamp, optionally synchronizes the
    /// global rotation, then moves the body through `env` with velocity
    /// scaled by `speed_scale` for this tick only.
    pub fn step<E: SlideEnvironment + ?Sized>(
        &mut self,
        config: &KineBodyConfig,
        env: &mut E,
        delta: f32,
        speed_scale: f32,
        sync_rotation: bool,
    ) -> StepOutcome {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        self.prev_velocity = self.velocity;
        self.prev_on_floor = env.is_on_floor();

        let gravity = env.gravity();
        let gravity_dir = gravity.normalize_or_zero();
        let grounded = config.motion_mode == MotionMode::Grounded;

        if grounded && is_finite_vec(gravity_dir) && !is_zero_approx(gravity_dir) {
            self.up_direction = -gravity_dir;
        }

        if config.gravity_scale > 0.0 && is_finite_vec(gravity) {
            self.apply_gravity(config, gravity, gravity_dir, delta);
        }

        // Only the tween strategy owns a task; anything else drops it.
        let tweening = matches!(config.rotation_sync, RotationSync::Tween { .. });
        if grounded && tweening {
            if let Some(rotation) = self.sync_task.advance(delta) {
                self.global_rotation = rotation;
                if !self.sync_task.is_running() {
                    debug!("Rotation sync finished at {:.3} rad", rotation);
                }
            }
        } else {
            self.sync_task = SyncTask::Idle;
        }

        if sync_rotation {
            self.sync_global_rotation(config, &*env, delta);
        }

        let collided = self.slide(env, delta, speed_scale);
        let contacts = env.contacts();

        if contacts.on_floor && !self.prev_on_floor {
            debug!("Body landed, floor normal {:?}", contacts.floor_normal);
        } else if !contacts.on_floor && self.prev_on_floor {
            debug!("Body left the floor");
        }

        let outcome = StepOutcome::from_slide(collided, contacts);
        trace!(
            "step: velocity={:?} up={:?} rotation={:.3} {:?}",
            self.velocity,
            self.up_direction,
            self.global_rotation,
            outcome
        );
        outcome
    }

    fn apply_gravity(
        &mut self,
        config: &KineBodyConfig,
        gravity: Vec2,
        gravity_dir: Vec2,
        delta: f32,
    ) {
        let dv = gravity * config.gravity_scale * delta;
        if is_finite_vec(dv) {
            self.velocity += dv;
        }

        let max_speed = config.max_falling_speed;
        if max_speed <= 0.0 || !max_speed.is_finite() || is_zero_approx(gravity_dir) {
            return;
        }
        let falling = self.velocity.project_onto(gravity_dir);
        if is_finite_vec(falling)
            && falling.dot(gravity_dir) > 0.0
            && falling.length_squared() > max_speed * max_speed
        {
            self.velocity -= falling - falling.normalize() * max_speed;
        }
    }

    fn slide<E: SlideEnvironment + ?Sized>(
        &mut self,
        env: &mut E,
        delta: f32,
        speed_scale: f32,
    ) -> bool {
        if speed_scale > 0.0 && speed_scale.is_finite() {
            let mut velocity = self.velocity * speed_scale;
            let collided = env.move_and_slide(&mut velocity, self.up_direction, delta);
            self.velocity = velocity / speed_scale;
            collided
        } else {
            // Nothing moves, but contact flags still refresh.
            let mut stationary = Vec2::ZERO;
            env.move_and_slide(&mut stationary, self.up_direction, delta)
        }
    }

    /// Align the global rotation with the up direction.
    ///
    /// Does nothing unless the body is [`MotionMode::Grounded`].
    pub fn sync_global_rotation<E: SlideEnvironment + ?Sized>(
        &mut self,
        config: &KineBodyConfig,
        env: &E,
        delta: f32,
    ) {
        if config.motion_mode != MotionMode::Grounded {
            return;
        }

        let target = self.up_direction_rotation();
        let within_tolerance = is_angle_equal_approx(self.global_rotation, target);

        match config.rotation_sync {
            RotationSync::Lerp { speed } => {
                if env.is_on_floor() || self.prev_on_floor || within_tolerance {
                    self.global_rotation = target;
                } else {
                    let weight = speed * delta;
                    let weight = if weight.is_nan() {
                        0.0
                    } else {
                        weight.clamp(0.0, 1.0)
                    };
                    self.global_rotation = wrap_angle(lerp_angle(self.global_rotation, target, weight));
                }
            }
            RotationSync::Tween { duration } => {
                if within_tolerance {
                    self.global_rotation = target;
                    self.sync_task = SyncTask::Idle;
                } else if !self.sync_task.is_running() {
                    debug!(
                        "Rotation sync started: {:.3} -> {:.3} over {}s",
                        self.global_rotation, target, duration
                    );
                    self.sync_task = SyncTask::start(self.global_rotation, target, duration);
                }
            }
        }
    }

    // ==================== Helpers ====================

    pub fn accelerate(&mut self, acceleration: Vec2) {
        self.velocity += acceleration;
    }

    /// Move velocity toward `to` by at most `acceleration`.
    pub fn accelerate_to(&mut self, acceleration: f32, to: Vec2) {
        self.velocity = self.velocity.move_towards(to, acceleration);
    }

    /// Add `momentum / mass` to velocity.
    pub fn apply_momentum<E: SlideEnvironment + ?Sized>(&mut self, env: &E, momentum: Vec2) {
        self.velocity += momentum / env.mass().max(MIN_MASS);
    }

    /// Set velocity to `momentum / mass`.
    pub fn set_momentum<E: SlideEnvironment + ?Sized>(&mut self, env: &E, momentum: Vec2) {
        self.velocity = momentum / env.mass().max(MIN_MASS);
    }

    pub fn momentum<E: SlideEnvironment + ?Sized>(&self, env: &E) -> Vec2 {
        self.velocity * env.mass().max(MIN_MASS)
    }

    /// Jump along the up direction.
    ///
    /// With `accumulating`, `speed` is added to the current velocity.
    /// Otherwise the up-direction component is replaced by `speed`.
    pub fn jump(&mut self, speed: f32, accumulating: bool) {
        let up = self.up_direction;
        if accumulating {
            self.velocity += up * speed;
        } else {
            self.velocity += up * speed - up * self.velocity.dot(up);
        }
    }

    /// Reverse the walking direction, keeping the up-direction component.
    pub fn turn_back_walk(&mut self) {
        self.velocity = self.reflection_source().reflect(self.up_direction.perp());
    }

    /// Invert the up-direction component, keeping the walking component.
    pub fn bounce_jumping_falling(&mut self) {
        self.velocity = self.reflection_source().reflect(self.up_direction);
    }

    fn reflection_source(&self) -> Vec2 {
        if is_zero_approx(self.prev_velocity) {
            self.velocity
        } else {
            self.prev_velocity
        }
    }
}
