//! Contact results produced by move-and-slide backends.
//!
//! These structures hold what a backend learned while sliding a body:
//! which kinds of surface it touched during the last slide, and the result of
//! trial moves used by helpers such as floor friction queries.

use bevy::prelude::*;

/// Default tolerance added to the floor angle when classifying surfaces.
const FLOOR_ANGLE_THRESHOLD: f32 = 0.01;

/// Information about a trial move (shape cast) that hit something.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveCollision {
    /// Distance travelled before the hit.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
    /// Friction coefficient of the hit collider, if it carries one.
    pub friction: Option<f32>,
}

impl MoveCollision {
    /// Create a hit result.
    pub fn hit(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
            friction: None,
        }
    }

    /// Attach the friction coefficient of the hit collider.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }
}

/// Kind of surface a contact normal belongs to, relative to an up direction.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Floor,
    Wall,
    Ceiling,
}

impl SurfaceKind {
    /// Classify a contact `normal` against `up_direction`.
    ///
    /// A surface is a floor when its normal is within `floor_max_angle` of the
    /// up direction, a ceiling when within `floor_max_angle` of the opposite
    /// direction, and a wall otherwise. Without an up direction every
    /// surface is a wall.
    pub fn classify(normal: Vec2, up_direction: Vec2, floor_max_angle: f32) -> Self {
        let up = up_direction.normalize_or_zero();
        if up == Vec2::ZERO {
            return Self::Wall;
        }
        let dot = normal.normalize_or_zero().dot(up).clamp(-1.0, 1.0);
        let limit = floor_max_angle + FLOOR_ANGLE_THRESHOLD;
        if dot.acos() <= limit {
            Self::Floor
        } else if (-dot).acos() <= limit {
            Self::Ceiling
        } else {
            Self::Wall
        }
    }
}

/// Contact flags from the most recent slide of a body.
///
/// Valid only immediately after a slide; backends reset and refill it on
/// every call.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct SlideContacts {
    pub on_floor: bool,
    pub on_wall: bool,
    pub on_ceiling: bool,
    /// Normal of the last floor touched. Zero when not on floor.
    pub floor_normal: Vec2,
    /// Normal of the last wall touched. Zero when not on a wall.
    pub wall_normal: Vec2,
    /// Entity of the last floor touched.
    pub floor_entity: Option<Entity>,
}

impl SlideContacts {
    /// Record a contact and return the kind of surface it was.
    pub fn record(
        &mut self,
        normal: Vec2,
        entity: Option<Entity>,
        up_direction: Vec2,
        floor_max_angle: f32,
    ) -> SurfaceKind {
        let kind = SurfaceKind::classify(normal, up_direction, floor_max_angle);
        match kind {
            SurfaceKind::Floor => {
                self.on_floor = true;
                self.floor_normal = normal;
                self.floor_entity = entity;
            }
            SurfaceKind::Wall => {
                self.on_wall = true;
                self.wall_normal = normal;
            }
            SurfaceKind::Ceiling => {
                self.on_ceiling = true;
            }
        }
        kind
    }
}
