//! Motion mode selection.

use bevy::prelude::*;

/// How the body relates to the ground.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotionMode {
    /// Platformer-style motion. The up direction follows gravity and the
    /// global rotation can be synchronized to it.
    #[default]
    Grounded,
    /// Free flight (top-down games, swimming). No ground semantics: the up
    /// direction is never derived from gravity and rotation is never synced.
    Floating,
}
