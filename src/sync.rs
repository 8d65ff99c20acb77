//! Bounded-duration rotation synchronization task.
//!
//! The task is an explicit state machine advanced once per step by its owning
//! body. At most one task exists per body, so two animations can never write
//! the rotation at the same time.

use bevy::prelude::*;

use crate::math::{lerp_angle, sine_in_out, wrap_angle};

/// State of a body's rotation animation.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub enum SyncTask {
    #[default]
    Idle,
    Running {
        /// Rotation when the task started.
        start: f32,
        /// Rotation the task animates toward.
        target: f32,
        /// Seconds elapsed since the task started.
        elapsed: f32,
        /// Total length of the animation in seconds.
        duration: f32,
    },
}

impl SyncTask {
    /// Start a new animation from `start` to `target` over `duration` seconds.
    pub fn start(start: f32, target: f32, duration: f32) -> Self {
        Self::Running {
            start,
            target,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Whether an animation is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Advance the animation by `delta` seconds.
    ///
    /// Returns the rotation to apply this tick, or `None` when idle. The task
    /// returns to [`SyncTask::Idle`] on the tick it reaches its target.
    pub fn advance(&mut self, delta: f32) -> Option<f32> {
        let Self::Running {
            start,
            target,
            elapsed,
            duration,
        } = *self
        else {
            return None;
        };

        let elapsed = elapsed + delta.max(0.0);
        if duration <= 0.0 || elapsed >= duration {
            *self = Self::Idle;
            return Some(wrap_angle(target));
        }

        *self = Self::Running {
            start,
            target,
            elapsed,
            duration,
        };
        let t = sine_in_out(elapsed / duration);
        Some(wrap_angle(lerp_angle(start, target, t)))
    }
}
