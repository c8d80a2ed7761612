//! Jump impulse.
//!
//! The [`JumpController`] holds the live jump force. Boosts change it at
//! runtime through the boost stack; the configured force is only the
//! starting value.

use bevy::prelude::*;

use crate::config::JumpConfig;
use crate::math::flat;

const MIN_DIRECTION_SQ: f32 = 0.0001;

/// Converts a grounded jump request into a velocity change.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct JumpController {
    /// Vertical speed a jump sets. Mutable at runtime.
    pub jump_force: f32,
    /// Fraction of `jump_force` added along the move direction.
    pub forward_carry: f32,
}

impl Default for JumpController {
    fn default() -> Self {
        Self::from_config(&JumpConfig::default())
    }
}

impl JumpController {
    /// Create a controller from configuration.
    pub fn from_config(config: &JumpConfig) -> Self {
        Self {
            jump_force: config.force,
            forward_carry: config.forward_carry,
        }
    }

    /// Set the live jump force.
    pub fn set_jump_force(&mut self, force: f32) {
        self.jump_force = force;
    }

    /// Attempt a jump.
    ///
    /// Does nothing and returns `false` when not grounded. Otherwise the
    /// vertical velocity is replaced by `jump_force` and, if
    /// `move_direction` has a usable horizontal part, `forward_carry ×
    /// jump_force` is added along it.
    pub fn try_jump(&self, velocity: &mut Vec3, move_direction: Vec3, is_grounded: bool) -> bool {
        if !is_grounded {
            return false;
        }

        velocity.y = self.jump_force;

        if move_direction.length_squared() > MIN_DIRECTION_SQ {
            let horizontal = flat(move_direction).normalize_or_zero();
            *velocity += horizontal * (self.jump_force * self.forward_carry);
        }

        true
    }
}
