//! Drive intent component.
//!
//! Input code (keyboard, touch, gamepad, AI) writes a [`DriveIntent`] at
//! render rate. The fixed-tick drive system copies the steering into the
//! controller and turns a fresh jump press into a latched jump request.

use bevy::prelude::*;

/// What the driver wants this tick.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use ride_controller::prelude::*;
///
/// let mut intent = DriveIntent::new();
/// intent.set_direction(Vec2::new(0.0, 1.0));
/// assert!(intent.is_steering());
///
/// intent.set_jump_pressed(true);
/// assert!(intent.take_jump());
/// // Holding the button does not request another jump.
/// intent.set_jump_pressed(true);
/// assert!(!intent.take_jump());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct DriveIntent {
    /// Steering input, `(x, y)` maps to world `(x, 0, y)`.
    pub direction: Vec2,
    /// Whether the jump button is held.
    pub jump_pressed: bool,
    jump_pressed_prev: bool,
    jump_request: bool,
}

impl DriveIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the steering input. Each axis is clamped to `[-1, 1]`.
    pub fn set_direction(&mut self, direction: Vec2) {
        self.direction = direction.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Stop steering.
    pub fn clear(&mut self) {
        self.direction = Vec2::ZERO;
    }

    /// Whether there is any steering input.
    pub fn is_steering(&self) -> bool {
        self.direction != Vec2::ZERO
    }

    /// Update the held state of the jump button.
    ///
    /// A released-to-pressed transition latches one jump request.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        if pressed && !self.jump_pressed_prev {
            self.jump_request = true;
        }
        self.jump_pressed = pressed;
        self.jump_pressed_prev = pressed;
    }

    /// Latch a jump request directly (for AI and scripted input).
    pub fn request_jump(&mut self) {
        self.jump_request = true;
    }

    /// Whether a jump request is waiting.
    pub fn has_jump_request(&self) -> bool {
        self.jump_request
    }

    /// Take the pending jump request.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_request)
    }
}
