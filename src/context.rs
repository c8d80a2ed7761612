//! Shared simulation context.

use bevy::prelude::*;

/// World-wide simulation state shared by every vehicle.
///
/// `elapsed` is simulation time advanced by the fixed tick while not
/// paused. Bounce cooldowns and obstacle motion read it instead of a wall
/// clock, so pausing freezes them too.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Resource)]
pub struct SimulationContext {
    /// When set, vehicles and obstacles stop updating.
    pub paused: bool,
    /// Seconds of unpaused simulation.
    pub elapsed: f32,
    /// Gravity used for slope compensation.
    pub gravity: Vec3,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self {
            paused: false,
            elapsed: 0.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl SimulationContext {
    /// Advance simulation time unless paused.
    pub fn advance(&mut self, dt: f32) {
        if !self.paused {
            self.elapsed += dt.max(0.0);
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}
