//! Hazards and kinematic obstacles.
//!
//! A [`Hazard`] wrecks any vehicle that touches it. Obstacles usually pair
//! it with a motion component: [`PingPongMotion`] slides back and forth
//! between its start position and `start + offset`, [`SpinMotion`] rotates
//! at a constant rate. Both follow
//! [`SimulationContext`](crate::context::SimulationContext) time and stop
//! while it is paused.

use bevy::prelude::*;

use crate::math::ping_pong;

/// Marks a collider whose touch wrecks a vehicle.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct Hazard;

/// Oscillates an entity along `offset`.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct PingPongMotion {
    /// Displacement at the far end of the path.
    pub offset: Vec3,
    /// Path traversals per second.
    pub speed: f32,
    /// Start position, captured on the first update.
    pub origin: Option<Vec3>,
}

impl Default for PingPongMotion {
    fn default() -> Self {
        Self::new(Vec3::Y, 1.0)
    }
}

impl PingPongMotion {
    pub fn new(offset: Vec3, speed: f32) -> Self {
        Self {
            offset,
            speed,
            origin: None,
        }
    }

    /// Position at simulation time `elapsed` for a path starting at `origin`.
    pub fn position_at(&self, origin: Vec3, elapsed: f32) -> Vec3 {
        origin + self.offset * ping_pong(elapsed * self.speed, 1.0)
    }
}

/// Rotates an entity at a constant rate around its local axes.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct SpinMotion {
    /// Euler rates in degrees per second.
    pub degrees_per_second: Vec3,
}

impl Default for SpinMotion {
    fn default() -> Self {
        Self {
            degrees_per_second: Vec3::new(0.0, 90.0, 0.0),
        }
    }
}

impl SpinMotion {
    /// Local rotation to apply for a step of `dt` seconds.
    pub fn step(&self, dt: f32) -> Quat {
        let angles = self.degrees_per_second * dt;
        Quat::from_euler(
            EulerRot::YXZ,
            angles.y.to_radians(),
            angles.x.to_radians(),
            angles.z.to_radians(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_pong_reaches_offset_and_returns() {
        let motion = PingPongMotion::new(Vec3::new(0.0, 4.0, 0.0), 0.5);
        let origin = Vec3::new(1.0, 0.0, 0.0);

        assert_eq!(motion.position_at(origin, 0.0), origin);
        assert!((motion.position_at(origin, 2.0) - Vec3::new(1.0, 4.0, 0.0)).length() < 1e-5);
        assert!((motion.position_at(origin, 3.0) - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        assert!((motion.position_at(origin, 4.0) - origin).length() < 1e-5);
    }

    #[test]
    fn spin_step_matches_rate() {
        let spin = SpinMotion::default();
        let rotation = spin.step(1.0);
        let forward = rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn zero_dt_spin_is_identity() {
        let spin = SpinMotion {
            degrees_per_second: Vec3::new(10.0, 20.0, 30.0),
        };
        assert!(spin.step(0.0).abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
