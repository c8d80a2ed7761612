//! Physics backend abstraction.
//!
//! The controller systems never talk to a physics engine directly. They go
//! through a [`VehiclePhysicsBackend`], which reads and writes rigid-body
//! state. Ground probing and contact reporting are engine specific and live
//! in the backend's own plugin, which writes
//! [`GroundReading`](crate::sensor::GroundReading) components and sends
//! [`ImpactEvent`](crate::bounce::ImpactEvent)s.

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// Getters return a neutral value (zero) when the entity lacks the
/// relevant component; setters are no-ops in that case.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`.
pub trait VehiclePhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Overwrite the orientation of an entity.
    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
