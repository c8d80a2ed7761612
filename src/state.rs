//! State markers and outgoing events.
//!
//! Marker components mirror the vehicle's physical state for queries by
//! animation and UI code. They are added and removed by the controller
//! systems each fixed tick; nothing else should insert them.

use bevy::prelude::*;

use crate::boost::BoostChange;

/// Marker component indicating the vehicle is grounded.
///
/// Mutually exclusive with [`Airborne`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use ride_controller::prelude::*;
///
/// fn count_grounded(vehicles: Query<(), With<Grounded>>) -> usize {
///     vehicles.iter().count()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the vehicle is airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component for a vehicle that hit a hazard.
///
/// A wrecked vehicle is no longer driven. Remove the marker (and clear
/// [`SimulationContext::paused`](crate::context::SimulationContext)) to
/// respawn it.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Wrecked;

/// Discrete state changes animation and audio collaborators react to.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleSignal {
    /// A jump impulse was applied.
    JumpStarted,
    /// The vehicle touched down while falling.
    Landed,
    /// The vehicle lost ground contact.
    BecameAirborne,
    /// A bounce pad launched the vehicle.
    Bounced,
    /// The vehicle hit a hazard.
    Wrecked,
}

/// A [`VehicleSignal`] raised by a specific vehicle.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleSignalEvent {
    pub vehicle: Entity,
    pub signal: VehicleSignal,
}

/// A boost started or ended on a vehicle.
///
/// `SpeedStarted`/`JumpStarted` carry the new stat value. Cancelling boosts
/// through a reset raises nothing.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BoostEvent {
    pub vehicle: Entity,
    pub change: BoostChange,
}
