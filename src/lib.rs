//! # `ride_controller`
//!
//! Ground-aware vehicle locomotion with timed boosts, built for Bevy.
//!
//! This crate provides an arcade bike/board controller that:
//! - Probes the ground below the vehicle and aligns acceleration to slopes
//! - Smooths steering into a heading with lean into turns
//! - Jumps with a force that boosts can change at runtime
//! - Bounces off trampoline pads right after landing
//! - Applies temporary speed/jump boosts that restore exactly on expiry
//! - Abstracts the physics backend (Rapier3D included)
//!
//! ## Architecture
//!
//! Every timed behaviour is advanced by the fixed tick. Per tick, in order:
//! 1. The simulation clock and kinematic obstacles advance
//! 2. The backend probes the ground and reports collision starts
//! 3. Each vehicle runs locomotion then jumping, and writes its velocity
//!    and orientation through the backend
//! 4. Boost timers count down and restore expired values
//! 5. Collisions with bounce pads, pickups and hazards are resolved
//! 6. Marker components are synced and events published
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use ride_controller::prelude::*;
//!
//! let config = VehicleConfig::player();
//! let controller = VehicleController::new(&config);
//! let intent = DriveIntent::default();
//!
//! // These can be spawned together with physics components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod boost;
pub mod bounce;
pub mod collision;
pub mod config;
pub mod context;
pub mod controller;
pub mod hazard;
pub mod intent;
pub mod jump;
pub mod locomotion;
pub mod math;
pub mod pickup;
pub mod sensor;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::VehiclePhysicsBackend;
    pub use crate::boost::{BoostAmount, BoostChange, BoostKind, MovementStats};
    pub use crate::bounce::{BouncePad, BouncePreset, ImpactEvent};
    pub use crate::collision::CollisionMask;
    pub use crate::config::{JumpConfig, LocomotionConfig, SensorConfig, VehicleConfig};
    pub use crate::context::SimulationContext;
    pub use crate::controller::VehicleController;
    pub use crate::hazard::{Hazard, PingPongMotion, SpinMotion};
    pub use crate::intent::DriveIntent;
    pub use crate::pickup::{BoostPickupZone, BoostTarget, BoostType, BoostZonePreset};
    pub use crate::sensor::{GroundReading, GroundSample};
    pub use crate::state::{
        Airborne, BoostEvent, Grounded, VehicleSignal, VehicleSignalEvent, Wrecked,
    };
    pub use crate::{VehicleControllerPlugin, VehicleControllerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dVehicleBundle};
}

/// Ordering of the controller's fixed-tick work. The sets run chained in
/// `FixedUpdate`; backends add their own systems to them.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleControllerSet {
    /// Simulation clock and kinematic obstacles.
    Clock,
    /// Ground probes and collision reporting.
    Sensors,
    /// Locomotion and jumping.
    Drive,
    /// Boost timers.
    Boosts,
    /// Bounce pads, pickups and hazards.
    Impacts,
    /// Marker components and outgoing events.
    Sync,
}

/// Main plugin for the vehicle controller.
///
/// Generic over a physics backend `B` which reads and writes rigid-body
/// state and provides ground probing.
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use ride_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(VehicleControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct VehicleControllerPlugin<B: backend::VehiclePhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::VehiclePhysicsBackend> Default for VehicleControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::VehiclePhysicsBackend> Plugin for VehicleControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<config::VehicleConfig>();
        app.register_type::<controller::VehicleController>();
        app.register_type::<intent::DriveIntent>();
        app.register_type::<sensor::GroundReading>();
        app.register_type::<bounce::BouncePad>();
        app.register_type::<pickup::BoostPickupZone>();
        app.register_type::<hazard::Hazard>();
        app.register_type::<hazard::PingPongMotion>();
        app.register_type::<hazard::SpinMotion>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Wrecked>();
        app.register_type::<context::SimulationContext>();

        app.init_resource::<context::SimulationContext>();
        app.add_event::<bounce::ImpactEvent>();
        app.add_event::<state::BoostEvent>();
        app.add_event::<state::VehicleSignalEvent>();

        app.configure_sets(
            FixedUpdate,
            (
                VehicleControllerSet::Clock,
                VehicleControllerSet::Sensors,
                VehicleControllerSet::Drive,
                VehicleControllerSet::Boosts,
                VehicleControllerSet::Impacts,
                VehicleControllerSet::Sync,
            )
                .chain(),
        );

        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                (
                    systems::advance_simulation_clock,
                    (systems::move_ping_pong_obstacles, systems::spin_obstacles),
                )
                    .chain()
                    .in_set(VehicleControllerSet::Clock),
                systems::drive_vehicles::<B>.in_set(VehicleControllerSet::Drive),
                systems::advance_vehicle_boosts.in_set(VehicleControllerSet::Boosts),
                systems::resolve_vehicle_impacts::<B>.in_set(VehicleControllerSet::Impacts),
                (systems::publish_vehicle_events, systems::sync_state_markers)
                    .in_set(VehicleControllerSet::Sync),
            ),
        );
    }
}
