//! Core controller systems.
//!
//! Systems that touch rigid-body state are exclusive and generic over the
//! physics backend, the rest are plain systems. All of them run in
//! `FixedUpdate`, ordered by [`VehicleControllerSet`](crate::VehicleControllerSet).

use bevy::ecs::system::SystemState;
use bevy::prelude::*;

use crate::backend::VehiclePhysicsBackend;
use crate::bounce::{BouncePad, ImpactEvent};
use crate::config::VehicleConfig;
use crate::context::SimulationContext;
use crate::controller::{TickInput, VehicleController};
use crate::hazard::{Hazard, PingPongMotion, SpinMotion};
use crate::intent::DriveIntent;
use crate::pickup::BoostPickupZone;
use crate::sensor::GroundReading;
use crate::state::{Airborne, BoostEvent, Grounded, VehicleSignalEvent, Wrecked};

/// Fixed timestep delta, with fallback for testing scenarios where the
/// fixed clock has not been advanced.
pub fn fixed_delta(time: Option<&Time<Fixed>>) -> f32 {
    time.map(|t| t.delta_secs())
        .filter(|&d| d > 0.0)
        .unwrap_or(1.0 / 60.0)
}

/// Advance simulation time.
pub fn advance_simulation_clock(
    time: Option<Res<Time<Fixed>>>,
    mut context: ResMut<SimulationContext>,
) {
    context.advance(fixed_delta(time.as_deref()));
}

/// Slide ping-pong obstacles along their path.
pub fn move_ping_pong_obstacles(
    context: Res<SimulationContext>,
    mut q_obstacles: Query<(&mut Transform, &mut PingPongMotion)>,
) {
    if context.paused {
        return;
    }
    for (mut transform, mut motion) in &mut q_obstacles {
        let origin = *motion.origin.get_or_insert(transform.translation);
        transform.translation = motion.position_at(origin, context.elapsed);
    }
}

/// Rotate spinning obstacles.
pub fn spin_obstacles(
    time: Option<Res<Time<Fixed>>>,
    context: Res<SimulationContext>,
    mut q_obstacles: Query<(&mut Transform, &SpinMotion)>,
) {
    if context.paused {
        return;
    }
    let dt = fixed_delta(time.as_deref());
    for (mut transform, spin) in &mut q_obstacles {
        transform.rotation = (transform.rotation * spin.step(dt)).normalize();
    }
}

/// Run one locomotion and jump tick for every vehicle.
///
/// Reads the ground reading written by the backend's sensor system, feeds
/// the drive intent into the controller and writes the resulting velocity
/// and orientation back through the backend.
pub fn drive_vehicles<B: VehiclePhysicsBackend>(world: &mut World) {
    let context = world
        .get_resource::<SimulationContext>()
        .copied()
        .unwrap_or_default();
    if context.paused {
        return;
    }

    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, VehicleConfig, GroundReading)> = world
        .query_filtered::<(Entity, &VehicleConfig, Option<&GroundReading>), (
            With<VehicleController>,
            Without<Wrecked>,
        )>()
        .iter(world)
        .map(|(e, config, reading)| (e, *config, reading.copied().unwrap_or_default()))
        .collect();

    for (entity, config, reading) in entities {
        let intent = world.get_mut::<DriveIntent>(entity).map(|mut intent| {
            let jump = intent.take_jump();
            (intent.direction, jump)
        });
        let velocity = B::get_velocity(world, entity);

        let output = {
            let Some(mut controller) = world.get_mut::<VehicleController>(entity) else {
                continue;
            };
            if let Some((direction, jump)) = intent {
                controller.set_input(direction);
                if jump {
                    controller.request_jump();
                }
            }
            controller.fixed_tick(
                &config,
                TickInput {
                    ground: reading.sample,
                    jump_grounded: reading.jump_grounded,
                    velocity,
                    gravity: context.gravity,
                    dt,
                },
            )
        };

        B::set_velocity(world, entity, output.velocity);
        if let Some(rotation) = output.rotation {
            B::set_rotation(world, entity, rotation);
        }
    }
}

/// Count down active boosts and restore expired ones.
pub fn advance_vehicle_boosts(
    time: Option<Res<Time<Fixed>>>,
    context: Res<SimulationContext>,
    mut q_vehicles: Query<&mut VehicleController, Without<Wrecked>>,
) {
    if context.paused {
        return;
    }
    let dt = fixed_delta(time.as_deref());
    for mut controller in &mut q_vehicles {
        controller.advance_boosts(dt);
    }
}

/// Route collision starts to bounce pads, pickups and hazards.
pub fn resolve_vehicle_impacts<B: VehiclePhysicsBackend>(
    world: &mut World,
    reader: &mut SystemState<EventReader<ImpactEvent>>,
) {
    let impacts: Vec<ImpactEvent> = reader.get_mut(world).read().copied().collect();

    let context = world
        .get_resource::<SimulationContext>()
        .copied()
        .unwrap_or_default();
    if context.paused {
        return;
    }

    for impact in impacts {
        let (vehicle, surface) = (impact.vehicle, impact.surface);
        if world.get::<VehicleController>(vehicle).is_none() || world.get::<Wrecked>(vehicle).is_some()
        {
            continue;
        }

        if world.get::<Hazard>(surface).is_some() {
            wreck_vehicle::<B>(world, vehicle);
            info!("Vehicle {vehicle} wrecked by {surface}");
            continue;
        }

        if let Some(mut zone) = world.get::<BoostPickupZone>(surface).copied() {
            let consumed = world
                .get_mut::<VehicleController>(vehicle)
                .is_some_and(|mut controller| zone.try_consume(&mut *controller));
            if consumed {
                world.despawn(surface);
                debug!("Pickup {surface} consumed by {vehicle}");
            }
            continue;
        }

        if let Some(pad) = world.get::<BouncePad>(surface).copied() {
            let bounced = world
                .get_mut::<VehicleController>(vehicle)
                .and_then(|mut controller| controller.handle_impact(&impact, &pad.0, context.elapsed));
            if let Some(velocity) = bounced {
                B::set_velocity(world, vehicle, velocity);
                debug!("Vehicle {vehicle} bounced off {surface} at {velocity}");
            }
        }
    }
}

/// Stop a vehicle, cancel its timed effects and pause the simulation.
fn wreck_vehicle<B: VehiclePhysicsBackend>(world: &mut World, vehicle: Entity) {
    if let Some(mut controller) = world.get_mut::<VehicleController>(vehicle) {
        controller.wreck();
    }
    B::set_velocity(world, vehicle, Vec3::ZERO);
    world.entity_mut(vehicle).insert(Wrecked);
    if let Some(mut context) = world.get_resource_mut::<SimulationContext>() {
        context.pause();
    }
}

/// Publish queued boost changes and signals as events.
pub fn publish_vehicle_events(
    mut q_vehicles: Query<(Entity, &mut VehicleController)>,
    mut boost_events: EventWriter<BoostEvent>,
    mut signal_events: EventWriter<VehicleSignalEvent>,
) {
    for (vehicle, mut controller) in &mut q_vehicles {
        for change in controller.drain_boost_changes() {
            boost_events.write(BoostEvent { vehicle, change });
        }
        for signal in controller.drain_signals() {
            signal_events.write(VehicleSignalEvent { vehicle, signal });
        }
    }
}

/// Sync state marker components with the controller's grounded flag.
pub fn sync_state_markers(
    mut commands: Commands,
    q_vehicles: Query<(Entity, &VehicleController, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, controller, has_grounded, has_airborne) in &q_vehicles {
        if controller.is_grounded() && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !controller.is_grounded() && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }
    }
}
