//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.
//!
//! Collision layers map onto Rapier groups bit for bit: layer `n` is the
//! group with bit `n` set.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::VehiclePhysicsBackend;
use crate::bounce::ImpactEvent;
use crate::collision::{CollisionData, CollisionMask};
use crate::config::VehicleConfig;
use crate::controller::VehicleController;
use crate::sensor::{jump_probe, GroundProbe, GroundReading};
use crate::VehicleControllerSet;

/// Rapier3D physics backend for the vehicle controller.
///
/// Velocity and orientation go through the [`Velocity`] and [`Transform`]
/// components. Ground probing and contact reporting are handled by the
/// systems added by [`Rapier3dBackendPlugin`].
pub struct Rapier3dBackend;

impl VehiclePhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = rotation;
        }
        // Orientation is authoritative, so no residual spin is kept.
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.angvel = Vec3::ZERO;
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the vehicle controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (rapier_ground_sensor, rapier_impact_bridge)
                .chain()
                .in_set(VehicleControllerSet::Sensors),
        );
    }
}

/// Rapier query filter for a probe: the vehicle's own body and every sensor
/// collider are skipped, and only groups in the probe mask can be hit.
fn probe_filter(mask: CollisionMask, exclude_entity: Entity) -> QueryFilter<'static> {
    QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(mask.bits()),
        ))
}

/// Cast a ground probe using RapierContext.
fn rapier_raycast(
    context: &RapierContext,
    probe: &GroundProbe,
    exclude_entity: Entity,
) -> Option<CollisionData> {
    context
        .cast_ray_and_get_normal(
            probe.origin,
            probe.direction,
            probe.max_distance,
            true,
            probe_filter(probe.mask, exclude_entity),
        )
        .map(|(hit_entity, hit)| {
            CollisionData::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
        })
}

/// Probe the ground under every vehicle.
fn rapier_ground_sensor(
    rapier_context: ReadRapierContext,
    mut q_vehicles: Query<(Entity, &GlobalTransform, &VehicleConfig, &mut GroundReading)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut reading) in &mut q_vehicles {
        let position = transform.translation();

        let sample = config
            .sensor
            .ground_sensor()
            .sample(position, |probe| rapier_raycast(&context, probe, entity));

        let coarse = jump_probe(position, config.jump.ground_check_distance, config.sensor.mask());
        let jump_grounded = rapier_raycast(&context, &coarse, entity).is_some();

        let next = GroundReading {
            sample,
            jump_grounded,
        };
        if *reading != next {
            trace!("Vehicle {entity} ground reading {next:?}");
            *reading = next;
        }
    }
}

/// World-space contact normal between two colliders, if they touch.
fn contact_normal(context: &RapierContext, a: Entity, b: Entity) -> Option<Vec3> {
    let pair = context.contact_pair(a, b)?;
    let normal = pair
        .manifolds()
        .find(|manifold| manifold.num_points() > 0)
        .map(|manifold| manifold.normal());
    normal
}

/// Turn Rapier collision starts involving a vehicle into [`ImpactEvent`]s.
///
/// The relative velocity is the velocity the vehicle was last commanded to
/// (what the integrator stepped with) minus the surface's velocity. The
/// normal is oriented from the surface toward the vehicle and defaults to
/// world up for sensor volumes, which have no contact manifold.
fn rapier_impact_bridge(
    rapier_context: ReadRapierContext,
    mut collision_events: EventReader<CollisionEvent>,
    q_vehicles: Query<(&VehicleController, &GlobalTransform)>,
    q_surfaces: Query<(&GlobalTransform, Option<&Velocity>)>,
    mut impacts: EventWriter<ImpactEvent>,
) {
    let context = rapier_context.single().ok();

    for event in collision_events.read() {
        let CollisionEvent::Started(a, b, _) = *event else {
            continue;
        };
        let (vehicle, surface) = if q_vehicles.contains(a) {
            (a, b)
        } else if q_vehicles.contains(b) {
            (b, a)
        } else {
            continue;
        };
        let Ok((controller, vehicle_transform)) = q_vehicles.get(vehicle) else {
            continue;
        };

        let vehicle_position = vehicle_transform.translation();
        let (surface_position, surface_velocity) = q_surfaces
            .get(surface)
            .map(|(transform, velocity)| {
                (
                    transform.translation(),
                    velocity.map(|v| v.linvel).unwrap_or(Vec3::ZERO),
                )
            })
            .unwrap_or((vehicle_position - Vec3::Y, Vec3::ZERO));

        let toward_vehicle = vehicle_position - surface_position;
        let contact_normal = context
            .as_ref()
            .and_then(|context| contact_normal(context, vehicle, surface))
            .map(|normal| {
                if normal.dot(toward_vehicle) < 0.0 {
                    -normal
                } else {
                    normal
                }
            })
            .unwrap_or(Vec3::Y);

        impacts.write(ImpactEvent {
            vehicle,
            surface,
            contact_normal,
            relative_velocity: controller.commanded_velocity() - surface_velocity,
        });
    }
}

/// Rigid-body components for a Rapier3D vehicle.
///
/// Rotation is locked because the controller writes orientation directly.
/// Collision events are enabled so bounce pads, pickups and hazards are
/// reported.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use ride_controller::prelude::*;
///
/// fn spawn_rider(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         VehicleConfig::player(),
///         VehicleController::new(&VehicleConfig::player()),
///         Rapier3dVehicleBundle::new(),
///         Collider::capsule_y(0.4, 0.3),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier3dVehicleBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    pub locked_axes: LockedAxes,
    pub damping: Damping,
    pub active_events: ActiveEvents,
    /// Membership on the vehicle's own layer so its probes skip it.
    pub collision_groups: CollisionGroups,
}

impl Default for Rapier3dVehicleBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dVehicleBundle {
    /// Dynamic body on the default own layer.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 1.0,
            },
            active_events: ActiveEvents::COLLISION_EVENTS,
            collision_groups: own_layer_groups(VehicleConfig::default().sensor.own_layer),
        }
    }

    /// Put the body on `layer`. Match it with
    /// [`VehicleConfig::with_own_layer`].
    pub fn with_own_layer(mut self, layer: u32) -> Self {
        self.collision_groups = own_layer_groups(layer);
        self
    }

    /// Set the damping coefficients.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }
}

fn own_layer_groups(layer: u32) -> CollisionGroups {
    let bits = CollisionMask::NONE.with_layer(layer).bits();
    CollisionGroups::new(Group::from_bits_truncate(bits), Group::ALL)
}
