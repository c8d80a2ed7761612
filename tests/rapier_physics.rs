//! Integration tests against the Rapier3D backend.
//!
//! These step real physics, so assertions use generous bounds.

#![cfg(feature = "rapier3d")]

use bevy::prelude::*;
use bevy::time::Virtual;
use bevy_rapier3d::prelude::*;
use ride_controller::prelude::*;

fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(VehicleControllerPlugin::<Rapier3dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

/// Flat ground whose top face sits at y = 0.5.
fn spawn_ground(app: &mut App) -> Entity {
    let transform = Transform::default();
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(50.0, 0.5, 50.0),
        ))
        .id()
}

fn spawn_vehicle(app: &mut App, position: Vec3) -> Entity {
    let transform = Transform::from_translation(position);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            VehicleController::default(),
            VehicleConfig::default(),
            Rapier3dVehicleBundle::new(),
            Collider::capsule_y(0.4, 0.3),
        ))
        .id()
}

fn tick(app: &mut App) {
    let timestep = std::time::Duration::from_secs_f64(1.0 / 60.0);
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .advance_by(timestep);
    app.update();
    app.world_mut().run_schedule(FixedUpdate);
    app.update();
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(entity)
        .map(|t| t.translation)
        .unwrap_or(Vec3::NAN)
}

#[test]
fn vehicle_resting_on_ground_is_grounded() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let vehicle = spawn_vehicle(&mut app, Vec3::new(0.0, 1.3, 0.0));

    run_frames(&mut app, 60);

    let reading = app.world().get::<GroundReading>(vehicle).copied();
    println!("PROOF: reading={reading:?} position={}", position(&app, vehicle));
    assert!(reading.is_some_and(|r| r.sample.grounded));
    assert!(app.world().get::<Grounded>(vehicle).is_some());
    assert!(position(&app, vehicle).y > 0.5);
}

#[test]
fn vehicle_high_above_ground_is_airborne() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let vehicle = spawn_vehicle(&mut app, Vec3::new(0.0, 20.0, 0.0));

    run_frames(&mut app, 3);

    let reading = app.world().get::<GroundReading>(vehicle).copied();
    assert!(reading.is_some_and(|r| !r.sample.grounded && !r.jump_grounded));
    assert!(app.world().get::<Airborne>(vehicle).is_some());
}

#[test]
fn throttle_drives_vehicle_forward() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let vehicle = spawn_vehicle(&mut app, Vec3::new(0.0, 1.3, 0.0));
    run_frames(&mut app, 20);

    let start = position(&app, vehicle);
    if let Some(mut intent) = app.world_mut().get_mut::<DriveIntent>(vehicle) {
        intent.set_direction(Vec2::new(0.0, 1.0));
    }
    run_frames(&mut app, 120);

    let end = position(&app, vehicle);
    println!("PROOF: start={start} end={end}");
    assert!(end.z - start.z > 2.0);
    assert!((end.x - start.x).abs() < 0.5);
}

#[test]
fn pickup_sensor_boosts_overlapping_vehicle() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let zone_transform = Transform::from_xyz(0.0, 1.3, 0.0);
    let zone = app
        .world_mut()
        .spawn((
            zone_transform,
            GlobalTransform::from(zone_transform),
            Collider::cuboid(1.0, 1.0, 1.0),
            Sensor,
            BoostPickupZone::new(BoostZonePreset::acceleration(1.5, 10.0)),
        ))
        .id();
    let vehicle = spawn_vehicle(&mut app, Vec3::new(0.0, 1.3, 0.0));

    run_frames(&mut app, 10);

    assert!(app.world().get_entity(zone).is_err());
    let controller = app.world().get::<VehicleController>(vehicle);
    assert_eq!(controller.map(|c| c.stats.max_speed), Some(18.0));
}
