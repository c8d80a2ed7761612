//! ECS-level tests of the controller systems.
//!
//! A mock backend stores rigid-body state in a plain component so the
//! systems can be driven without a physics engine. Ground readings are
//! written by hand in place of a sensor system.

use bevy::prelude::*;
use ride_controller::backend::NoOpBackendPlugin;
use ride_controller::prelude::*;

#[derive(Component, Debug, Clone, Copy, Default)]
struct MockBody {
    velocity: Vec3,
    rotation: Quat,
}

struct MockBackend;

impl VehiclePhysicsBackend for MockBackend {
    fn plugin() -> impl Plugin {
        NoOpBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<MockBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut body) = world.get_mut::<MockBody>(entity) {
            body.velocity = velocity;
        }
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat) {
        if let Some(mut body) = world.get_mut::<MockBody>(entity) {
            body.rotation = rotation;
        }
    }
}

// ==================== Test Helpers ====================

fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(VehicleControllerPlugin::<MockBackend>::default());
    app.finish();
    app.cleanup();
    app
}

/// Run one fixed tick (dt falls back to 1/60).
fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn run_ticks(app: &mut App, count: usize) {
    for _ in 0..count {
        tick(app);
    }
}

fn spawn_vehicle(app: &mut App, reading: GroundReading) -> Entity {
    app.world_mut()
        .spawn((
            VehicleController::default(),
            VehicleConfig::default(),
            reading,
            MockBody {
                rotation: Quat::IDENTITY,
                ..default()
            },
        ))
        .id()
}

fn body(app: &App, entity: Entity) -> MockBody {
    app.world()
        .get::<MockBody>(entity)
        .copied()
        .expect("vehicle should have a body")
}

fn set_reading(app: &mut App, entity: Entity, reading: GroundReading) {
    app.world_mut().entity_mut(entity).insert(reading);
}

fn impact(vehicle: Entity, surface: Entity, relative_velocity: Vec3) -> ImpactEvent {
    ImpactEvent {
        vehicle,
        surface,
        contact_normal: Vec3::Y,
        relative_velocity,
    }
}

fn boost_changes(app: &App) -> Vec<BoostChange> {
    let events = app.world().resource::<Events<BoostEvent>>();
    events.get_cursor().read(events).map(|e| e.change).collect()
}

fn signals(app: &App, vehicle: Entity) -> Vec<VehicleSignal> {
    let events = app.world().resource::<Events<VehicleSignalEvent>>();
    events
        .get_cursor()
        .read(events)
        .filter(|e| e.vehicle == vehicle)
        .map(|e| e.signal)
        .collect()
}

// ==================== Driving ====================

mod driving {
    use super::*;

    #[test]
    fn throttle_accelerates_along_heading() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        app.world_mut()
            .get_mut::<DriveIntent>(vehicle)
            .expect("intent is required")
            .set_direction(Vec2::new(0.0, 1.0));

        run_ticks(&mut app, 120);

        let body = body(&app, vehicle);
        assert!(body.velocity.z > 5.0, "velocity: {}", body.velocity);
        assert!(body.velocity.x.abs() < 1e-3);
        assert!((body.rotation * Vec3::Z).dot(Vec3::Z) > 0.99);
    }

    #[test]
    fn released_throttle_brakes_to_a_stop() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        app.world_mut()
            .get_mut::<MockBody>(vehicle)
            .expect("body")
            .velocity = Vec3::new(0.0, 0.0, 4.0);

        run_ticks(&mut app, 60);

        assert!(body(&app, vehicle).velocity.z.abs() < 1e-3);
    }

    #[test]
    fn jump_press_launches_grounded_vehicle() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        tick(&mut app);

        app.world_mut()
            .get_mut::<DriveIntent>(vehicle)
            .expect("intent is required")
            .set_jump_pressed(true);
        tick(&mut app);

        assert_eq!(body(&app, vehicle).velocity.y, 8.0);
        assert!(signals(&app, vehicle).contains(&VehicleSignal::JumpStarted));
        let intent = app.world().get::<DriveIntent>(vehicle).expect("intent");
        assert!(!intent.has_jump_request());
    }

    #[test]
    fn airborne_jump_request_is_dropped() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::airborne());
        app.world_mut()
            .get_mut::<DriveIntent>(vehicle)
            .expect("intent is required")
            .request_jump();

        tick(&mut app);
        assert_eq!(body(&app, vehicle).velocity.y, 0.0);

        // The request does not carry over to a later landing.
        set_reading(&mut app, vehicle, GroundReading::on_surface(Vec3::Y));
        tick(&mut app);
        assert_eq!(body(&app, vehicle).velocity.y, 0.0);
    }

    #[test]
    fn state_markers_follow_ground_contact() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));

        tick(&mut app);
        assert!(app.world().get::<Grounded>(vehicle).is_some());
        assert!(app.world().get::<Airborne>(vehicle).is_none());

        set_reading(&mut app, vehicle, GroundReading::airborne());
        tick(&mut app);
        assert!(app.world().get::<Grounded>(vehicle).is_none());
        assert!(app.world().get::<Airborne>(vehicle).is_some());
        assert!(signals(&app, vehicle).contains(&VehicleSignal::BecameAirborne));
    }

    #[test]
    fn paused_context_freezes_vehicles() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        app.world_mut().resource_mut::<SimulationContext>().pause();
        app.world_mut()
            .get_mut::<DriveIntent>(vehicle)
            .expect("intent is required")
            .set_direction(Vec2::new(0.0, 1.0));

        run_ticks(&mut app, 10);

        assert_eq!(body(&app, vehicle).velocity, Vec3::ZERO);
        assert_eq!(app.world().resource::<SimulationContext>().elapsed, 0.0);
    }
}

// ==================== Boosts ====================

mod boosts {
    use super::*;

    #[test]
    fn temporary_speed_boost_reports_start_and_end() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let boosted = app
            .world_mut()
            .get_mut::<VehicleController>(vehicle)
            .expect("controller")
            .apply_temporary_speed_boost(2.0, 0.5);
        assert_eq!(boosted, Some(24.0));

        tick(&mut app);
        assert_eq!(boost_changes(&app), vec![BoostChange::SpeedStarted(24.0)]);

        run_ticks(&mut app, 40);

        let controller = app.world().get::<VehicleController>(vehicle).expect("controller");
        assert_eq!(controller.stats.max_speed, 12.0);
        assert_eq!(
            boost_changes(&app),
            vec![BoostChange::SpeedStarted(24.0), BoostChange::SpeedEnded]
        );
    }

    #[test]
    fn pickup_zone_is_consumed_and_despawned() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let zone = app
            .world_mut()
            .spawn(BoostPickupZone::new(BoostZonePreset::acceleration(2.0, 1.0)))
            .id();

        app.world_mut().send_event(impact(vehicle, zone, Vec3::ZERO));
        tick(&mut app);

        assert!(app.world().get_entity(zone).is_err());
        let controller = app.world().get::<VehicleController>(vehicle).expect("controller");
        assert_eq!(controller.stats.max_speed, 24.0);
        assert_eq!(boost_changes(&app), vec![BoostChange::SpeedStarted(24.0)]);
    }

    #[test]
    fn jump_pickup_raises_jump_force() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let zone = app
            .world_mut()
            .spawn(BoostPickupZone::new(BoostZonePreset::jump(1.5, 2.0)))
            .id();

        app.world_mut().send_event(impact(vehicle, zone, Vec3::ZERO));
        tick(&mut app);

        app.world_mut()
            .get_mut::<DriveIntent>(vehicle)
            .expect("intent is required")
            .request_jump();
        tick(&mut app);

        assert_eq!(body(&app, vehicle).velocity.y, 12.0);
    }

    #[test]
    fn bounce_zone_pickup_stays_in_world() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let preset = BoostZonePreset {
            zone_type: BoostType::Bounce,
            ..default()
        };
        let zone = app.world_mut().spawn(BoostPickupZone::new(preset)).id();

        app.world_mut().send_event(impact(vehicle, zone, Vec3::ZERO));
        tick(&mut app);

        let zone = app.world().get::<BoostPickupZone>(zone).expect("zone kept");
        assert!(!zone.is_consumed());
        assert!(boost_changes(&app).is_empty());
    }
}

// ==================== Impacts ====================

mod impacts {
    use super::*;

    #[test]
    fn landing_on_bounce_pad_launches_vehicle() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::airborne());
        let pad = app.world_mut().spawn(BouncePad::default()).id();
        app.world_mut()
            .get_mut::<MockBody>(vehicle)
            .expect("body")
            .velocity = Vec3::new(0.0, -6.0, 0.0);
        tick(&mut app);

        set_reading(&mut app, vehicle, GroundReading::on_surface(Vec3::Y));
        app.world_mut()
            .send_event(impact(vehicle, pad, Vec3::new(0.0, -6.0, 0.0)));
        tick(&mut app);

        let velocity = body(&app, vehicle).velocity;
        assert!((velocity - Vec3::new(0.0, 12.0, 0.0)).length() < 1e-4, "{velocity}");
        let signals = signals(&app, vehicle);
        assert!(signals.contains(&VehicleSignal::Landed));
        assert!(signals.contains(&VehicleSignal::Bounced));
    }

    #[test]
    fn bounce_pad_ignored_outside_landing_window() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let pad = app.world_mut().spawn(BouncePad::default()).id();

        // Grounded long enough for the landing window to run out.
        run_ticks(&mut app, 30);
        app.world_mut()
            .send_event(impact(vehicle, pad, Vec3::new(0.0, -6.0, 0.0)));
        tick(&mut app);

        assert!(body(&app, vehicle).velocity.y <= 0.0);
        assert!(!signals(&app, vehicle).contains(&VehicleSignal::Bounced));
    }

    #[test]
    fn hazard_wrecks_vehicle_and_pauses_simulation() {
        let mut app = create_test_app();
        let vehicle = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let hazard = app.world_mut().spawn(Hazard).id();
        app.world_mut()
            .get_mut::<VehicleController>(vehicle)
            .expect("controller")
            .apply_temporary_speed_boost(2.0, 5.0);
        app.world_mut()
            .get_mut::<DriveIntent>(vehicle)
            .expect("intent is required")
            .set_direction(Vec2::new(0.0, 1.0));
        run_ticks(&mut app, 10);

        app.world_mut().send_event(impact(vehicle, hazard, Vec3::ZERO));
        tick(&mut app);

        assert!(app.world().get::<Wrecked>(vehicle).is_some());
        assert!(app.world().resource::<SimulationContext>().paused);
        assert_eq!(body(&app, vehicle).velocity, Vec3::ZERO);
        let controller = app.world().get::<VehicleController>(vehicle).expect("controller");
        assert_eq!(controller.stats.max_speed, 12.0);
        assert!(signals(&app, vehicle).contains(&VehicleSignal::Wrecked));
        // Reset is silent.
        assert_eq!(boost_changes(&app), vec![BoostChange::SpeedStarted(24.0)]);

        run_ticks(&mut app, 10);
        assert_eq!(body(&app, vehicle).velocity, Vec3::ZERO);
    }

    #[test]
    fn wreck_does_not_drop_other_impacts_in_the_batch() {
        let mut app = create_test_app();
        let wrecked = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let other = spawn_vehicle(&mut app, GroundReading::on_surface(Vec3::Y));
        let hazard = app.world_mut().spawn(Hazard).id();
        let zone = app
            .world_mut()
            .spawn(BoostPickupZone::new(BoostZonePreset::acceleration(2.0, 1.0)))
            .id();

        app.world_mut().send_event(impact(wrecked, hazard, Vec3::ZERO));
        app.world_mut().send_event(impact(other, zone, Vec3::ZERO));
        tick(&mut app);

        assert!(app.world().get::<Wrecked>(wrecked).is_some());
        assert!(app.world().get_entity(zone).is_err());
        let controller = app.world().get::<VehicleController>(other).expect("controller");
        assert_eq!(controller.stats.max_speed, 24.0);
    }
}

// ==================== Obstacles ====================

mod obstacles {
    use super::*;

    #[test]
    fn obstacles_follow_simulation_time() {
        let mut app = create_test_app();
        let slider = app
            .world_mut()
            .spawn((Transform::default(), PingPongMotion::new(Vec3::X, 1.0)))
            .id();
        let spinner = app
            .world_mut()
            .spawn((Transform::default(), SpinMotion::default()))
            .id();

        run_ticks(&mut app, 30);

        let slider = app.world().get::<Transform>(slider).expect("slider");
        assert!((slider.translation.x - 0.5).abs() < 1e-3);
        let spinner = app.world().get::<Transform>(spinner).expect("spinner");
        assert!(spinner.rotation.angle_between(Quat::IDENTITY) > 0.5);
    }
}
