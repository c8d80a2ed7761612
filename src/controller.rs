//! Per-vehicle orchestrator.
//!
//! [`VehicleController`] ties the pure pieces together: it runs locomotion
//! and jumping each fixed tick, tracks the landing window that gates bounce
//! pads, owns the boost stack and exposes the public boost API pickups call.
//!
//! It never reads or writes the physics world directly. The ECS systems
//! gather a [`TickInput`] through the physics backend, call
//! [`VehicleController::fixed_tick`] and write the [`TickOutput`] back.

use bevy::prelude::*;

use crate::boost::{BoostAmount, BoostChange, BoostKind, BoostModifierStack, MovementStats};
use crate::bounce::{BouncePreset, ImpactBounceHandler, ImpactEvent};
use crate::config::VehicleConfig;
use crate::intent::DriveIntent;
use crate::jump::JumpController;
use crate::locomotion::{cap_horizontal_speed, LocomotionController};
use crate::math::{flat, secs};
use crate::pickup::BoostTarget;
use crate::sensor::{GroundReading, GroundSample};
use crate::state::VehicleSignal;

const MIN_SURGE_ADJUST: f32 = 0.001;

/// Everything the controller needs from the world for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Main ground probe result.
    pub ground: GroundSample,
    /// Result of the coarse jump probe.
    pub jump_grounded: bool,
    /// Rigid body velocity before this tick.
    pub velocity: Vec3,
    pub gravity: Vec3,
    pub dt: f32,
}

/// What the controller wants written back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub velocity: Vec3,
    /// Authoritative orientation, `None` while pushed.
    pub rotation: Option<Quat>,
}

/// An external shove that suspends locomotion.
#[derive(Reflect, Debug, Clone, PartialEq)]
struct Push {
    pending: Option<Vec3>,
    remaining: Timer,
}

/// A one-off forward speed spike that fades back to base speed.
#[derive(Reflect, Debug, Clone, PartialEq)]
struct SpeedSurge {
    multiplier: f32,
    deceleration_time: f32,
    /// Set on the first tick.
    track: Option<SurgeTrack>,
}

/// Captured direction, target and base speeds, and the fade timer.
#[derive(Reflect, Debug, Clone, PartialEq)]
struct SurgeTrack {
    direction: Vec3,
    target_speed: f32,
    base_speed: f32,
    fade: Timer,
}

impl SpeedSurge {
    /// Adjust `velocity` for this tick. Returns `false` once finished.
    fn step(&mut self, velocity: &mut Vec3, forward: Vec3, base_speed: f32, dt: f32) -> bool {
        let Some(track) = self.track.as_mut() else {
            let direction = flat(forward).normalize_or_zero();
            let current = flat(*velocity).dot(direction).max(0.0);
            let target_speed = base_speed * self.multiplier;
            *velocity += direction * (target_speed - current);

            let fade = Timer::new(secs(self.deceleration_time), TimerMode::Once);
            let running = !fade.duration().is_zero();
            self.track = Some(SurgeTrack {
                direction,
                target_speed,
                base_speed,
                fade,
            });
            return running;
        };

        let t = track.fade.fraction();
        let desired = track.target_speed + (track.base_speed - track.target_speed) * t;
        let current = flat(*velocity).dot(track.direction);
        let adjust = desired - current;
        if adjust.abs() > MIN_SURGE_ADJUST {
            *velocity += track.direction * adjust;
        }

        !track.fade.tick(secs(dt)).finished()
    }
}

/// Orchestrator component for one vehicle.
///
/// Tuning comes from the [`VehicleConfig`] on the same entity, steering from
/// its [`DriveIntent`] and ground contact from its [`GroundReading`].
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(VehicleConfig, DriveIntent, GroundReading)]
pub struct VehicleController {
    /// Live speed and jump parameters, boosted in place.
    pub stats: MovementStats,
    pub locomotion: LocomotionController,
    pub jump: JumpController,
    boosts: BoostModifierStack,
    bounce: ImpactBounceHandler,
    /// Open right after touching down; `None` until the first landing.
    landing_window: Option<Timer>,
    forced_airborne: bool,
    was_grounded: bool,
    grounded: bool,
    jump_requested: bool,
    push: Option<Push>,
    surge: Option<SpeedSurge>,
    commanded_velocity: Vec3,
    approach_velocity: Vec3,
    #[reflect(ignore)]
    signals: Vec<VehicleSignal>,
}

impl Default for VehicleController {
    fn default() -> Self {
        Self::new(&VehicleConfig::default())
    }
}

impl VehicleController {
    /// Create a controller whose live stats start from `config`.
    pub fn new(config: &VehicleConfig) -> Self {
        Self {
            stats: MovementStats {
                max_speed: config.locomotion.max_speed,
                jump_force: config.jump.force,
            },
            locomotion: LocomotionController::default(),
            jump: JumpController::from_config(&config.jump),
            boosts: BoostModifierStack::default(),
            bounce: ImpactBounceHandler::default(),
            landing_window: None,
            forced_airborne: false,
            was_grounded: false,
            grounded: false,
            jump_requested: false,
            push: None,
            surge: None,
            commanded_velocity: Vec3::ZERO,
            approach_velocity: Vec3::ZERO,
            signals: Vec::new(),
        }
    }

    /// Builder: start facing `yaw` degrees (0 faces +Z).
    pub fn facing(mut self, yaw: f32) -> Self {
        self.locomotion = LocomotionController::new(yaw);
        self
    }

    /// Store the raw steering input for the next tick.
    pub fn set_input(&mut self, raw: Vec2) {
        self.locomotion.set_input(raw);
    }

    /// Latch a jump request. Consumed by the next tick whether or not the
    /// jump succeeds.
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Force the next grounded tick to count as a landing.
    pub fn mark_airborne(&mut self) {
        self.forced_airborne = true;
    }

    /// Grounded according to the last tick (either probe).
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Whether a bounce pad may fire: recently landed and not rising.
    pub fn landing_eligible(&self) -> bool {
        self.landing_window_open() && self.commanded_velocity.y <= 0.0
    }

    /// Seconds left in the landing window.
    pub fn landing_window_remaining(&self) -> f32 {
        self.landing_window
            .as_ref()
            .map_or(0.0, |window| window.remaining_secs())
    }

    fn landing_window_open(&self) -> bool {
        self.landing_window_remaining() > 0.0
    }

    fn tick_landing_window(&mut self, dt: f32) {
        if let Some(window) = self.landing_window.as_mut() {
            window.tick(secs(dt));
        }
    }

    /// Whether a push currently suspends locomotion.
    pub fn is_pushed(&self) -> bool {
        self.push.is_some()
    }

    /// Whether an instant speed surge is still fading out.
    pub fn is_surging(&self) -> bool {
        self.surge.is_some()
    }

    /// The velocity this controller last wrote.
    pub fn commanded_velocity(&self) -> Vec3 {
        self.commanded_velocity
    }

    /// Read-only view of the boost stack.
    pub fn boosts(&self) -> &BoostModifierStack {
        &self.boosts
    }

    /// Apply or refresh a boost with an explicit amount.
    pub fn apply_boost(&mut self, kind: BoostKind, amount: BoostAmount, duration: f32) -> Option<f32> {
        let value = self.boosts.apply(&mut self.stats, kind, amount, duration)?;
        self.jump.set_jump_force(self.stats.jump_force);
        Some(value)
    }

    /// Scale top speed by `multiplier` for `duration` seconds.
    pub fn apply_temporary_speed_boost(&mut self, multiplier: f32, duration: f32) -> Option<f32> {
        self.apply_boost(BoostKind::Speed, BoostAmount::Scale(multiplier), duration)
    }

    /// Scale jump force by `multiplier` for `duration` seconds.
    pub fn apply_temporary_jump_boost(&mut self, multiplier: f32, duration: f32) -> Option<f32> {
        self.apply_boost(BoostKind::Jump, BoostAmount::Scale(multiplier), duration)
    }

    /// Spike forward speed to `base × multiplier` on the next tick, then fade
    /// back to base speed over `deceleration_time` seconds.
    ///
    /// Replaces any surge in progress.
    pub fn apply_instant_speed_boost(&mut self, multiplier: f32, deceleration_time: f32) {
        if !multiplier.is_finite() || !deceleration_time.is_finite() {
            return;
        }
        self.surge = Some(SpeedSurge {
            multiplier,
            deceleration_time: deceleration_time.max(0.0),
            track: None,
        });
    }

    /// Set velocity to `velocity` on the next tick and suspend locomotion
    /// for `duration` seconds. Replaces any push in progress.
    ///
    /// Returns `false` and leaves any current push untouched when the
    /// velocity is not finite or the duration is not a positive finite value.
    pub fn apply_push(&mut self, velocity: Vec3, duration: f32) -> bool {
        if !velocity.is_finite() || !(duration.is_finite() && duration > 0.0) {
            debug!("Rejected push {velocity} for {duration}s");
            return false;
        }
        self.push = Some(Push {
            pending: Some(velocity),
            remaining: Timer::new(secs(duration), TimerMode::Once),
        });
        true
    }

    /// Cancel boosts and any surge, restoring base values silently.
    pub fn reset_boosts(&mut self) {
        self.boosts.reset(&mut self.stats);
        self.jump.set_jump_force(self.stats.jump_force);
        self.surge = None;
    }

    /// Wreck the vehicle: cancel every timed effect and raise
    /// [`VehicleSignal::Wrecked`].
    pub fn wreck(&mut self) {
        self.reset_boosts();
        self.push = None;
        self.jump_requested = false;
        self.signals.push(VehicleSignal::Wrecked);
    }

    /// Advance boost timers, restoring expired values.
    pub fn advance_boosts(&mut self, dt: f32) {
        self.boosts.advance(&mut self.stats, dt);
        self.jump.set_jump_force(self.stats.jump_force);
    }

    /// The velocity commanded before the current tick, i.e. the one the
    /// integrator stepped with when a contact was reported.
    pub fn approach_velocity(&self) -> Vec3 {
        self.approach_velocity
    }

    /// Evaluate a collision with a bounce pad.
    ///
    /// Judged against the approach velocity: by the time the contact is
    /// reported the integrator has already resolved it. Returns the velocity
    /// to write on success.
    pub fn handle_impact(
        &mut self,
        impact: &ImpactEvent,
        preset: &BouncePreset,
        now: f32,
    ) -> Option<Vec3> {
        let approach = self.approach_velocity;
        let eligible = self.landing_window_open() && approach.y <= 0.0;
        let velocity = self
            .bounce
            .try_bounce(impact, approach, preset, eligible, now)?;

        self.mark_airborne();
        self.commanded_velocity = velocity;
        self.approach_velocity = velocity;
        self.signals.push(VehicleSignal::Bounced);
        Some(velocity)
    }

    /// Run one fixed tick.
    pub fn fixed_tick(&mut self, config: &VehicleConfig, input: TickInput) -> TickOutput {
        let jump_requested = std::mem::take(&mut self.jump_requested);
        self.approach_velocity = self.commanded_velocity;
        let grounded = input.ground.grounded || input.jump_grounded;

        if let Some(push) = self.push.as_mut() {
            let velocity = push.pending.take().unwrap_or(input.velocity);
            if push.remaining.tick(secs(input.dt)).finished() {
                self.push = None;
                debug!("Push ended");
            }
            self.track_ground(config, grounded, velocity, input.dt);
            return TickOutput {
                velocity,
                rotation: None,
            };
        }

        let step = self.locomotion.tick(
            &config.locomotion,
            self.stats.max_speed,
            input.ground,
            grounded,
            input.velocity,
            input.gravity,
            input.dt,
        );
        let mut velocity = step.velocity;

        if let Some(surge) = self.surge.as_mut() {
            let forward = self.locomotion.heading_forward();
            if !surge.step(&mut velocity, forward, config.locomotion.max_speed, input.dt) {
                self.surge = None;
            }
            velocity = cap_horizontal_speed(velocity, self.stats.max_speed);
        }

        if jump_requested {
            let smoothed = self.locomotion.smoothed_input;
            let move_direction = Vec3::new(smoothed.x, 0.0, smoothed.y);
            if self.jump.try_jump(&mut velocity, move_direction, grounded) {
                self.signals.push(VehicleSignal::JumpStarted);
                trace!("Jump with force {}", self.jump.jump_force);
            }
        }

        self.track_ground(config, grounded, velocity, input.dt);

        TickOutput {
            velocity,
            rotation: Some(step.rotation),
        }
    }

    /// Landing and take-off bookkeeping, run every tick including pushed ones.
    fn track_ground(&mut self, config: &VehicleConfig, grounded: bool, velocity: Vec3, dt: f32) {
        let just_landed =
            (!self.was_grounded || self.forced_airborne) && grounded && velocity.y <= 0.0;
        if just_landed {
            self.landing_window = Some(Timer::new(secs(config.landing_window), TimerMode::Once));
            self.forced_airborne = false;
            self.signals.push(VehicleSignal::Landed);
        } else {
            self.tick_landing_window(dt);
        }

        if self.was_grounded && !grounded {
            self.signals.push(VehicleSignal::BecameAirborne);
        }

        self.was_grounded = grounded;
        self.grounded = grounded;
        self.commanded_velocity = velocity;
    }

    /// Take queued boost notifications.
    pub fn drain_boost_changes(&mut self) -> Vec<BoostChange> {
        self.boosts.drain_changes()
    }

    /// Take queued signals in the order they happened.
    pub fn drain_signals(&mut self) -> Vec<VehicleSignal> {
        std::mem::take(&mut self.signals)
    }
}

impl BoostTarget for VehicleController {
    fn apply_temporary_speed_boost(&mut self, multiplier: f32, duration: f32) -> bool {
        VehicleController::apply_temporary_speed_boost(self, multiplier, duration).is_some()
    }

    fn apply_temporary_jump_boost(&mut self, multiplier: f32, duration: f32) -> bool {
        VehicleController::apply_temporary_jump_boost(self, multiplier, duration).is_some()
    }
}
