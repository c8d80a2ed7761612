//! Ground-aware steering and acceleration.
//!
//! [`LocomotionController`] owns the smoothed steering state of one vehicle
//! (input, heading, lean) and turns it into a new velocity and an
//! authoritative orientation once per fixed tick. It never touches the
//! physics world; the orchestrator reads the rigid body, calls
//! [`LocomotionController::tick`] and writes the result back.
//!
//! Conventions: input `(x, y)` maps to world `(x, 0, y)`, yaw is in degrees
//! and yaw 0 faces world +Z.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::math::{delta_angle, flat, sign, smooth_damp, smooth_damp_angle};
use crate::sensor::GroundSample;

/// Heading error below which the heading snaps onto its target (degrees).
pub const HEADING_SNAP_EPSILON: f32 = 0.5;

/// Heading error at which drift is at full strength (degrees).
pub const DRIFT_REFERENCE_ANGLE: f32 = 60.0;

/// Heading error at which lean is at full strength (degrees).
pub const LEAN_REFERENCE_ANGLE: f32 = 45.0;

/// Share of the downhill gravity component cancelled by braking assist.
pub const DOWNHILL_BRAKE_ASSIST: f32 = 0.5;

const MIN_DT: f32 = 0.0001;
const MIN_DIRECTION_SQ: f32 = 0.0001;

/// Result of one locomotion tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionStep {
    /// Velocity to hand back to the rigid body.
    pub velocity: Vec3,
    /// Orientation to write directly onto the rigid body.
    pub rotation: Quat,
}

/// Per-vehicle steering state, integrated once per physics tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct LocomotionController {
    /// Latest raw input, each axis in `[-1, 1]`.
    pub raw_input: Vec2,
    /// Input after time-based smoothing.
    pub smoothed_input: Vec2,
    /// Current heading (degrees).
    pub heading_yaw: f32,
    /// Heading the vehicle is turning toward (degrees).
    pub target_heading_yaw: f32,
    /// Smoothing velocity of the heading (degrees/second).
    pub heading_velocity: f32,
    /// Current lean around the forward axis (degrees).
    pub lean_angle: f32,
    /// Smoothing velocity of the lean (degrees/second).
    pub lean_velocity: f32,
    /// Whether the last tick ran on the ground.
    pub grounded: bool,
    /// Ground normal used by the last tick.
    pub ground_normal: Vec3,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl LocomotionController {
    /// Create a controller facing `initial_yaw` degrees.
    pub fn new(initial_yaw: f32) -> Self {
        Self {
            raw_input: Vec2::ZERO,
            smoothed_input: Vec2::ZERO,
            heading_yaw: initial_yaw,
            target_heading_yaw: initial_yaw,
            heading_velocity: 0.0,
            lean_angle: 0.0,
            lean_velocity: 0.0,
            grounded: false,
            ground_normal: Vec3::Y,
        }
    }

    /// Store the raw steering input. Each axis is clamped to `[-1, 1]`.
    pub fn set_input(&mut self, raw: Vec2) {
        self.raw_input = raw.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Yaw-only rotation of the current heading.
    pub fn heading_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.heading_yaw.to_radians())
    }

    /// Flat unit vector the vehicle is heading along.
    pub fn heading_forward(&self) -> Vec3 {
        self.heading_rotation() * Vec3::Z
    }

    /// Signed heading error toward the target (degrees).
    pub fn heading_error(&self) -> f32 {
        delta_angle(self.heading_yaw, self.target_heading_yaw)
    }

    /// Throttle derived from the smoothed input, in `[0, 1]`.
    pub fn throttle(&self) -> f32 {
        self.smoothed_input.length().clamp(0.0, 1.0)
    }

    /// Advance one fixed tick.
    ///
    /// `max_speed` is the live (possibly boosted) top speed, `ground` the
    /// sample taken this tick and `grounded` the combined grounded flag.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        config: &LocomotionConfig,
        max_speed: f32,
        ground: GroundSample,
        grounded: bool,
        velocity: Vec3,
        gravity: Vec3,
        dt: f32,
    ) -> LocomotionStep {
        let dt = dt.max(MIN_DT);
        self.grounded = grounded;
        self.ground_normal = ground.normal;

        // 1. Input smoothing.
        let blend = (dt * config.input_smoothing).clamp(0.0, 1.0);
        self.smoothed_input = self.smoothed_input.lerp(self.raw_input, blend);

        // 2. Target heading from input direction.
        let desired = Vec3::new(self.smoothed_input.x, 0.0, self.smoothed_input.y);
        let has_input = desired.length_squared() > MIN_DIRECTION_SQ;
        if has_input {
            let direction = desired.normalize();
            self.target_heading_yaw = direction.x.atan2(direction.z).to_degrees();
        }

        // 3. Heading smoothing with snap.
        self.heading_yaw = smooth_damp_angle(
            self.heading_yaw,
            self.target_heading_yaw,
            &mut self.heading_velocity,
            config.turn_smooth_time,
            f32::INFINITY,
            dt,
        );
        if has_input && self.heading_error().abs() < HEADING_SNAP_EPSILON {
            self.heading_yaw = self.target_heading_yaw;
            self.heading_velocity = 0.0;
        }

        // 4. Ground-plane basis.
        let heading = self.heading_rotation();
        let forward_flat = heading * Vec3::Z;
        let normal = ground.normal.try_normalize().unwrap_or(Vec3::Y);
        let forward = forward_flat.reject_from_normalized(normal).normalize_or_zero();
        let right = (heading * Vec3::X).reject_from_normalized(normal).normalize_or_zero();

        // 5. Decompose.
        let forward_speed = velocity.dot(forward);
        let lateral_speed = velocity.dot(right);

        // 6/7. Throttle or brake.
        let throttle = self.throttle();
        let forward_accel = if throttle > config.min_input_threshold {
            let desired_speed = throttle * max_speed;
            let base = ((desired_speed - forward_speed) / dt)
                .clamp(-config.acceleration, config.acceleration);
            base + slope_compensation(config, ground, forward, gravity)
        } else {
            (-forward_speed / dt).clamp(-config.drag, config.drag)
        };

        // 8. Lateral grip, loosened during sharp turns.
        let turning_intensity = if has_input {
            (self.heading_error().abs() / DRIFT_REFERENCE_ANGLE).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let grip = config.lateral_friction * (1.0 - config.drift_factor * turning_intensity);
        let lateral_accel = (-lateral_speed / dt).clamp(-grip.abs(), grip.abs());

        let new_velocity = cap_horizontal_speed(
            velocity + forward * (forward_accel * dt) + right * (lateral_accel * dt),
            max_speed,
        );

        // 9. Lean into the turn.
        let rate = self.heading_error();
        let lean_factor = (rate.abs() / LEAN_REFERENCE_ANGLE).clamp(0.0, 1.0);
        let target_lean = -sign(rate) * lean_factor * config.lean_angle_max;
        self.lean_angle = smooth_damp(
            self.lean_angle,
            target_lean,
            &mut self.lean_velocity,
            config.lean_smooth_time,
            f32::INFINITY,
            dt,
        );
        let lean = Quat::from_axis_angle(forward_flat, self.lean_angle.to_radians());

        LocomotionStep {
            velocity: new_velocity,
            rotation: lean * heading,
        }
    }
}

/// Clamp the horizontal (XZ) speed of `velocity` to
/// [`LocomotionConfig::horizontal_speed_cap`], keeping its vertical part.
pub fn cap_horizontal_speed(velocity: Vec3, max_speed: f32) -> Vec3 {
    let cap = LocomotionConfig::horizontal_speed_cap(max_speed);
    let horizontal = flat(velocity);
    if horizontal.length() <= cap {
        return velocity;
    }
    let limited = horizontal.normalize() * cap;
    Vec3::new(limited.x, velocity.y, limited.z)
}

/// Extra forward acceleration from the slope under the vehicle.
///
/// Uphill on a climbable slope cancels `climb_assist` of the gravity pull;
/// downhill brakes against half of it.
fn slope_compensation(
    config: &LocomotionConfig,
    ground: GroundSample,
    forward: Vec3,
    gravity: Vec3,
) -> f32 {
    let gravity_along_forward = gravity.dot(forward);
    if gravity_along_forward < 0.0 && ground.slope_angle() <= config.max_climbable_slope_angle {
        -gravity_along_forward * config.climb_assist
    } else if gravity_along_forward > 0.0 {
        -gravity_along_forward * DOWNHILL_BRAKE_ASSIST
    } else {
        0.0
    }
}
