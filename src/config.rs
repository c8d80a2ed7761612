//! Controller configuration components.
//!
//! [`VehicleConfig`] is the single tuning component attached to a vehicle. It
//! groups locomotion, jump and sensor settings; boosts never modify it, they
//! modify the live [`MovementStats`](crate::boost::MovementStats)
//! derived from it.

use bevy::prelude::*;

use crate::collision::CollisionMask;
use crate::sensor::GroundSensor;

/// Steering and acceleration tuning.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct LocomotionConfig {
    /// Top forward speed at full throttle (units/second).
    pub max_speed: f32,

    /// Maximum forward acceleration (units/second²).
    pub acceleration: f32,

    /// Maximum braking deceleration when there is no throttle (units/second²).
    pub drag: f32,

    /// Maximum sideways correction (units/second²).
    pub lateral_friction: f32,

    /// How much lateral grip is given up during sharp turns (0.0-1.0).
    pub drift_factor: f32,

    /// Heading smoothing time (seconds).
    pub turn_smooth_time: f32,

    /// Largest lean angle in degrees.
    pub lean_angle_max: f32,

    /// Lean smoothing time (seconds).
    pub lean_smooth_time: f32,

    /// Throttle below this is treated as no throttle.
    pub min_input_threshold: f32,

    /// Steepest slope (degrees) on which climbing is assisted.
    pub max_climbable_slope_angle: f32,

    /// Fraction of the uphill gravity component cancelled while climbing.
    pub climb_assist: f32,

    /// Rate at which raw input is blended into the smoothed input (1/seconds).
    pub input_smoothing: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 12.0,
            acceleration: 30.0,
            drag: 20.0,
            lateral_friction: 25.0,
            drift_factor: 0.6,
            turn_smooth_time: 0.12,
            lean_angle_max: 20.0,
            lean_smooth_time: 0.15,
            min_input_threshold: 0.1,
            max_climbable_slope_angle: 50.0,
            climb_assist: 1.0,
            input_smoothing: 10.0,
        }
    }
}

impl LocomotionConfig {
    /// Hard cap on horizontal speed: 1.5× the (possibly boosted) top speed.
    #[inline]
    pub fn horizontal_speed_cap(max_speed: f32) -> f32 {
        max_speed * 1.5
    }
}

/// Jump tuning.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct JumpConfig {
    /// Vertical speed set by a jump.
    pub force: f32,

    /// Length of the coarse ground check used for jump eligibility.
    pub ground_check_distance: f32,

    /// Fraction of the jump force added horizontally along the move direction.
    pub forward_carry: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            force: 8.0,
            ground_check_distance: 1.2,
            forward_carry: 0.3,
        }
    }
}

/// Ground probe tuning.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    /// Collision layer the vehicle's own collider lives on.
    pub own_layer: u32,

    /// Height above the vehicle origin where the ground ray starts.
    pub probe_offset: f32,

    /// Ground ray length.
    pub probe_distance: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            own_layer: 8,
            probe_offset: 0.1,
            probe_distance: 1.2,
        }
    }
}

impl SensorConfig {
    /// Mask used by both ground probes.
    pub fn mask(&self) -> CollisionMask {
        CollisionMask::excluding_self(self.own_layer)
    }

    /// Ground sensor built from these settings.
    pub fn ground_sensor(&self) -> GroundSensor {
        GroundSensor::new(self.probe_offset, self.probe_distance, self.mask())
    }
}

/// Configuration component for a vehicle.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct VehicleConfig {
    /// Steering and acceleration.
    pub locomotion: LocomotionConfig,

    /// Jump impulse.
    pub jump: JumpConfig,

    /// Ground probes.
    pub sensor: SensorConfig,

    /// How long after touching down the vehicle counts as "just landed"
    /// for bounce pads (seconds).
    pub landing_window: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            locomotion: LocomotionConfig::default(),
            jump: JumpConfig::default(),
            sensor: SensorConfig::default(),
            landing_window: 0.2,
        }
    }
}

impl VehicleConfig {
    /// Responsive tuning for a player-driven bike.
    pub fn player() -> Self {
        Self {
            locomotion: LocomotionConfig {
                acceleration: 40.0,
                turn_smooth_time: 0.1,
                ..default()
            },
            ..default()
        }
    }

    /// Loose, drifty tuning.
    pub fn arcade() -> Self {
        Self {
            locomotion: LocomotionConfig {
                max_speed: 16.0,
                lateral_friction: 15.0,
                drift_factor: 0.85,
                lean_angle_max: 30.0,
                ..default()
            },
            jump: JumpConfig {
                force: 10.0,
                ..default()
            },
            ..default()
        }
    }

    /// Builder: set max speed and acceleration.
    pub fn with_movement(mut self, max_speed: f32, acceleration: f32) -> Self {
        self.locomotion.max_speed = max_speed;
        self.locomotion.acceleration = acceleration;
        self
    }

    /// Builder: set max speed.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.locomotion.max_speed = max_speed;
        self
    }

    /// Builder: set braking drag.
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.locomotion.drag = drag;
        self
    }

    /// Builder: set lateral grip and drift.
    pub fn with_grip(mut self, lateral_friction: f32, drift_factor: f32) -> Self {
        self.locomotion.lateral_friction = lateral_friction;
        self.locomotion.drift_factor = drift_factor.clamp(0.0, 1.0);
        self
    }

    /// Builder: set heading and lean smoothing.
    pub fn with_smoothing(mut self, turn_smooth_time: f32, lean_smooth_time: f32) -> Self {
        self.locomotion.turn_smooth_time = turn_smooth_time;
        self.locomotion.lean_smooth_time = lean_smooth_time;
        self
    }

    /// Builder: set jump force.
    pub fn with_jump_force(mut self, force: f32) -> Self {
        self.jump.force = force;
        self
    }

    /// Builder: set the vehicle's own collision layer.
    pub fn with_own_layer(mut self, layer: u32) -> Self {
        self.sensor.own_layer = layer;
        self
    }

    /// Builder: set the landing window.
    pub fn with_landing_window(mut self, seconds: f32) -> Self {
        self.landing_window = seconds.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::IGNORE_LAYER;

    #[test]
    fn default_landing_window() {
        assert_eq!(VehicleConfig::default().landing_window, 0.2);
    }

    #[test]
    fn speed_cap_is_one_and_a_half() {
        assert_eq!(LocomotionConfig::horizontal_speed_cap(20.0), 30.0);
    }

    #[test]
    fn sensor_mask_excludes_own_and_ignore_layers() {
        let config = VehicleConfig::default().with_own_layer(5);
        let mask = config.sensor.mask();
        assert!(!mask.contains_layer(5));
        assert!(!mask.contains_layer(IGNORE_LAYER));
        assert!(mask.contains_layer(0));
    }

    #[test]
    fn builders_apply() {
        let config = VehicleConfig::default()
            .with_movement(20.0, 10.0)
            .with_grip(30.0, 2.0)
            .with_jump_force(12.0)
            .with_landing_window(-1.0);

        assert_eq!(config.locomotion.max_speed, 20.0);
        assert_eq!(config.locomotion.acceleration, 10.0);
        assert_eq!(config.locomotion.drift_factor, 1.0);
        assert_eq!(config.jump.force, 12.0);
        assert_eq!(config.landing_window, 0.0);
    }

    #[test]
    fn presets_differ_from_default() {
        let default = VehicleConfig::default();
        assert!(VehicleConfig::player().locomotion.acceleration > default.locomotion.acceleration);
        assert!(VehicleConfig::arcade().locomotion.drift_factor > default.locomotion.drift_factor);
    }
}
