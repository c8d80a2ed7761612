//! Boost pickups.
//!
//! A [`BoostPickupZone`] is a trigger volume that hands its
//! [`BoostZonePreset`] to the first vehicle entering it and is then
//! consumed. The appliers are stateless adapters from a preset to the
//! [`BoostTarget`] API.

use bevy::prelude::*;

/// What a zone does to a vehicle.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoostType {
    /// Temporary top-speed boost.
    #[default]
    Acceleration,
    /// Temporary jump-force boost.
    Jump,
    /// Trampoline surface, handled by [`BouncePad`](crate::bounce::BouncePad)
    /// rather than consumed as a pickup.
    Bounce,
}

/// The boost API a pickup can drive.
///
/// Returns `false` when the boost was rejected (non-positive duration,
/// non-finite multiplier).
pub trait BoostTarget {
    fn apply_temporary_speed_boost(&mut self, multiplier: f32, duration: f32) -> bool;
    fn apply_temporary_jump_boost(&mut self, multiplier: f32, duration: f32) -> bool;
}

/// Tuning for a boost zone.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct BoostZonePreset {
    pub zone_type: BoostType,
    pub acceleration_multiplier: f32,
    pub acceleration_duration: f32,
    pub jump_multiplier: f32,
    pub jump_duration: f32,
}

impl Default for BoostZonePreset {
    fn default() -> Self {
        Self {
            zone_type: BoostType::Acceleration,
            acceleration_multiplier: 1.5,
            acceleration_duration: 3.0,
            jump_multiplier: 1.5,
            jump_duration: 3.0,
        }
    }
}

impl BoostZonePreset {
    /// A speed pickup.
    pub fn acceleration(multiplier: f32, duration: f32) -> Self {
        Self {
            zone_type: BoostType::Acceleration,
            acceleration_multiplier: multiplier,
            acceleration_duration: duration,
            ..default()
        }
    }

    /// A jump pickup.
    pub fn jump(multiplier: f32, duration: f32) -> Self {
        Self {
            zone_type: BoostType::Jump,
            jump_multiplier: multiplier,
            jump_duration: duration,
            ..default()
        }
    }

    /// Hand this preset to `target` through the matching applier.
    ///
    /// Bounce zones apply nothing here.
    pub fn apply_boost(&self, target: &mut dyn BoostTarget) -> bool {
        match self.zone_type {
            BoostType::Acceleration => AccelerationBooster.try_apply(target, self),
            BoostType::Jump => JumpBooster.try_apply(target, self),
            BoostType::Bounce => false,
        }
    }
}

/// Applies the acceleration part of a preset.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccelerationBooster;

impl AccelerationBooster {
    pub fn try_apply(&self, target: &mut dyn BoostTarget, preset: &BoostZonePreset) -> bool {
        target.apply_temporary_speed_boost(preset.acceleration_multiplier, preset.acceleration_duration)
    }
}

/// Applies the jump part of a preset.
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpBooster;

impl JumpBooster {
    pub fn try_apply(&self, target: &mut dyn BoostTarget, preset: &BoostZonePreset) -> bool {
        target.apply_temporary_jump_boost(preset.jump_multiplier, preset.jump_duration)
    }
}

/// One-shot pickup trigger. Despawned after its first successful use.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct BoostPickupZone {
    pub preset: BoostZonePreset,
    consumed: bool,
}

impl BoostPickupZone {
    pub fn new(preset: BoostZonePreset) -> Self {
        Self {
            preset,
            consumed: false,
        }
    }

    /// Whether the pickup has already been used.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Apply the preset to `target` unless already consumed.
    ///
    /// Returns `true` exactly once over the lifetime of the zone.
    pub fn try_consume(&mut self, target: &mut dyn BoostTarget) -> bool {
        if self.consumed || self.preset.zone_type == BoostType::Bounce {
            return false;
        }
        self.consumed = self.preset.apply_boost(target);
        self.consumed
    }
}
