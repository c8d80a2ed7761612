//! Timed stat modifiers.
//!
//! A [`BoostModifierStack`] holds at most one active modifier per
//! [`BoostKind`]. Applying a boost of a kind that is already active replaces
//! its magnitude and restarts its timer; the base value is captured only when
//! the kind goes from inactive to active, so restoration is exact no matter
//! how often a boost is refreshed.
//!
//! The stack never publishes events itself. It queues [`BoostChange`]s which
//! the ECS layer drains once per tick.

use bevy::prelude::*;

use crate::math::secs;

/// The live movement parameters boosts act on.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct MovementStats {
    /// Current top speed.
    pub max_speed: f32,
    /// Current jump force.
    pub jump_force: f32,
}

impl MovementStats {
    pub fn get(&self, kind: BoostKind) -> f32 {
        match kind {
            BoostKind::Speed => self.max_speed,
            BoostKind::Jump => self.jump_force,
        }
    }

    pub fn set(&mut self, kind: BoostKind, value: f32) {
        match kind {
            BoostKind::Speed => self.max_speed = value,
            BoostKind::Jump => self.jump_force = value,
        }
    }
}

/// Which movement parameter a boost overrides.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoostKind {
    Speed,
    Jump,
}

/// How a boost derives its value from the base value.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum BoostAmount {
    /// `base × multiplier`.
    Scale(f32),
    /// An absolute value, ignoring the base.
    Set(f32),
}

impl BoostAmount {
    fn resolve(self, base: f32) -> f32 {
        match self {
            Self::Scale(multiplier) => base * multiplier,
            Self::Set(value) => value,
        }
    }

    fn is_finite(self) -> bool {
        match self {
            Self::Scale(value) | Self::Set(value) => value.is_finite(),
        }
    }
}

/// One active boost.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct BoostModifier {
    pub kind: BoostKind,
    /// Value currently written into the stats.
    pub magnitude: f32,
    pub duration_remaining: Timer,
    /// Value written back when the boost ends.
    pub base_value_to_restore: f32,
}

/// Boost lifecycle notifications, queued until drained.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum BoostChange {
    SpeedStarted(f32),
    SpeedEnded,
    JumpStarted(f32),
    JumpEnded,
}

impl BoostChange {
    fn started(kind: BoostKind, value: f32) -> Self {
        match kind {
            BoostKind::Speed => Self::SpeedStarted(value),
            BoostKind::Jump => Self::JumpStarted(value),
        }
    }

    fn ended(kind: BoostKind) -> Self {
        match kind {
            BoostKind::Speed => Self::SpeedEnded,
            BoostKind::Jump => Self::JumpEnded,
        }
    }
}

/// Single-slot-per-kind boost engine.
#[derive(Reflect, Debug, Clone, Default)]
pub struct BoostModifierStack {
    speed: Option<BoostModifier>,
    jump: Option<BoostModifier>,
    #[reflect(ignore)]
    changes: Vec<BoostChange>,
}

impl BoostModifierStack {
    fn slot(&self, kind: BoostKind) -> &Option<BoostModifier> {
        match kind {
            BoostKind::Speed => &self.speed,
            BoostKind::Jump => &self.jump,
        }
    }

    fn slot_mut(&mut self, kind: BoostKind) -> &mut Option<BoostModifier> {
        match kind {
            BoostKind::Speed => &mut self.speed,
            BoostKind::Jump => &mut self.jump,
        }
    }

    /// The active modifier of `kind`, if any.
    pub fn active(&self, kind: BoostKind) -> Option<&BoostModifier> {
        self.slot(kind).as_ref()
    }

    /// Whether any boost is active.
    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.jump.is_none()
    }

    /// Apply or refresh a boost of `kind`.
    ///
    /// Returns the new stat value, or `None` when `duration` is not positive
    /// or the amount is not finite. A refresh replaces the magnitude and
    /// restarts the timer; it never compounds with the previous magnitude.
    pub fn apply(
        &mut self,
        stats: &mut MovementStats,
        kind: BoostKind,
        amount: BoostAmount,
        duration: f32,
    ) -> Option<f32> {
        if !(duration.is_finite() && duration > 0.0) || !amount.is_finite() {
            debug!("Rejected {kind:?} boost ({amount:?} for {duration}s)");
            return None;
        }

        let current = stats.get(kind);
        let slot = self.slot_mut(kind);
        let base = slot
            .as_ref()
            .map_or(current, |active| active.base_value_to_restore);
        let value = amount.resolve(base);

        *slot = Some(BoostModifier {
            kind,
            magnitude: value,
            duration_remaining: Timer::new(secs(duration), TimerMode::Once),
            base_value_to_restore: base,
        });
        stats.set(kind, value);
        self.changes.push(BoostChange::started(kind, value));

        debug!("{kind:?} boost active: {base} -> {value} for {duration}s");
        Some(value)
    }

    /// Speed boost: `max_speed = base × multiplier` for `duration` seconds.
    pub fn apply_speed_boost(
        &mut self,
        stats: &mut MovementStats,
        multiplier: f32,
        duration: f32,
    ) -> Option<f32> {
        self.apply(stats, BoostKind::Speed, BoostAmount::Scale(multiplier), duration)
    }

    /// Jump boost: `jump_force = base × multiplier` for `duration` seconds.
    pub fn apply_jump_boost(
        &mut self,
        stats: &mut MovementStats,
        multiplier: f32,
        duration: f32,
    ) -> Option<f32> {
        self.apply(stats, BoostKind::Jump, BoostAmount::Scale(multiplier), duration)
    }

    /// Advance all timers by `dt`, restoring base values of expired boosts.
    pub fn advance(&mut self, stats: &mut MovementStats, dt: f32) {
        for kind in [BoostKind::Speed, BoostKind::Jump] {
            let slot = self.slot_mut(kind);
            let Some(active) = slot.as_mut() else {
                continue;
            };
            if !active.duration_remaining.tick(secs(dt)).just_finished() {
                continue;
            }

            let base = active.base_value_to_restore;
            *slot = None;
            stats.set(kind, base);
            self.changes.push(BoostChange::ended(kind));
            debug!("{kind:?} boost expired, restored {base}");
        }
    }

    /// Cancel every active boost and restore base values.
    ///
    /// Raises no end notifications. Safe to call repeatedly.
    pub fn reset(&mut self, stats: &mut MovementStats) {
        for kind in [BoostKind::Speed, BoostKind::Jump] {
            if let Some(active) = self.slot_mut(kind).take() {
                stats.set(kind, active.base_value_to_restore);
                debug!("{kind:?} boost cancelled, restored {}", active.base_value_to_restore);
            }
        }
    }

    /// Take queued notifications in the order they happened.
    pub fn drain_changes(&mut self) -> Vec<BoostChange> {
        std::mem::take(&mut self.changes)
    }
}
