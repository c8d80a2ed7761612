//! Trampoline bounce response.
//!
//! A [`BouncePad`] surface turns a qualifying landing impact into an upward
//! (or custom-direction) velocity. The [`ImpactBounceHandler`] owns the
//! cooldown; the orchestrator supplies the landing-eligibility flag.

use bevy::prelude::*;

const MIN_CUSTOM_DIRECTION_SQ: f32 = 0.001;

/// Bounce policy for a pad.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct BouncePreset {
    /// Fixed bounce direction. Takes priority over the surface normal when
    /// set and non-degenerate.
    pub custom_direction: Option<Vec3>,
    /// Use the contact normal when no custom direction is set.
    pub use_surface_normal: bool,
    /// Impacts slower than this along the normal are ignored.
    pub min_impact_speed: f32,
    /// Minimum outgoing speed along the bounce normal.
    pub bounce_force: f32,
    /// Keep the velocity component tangent to the normal.
    pub keep_horizontal_velocity: bool,
    /// Seconds between two bounces of the same vehicle.
    pub cooldown: f32,
}

impl Default for BouncePreset {
    fn default() -> Self {
        Self {
            custom_direction: None,
            use_surface_normal: true,
            min_impact_speed: 2.0,
            bounce_force: 12.0,
            keep_horizontal_velocity: true,
            cooldown: 0.3,
        }
    }
}

impl BouncePreset {
    /// Straight up regardless of the surface.
    pub fn vertical(bounce_force: f32) -> Self {
        Self {
            use_surface_normal: false,
            bounce_force,
            ..default()
        }
    }

    /// Builder: bounce along a fixed direction.
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.custom_direction = Some(direction);
        self
    }

    /// Builder: set the impact speed threshold.
    pub fn with_min_impact_speed(mut self, speed: f32) -> Self {
        self.min_impact_speed = speed.max(0.0);
        self
    }

    /// Builder: set the cooldown.
    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown = seconds.max(0.0);
        self
    }

    /// Builder: drop tangential velocity on bounce.
    pub fn without_horizontal_velocity(mut self) -> Self {
        self.keep_horizontal_velocity = false;
        self
    }

    /// The direction a bounce pushes along, always in the upper hemisphere.
    pub fn bounce_normal(&self, contact_normal: Vec3) -> Vec3 {
        let custom = self
            .custom_direction
            .filter(|direction| direction.length_squared() > MIN_CUSTOM_DIRECTION_SQ)
            .map(Vec3::normalize);

        let normal = match custom {
            Some(direction) => direction,
            None if self.use_surface_normal => contact_normal.try_normalize().unwrap_or(Vec3::Y),
            None => Vec3::Y,
        };

        if normal.dot(Vec3::Y) < 0.0 {
            -normal
        } else {
            normal
        }
    }
}

/// Marks a collider as a trampoline.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct BouncePad(pub BouncePreset);

/// A collision start between a vehicle and another collider.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ImpactEvent {
    pub vehicle: Entity,
    pub surface: Entity,
    /// Contact normal pointing away from the surface.
    pub contact_normal: Vec3,
    /// Vehicle velocity relative to the surface at contact.
    pub relative_velocity: Vec3,
}

/// Cooldown-gated bounce evaluation for one vehicle.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct ImpactBounceHandler {
    last_bounce: Option<f32>,
}

impl ImpactBounceHandler {
    /// Simulation time of the last bounce.
    pub fn last_bounce(&self) -> Option<f32> {
        self.last_bounce
    }

    /// Whether the cooldown has run out at `now`.
    pub fn cooldown_elapsed(&self, cooldown: f32, now: f32) -> bool {
        self.last_bounce
            .map_or(true, |last| now - last >= cooldown)
    }

    /// Evaluate an impact.
    ///
    /// Returns the velocity to write, or `None` when the impact does not
    /// qualify: cooldown still running, not landing-eligible, too slow along
    /// the bounce normal, or already moving away from the surface.
    pub fn try_bounce(
        &mut self,
        impact: &ImpactEvent,
        current_velocity: Vec3,
        preset: &BouncePreset,
        landing_eligible: bool,
        now: f32,
    ) -> Option<Vec3> {
        if !self.cooldown_elapsed(preset.cooldown, now) {
            return None;
        }

        let normal = preset.bounce_normal(impact.contact_normal);
        let incoming_speed = impact.relative_velocity.dot(-normal);
        let along_normal = current_velocity.dot(normal);

        if !landing_eligible || incoming_speed < preset.min_impact_speed || along_normal >= 0.0 {
            return None;
        }

        let strength = preset.bounce_force.max(incoming_speed);
        let mut velocity = normal * strength;
        if preset.keep_horizontal_velocity {
            velocity += current_velocity.reject_from(normal);
        }

        self.last_bounce = Some(now);
        Some(velocity)
    }
}
