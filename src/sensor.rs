//! Ground sensing.
//!
//! The [`GroundSensor`] decides whether the vehicle is grounded and which
//! surface normal locomotion should align to. It does not touch the physics
//! world itself: the caller hands in a cast function, which the Rapier
//! backend implements with a filtered raycast and tests implement with plain
//! geometry.

use bevy::prelude::*;

use crate::collision::{CollisionData, CollisionMask};

/// Result of one ground probe. Recomputed every physics tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GroundSample {
    /// Whether the probe hit qualifying geometry.
    pub grounded: bool,
    /// Surface normal under the vehicle, world up when nothing was hit.
    pub normal: Vec3,
}

impl Default for GroundSample {
    fn default() -> Self {
        Self::airborne()
    }
}

impl GroundSample {
    /// A sample with no ground below.
    pub fn airborne() -> Self {
        Self {
            grounded: false,
            normal: Vec3::Y,
        }
    }

    /// A sample standing on a surface with the given normal.
    pub fn on_surface(normal: Vec3) -> Self {
        Self {
            grounded: true,
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
        }
    }

    /// Slope of the surface in degrees (0 = flat).
    pub fn slope_angle(&self) -> f32 {
        self.normal.angle_between(Vec3::Y).to_degrees()
    }
}

/// Latest probe results for a vehicle, written by the backend's sensor
/// system and consumed by the drive system in the same tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct GroundReading {
    /// Main ground probe.
    pub sample: GroundSample,
    /// Coarse jump probe.
    pub jump_grounded: bool,
}

impl GroundReading {
    /// Standing on a surface with the given normal, both probes hitting.
    pub fn on_surface(normal: Vec3) -> Self {
        Self {
            sample: GroundSample::on_surface(normal),
            jump_grounded: true,
        }
    }

    /// Nothing below.
    pub fn airborne() -> Self {
        Self::default()
    }
}

/// A single downward ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Ray origin in world space.
    pub origin: Vec3,
    /// Ray direction (always world down).
    pub direction: Vec3,
    /// Maximum ray length.
    pub max_distance: f32,
    /// Layers the ray may hit.
    pub mask: CollisionMask,
}

/// Downward probe configuration for one vehicle.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GroundSensor {
    /// How far above the vehicle origin the ray starts.
    pub probe_offset: f32,
    /// Ray length.
    pub max_distance: f32,
    /// Layers considered ground.
    pub mask: CollisionMask,
}

impl Default for GroundSensor {
    fn default() -> Self {
        Self {
            probe_offset: 0.1,
            max_distance: 1.2,
            mask: CollisionMask::default(),
        }
    }
}

impl GroundSensor {
    /// Create a sensor.
    pub fn new(probe_offset: f32, max_distance: f32, mask: CollisionMask) -> Self {
        Self {
            probe_offset,
            max_distance: max_distance.max(0.0),
            mask,
        }
    }

    /// The ray this sensor casts from `position`.
    pub fn probe(&self, position: Vec3) -> GroundProbe {
        GroundProbe {
            origin: position + Vec3::Y * self.probe_offset,
            direction: Vec3::NEG_Y,
            max_distance: self.max_distance,
            mask: self.mask,
        }
    }

    /// Probe the ground below `position`.
    ///
    /// `cast` performs the world query; it must honour the probe's mask.
    /// Hits beyond `max_distance` are treated as misses even if the cast
    /// reports them.
    pub fn sample<F>(&self, position: Vec3, cast: F) -> GroundSample
    where
        F: FnOnce(&GroundProbe) -> Option<CollisionData>,
    {
        let probe = self.probe(position);
        match cast(&probe) {
            Some(hit) if hit.distance <= probe.max_distance => GroundSample::on_surface(hit.normal),
            _ => GroundSample::airborne(),
        }
    }
}

/// Coarse ground check used only for jump eligibility.
///
/// Casts straight down from the vehicle origin with no offset.
pub fn jump_probe(position: Vec3, check_distance: f32, mask: CollisionMask) -> GroundProbe {
    GroundProbe {
        origin: position,
        direction: Vec3::NEG_Y,
        max_distance: check_distance.max(0.0),
        mask,
    }
}
