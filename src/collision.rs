//! Detection result structures.
//!
//! These hold the results of physics queries (raycasts) used for ground
//! detection, and the layer masks those queries are filtered by.

use bevy::prelude::*;

/// Layer reserved for volumes that ground probes must never see
/// (trigger-only pickups, "ignore raycast" geometry).
pub const IGNORE_LAYER: u32 = 2;

/// Information about a raycast hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// Bitmask of collision layers a query is allowed to hit.
///
/// Bit `n` set means colliders on layer `n` are visible to the query.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionMask(u32);

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl CollisionMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// No layer.
    pub const NONE: Self = Self(0);

    /// Build a mask from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Every layer except `own_layer` and [`IGNORE_LAYER`].
    ///
    /// This is the mask ground probes use so a vehicle never detects its own
    /// collider or trigger volumes.
    pub fn excluding_self(own_layer: u32) -> Self {
        Self::ALL.without_layer(own_layer).without_layer(IGNORE_LAYER)
    }

    /// Remove a layer (layers `>= 32` are ignored).
    pub fn without_layer(self, layer: u32) -> Self {
        match 1u32.checked_shl(layer) {
            Some(bit) => Self(self.0 & !bit),
            None => self,
        }
    }

    /// Add a layer (layers `>= 32` are ignored).
    pub fn with_layer(self, layer: u32) -> Self {
        match 1u32.checked_shl(layer) {
            Some(bit) => Self(self.0 | bit),
            None => self,
        }
    }

    /// Whether colliders on `layer` are visible to this mask.
    pub fn contains_layer(&self, layer: u32) -> bool {
        1u32.checked_shl(layer)
            .map(|bit| self.0 & bit != 0)
            .unwrap_or(false)
    }

    /// Raw bits.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }
}
