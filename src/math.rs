//! Smoothing and angle helpers shared by the locomotion and jump code.
//!
//! All angles in this module are in degrees, matching the heading and lean
//! state stored on the vehicle.

use std::time::Duration;

use bevy::prelude::*;

/// Smallest smoothing time accepted by [`smooth_damp`].
pub const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Wrap `t` into `[0, length)`.
#[inline]
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0.0, length)
}

/// Triangle wave bouncing `t` between `0` and `length`.
#[inline]
pub fn ping_pong(t: f32, length: f32) -> f32 {
    let t = repeat(t, length * 2.0);
    length - (t - length).abs()
}

/// Shortest signed difference from `current` to `target`, in `(-180, 180]`.
#[inline]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = repeat(target - current, 360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Critically damped approach of `current` toward `target`.
///
/// `velocity` is the caller-owned smoothing state and is updated in place.
/// `smooth_time` is roughly the time to reach the target; `max_speed` caps the
/// rate of change (pass `f32::INFINITY` for no cap). The result never
/// overshoots `target`.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let max_change = max_speed * smooth_time;
    let change = (current - target).clamp(-max_change, max_change);
    let goal = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = goal + (change + temp) * decay;

    // Never pass the original target.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }

    output
}

/// [`smooth_damp`] for angles in degrees, taking the shortest way around.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, max_speed, dt)
}

/// Timer duration for `seconds`. Negative and NaN clamp to zero, infinity
/// saturates.
pub fn secs(seconds: f32) -> Duration {
    Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

/// Horizontal (XZ) part of a vector.
#[inline]
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Sign that treats zero as positive.
#[inline]
pub fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}
