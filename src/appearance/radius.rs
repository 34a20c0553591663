//! Radius model: elapsed time since the last bump drives the circle size

use crate::Millis;
use crate::consts::{MAX_RADIUS, MIN_RADIUS, MS_PER_DAY};
use crate::item::Item;

/// Radius for a growth clock started at `last_bumped`
///
/// Clamped to `[MIN_RADIUS, MAX_RADIUS]`, so clock skew (a bump in the
/// future) reads as a fresh item rather than a shrunken one.
#[inline]
pub fn radius_at(last_bumped: Millis, growth_rate: f32, now: Millis) -> f32 {
    let elapsed_days = ((now - last_bumped) / MS_PER_DAY) as f32;
    let radius = MIN_RADIUS + elapsed_days * growth_rate;
    if radius.is_nan() {
        return MIN_RADIUS;
    }
    radius.clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Current radius of an item
#[inline]
pub fn radius(item: &Item, now: Millis) -> f32 {
    radius_at(item.last_bumped, item.growth_rate, now)
}
