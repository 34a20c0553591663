//! Soft forces: centering pull and pairwise charge
//!
//! Both scale with alpha, so they fade out as the simulation settles.
//! They only touch velocity; integration happens in `tick`.

use glam::Vec2;

use super::state::SimState;

/// Distance² below which charge is softened
const CHARGE_DISTANCE_MIN_SQ: f32 = 1.0;

/// Pull unpinned bodies toward the viewport center, each axis independently
pub fn apply_center(state: &mut SimState) {
    let target = state.viewport.center();
    let k = state.settings.center_strength * state.temperature.alpha;
    if k == 0.0 {
        return;
    }
    for body in state.bodies.iter_mut().filter(|b| !b.is_pinned()) {
        body.vel += (target - body.pos) * k;
    }
}

/// Uniform pairwise charge; negative strength repels
///
/// Exact O(n²) over all pairs. Item counts are UI-scale.
pub fn apply_charge(state: &mut SimState) {
    let count = state.bodies.len();
    let strength = state.settings.charge_strength * state.temperature.alpha;
    if count < 2 || strength == 0.0 {
        return;
    }

    for i in 0..count {
        for j in (i + 1)..count {
            let mut delta = state.bodies[j].pos - state.bodies[i].pos;
            if delta.x == 0.0 {
                delta.x = state.tiny_jitter();
            }
            if delta.y == 0.0 {
                delta.y = state.tiny_jitter();
            }

            let mut distance_sq = delta.length_squared();
            if distance_sq < CHARGE_DISTANCE_MIN_SQ {
                distance_sq = (CHARGE_DISTANCE_MIN_SQ * distance_sq).sqrt();
            }
            let w = strength / distance_sq.max(f32::MIN_POSITIVE);
            let push: Vec2 = delta * w;

            state.bodies[i].vel += push;
            state.bodies[j].vel -= push;
        }
    }
}
