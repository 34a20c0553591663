//! Collision response between circles and containment inside the viewport
//!
//! Collision and containment are not scaled by alpha: radii keep growing
//! after the simulation settles, so both have to keep working while cold.

use glam::Vec2;

use super::state::SimState;

/// Push overlapping circles apart through their velocities
///
/// Uses positions predicted one step ahead (`pos + vel`) and weights the
/// push by radius² so small circles yield to big ones. A pinned body does
/// not move, so its partner takes the whole push.
pub fn collide(state: &mut SimState) {
    let count = state.bodies.len();
    if count < 2 {
        return;
    }
    let padding = state.settings.collision_padding;

    for i in 0..count {
        let ri = state.bodies[i].radius + padding;
        let ri_sq = ri * ri;
        let predicted_i = state.bodies[i].pos + state.bodies[i].vel;

        for j in (i + 1)..count {
            let rj = state.bodies[j].radius + padding;
            let min_distance = ri + rj;
            let predicted_j = state.bodies[j].pos + state.bodies[j].vel;

            let mut delta = predicted_i - predicted_j;
            let mut distance_sq = delta.length_squared();
            if distance_sq >= min_distance * min_distance {
                continue;
            }

            if delta.x == 0.0 {
                delta.x = state.tiny_jitter();
                distance_sq += delta.x * delta.x;
            }
            if delta.y == 0.0 {
                delta.y = state.tiny_jitter();
                distance_sq += delta.y * delta.y;
            }

            let distance = distance_sq.sqrt();
            if distance <= 0.0 {
                continue;
            }
            let push = delta * ((min_distance - distance) / distance);

            let rj_sq = rj * rj;
            let share_i = match (state.bodies[i].is_pinned(), state.bodies[j].is_pinned()) {
                (true, true) => continue,
                (true, false) => 0.0,
                (false, true) => 1.0,
                (false, false) => rj_sq / (ri_sq + rj_sq),
            };

            state.bodies[i].vel += push * share_i;
            state.bodies[j].vel -= push * (1.0 - share_i);
        }
    }
}

/// Bounce a coordinate back inside `[min, max]`
///
/// Returns the clamped coordinate and the damped, reflected velocity.
#[inline]
fn bounce_axis(pos: f32, vel: f32, min: f32, max: f32, damping: f32) -> (f32, f32) {
    if pos < min {
        (min, vel.abs() * damping)
    } else if pos > max {
        (max, -vel.abs() * damping)
    } else {
        (pos, vel)
    }
}

/// Hard clamp of unpinned bodies inside the padded viewport
///
/// Runs after integration so the containment invariant holds at the end of
/// every tick, including right after a viewport shrink.
pub fn contain(state: &mut SimState) {
    let viewport = state.viewport;
    let padding = state.settings.boundary_padding;
    let damping = state.settings.bounce_damping;

    for body in state.bodies.iter_mut().filter(|b| !b.is_pinned()) {
        let (min, max) = viewport.inner_bounds(body.radius, padding);
        let (x, vx) = bounce_axis(body.pos.x, body.vel.x, min.x, max.x, damping);
        let (y, vy) = bounce_axis(body.pos.y, body.vel.y, min.y, max.y, damping);
        body.pos = Vec2::new(x, y);
        body.vel = Vec2::new(vx, vy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemId};
    use crate::settings::Settings;
    use crate::sim::state::Viewport;

    fn state_with(bodies: &[(Vec2, f32)]) -> SimState {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 7);
        for (i, (pos, radius)) in bodies.iter().enumerate() {
            state.insert(&Item::new(ItemId(i as u64), 0.0), 0.0);
            state.bodies[i].pos = *pos;
            state.bodies[i].vel = Vec2::ZERO;
            state.bodies[i].radius = *radius;
        }
        state
    }

    #[test]
    fn test_overlapping_circles_push_apart() {
        let mut state = state_with(&[
            (Vec2::new(390.0, 300.0), 20.0),
            (Vec2::new(410.0, 300.0), 20.0),
        ]);
        collide(&mut state);
        assert!(state.bodies[0].vel.x < 0.0);
        assert!(state.bodies[1].vel.x > 0.0);
        // Equal radii split the overlap evenly
        assert!((state.bodies[0].vel.x + state.bodies[1].vel.x).abs() < 1e-4);
        // Overlap with padding: 44 - 20 = 24
        assert!((state.bodies[1].vel.x - state.bodies[0].vel.x - 24.0).abs() < 1e-3);
    }

    #[test]
    fn test_separated_circles_untouched() {
        let mut state = state_with(&[
            (Vec2::new(100.0, 300.0), 20.0),
            (Vec2::new(400.0, 300.0), 20.0),
        ]);
        collide(&mut state);
        assert_eq!(state.bodies[0].vel, Vec2::ZERO);
        assert_eq!(state.bodies[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_small_circle_yields_to_big() {
        let mut state = state_with(&[
            (Vec2::new(400.0, 300.0), 80.0),
            (Vec2::new(450.0, 300.0), 20.0),
        ]);
        collide(&mut state);
        assert!(state.bodies[1].vel.x.abs() > state.bodies[0].vel.x.abs() * 4.0);
    }

    #[test]
    fn test_pinned_body_does_not_yield() {
        let mut state = state_with(&[
            (Vec2::new(400.0, 300.0), 30.0),
            (Vec2::new(420.0, 300.0), 30.0),
        ]);
        state.bodies[0].pin = Some(Vec2::new(400.0, 300.0));
        collide(&mut state);
        assert_eq!(state.bodies[0].vel, Vec2::ZERO);
        assert!(state.bodies[1].vel.x > 0.0);
    }

    #[test]
    fn test_contain_clamps_and_bounces() {
        let mut state = state_with(&[(Vec2::new(5.0, 300.0), 20.0)]);
        state.bodies[0].vel = Vec2::new(-8.0, 0.0);
        contain(&mut state);
        assert_eq!(state.bodies[0].pos.x, 30.0);
        assert_eq!(state.bodies[0].vel.x, 4.0);
    }

    #[test]
    fn test_contain_far_edge() {
        let mut state = state_with(&[(Vec2::new(400.0, 700.0), 20.0)]);
        state.bodies[0].vel = Vec2::new(0.0, 6.0);
        contain(&mut state);
        assert_eq!(state.bodies[0].pos.y, 570.0);
        assert_eq!(state.bodies[0].vel.y, -3.0);
    }

    #[test]
    fn test_contain_leaves_pinned_alone() {
        let mut state = state_with(&[(Vec2::new(0.0, 0.0), 20.0)]);
        state.bodies[0].pin = Some(Vec2::ZERO);
        contain(&mut state);
        assert_eq!(state.bodies[0].pos, Vec2::ZERO);
    }
}
