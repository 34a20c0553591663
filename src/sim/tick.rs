//! Simulation tick
//!
//! Per tick, in order:
//! 1. Re-seed non-finite bodies and re-derive radii from the wall clock
//! 2. Step alpha toward its target
//! 3. Collision, centering, charge (velocity only)
//! 4. Damping and integration; pinned bodies snap to their pin
//! 5. Boundary containment

use glam::Vec2;

use super::collision::{collide, contain};
use super::forces::{apply_center, apply_charge};
use super::state::SimState;
use crate::Millis;

/// Inputs for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Wall-clock time used for radii (Unix ms)
    pub now: Millis,
}

impl TickInput {
    pub fn at(now: Millis) -> Self {
        Self { now }
    }
}

/// Advance the simulation by one step
///
/// Returns whether the simulation is still running (not settled).
pub fn tick(state: &mut SimState, input: &TickInput) -> bool {
    if state.bodies.is_empty() {
        return false;
    }

    state.ticks += 1;
    state.reseed_invalid();
    state.refresh_radii(input.now);
    state.temperature.step();

    collide(state);
    apply_center(state);
    apply_charge(state);

    let retention = state.settings.velocity_retention;
    for body in &mut state.bodies {
        match body.pin {
            Some(pin) => {
                body.pos = pin;
                body.vel = Vec2::ZERO;
            }
            None => {
                body.vel *= retention;
                body.pos += body.vel;
            }
        }
    }

    contain(state);

    state.temperature.is_running()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MS_PER_DAY;
    use crate::item::{Item, ItemId};
    use crate::settings::Settings;
    use crate::sim::state::Viewport;
    use proptest::prelude::*;

    const NOW: Millis = 1_700_000_000_000.0;

    fn run(state: &mut SimState, ticks: usize) {
        let input = TickInput::at(NOW);
        for _ in 0..ticks {
            tick(state, &input);
        }
    }

    fn assert_contained(state: &SimState) {
        let padding = state.settings.boundary_padding;
        for body in state.bodies.iter().filter(|b| !b.is_pinned()) {
            let (min, max) = state.viewport.inner_bounds(body.radius, padding);
            assert!(
                body.pos.x >= min.x
                    && body.pos.x <= max.x
                    && body.pos.y >= min.y
                    && body.pos.y <= max.y,
                "body {} at {:?} outside {:?}..{:?}",
                body.id,
                body.pos,
                min,
                max
            );
        }
    }

    #[test]
    fn test_empty_tick_is_noop() {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 1);
        assert!(!tick(&mut state, &TickInput::at(NOW)));
        assert_eq!(state.ticks, 0);
        assert_eq!(state.temperature.alpha, 1.0);
    }

    #[test]
    fn test_two_items_stop_overlapping() {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 3);
        let a = Item::new(ItemId(1), NOW - 15.0 * MS_PER_DAY).with_growth_rate(2.0);
        let b = Item::new(ItemId(2), NOW - 10.0 * MS_PER_DAY).with_growth_rate(3.0);
        state.insert(&a, NOW);
        state.insert(&b, NOW);
        // Start them on top of each other
        state.bodies[0].pos = Vec2::new(400.0, 300.0);
        state.bodies[1].pos = Vec2::new(405.0, 302.0);

        run(&mut state, 500);

        let (p, q) = (&state.bodies[0], &state.bodies[1]);
        let distance = p.pos.distance(q.pos);
        assert!(distance >= p.radius + q.radius - 0.5, "distance {distance}");
        assert_contained(&state);
    }

    #[test]
    fn test_many_items_settle_apart() {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 11);
        for id in 0..8 {
            let item = Item::new(ItemId(id), NOW - (id as f64 * 3.0) * MS_PER_DAY);
            state.insert(&item, NOW);
        }
        run(&mut state, 600);

        for i in 0..state.bodies.len() {
            for j in (i + 1)..state.bodies.len() {
                let (p, q) = (&state.bodies[i], &state.bodies[j]);
                assert!(p.pos.distance(q.pos) >= p.radius + q.radius - 1.0);
            }
        }
        assert!(!state.temperature.is_running());
    }

    #[test]
    fn test_pin_wins_over_forces() {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 5);
        state.insert(&Item::new(ItemId(1), NOW), NOW);
        state.insert(&Item::new(ItemId(2), NOW), NOW);
        let pin = Vec2::new(200.0, 150.0);
        state.bodies[0].pin = Some(pin);
        state.bodies[1].pos = Vec2::new(205.0, 150.0);

        run(&mut state, 20);
        assert_eq!(state.bodies[0].pos, pin);
        assert_eq!(state.bodies[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_radius_follows_clock() {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 5);
        state.insert(&Item::new(ItemId(1), NOW).with_growth_rate(10.0), NOW);
        tick(&mut state, &TickInput::at(NOW + 2.0 * MS_PER_DAY));
        assert!((state.bodies[0].radius - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_shrunk_viewport_contains_within_one_tick() {
        let mut state = SimState::new(Viewport::new(800.0, 600.0), Settings::default(), 9);
        for id in 0..4 {
            state.insert(&Item::new(ItemId(id), NOW), NOW);
        }
        state.bodies[0].pos = Vec2::new(750.0, 550.0);
        state.bodies[1].pos = Vec2::new(600.0, 100.0);
        state.viewport = Viewport::new(400.0, 300.0);

        tick(&mut state, &TickInput::at(NOW));
        assert_contained(&state);
    }

    proptest! {
        #[test]
        fn containment_holds_every_tick(
            seed in any::<u64>(),
            count in 1usize..12,
            ticks in 1usize..80,
            ages in proptest::collection::vec(0.0f64..60.0, 12),
        ) {
            let mut state = SimState::new(Viewport::new(640.0, 480.0), Settings::default(), seed);
            for id in 0..count {
                let item = Item::new(ItemId(id as u64), NOW - ages[id] * MS_PER_DAY);
                state.insert(&item, NOW);
            }
            for _ in 0..ticks {
                tick(&mut state, &TickInput::at(NOW));
                assert_contained(&state);
            }
        }
    }
}
