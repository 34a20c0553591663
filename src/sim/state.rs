//! Simulation state and core kinematic types
//!
//! Kinematic state is transient: it is seeded when an item first appears
//! and owned by the simulation from then on.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::appearance::radius_at;
use crate::item::{Item, ItemId};
use crate::settings::Settings;
use crate::{Millis, is_finite_vec};

/// Growth parameters copied from the item so radii can be re-derived per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthClock {
    pub last_bumped: Millis,
    pub growth_rate: f32,
}

impl GrowthClock {
    pub fn of(item: &Item) -> Self {
        Self {
            last_bumped: item.last_bumped,
            growth_rate: item.growth_rate,
        }
    }

    #[inline]
    pub fn radius(&self, now: Millis) -> f32 {
        radius_at(self.last_bumped, self.growth_rate, now)
    }
}

/// One simulated circle
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: ItemId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed position while dragged; overrides forces on both axes
    pub pin: Option<Vec2>,
    /// Radius as of the last tick
    pub radius: f32,
    pub growth: GrowthClock,
}

impl Body {
    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Non-finite kinematics are treated as uninitialized
    pub fn is_valid(&self) -> bool {
        is_finite_vec(self.pos) && is_finite_vec(self.vel)
    }
}

/// Simulation area in pixels, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Allowed center range for a circle of `radius`, per axis
    ///
    /// Collapses to the viewport center on an axis too small for the circle.
    pub fn inner_bounds(&self, radius: f32, padding: f32) -> (Vec2, Vec2) {
        let margin = radius + padding;
        let axis = |extent: f32| {
            if extent - margin < margin {
                (extent / 2.0, extent / 2.0)
            } else {
                (margin, extent - margin)
            }
        };
        let (min_x, max_x) = axis(self.width);
        let (min_y, max_y) = axis(self.height);
        (Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    /// Clamp a point into the allowed range for a circle of `radius`
    pub fn clamp_inside(&self, pos: Vec2, radius: f32, padding: f32) -> Vec2 {
        let (min, max) = self.inner_bounds(radius, padding);
        pos.clamp(min, max)
    }
}

/// Simulation temperature
///
/// Alpha eases toward `target` by `decay` each tick. With a zero target this
/// is plain geometric decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub alpha: f32,
    pub target: f32,
    pub decay: f32,
    pub min: f32,
}

impl Temperature {
    pub fn new(settings: &Settings) -> Self {
        Self {
            alpha: 1.0,
            target: 0.0,
            decay: settings.alpha_decay,
            min: settings.alpha_min,
        }
    }

    pub fn step(&mut self) {
        self.alpha += (self.target - self.alpha) * self.decay;
    }

    /// Set alpha directly (restart with a new energy level)
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// Hold alpha near `target` until released
    pub fn hold(&mut self, target: f32) {
        self.target = target;
    }

    /// Moving meaningfully, or held warm by an interaction
    pub fn is_running(&self) -> bool {
        self.alpha >= self.min || self.target > 0.0
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Bodies in insertion order
    pub bodies: Vec<Body>,
    pub viewport: Viewport,
    pub temperature: Temperature,
    pub settings: Settings,
    /// Tick counter
    pub ticks: u64,
    rng: Pcg32,
}

impl SimState {
    /// Create an empty simulation with the given RNG seed
    pub fn new(viewport: Viewport, settings: Settings, seed: u64) -> Self {
        Self {
            bodies: Vec::new(),
            viewport,
            temperature: Temperature::new(&settings),
            settings,
            ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn body(&self, id: ItemId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_mut(&mut self, id: ItemId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.body(id).is_some()
    }

    /// Random position near the center and a small random velocity
    pub fn seed_kinematics(&mut self) -> (Vec2, Vec2) {
        let center = self.viewport.center();
        let p = self.settings.seed_position_jitter;
        let v = self.settings.seed_velocity_jitter;
        let pos = center + Vec2::new(self.jitter(p), self.jitter(p));
        let vel = Vec2::new(self.jitter(v), self.jitter(v));
        (pos, vel)
    }

    fn jitter(&mut self, magnitude: f32) -> f32 {
        if magnitude <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-magnitude..magnitude)
    }

    /// Tiny random offset used to break exact coincidence
    pub fn tiny_jitter(&mut self) -> f32 {
        (self.rng.random::<f32>() - 0.5) * 1e-6
    }

    /// Add a body for an item, seeded near the center
    pub fn insert(&mut self, item: &Item, now: Millis) {
        if self.contains(item.id) {
            return;
        }
        let (pos, vel) = self.seed_kinematics();
        let growth = GrowthClock::of(item);
        self.bodies.push(Body {
            id: item.id,
            pos,
            vel,
            pin: None,
            radius: growth.radius(now),
            growth,
        });
    }

    /// Drop a body; returns whether it existed
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.id != id);
        self.bodies.len() != before
    }

    /// Re-seed any body whose kinematics went non-finite
    pub fn reseed_invalid(&mut self) -> usize {
        let mut reseeded = 0;
        for index in 0..self.bodies.len() {
            if self.bodies[index].is_valid() {
                continue;
            }
            let (pos, vel) = self.seed_kinematics();
            let body = &mut self.bodies[index];
            log::warn!("Re-seeding item {} with non-finite kinematics", body.id);
            body.pos = pos;
            body.vel = vel;
            if body.pin.is_some_and(|pin| !is_finite_vec(pin)) {
                body.pin = None;
            }
            reseeded += 1;
        }
        reseeded
    }

    /// Re-derive every radius from the growth clocks
    pub fn refresh_radii(&mut self, now: Millis) {
        for body in &mut self.bodies {
            body.radius = body.growth.radius(now);
        }
    }
}
