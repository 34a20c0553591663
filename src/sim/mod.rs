//! Force simulation module
//!
//! Positions items as non-overlapping circles inside the viewport:
//! - Temperature (alpha) decays toward a target each tick
//! - Forces add into velocity in a fixed order
//! - Boundary containment runs last so it always wins
//! - Seeded RNG only, stable iteration order (by insertion)
//! - No rendering or platform dependencies

pub mod collision;
pub mod forces;
pub mod state;
pub mod tick;

pub use collision::{collide, contain};
pub use forces::{apply_center, apply_charge};
pub use state::{Body, GrowthClock, SimState, Temperature, Viewport};
pub use tick::{TickInput, tick};
