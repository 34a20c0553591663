//! Balls in the Air - a visual task reminder
//!
//! Every task is a circle that grows while it is neglected and shrinks back
//! when it is bumped. A small force simulation keeps the circles apart.
//!
//! Core modules:
//! - `appearance`: Pure radius, text-fit, color and crescent models
//! - `sim`: Force simulation (bodies, forces, collisions, tick)
//! - `gesture`: Click/drag arbitration for pointer input
//! - `controller`: Simulation lifecycle (start, reconcile, resize, stop)
//! - `board`: The authoritative task list and its edit operations
//! - `persistence`: Item storage (LocalStorage on web)
//! - `settings`: Tunable constants

pub mod appearance;
pub mod board;
pub mod controller;
pub mod gesture;
pub mod item;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use board::Board;
pub use controller::{Frame, FrameItem, Simulation};
pub use item::{Item, ItemError, ItemId, ItemUpdate};
pub use settings::Settings;

use glam::Vec2;

/// Timestamps are Unix milliseconds, matching `Date.now()` on the web
pub type Millis = f64;

/// Domain constants
pub mod consts {
    /// Milliseconds in one day (growth rates are pixels per day)
    pub const MS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

    /// Radius of a freshly bumped item
    pub const MIN_RADIUS: f32 = 20.0;
    /// Radius an item stops growing at
    pub const MAX_RADIUS: f32 = 150.0;

    /// Hue used when an item has none (blue)
    pub const DEFAULT_HUE: f32 = 210.0;
    /// Growth rate of a newly created item (pixels per day)
    pub const DEFAULT_GROWTH_RATE: f32 = 2.0;
    /// Name of a newly created item
    pub const DEFAULT_NAME: &str = "New Task";

    /// Bounds for the user's text scale multiplier
    pub const MIN_TEXT_SCALE: f32 = 0.5;
    pub const MAX_TEXT_SCALE: f32 = 2.0;
}

/// Wrap an angle difference to [-π, π]
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// True when both components are finite
#[inline]
pub fn is_finite_vec(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
