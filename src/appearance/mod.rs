//! Pure visual models
//!
//! Everything the presentation layer needs to paint an item, derived from
//! the item's fields and the current time. No state, no side effects.

pub mod color;
pub mod crescent;
pub mod radius;
pub mod text;

pub use color::{BallColors, Hsl, ball_colors};
pub use crescent::Crescent;
pub use radius::{radius, radius_at};
pub use text::{LINE_HEIGHT_EM, font_size, split_lines};
