//! Crescent indicator that turns toward an item's direction of travel

use glam::Vec2;

use crate::settings::Settings;
use crate::wrap_angle;

/// Per-item crescent orientation, tracked across ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crescent {
    /// Current angle (radians)
    pub angle: f32,
    prev_pos: Vec2,
}

impl Crescent {
    pub fn new(pos: Vec2, settings: &Settings) -> Self {
        Self {
            angle: settings.crescent_initial_angle_deg.to_radians(),
            prev_pos: pos,
        }
    }

    /// Ease toward the direction moved since the last call
    pub fn follow(&mut self, pos: Vec2, settings: &Settings) {
        let delta = pos - self.prev_pos;
        let distance = delta.length();

        if distance > settings.crescent_min_distance {
            let target = delta.y.atan2(delta.x);
            let speed =
                (distance * settings.crescent_speed_factor).min(settings.crescent_max_speed);
            self.angle = wrap_angle(self.angle + wrap_angle(target - self.angle) * speed);
        }

        self.prev_pos = pos;
    }

    /// Crescent center relative to the item center
    pub fn offset(&self, radius: f32, settings: &Settings) -> Vec2 {
        Vec2::from_angle(self.angle) * radius * settings.crescent_offset
    }
}
