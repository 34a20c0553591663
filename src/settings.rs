//! Tuning constants and preferences
//!
//! Persisted separately from the task list in LocalStorage. Every number the
//! simulation, gesture arbiter and refresh clock use comes from here.

use serde::{Deserialize, Serialize};

/// Simulation and interaction tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Forces ===
    /// Extra radius used only by the collision test
    pub collision_padding: f32,
    /// Pull toward the viewport center, per axis
    pub center_strength: f32,
    /// Pairwise charge (negative repels)
    pub charge_strength: f32,
    /// Gap kept between circles and the viewport edge
    pub boundary_padding: f32,
    /// Velocity kept after bouncing off an edge
    pub bounce_damping: f32,
    /// Velocity kept after each tick
    pub velocity_retention: f32,

    // === Temperature ===
    /// Fraction of the distance to the alpha target covered per tick
    pub alpha_decay: f32,
    /// Below this alpha the simulation counts as settled
    pub alpha_min: f32,
    /// Alpha after the item set or viewport changes
    pub reheat_alpha: f32,

    // === Seeding ===
    /// Max position offset from the center for new items
    pub seed_position_jitter: f32,
    /// Max initial velocity for new items
    pub seed_velocity_jitter: f32,

    // === Gestures ===
    /// Accumulated pointer travel that turns a press into a drag
    pub drag_threshold: f32,
    /// Presses shorter than this resolve to a click
    pub click_window_ms: f64,
    /// Background clicks this soon after an item click are swallowed
    pub click_suppress_ms: f64,
    /// Alpha while an item is pressed but not yet dragged
    pub press_alpha: f32,
    /// Alpha target held during a drag
    pub drag_alpha_target: f32,
    /// Alpha nudge after a press is released
    pub release_alpha: f32,

    // === Crescent ===
    /// Starting crescent angle in degrees
    pub crescent_initial_angle_deg: f32,
    /// Movement per tick below which the crescent stays put
    pub crescent_min_distance: f32,
    /// Turn fraction per pixel moved
    pub crescent_speed_factor: f32,
    /// Max turn fraction per tick
    pub crescent_max_speed: f32,
    /// Crescent offset as a fraction of the radius
    pub crescent_offset: f32,

    // === Refresh ===
    /// Interval of the time-driven radius refresh
    pub refresh_interval_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collision_padding: 2.0,
            center_strength: 0.05,
            charge_strength: -30.0,
            boundary_padding: 10.0,
            bounce_damping: 0.5,
            velocity_retention: 0.8,

            alpha_decay: 0.0228,
            alpha_min: 0.001,
            reheat_alpha: 1.0,

            seed_position_jitter: 50.0,
            seed_velocity_jitter: 1.0,

            drag_threshold: 5.0,
            click_window_ms: 300.0,
            click_suppress_ms: 10.0,
            press_alpha: 0.05,
            drag_alpha_target: 0.3,
            release_alpha: 0.3,

            crescent_initial_angle_deg: -45.0,
            crescent_min_distance: 0.1,
            crescent_speed_factor: 0.05,
            crescent_max_speed: 0.3,
            crescent_offset: 0.35,

            refresh_interval_ms: 300.0,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "balls_in_the_air_settings";

    /// Clamp values that would make the simulation diverge or stall
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| {
            if value.is_finite() {
                value
            } else {
                fallback
            }
        };

        self.collision_padding =
            finite_or(self.collision_padding, defaults.collision_padding).max(0.0);
        self.center_strength =
            finite_or(self.center_strength, defaults.center_strength).clamp(0.0, 1.0);
        self.charge_strength = finite_or(self.charge_strength, defaults.charge_strength);
        self.boundary_padding =
            finite_or(self.boundary_padding, defaults.boundary_padding).max(0.0);
        self.bounce_damping =
            finite_or(self.bounce_damping, defaults.bounce_damping).clamp(0.0, 1.0);
        self.velocity_retention =
            finite_or(self.velocity_retention, defaults.velocity_retention).clamp(0.0, 1.0);
        self.alpha_decay = finite_or(self.alpha_decay, defaults.alpha_decay).clamp(0.0001, 1.0);
        self.alpha_min = finite_or(self.alpha_min, defaults.alpha_min).clamp(0.0, 1.0);
        self.reheat_alpha = finite_or(self.reheat_alpha, defaults.reheat_alpha).clamp(0.0, 1.0);
        self.press_alpha = finite_or(self.press_alpha, defaults.press_alpha).clamp(0.0, 1.0);
        self.drag_alpha_target =
            finite_or(self.drag_alpha_target, defaults.drag_alpha_target).clamp(0.0, 1.0);
        self.release_alpha = finite_or(self.release_alpha, defaults.release_alpha).clamp(0.0, 1.0);
        self.drag_threshold = finite_or(self.drag_threshold, defaults.drag_threshold).max(0.0);
        if !self.click_window_ms.is_finite() || self.click_window_ms < 0.0 {
            self.click_window_ms = defaults.click_window_ms;
        }
        if !self.click_suppress_ms.is_finite() || self.click_suppress_ms < 0.0 {
            self.click_suppress_ms = defaults.click_suppress_ms;
        }
        if !self.refresh_interval_ms.is_finite() || self.refresh_interval_ms < 16.0 {
            self.refresh_interval_ms = defaults.refresh_interval_ms;
        }
        self
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {err}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
