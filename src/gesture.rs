//! Pointer gesture arbitration
//!
//! Tells clicks from drags on items and keeps the simulation temperature in
//! step with the gesture:
//!
//! ```text
//! Idle --down--> Pressed --travel > threshold--> Dragging --up--> Idle
//!                   |
//!                   +--up, quick--> ClickResolved --suppress window--> Idle
//!                   +--up, slow---> Idle (no click)
//! ```
//!
//! Time is passed in by the caller so the machine is deterministic.

use glam::Vec2;

use crate::Millis;
use crate::item::ItemId;
use crate::sim::SimState;

/// Events reported to the owner of the arbiter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Quick press and release on an item
    Click(ItemId),
    /// Click on empty space
    Deselect,
    DragStart(ItemId),
    DragMove { id: ItemId, pos: Vec2 },
    DragEnd(ItemId),
}

/// Gesture state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    /// Pointer is down on an item, not yet a drag
    Pressed {
        id: ItemId,
        started: Millis,
        /// Accumulated |dx| + |dy| since the press
        travel: f32,
        last_pointer: Vec2,
        /// Item center minus pointer at press time
        grab_offset: Vec2,
    },
    Dragging {
        id: ItemId,
        grab_offset: Vec2,
    },
    /// A click was just emitted; background clicks are swallowed until `until`
    ClickResolved { id: ItemId, until: Millis },
}

/// Per-pointer gesture arbiter
#[derive(Debug, Clone)]
pub struct GestureArbiter {
    phase: GesturePhase,
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self {
            phase: GesturePhase::Idle,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Item currently pressed or dragged
    pub fn active_item(&self) -> Option<ItemId> {
        match self.phase {
            GesturePhase::Pressed { id, .. } | GesturePhase::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. })
    }

    /// Pointer pressed on an item
    ///
    /// Pins the item where it is and cools the simulation so nothing jumps.
    pub fn pointer_down(&mut self, sim: &mut SimState, id: ItemId, pointer: Vec2, now: Millis) {
        if self.active_item().is_some() {
            // A second press without a release: drop the stale gesture first
            self.cancel(sim);
        }
        let Some(body) = sim.body_mut(id) else {
            log::debug!("Pointer down on unknown item {id}");
            return;
        };

        body.pin = Some(body.pos);
        let grab_offset = body.pos - pointer;
        sim.temperature.hold(0.0);
        sim.temperature.reheat(sim.settings.press_alpha);

        self.phase = GesturePhase::Pressed {
            id,
            started: now,
            travel: 0.0,
            last_pointer: pointer,
            grab_offset,
        };
    }

    /// Pointer moved (anywhere)
    pub fn pointer_move(&mut self, sim: &mut SimState, pointer: Vec2) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        match self.phase {
            GesturePhase::Pressed {
                id,
                started,
                travel,
                last_pointer,
                grab_offset,
            } => {
                let step = (pointer - last_pointer).abs();
                let travel = travel + step.x + step.y;
                if travel > sim.settings.drag_threshold {
                    log::debug!("Drag started on item {id}");
                    sim.temperature.hold(sim.settings.drag_alpha_target);
                    events.push(GestureEvent::DragStart(id));
                    self.phase = GesturePhase::Dragging { id, grab_offset };
                    if let Some(pos) = Self::move_pin(sim, id, pointer + grab_offset) {
                        events.push(GestureEvent::DragMove { id, pos });
                    }
                } else {
                    self.phase = GesturePhase::Pressed {
                        id,
                        started,
                        travel,
                        last_pointer: pointer,
                        grab_offset,
                    };
                }
            }
            GesturePhase::Dragging { id, grab_offset } => {
                if let Some(pos) = Self::move_pin(sim, id, pointer + grab_offset) {
                    events.push(GestureEvent::DragMove { id, pos });
                }
            }
            GesturePhase::Idle | GesturePhase::ClickResolved { .. } => {}
        }
        events
    }

    /// Pointer released
    pub fn pointer_up(&mut self, sim: &mut SimState, now: Millis) -> Vec<GestureEvent> {
        match self.phase {
            GesturePhase::Dragging { id, .. } => {
                Self::unpin(sim, id);
                sim.temperature.hold(0.0);
                self.phase = GesturePhase::Idle;
                log::debug!("Drag ended on item {id}");
                vec![GestureEvent::DragEnd(id)]
            }
            GesturePhase::Pressed { id, started, .. } => {
                Self::unpin(sim, id);
                sim.temperature.hold(0.0);
                sim.temperature.reheat(sim.settings.release_alpha);

                if now - started < sim.settings.click_window_ms {
                    self.phase = GesturePhase::ClickResolved {
                        id,
                        until: now + sim.settings.click_suppress_ms,
                    };
                    vec![GestureEvent::Click(id)]
                } else {
                    // Long press without movement: not a click
                    self.phase = GesturePhase::Idle;
                    Vec::new()
                }
            }
            GesturePhase::Idle | GesturePhase::ClickResolved { .. } => Vec::new(),
        }
    }

    /// Click that landed on empty space
    pub fn background_click(&mut self, now: Millis) -> Option<GestureEvent> {
        match self.phase {
            GesturePhase::ClickResolved { until, .. } => {
                self.phase = GesturePhase::Idle;
                if now <= until {
                    None
                } else {
                    Some(GestureEvent::Deselect)
                }
            }
            GesturePhase::Pressed { .. } | GesturePhase::Dragging { .. } => None,
            GesturePhase::Idle => Some(GestureEvent::Deselect),
        }
    }

    /// Expire the click suppression window
    pub fn poll(&mut self, now: Millis) {
        if let GesturePhase::ClickResolved { until, .. } = self.phase {
            if now > until {
                self.phase = GesturePhase::Idle;
            }
        }
    }

    /// Abandon any gesture in progress without emitting events
    pub fn cancel(&mut self, sim: &mut SimState) {
        if let Some(id) = self.active_item() {
            Self::unpin(sim, id);
            sim.temperature.hold(0.0);
        }
        self.phase = GesturePhase::Idle;
    }

    /// Forget a gesture whose item has left the simulation
    ///
    /// A press or drag on a vanished item also releases its alpha hold.
    pub fn forget_missing(&mut self, sim: &mut SimState) {
        let gone = match self.phase {
            GesturePhase::Pressed { id, .. }
            | GesturePhase::Dragging { id, .. }
            | GesturePhase::ClickResolved { id, .. } => !sim.contains(id),
            GesturePhase::Idle => false,
        };
        if !gone {
            return;
        }
        if self.active_item().is_some() {
            sim.temperature.hold(0.0);
        }
        self.phase = GesturePhase::Idle;
    }

    /// Pull the active pin back inside the viewport after a resize
    pub fn reclamp_pin(&self, sim: &mut SimState) {
        let Some(id) = self.active_item() else {
            return;
        };
        if let Some(pin) = sim.body(id).and_then(|body| body.pin) {
            Self::move_pin(sim, id, pin);
        }
    }

    fn move_pin(sim: &mut SimState, id: ItemId, target: Vec2) -> Option<Vec2> {
        let viewport = sim.viewport;
        let padding = sim.settings.boundary_padding;
        let body = sim.body_mut(id)?;
        let pos = viewport.clamp_inside(target, body.radius, padding);
        body.pin = Some(pos);
        Some(pos)
    }

    fn unpin(sim: &mut SimState, id: ItemId) {
        if let Some(body) = sim.body_mut(id) {
            body.pin = None;
        }
    }
}
