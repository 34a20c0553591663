//! Simulation lifecycle
//!
//! `Simulation` owns the force simulation, the gesture arbiter and a snapshot
//! of the items being shown. It reconciles item-set changes without
//! resetting positions, follows viewport resizes, and hands a render-ready
//! `Frame` to a callback after every tick or refresh.

use std::collections::HashMap;

use glam::Vec2;

use crate::Millis;
use crate::appearance::text::first_line_offset_em;
use crate::appearance::{BallColors, Crescent, LINE_HEIGHT_EM, ball_colors, font_size, split_lines};
use crate::gesture::{GestureArbiter, GestureEvent};
use crate::item::{Item, ItemId};
use crate::settings::Settings;
use crate::sim::{GrowthClock, SimState, TickInput, Viewport, tick};

/// Everything the presentation layer needs for one item
#[derive(Debug, Clone, PartialEq)]
pub struct FrameItem {
    pub id: ItemId,
    pub pos: Vec2,
    pub radius: f32,
    pub colors: BallColors,
    pub font_size: f32,
    pub lines: Vec<String>,
    /// Offset of the first line from the center (em)
    pub first_line_em: f32,
    pub line_height_em: f32,
    pub selected: bool,
    pub crescent_angle: f32,
    /// Crescent center relative to the item center
    pub crescent_offset: Vec2,
}

/// One rendered frame, in draw order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub items: Vec<FrameItem>,
    pub alpha: f32,
    pub running: bool,
}

/// Receives a frame after every tick or refresh
pub type FrameCallback = Box<dyn FnMut(&Frame)>;

/// Fraction of the interval a refresh may fire early
const EARLY_TOLERANCE: Millis = 0.1;

/// Fixed-interval clock for the time-driven radius refresh
#[derive(Debug, Clone, Copy)]
pub struct RefreshClock {
    interval: Millis,
    next_due: Option<Millis>,
}

impl RefreshClock {
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// True once per interval; the first call is always due
    ///
    /// Due times advance from the previous due time, so a timer firing a
    /// little early still lands in its own period. After a long gap the
    /// schedule restarts from `now` instead of catching up.
    pub fn due(&mut self, now: Millis) -> bool {
        let next = match self.next_due {
            Some(next) if now + self.interval * EARLY_TOLERANCE < next => return false,
            Some(next) if now - next < self.interval => next + self.interval,
            _ => now + self.interval,
        };
        self.next_due = Some(next);
        true
    }
}

/// Running simulation handle
pub struct Simulation {
    sim: SimState,
    arbiter: GestureArbiter,
    items: Vec<Item>,
    crescents: HashMap<ItemId, Crescent>,
    selection: Option<ItemId>,
    refresh: RefreshClock,
    on_frame: Option<FrameCallback>,
    stopped: bool,
}

impl Simulation {
    /// Seed every item near the center and start hot
    pub fn start(
        items: &[Item],
        viewport: Viewport,
        settings: Settings,
        seed: u64,
        now: Millis,
        on_frame: FrameCallback,
    ) -> Self {
        let refresh = RefreshClock::new(settings.refresh_interval_ms);
        let mut sim = SimState::new(viewport, settings, seed);
        for item in items {
            sim.insert(item, now);
        }
        sim.temperature.reheat(sim.settings.reheat_alpha);

        let mut simulation = Self {
            sim,
            arbiter: GestureArbiter::new(),
            items: items.to_vec(),
            crescents: HashMap::new(),
            selection: None,
            refresh,
            on_frame: Some(on_frame),
            stopped: false,
        };
        simulation.sync_crescents();

        log::info!(
            "Simulation started with {} items in {}x{}",
            items.len(),
            viewport.width,
            viewport.height
        );
        simulation
    }

    /// Reconcile a new item list
    ///
    /// Items present before and after keep their kinematics untouched; new
    /// items are seeded, missing ones dropped. The simulation is reheated so
    /// the new set converges from where it is.
    pub fn update_items(&mut self, items: &[Item], selection: Option<ItemId>, now: Millis) {
        if self.stopped {
            return;
        }

        let before = self.sim.bodies.len();
        self.sim
            .bodies
            .retain(|body| items.iter().any(|item| item.id == body.id));
        let removed = before - self.sim.bodies.len();

        let mut added = 0;
        for item in items {
            match self.sim.body_mut(item.id) {
                Some(body) => {
                    body.growth = GrowthClock::of(item);
                    body.radius = body.growth.radius(now);
                }
                None => {
                    self.sim.insert(item, now);
                    added += 1;
                }
            }
        }

        self.items = items.to_vec();
        self.selection = selection.filter(|id| self.sim.contains(*id));
        self.arbiter.forget_missing(&mut self.sim);
        self.sync_crescents();
        self.sim.temperature.reheat(self.sim.settings.reheat_alpha);

        log::debug!(
            "Reconciled items: {added} added, {removed} removed, {} total",
            self.items.len()
        );
    }

    /// Rendering hint only; no kinematic effect
    pub fn update_selection(&mut self, selection: Option<ItemId>) {
        self.selection = selection;
    }

    /// Follow a new viewport size; returns whether it changed
    ///
    /// Positions are kept. Anything now outside is pulled back in by
    /// containment on the next tick.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let viewport = Viewport::new(width, height);
        if self.stopped || viewport == self.sim.viewport {
            return false;
        }
        log::info!(
            "Viewport resized from {}x{} to {}x{}",
            self.sim.viewport.width,
            self.sim.viewport.height,
            viewport.width,
            viewport.height
        );
        self.sim.viewport = viewport;
        self.arbiter.reclamp_pin(&mut self.sim);
        self.sim.temperature.reheat(self.sim.settings.reheat_alpha);
        true
    }

    /// Halt and release everything; safe to call repeatedly or mid-drag
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.arbiter.cancel(&mut self.sim);
        self.sim.bodies.clear();
        self.crescents.clear();
        self.items.clear();
        self.on_frame = None;
        self.stopped = true;
        log::info!("Simulation stopped");
    }

    /// Advance one step and emit a frame; returns whether still running
    pub fn tick(&mut self, now: Millis) -> bool {
        if self.stopped {
            return false;
        }
        self.arbiter.poll(now);
        let running = tick(&mut self.sim, &TickInput::at(now));

        let settings = &self.sim.settings;
        for body in &self.sim.bodies {
            if let Some(crescent) = self.crescents.get_mut(&body.id) {
                crescent.follow(body.pos, settings);
            }
        }

        self.emit(now);
        running
    }

    /// Periodic radius refresh, independent of the physics rate
    ///
    /// Re-derives radii and emits a frame when the refresh interval has
    /// elapsed. Returns whether a frame was emitted.
    pub fn refresh(&mut self, now: Millis) -> bool {
        if self.stopped || !self.refresh.due(now) {
            return false;
        }
        self.sim.refresh_radii(now);
        self.emit(now);
        true
    }

    /// Build the frame for `now` without advancing the simulation
    pub fn frame(&self, now: Millis) -> Frame {
        let settings = &self.sim.settings;
        let items = self
            .sim
            .bodies
            .iter()
            .filter(|body| body.is_valid())
            .filter_map(|body| {
                let item = self.items.iter().find(|item| item.id == body.id)?;
                let radius = body.growth.radius(now);
                let selected = self.selection == Some(body.id);
                let lines: Vec<String> = split_lines(&item.name)
                    .into_iter()
                    .map(String::from)
                    .collect();
                let crescent = self
                    .crescents
                    .get(&body.id)
                    .copied()
                    .unwrap_or_else(|| Crescent::new(body.pos, settings));

                Some(FrameItem {
                    id: body.id,
                    pos: body.pos,
                    radius,
                    colors: ball_colors(item.hue_or_default(), selected),
                    font_size: font_size(&item.name, radius, item.text_scale),
                    first_line_em: first_line_offset_em(lines.len()),
                    line_height_em: LINE_HEIGHT_EM,
                    lines,
                    selected,
                    crescent_angle: crescent.angle,
                    crescent_offset: crescent.offset(radius, settings),
                })
            })
            .collect();

        Frame {
            items,
            alpha: self.sim.temperature.alpha,
            running: self.sim.temperature.is_running(),
        }
    }

    /// Topmost item under the pointer
    pub fn hit_test(&self, pointer: Vec2) -> Option<ItemId> {
        self.sim
            .bodies
            .iter()
            .rev()
            .find(|body| body.pos.distance(pointer) <= body.radius)
            .map(|body| body.id)
    }

    pub fn pointer_down(&mut self, id: ItemId, pointer: Vec2, now: Millis) {
        if self.stopped {
            return;
        }
        self.arbiter.pointer_down(&mut self.sim, id, pointer, now);
    }

    pub fn pointer_move(&mut self, pointer: Vec2) -> Vec<GestureEvent> {
        if self.stopped {
            return Vec::new();
        }
        self.arbiter.pointer_move(&mut self.sim, pointer)
    }

    pub fn pointer_up(&mut self, now: Millis) -> Vec<GestureEvent> {
        if self.stopped {
            return Vec::new();
        }
        self.arbiter.pointer_up(&mut self.sim, now)
    }

    pub fn background_click(&mut self, now: Millis) -> Option<GestureEvent> {
        if self.stopped {
            return None;
        }
        self.arbiter.background_click(now)
    }

    pub fn state(&self) -> &SimState {
        &self.sim
    }

    pub fn arbiter(&self) -> &GestureArbiter {
        &self.arbiter
    }

    pub fn selection(&self) -> Option<ItemId> {
        self.selection
    }

    pub fn viewport(&self) -> Viewport {
        self.sim.viewport
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_running(&self) -> bool {
        !self.stopped && self.sim.temperature.is_running()
    }

    fn emit(&mut self, now: Millis) {
        let frame = self.frame(now);
        if let Some(on_frame) = self.on_frame.as_mut() {
            on_frame(&frame);
        }
    }

    /// Crescent state follows body membership
    fn sync_crescents(&mut self) {
        let settings = &self.sim.settings;
        self.crescents
            .retain(|id, _| self.sim.bodies.iter().any(|body| body.id == *id));
        for body in &self.sim.bodies {
            self.crescents
                .entry(body.id)
                .or_insert_with(|| Crescent::new(body.pos, settings));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MIN_RADIUS, MS_PER_DAY};
    use std::cell::RefCell;
    use std::rc::Rc;

    const NOW: Millis = 1_700_000_000_000.0;

    fn items(ids: &[u64]) -> Vec<Item> {
        ids.iter()
            .map(|&id| {
                Item::new(ItemId(id), NOW - id as f64 * MS_PER_DAY).with_name(format!("Task {id}"))
            })
            .collect()
    }

    fn start(items: &[Item]) -> (Simulation, Rc<RefCell<Vec<Frame>>>) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = frames.clone();
        let simulation = Simulation::start(
            items,
            Viewport::new(800.0, 600.0),
            Settings::default(),
            1234,
            NOW,
            Box::new(move |frame: &Frame| sink.borrow_mut().push(frame.clone())),
        );
        (simulation, frames)
    }

    #[test]
    fn test_tick_emits_frames() {
        let (mut simulation, frames) = start(&items(&[1, 2, 3]));
        simulation.tick(NOW);
        simulation.tick(NOW);
        let frames = frames.borrow();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].items.len(), 3);
        assert_eq!(frames[1].items[0].lines, vec!["Task 1".to_string()]);
    }

    #[test]
    fn test_update_items_keeps_existing_kinematics() {
        let (mut simulation, _) = start(&items(&[1, 2, 3]));
        for _ in 0..30 {
            simulation.tick(NOW);
        }
        let kept: Vec<_> = simulation
            .state()
            .bodies
            .iter()
            .filter(|b| b.id != ItemId(2))
            .map(|b| (b.id, b.pos, b.vel))
            .collect();

        simulation.update_items(&items(&[1, 3, 4]), None, NOW);

        for (id, pos, vel) in kept {
            let body = simulation.state().body(id).unwrap();
            assert_eq!(body.pos, pos);
            assert_eq!(body.vel, vel);
        }
        assert!(!simulation.state().contains(ItemId(2)));
        assert!(simulation.state().contains(ItemId(4)));
        assert_eq!(simulation.state().temperature.alpha, 1.0);
    }

    #[test]
    fn test_bump_shrinks_without_moving() {
        let mut list = items(&[1, 20]);
        let (mut simulation, _) = start(&list);
        simulation.tick(NOW);
        let pos = simulation.state().body(ItemId(20)).unwrap().pos;

        list[1].bump(NOW);
        simulation.update_items(&list, Some(ItemId(20)), NOW);

        let body = simulation.state().body(ItemId(20)).unwrap();
        assert_eq!(body.pos, pos);
        assert_eq!(body.radius, MIN_RADIUS);
        let frame = simulation.frame(NOW);
        assert!(frame.items.iter().any(|item| item.id == ItemId(20) && item.selected));
    }

    #[test]
    fn test_delete_last_item_leaves_noop_ticks() {
        let (mut simulation, frames) = start(&items(&[1]));
        simulation.tick(NOW);
        simulation.update_items(&[], None, NOW);
        assert!(simulation.state().bodies.is_empty());
        assert!(!simulation.tick(NOW));
        assert!(frames.borrow().last().unwrap().items.is_empty());
    }

    #[test]
    fn test_resize_clamps_within_one_tick() {
        let (mut simulation, _) = start(&items(&[1, 2, 3, 4]));
        for _ in 0..100 {
            simulation.tick(NOW);
        }
        assert!(simulation.resize(400.0, 300.0));
        assert!(!simulation.resize(400.0, 300.0));
        simulation.tick(NOW);

        let state = simulation.state();
        for body in &state.bodies {
            let (min, max) = state
                .viewport
                .inner_bounds(body.radius, state.settings.boundary_padding);
            assert!(body.pos.cmpge(min).all() && body.pos.cmple(max).all());
        }
    }

    #[test]
    fn test_selection_is_render_only() {
        let (mut simulation, _) = start(&items(&[1, 2]));
        simulation.tick(NOW);
        let before = simulation.state().bodies.clone();
        simulation.update_selection(Some(ItemId(1)));
        assert_eq!(simulation.state().bodies, before);
        let frame = simulation.frame(NOW);
        assert!(frame.items[0].selected);
        assert!(!frame.items[1].selected);
    }

    #[test]
    fn test_stop_is_idempotent_and_safe_mid_drag() {
        let (mut simulation, frames) = start(&items(&[1]));
        simulation.tick(NOW);
        let pos = simulation.state().bodies[0].pos;
        simulation.pointer_down(ItemId(1), pos, NOW);
        simulation.pointer_move(pos + Vec2::new(40.0, 0.0));

        simulation.stop();
        simulation.stop();
        assert!(simulation.is_stopped());
        assert!(simulation.pointer_move(pos).is_empty());
        assert!(simulation.pointer_up(NOW + 50.0).is_empty());
        assert!(!simulation.tick(NOW));

        let count = frames.borrow().len();
        simulation.refresh(NOW + 1_000.0);
        assert_eq!(frames.borrow().len(), count);
    }

    #[test]
    fn test_refresh_runs_on_interval() {
        let (mut simulation, frames) = start(&items(&[1]));
        assert!(simulation.refresh(NOW));
        assert!(!simulation.refresh(NOW + 100.0));
        assert!(simulation.refresh(NOW + 300.0));
        assert_eq!(frames.borrow().len(), 2);
    }

    #[test]
    fn test_refresh_tolerates_early_timer() {
        let mut clock = RefreshClock::new(300.0);
        assert!(clock.due(0.0));
        assert!(clock.due(299.0));
        assert!(!clock.due(400.0));
        assert!(clock.due(598.0));
        // Long gap: no burst of catch-up refreshes
        assert!(clock.due(5_000.0));
        assert!(!clock.due(5_100.0));
        assert!(clock.due(5_300.0));
    }

    #[test]
    fn test_refresh_grows_radius_with_time() {
        let (mut simulation, _) = start(&items(&[1]));
        let early = simulation.frame(NOW).items[0].radius;
        let later = simulation.frame(NOW + 5.0 * MS_PER_DAY).items[0].radius;
        assert!(later > early);
    }

    #[test]
    fn test_hit_test_and_click_through_controller() {
        let (mut simulation, _) = start(&items(&[1]));
        simulation.tick(NOW);
        let pos = simulation.state().bodies[0].pos;
        assert_eq!(simulation.hit_test(pos), Some(ItemId(1)));
        assert_eq!(simulation.hit_test(pos + Vec2::splat(500.0)), None);

        simulation.pointer_down(ItemId(1), pos, NOW);
        let events = simulation.pointer_up(NOW + 80.0);
        assert_eq!(events, vec![GestureEvent::Click(ItemId(1))]);
        assert_eq!(simulation.background_click(NOW + 82.0), None);
    }

    #[test]
    fn test_removed_item_abandons_drag() {
        let (mut simulation, _) = start(&items(&[1, 2]));
        simulation.tick(NOW);
        let pos = simulation.state().body(ItemId(1)).unwrap().pos;
        simulation.pointer_down(ItemId(1), pos, NOW);
        simulation.pointer_move(pos + Vec2::new(40.0, 0.0));
        assert!(simulation.arbiter().is_dragging());

        simulation.update_items(&items(&[2]), None, NOW);
        assert!(simulation.arbiter().active_item().is_none());
        assert!(simulation.pointer_up(NOW + 10.0).is_empty());
        assert_eq!(simulation.state().temperature.target, 0.0);

        let mut ticks = 0;
        while simulation.tick(NOW) && ticks < 2_000 {
            ticks += 1;
        }
        assert!(!simulation.is_running());
    }

    #[test]
    fn test_resize_reclamps_active_pin() {
        let (mut simulation, _) = start(&items(&[1]));
        simulation.tick(NOW);
        let pos = simulation.state().bodies[0].pos;
        simulation.pointer_down(ItemId(1), pos, NOW);
        simulation.pointer_move(Vec2::new(750.0, 550.0));

        assert!(simulation.resize(400.0, 300.0));
        let state = simulation.state();
        let body = &state.bodies[0];
        let (min, max) = state
            .viewport
            .inner_bounds(body.radius, state.settings.boundary_padding);
        let pin = body.pin.unwrap();
        assert!(pin.cmpge(min).all() && pin.cmple(max).all());

        simulation.tick(NOW);
        let body = &simulation.state().bodies[0];
        assert_eq!(Some(body.pos), body.pin);
    }
}
