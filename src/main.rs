//! Balls in the Air entry point
//!
//! Web: renders the simulation into an SVG, wires pointer input and the
//! property editor, and runs the animation-frame loop plus the periodic
//! radius refresh. Native: runs the simulation headless and logs the layout.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, PointerEvent};

    use balls_in_the_air::gesture::GestureEvent;
    use balls_in_the_air::persistence::LocalStorageStore;
    use balls_in_the_air::sim::Viewport;
    use balls_in_the_air::{Board, Frame, FrameItem, ItemId, ItemUpdate, Settings, Simulation};

    const SVG_NS: &str = "http://www.w3.org/2000/svg";

    fn now() -> f64 {
        js_sys::Date::now()
    }

    /// SVG nodes for one item
    struct ItemNodes {
        group: Element,
        circle: Element,
        crescent: Element,
        text: Element,
        lines: Vec<String>,
    }

    /// Presentation: paints frames, owns no simulation state
    struct SvgView {
        document: Document,
        svg: Element,
        nodes: RefCell<HashMap<ItemId, ItemNodes>>,
    }

    impl SvgView {
        fn new(document: Document, container: &Element) -> Result<Self, JsValue> {
            let svg = document.create_element_ns(Some(SVG_NS), "svg")?;
            svg.set_attribute("style", "width: 100%; height: 100%; font: 14px sans-serif;")?;
            container.append_child(&svg)?;
            Ok(Self {
                document,
                svg,
                nodes: RefCell::new(HashMap::new()),
            })
        }

        fn set_size(&self, width: f32, height: f32) {
            let _ = self.svg.set_attribute("viewBox", &format!("0 0 {width} {height}"));
        }

        fn create_nodes(&self, id: ItemId) -> Result<ItemNodes, JsValue> {
            let group = self.document.create_element_ns(Some(SVG_NS), "g")?;
            group.set_attribute("data-id", &id.to_string())?;
            group.set_attribute("style", "cursor: pointer;")?;
            let circle = self.document.create_element_ns(Some(SVG_NS), "circle")?;
            circle.set_attribute("stroke-width", "2")?;
            let crescent = self.document.create_element_ns(Some(SVG_NS), "circle")?;
            crescent.set_attribute("fill", "white")?;
            crescent.set_attribute("opacity", "0.25")?;
            crescent.set_attribute("style", "pointer-events: none;")?;
            let text = self.document.create_element_ns(Some(SVG_NS), "text")?;
            text.set_attribute("text-anchor", "middle")?;
            text.set_attribute("dominant-baseline", "central")?;
            text.set_attribute("font-weight", "600")?;
            text.set_attribute("style", "pointer-events: none; user-select: none;")?;
            group.append_child(&circle)?;
            group.append_child(&crescent)?;
            group.append_child(&text)?;
            self.svg.append_child(&group)?;
            Ok(ItemNodes {
                group,
                circle,
                crescent,
                text,
                lines: Vec::new(),
            })
        }

        fn paint_item(&self, nodes: &mut ItemNodes, item: &FrameItem) -> Result<(), JsValue> {
            nodes.group.set_attribute(
                "transform",
                &format!("translate({},{})", item.pos.x, item.pos.y),
            )?;
            nodes.circle.set_attribute("r", &item.radius.to_string())?;
            nodes.circle.set_attribute("fill", &item.colors.fill.to_string())?;
            nodes.circle.set_attribute("stroke", &item.colors.stroke.to_string())?;
            nodes.crescent.set_attribute("cx", &item.crescent_offset.x.to_string())?;
            nodes.crescent.set_attribute("cy", &item.crescent_offset.y.to_string())?;
            nodes.crescent.set_attribute("r", &(item.radius * 0.5).to_string())?;
            nodes.text.set_attribute("fill", &item.colors.text.to_string())?;
            nodes.text.set_attribute("font-size", &format!("{}px", item.font_size))?;

            if nodes.lines != item.lines {
                nodes.text.set_text_content(None);
                for (i, line) in item.lines.iter().enumerate() {
                    let tspan = self.document.create_element_ns(Some(SVG_NS), "tspan")?;
                    tspan.set_attribute("x", "0")?;
                    let y = item.first_line_em + i as f32 * item.line_height_em;
                    tspan.set_attribute("y", &format!("{y}em"))?;
                    tspan.set_text_content(Some(line));
                    nodes.text.append_child(&tspan)?;
                }
                nodes.lines = item.lines.clone();
            }
            Ok(())
        }

        fn render(&self, frame: &Frame) {
            let mut nodes = self.nodes.borrow_mut();
            nodes.retain(|id, item_nodes| {
                let keep = frame.items.iter().any(|item| item.id == *id);
                if !keep {
                    item_nodes.group.remove();
                }
                keep
            });

            for item in &frame.items {
                if !nodes.contains_key(&item.id) {
                    match self.create_nodes(item.id) {
                        Ok(created) => {
                            nodes.insert(item.id, created);
                        }
                        Err(err) => {
                            log::error!("Failed to create nodes for item {}: {err:?}", item.id);
                            continue;
                        }
                    }
                }
                if let Some(item_nodes) = nodes.get_mut(&item.id) {
                    if let Err(err) = self.paint_item(item_nodes, item) {
                        log::warn!("Failed to paint item {}: {err:?}", item.id);
                    }
                }
            }
        }

        /// Pointer position in simulation coordinates
        fn local_point(&self, event: &PointerEvent) -> Vec2 {
            let rect = self.svg.get_bounding_client_rect();
            Vec2::new(
                event.client_x() as f32 - rect.left() as f32,
                event.client_y() as f32 - rect.top() as f32,
            )
        }
    }

    /// Application state: board, simulation and view
    struct App {
        board: Board<LocalStorageStore>,
        sim: Simulation,
        view: Rc<SvgView>,
        container: Element,
    }

    impl App {
        /// Push the board's list into the simulation and refresh the editor
        fn sync(&mut self) {
            self.sim.update_items(self.board.items(), self.board.selected(), now());
            self.sync_selection();
        }

        fn sync_selection(&mut self) {
            self.sim.update_selection(self.board.selected());
            update_editor(&self.view.document, &self.board);
        }

        fn handle_gesture(&mut self, event: GestureEvent) {
            match event {
                GestureEvent::Click(id) => {
                    self.board.click(Some(id));
                    self.sync_selection();
                }
                GestureEvent::Deselect => {
                    self.board.click(None);
                    self.sync_selection();
                }
                GestureEvent::DragStart(id) => log::debug!("Dragging item {id}"),
                GestureEvent::DragEnd(id) => log::debug!("Dropped item {id}"),
                GestureEvent::DragMove { .. } => {}
            }
        }

        fn apply_edit(&mut self, update: Result<ItemUpdate, balls_in_the_air::ItemError>) {
            match update.and_then(|update| self.board.apply_update(&update)) {
                Ok(_) => self.sync(),
                Err(err) => log::warn!("Edit rejected: {err}"),
            }
        }

        fn measure(&mut self) {
            let width = self.container.client_width() as f32;
            let height = self.container.client_height() as f32;
            if width > 0.0 && height > 0.0 && self.sim.resize(width, height) {
                self.view.set_size(width, height);
            }
        }
    }

    fn input_value(document: &Document, id: &str) -> Option<String> {
        let el = document.get_element_by_id(id)?;
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        el.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
    }

    fn set_input_value(document: &Document, id: &str, value: &str) {
        let Some(el) = document.get_element_by_id(id) else {
            return;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    /// Show the property editor for the selected item, hide it otherwise
    fn update_editor(document: &Document, board: &Board<LocalStorageStore>) {
        let Some(panel) = document.get_element_by_id("editor") else {
            return;
        };
        match board.selected_item() {
            Some(item) => {
                let _ = panel.set_attribute("class", "");
                set_input_value(document, "name-input", &item.name);
                set_input_value(document, "growth-input", &item.growth_rate.to_string());
                set_input_value(document, "hue-input", &item.hue_or_default().to_string());
                set_input_value(
                    document,
                    "text-scale-input",
                    &item.text_scale.unwrap_or(1.0).to_string(),
                );
                if board.is_newly_created() {
                    if let Some(name) = document
                        .get_element_by_id("name-input")
                        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
                    {
                        let _ = name.focus();
                    }
                }
            }
            None => {
                let _ = panel.set_attribute("class", "hidden");
            }
        }
    }

    fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, action: fn(&mut App)) {
        let Some(button) = document.get_element_by_id(id) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&mut app.borrow_mut());
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn item_id_of(event: &web_sys::Event) -> Option<ItemId> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        let group = target.closest("g[data-id]").ok()??;
        group.get_attribute("data-id")?.parse().ok().map(ItemId)
    }

    fn setup_pointer_handlers(app: Rc<RefCell<App>>) {
        let svg = app.borrow().view.svg.clone();
        let window = web_sys::window().expect("no window");

        // Pointer down on an item
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let Some(id) = item_id_of(&event) else {
                    return;
                };
                event.prevent_default();
                let mut app = app.borrow_mut();
                let pointer = app.view.local_point(&event);
                app.sim.pointer_down(id, pointer, now());
            });
            let _ = svg
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move (window, so drags survive leaving the svg)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut app = app.borrow_mut();
                let pointer = app.view.local_point(&event);
                for gesture in app.sim.pointer_move(pointer) {
                    app.handle_gesture(gesture);
                }
            });
            let _ = window
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let mut app = app.borrow_mut();
                for gesture in app.sim.pointer_up(now()) {
                    app.handle_gesture(gesture);
                }
            });
            let _ = window
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Background click; item clicks are resolved by the arbiter on pointerup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                if item_id_of(&event).is_some() {
                    return;
                }
                let mut app = app.borrow_mut();
                if let Some(gesture) = app.sim.background_click(now()) {
                    app.handle_gesture(gesture);
                }
            });
            let _ = svg.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_editor(app: Rc<RefCell<App>>) {
        let document = app.borrow().view.document.clone();

        on_click(&document, "add-btn", app.clone(), |app| {
            app.board.add(now());
            app.sync();
        });
        on_click(&document, "bump-btn", app.clone(), |app| {
            match app.board.bump(now()) {
                Ok(_) => app.sync(),
                Err(err) => log::warn!("Bump ignored: {err}"),
            }
        });
        on_click(&document, "delete-btn", app.clone(), |app| {
            match app.board.delete() {
                Ok(_) => app.sync(),
                Err(err) => log::warn!("Delete ignored: {err}"),
            }
        });
        on_click(&document, "close-btn", app.clone(), |app| {
            app.board.click(None);
            app.sync_selection();
        });

        type ParseField = fn(&str) -> Result<ItemUpdate, balls_in_the_air::ItemError>;
        let fields: [(&str, &str, ParseField); 4] = [
            ("name-input", "change", |value| Ok(ItemUpdate::name(value))),
            ("growth-input", "change", ItemUpdate::parse_growth_rate),
            ("hue-input", "input", |value| {
                value
                    .parse::<f32>()
                    .map(ItemUpdate::hue)
                    .map_err(|_| balls_in_the_air::ItemError::InvalidHue(f32::NAN))
            }),
            ("text-scale-input", "input", |value| {
                value
                    .parse::<f32>()
                    .map(ItemUpdate::text_scale)
                    .map_err(|_| balls_in_the_air::ItemError::InvalidTextScale(f32::NAN))
            }),
        ];

        for (id, event, parse) in fields {
            let Some(el) = document.get_element_by_id(id) else {
                continue;
            };
            let app = app.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(value) = input_value(&document, id) else {
                    return;
                };
                app.borrow_mut().apply_edit(parse(&value));
            });
            let _ = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |_time: f64| {
            frame_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>) {
        {
            let mut app = app.borrow_mut();
            if app.sim.is_stopped() {
                return;
            }
            app.measure();
            app.sim.tick(now());
        }
        request_animation_frame(app);
    }

    fn setup_refresh_timer(app: Rc<RefCell<App>>, interval_ms: f64) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut()>::new(move || {
            app.borrow_mut().sim.refresh(now());
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            interval_ms as i32,
        );
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Balls in the Air starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let container = document
            .get_element_by_id("arena")
            .expect("no #arena container");

        // Write back so the stored record carries sanitized values and new fields
        let settings = Settings::load();
        settings.save();
        let refresh_interval = settings.refresh_interval_ms;
        let board = Board::load(LocalStorageStore::default(), now());

        let width = container.client_width().max(1) as f32;
        let height = container.client_height().max(1) as f32;
        let view =
            Rc::new(SvgView::new(document.clone(), &container).expect("Failed to create svg"));
        view.set_size(width, height);

        let painter = view.clone();
        let sim = Simulation::start(
            board.items(),
            Viewport::new(width, height),
            settings,
            now() as u64,
            now(),
            Box::new(move |frame: &Frame| painter.render(frame)),
        );

        let app = Rc::new(RefCell::new(App {
            board,
            sim,
            view,
            container,
        }));
        app.borrow_mut().sync_selection();

        setup_pointer_handlers(app.clone());
        setup_editor(app.clone());
        setup_refresh_timer(app.clone(), refresh_interval);
        request_animation_frame(app);

        log::info!("Balls in the Air running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use balls_in_the_air::persistence::MemoryStore;
    use balls_in_the_air::sim::Viewport;
    use balls_in_the_air::{Board, Settings, Simulation};

    env_logger::init();
    log::info!("Balls in the Air (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 for the interactive version");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or_default();

    let board = Board::load(MemoryStore::new(), now);
    let frames = Rc::new(Cell::new(0usize));
    let counter = frames.clone();
    let mut sim = Simulation::start(
        board.items(),
        Viewport::new(800.0, 600.0),
        Settings::load(),
        now as u64,
        now,
        Box::new(move |_frame: &balls_in_the_air::Frame| counter.set(counter.get() + 1)),
    );

    let mut ticks = 0;
    while sim.tick(now) && ticks < 2_000 {
        ticks += 1;
    }
    log::info!("Settled after {ticks} ticks ({} frames)", frames.get());
    print_layout(&sim, now);

    sim.resize(400.0, 300.0);
    sim.tick(now);
    log::info!("After resize to 400x300:");
    print_layout(&sim, now);

    sim.stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn print_layout(sim: &balls_in_the_air::Simulation, now: f64) {
    for item in sim.frame(now).items {
        println!(
            "{:>14}  ({:6.1}, {:6.1})  r={:5.1}  {}",
            item.id,
            item.pos.x,
            item.pos.y,
            item.radius,
            item.lines.join(" / ")
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
