//! Toy Cannon entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{DragEvent, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent};

    use toy_cannon::assets::{AssetGate, AssetId, GateState};
    use toy_cannon::clock::FrameClock;
    use toy_cannon::renderer::{CanvasRenderer, Sprites, sprites::replace_sprite};
    use toy_cannon::sim::{Bounds, FrameInput, ParamKind, Simulation, tick};
    use toy_cannon::CannonError;

    /// Game instance holding all state
    struct Game {
        sim: Simulation,
        clock: FrameClock,
        input: FrameInput,
        gate: AssetGate,
        renderer: CanvasRenderer,
        sprites: Rc<RefCell<Option<Sprites>>>,
        /// Sprites being loaded for the current gate round
        loading: Option<Sprites>,
    }

    impl Game {
        /// Run one frame of simulation
        fn update(&mut self, time: f64) {
            let dt = self.clock.tick(time);
            let report = tick(&mut self.sim, &self.input, dt);
            if report.removed() > 0 || report.fired > 0 {
                log::trace!("{:?} ({} live)", report, self.sim.store.len());
            }

            // Clicks are one-shot; the held key stays until keyup
            self.input.fire_clicks = 0;
        }

        /// Render the current frame
        fn render(&self) {
            if let Some(sprites) = self.sprites.borrow().as_ref() {
                if let Err(e) = self.renderer.render(&self.sim, sprites) {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }

        /// Apply a slider change and refresh its readout
        fn set_param(&mut self, kind: ParamKind, value: f64) {
            if self.sim.params.apply_slider(kind, value) {
                set_label(kind, &self.sim.params.label(kind));
            }
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_label(kind: ParamKind, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(kind.label_id())) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub async fn run() -> Result<(), CannonError> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Toy Cannon starting...");

        let document = document().ok_or_else(|| CannonError::MissingElement("document".into()))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| CannonError::MissingElement("#canvas".into()))?
            .dyn_into()
            .map_err(|_| CannonError::MissingElement("#canvas is not a canvas".into()))?;

        let mut sim = Simulation::default();
        sim.bounds = Bounds {
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        };

        let game = Rc::new(RefCell::new(Game {
            sim,
            clock: FrameClock::default(),
            input: FrameInput::default(),
            gate: AssetGate::new(js_sys::Date::now()),
            renderer: CanvasRenderer::new(&canvas)?,
            sprites: Rc::new(RefCell::new(None)),
            loading: None,
        }));

        setup_sliders(game.clone())?;
        setup_fire_inputs(game.clone());
        setup_drop_zone(game.clone());
        setup_retry_button(game.clone());

        begin_loading(game)?;
        Ok(())
    }

    /// Start a load round: create the images and arm the timeout
    fn begin_loading(game: Rc<RefCell<Game>>) -> Result<(), CannonError> {
        set_visible("loading", true);
        set_visible("load-error", false);

        // Callbacks from an earlier round may still fire; tag this round's
        let attempt = game.borrow().gate.attempts();
        let on_done: Rc<dyn Fn(AssetId, Result<(), String>)> = {
            let game = game.clone();
            Rc::new(move |asset, result| on_asset(game.clone(), attempt, asset, result))
        };
        let sprites = Sprites::load(on_done)?;
        game.borrow_mut().loading = Some(sprites);

        let timeout_ms = toy_cannon::consts::ASSET_LOAD_TIMEOUT_MS;
        let closure = Closure::once(move || {
            let now = js_sys::Date::now();
            let failed = matches!(game.borrow_mut().gate.poll(attempt, now), GateState::Failed(_));
            if failed {
                show_failure(&game);
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                timeout_ms as i32,
            );
        }
        closure.forget();
        Ok(())
    }

    fn on_asset(game: Rc<RefCell<Game>>, attempt: u32, asset: AssetId, result: Result<(), String>) {
        let state = {
            let mut g = game.borrow_mut();
            match result {
                Ok(()) => g.gate.asset_loaded(attempt, asset).clone(),
                Err(reason) => g.gate.asset_failed(attempt, asset, reason).clone(),
            }
        };

        match state {
            GateState::Ready => {
                {
                    let mut g = game.borrow_mut();
                    let sprites = g.loading.take();
                    *g.sprites.borrow_mut() = sprites;
                    if let Err(e) = g.gate.start() {
                        log::error!("{}", e);
                        return;
                    }
                }
                set_visible("loading", false);
                request_animation_frame(game);
                log::info!("Toy Cannon running!");
            }
            GateState::Failed(_) => show_failure(&game),
            GateState::Loading | GateState::Running => {}
        }
    }

    fn show_failure(game: &Rc<RefCell<Game>>) {
        let g = game.borrow();
        if let GateState::Failed(err) = g.gate.state() {
            set_visible("loading", false);
            set_visible("load-error", true);
            g.renderer.render_error(&err.to_string());
        }
    }

    fn setup_retry_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("retry")) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let retried = game.borrow_mut().gate.retry(js_sys::Date::now());
            match retried {
                Ok(()) => {
                    if let Err(e) = begin_loading(game.clone()) {
                        log::error!("{}", e);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_sliders(game: Rc<RefCell<Game>>) -> Result<(), CannonError> {
        let document = document().ok_or_else(|| CannonError::MissingElement("document".into()))?;

        for kind in ParamKind::ALL {
            let input: HtmlInputElement = document
                .get_element_by_id(kind.input_id())
                .ok_or_else(|| CannonError::MissingElement(format!("#{}", kind.input_id())))?
                .dyn_into()
                .map_err(|_| CannonError::MissingElement(format!("#{} is not an input", kind.input_id())))?;

            {
                let g = game.borrow();
                input.set_value_as_number(g.sim.params.slider_value(kind));
                set_label(kind, &g.sim.params.label(kind));
            }

            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(target) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                game.borrow_mut().set_param(kind, target.value_as_number());
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        Ok(())
    }

    fn setup_fire_inputs(game: Rc<RefCell<Game>>) {
        // Fire button
        if let Some(btn) = document().and_then(|d| d.get_element_by_id("fire")) {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.fire_clicks += 1;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(window) = web_sys::window() else {
            return;
        };

        // Space held: polled every frame
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == " " {
                    event.prevent_default();
                    game.borrow_mut().input.fire_held = true;
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == " " {
                    game.borrow_mut().input.fire_held = false;
                }
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_drop_zone(game: Rc<RefCell<Game>>) {
        let Some(zone) = document().and_then(|d| d.get_element_by_id("drop")) else {
            return;
        };

        // Without this the browser opens the file instead of dropping it
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                event.prevent_default();
            });
            let _ = zone.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                event.prevent_default();
                let Some(file) = event
                    .data_transfer()
                    .and_then(|dt| dt.files())
                    .and_then(|files| files.get(0))
                else {
                    return;
                };
                log::info!("Dropped {}", file.name());
                let url = match web_sys::Url::create_object_url_with_blob(&file) {
                    Ok(url) => url,
                    Err(e) => {
                        log::warn!("Could not read dropped file: {:?}", e);
                        return;
                    }
                };
                let sprites = game.borrow().sprites.clone();
                if let Err(e) = replace_sprite(sprites, url) {
                    log::warn!("{}", e);
                }
            });
            let _ = zone.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Toy Cannon failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    log::info!("Toy Cannon (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    barrage::run(0xC0FFEE, 24);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless smoke run: fire a seeded spread of shots and simulate until the
/// sky is clear.
#[cfg(not(target_arch = "wasm32"))]
mod barrage {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use toy_cannon::clock::FrameClock;
    use toy_cannon::consts::*;
    use toy_cannon::sim::{FrameInput, Simulation, StepReport, tick};

    /// Simulated display refresh (milliseconds)
    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run(seed: u64, shots: u32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut sim = Simulation::default();
        let mut clock = FrameClock::default();
        let mut totals = StepReport::default();
        let mut frame: u64 = 0;

        loop {
            let mut input = FrameInput::default();
            if (frame as u32) < shots {
                let angle = rng.random_range(5.0..85.0);
                let speed = DEFAULT_VELOCITY * rng.random_range(0.5..1.5);
                sim.params.set_angle(angle);
                sim.params.set_velocity(speed);
                input.fire_clicks = 1;
            }

            let dt = clock.tick(frame as f64 * FRAME_MS);
            let report = tick(&mut sim, &input, dt);
            totals.fired += report.fired;
            totals.bounces += report.bounces;
            totals.expired += report.expired;
            totals.out_of_bounds += report.out_of_bounds;
            totals.stalled += report.stalled;

            frame += 1;
            if frame as u32 >= shots && sim.store.is_empty() {
                break;
            }
        }

        log::info!(
            "Barrage done after {:.2}s simulated: fired {}, bounces {}, expired {}, off-screen {}, stalled {}",
            sim.elapsed,
            totals.fired,
            totals.bounces,
            totals.expired,
            totals.out_of_bounds,
            totals.stalled
        );
        println!(
            "✓ {} shots cleared in {} frames ({:.2}s simulated)",
            totals.fired, frame, sim.elapsed
        );
    }
}
