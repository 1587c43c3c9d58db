//! Grill Arena entry point
//!
//! Browser builds drive the session from `requestAnimationFrame` and blit the
//! software frame into a 2D canvas. Native builds run a headless autoplay
//! round and log the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::{Clamped, prelude::*};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, PointerEvent};

    use grill_arena::consts::*;
    use grill_arena::renderer::Renderer;
    use grill_arena::settings::{DeviceTier, Settings};
    use grill_arena::sim::{GameEvent, ResizeRequest, Session, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        session: Session,
        renderer: Renderer,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        active_pointer: Option<i32>,
        score_label: String,
    }

    impl Game {
        fn update(&mut self, dt: f32) {
            // Resizes land between ticks, never inside one
            if self.session.apply_pending_resize(js_sys::Date::now()) {
                let surface = *self.session.surface();
                let style = self.canvas.style();
                let _ = style.set_property("width", &format!("{}px", surface.width));
                let _ = style.set_property("height", &format!("{}px", surface.height));
            }

            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= TICK_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.session, &input, TICK_DT);
                self.accumulator -= TICK_DT;
                substeps += 1;

                self.input.restart = false;
            }

            for event in self.session.drain_events() {
                self.handle_event(event);
            }
        }

        fn render(&mut self) {
            let frame = self.renderer.render(&self.session);
            if self.canvas.width() != frame.width() || self.canvas.height() != frame.height() {
                self.canvas.set_width(frame.width());
                self.canvas.set_height(frame.height());
            }
            if frame.width() == 0 || frame.height() == 0 {
                return;
            }
            match ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(frame.as_bytes()),
                frame.width(),
                frame.height(),
            ) {
                Ok(image) => {
                    let _ = self.ctx.put_image_data(&image, 0.0, 0.0);
                }
                Err(e) => log::warn!("Frame upload failed: {:?}", e),
            }
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&format!(
                    "{}: {}",
                    self.score_label,
                    self.session.score()
                )));
            }
            if let Some(el) = document.get_element_by_id("timer") {
                el.set_text_content(Some(&self.session.timer_text()));
            }
        }

        fn handle_event(&self, event: GameEvent) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let banner = document.get_element_by_id("result");
            match event {
                GameEvent::RoundStarted => {
                    if let Some(el) = banner {
                        let _ = el.set_attribute("class", "badge hidden");
                    }
                }
                GameEvent::RoundWon { score } | GameEvent::RoundLost { score } => {
                    let won = matches!(event, GameEvent::RoundWon { .. });
                    if let Some(el) = banner {
                        let _ = el.set_attribute("class", "badge");
                        let _ = el.set_attribute("data-outcome", if won { "won" } else { "lost" });
                        let _ = el.set_attribute("data-score", &score.to_string());
                    }
                }
                GameEvent::TargetEliminated { .. } => {}
            }
        }
    }

    fn is_mobile(window: &web_sys::Window) -> bool {
        let agent = window.navigator().user_agent().unwrap_or_default();
        ["Mobi", "Android", "iPhone", "iPad", "iPod"]
            .iter()
            .any(|needle| agent.to_lowercase().contains(&needle.to_lowercase()))
    }

    fn prefers_reduced_motion(window: &web_sys::Window) -> bool {
        window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .is_some_and(|mq| mq.matches())
    }

    /// Viewport request from the arena wrapper (or the canvas itself)
    fn viewport_request(canvas: &HtmlCanvasElement) -> Option<ResizeRequest> {
        let window = web_sys::window()?;
        let rect = window
            .document()
            .and_then(|d| d.get_element_by_id("arena-wrap"))
            .map(|el| el.get_bounding_client_rect())
            .unwrap_or_else(|| canvas.get_bounding_client_rect());
        Some(ResizeRequest {
            viewport_width: rect.width() as f32,
            viewport_height: rect.height() as f32,
            device_pixel_ratio: window.device_pixel_ratio() as f32,
        })
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Grill Arena starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("arena")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let mut settings = Settings::load();
        if is_mobile(&window) && settings.tier != DeviceTier::Constrained {
            settings.tier = DeviceTier::Constrained;
            settings.save();
        }
        settings.reduced_motion |= prefers_reduced_motion(&window);
        log::info!(
            "Tier {}, reduced motion {}",
            settings.tier.as_str(),
            settings.reduced_motion
        );

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(settings, seed);
        if let Some(request) = viewport_request(&canvas) {
            session.resize_now(request);
        }
        log::info!("Session initialized with seed: {}", seed);

        let score_label = document
            .get_element_by_id("score")
            .and_then(|el| el.get_attribute("data-label"))
            .unwrap_or_else(|| "Kills".to_string());

        let game = Rc::new(RefCell::new(Game {
            session,
            renderer: Renderer::new(),
            canvas: canvas.clone(),
            ctx,
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            active_pointer: None,
            score_label,
        }));
        {
            let g = game.borrow();
            let surface = g.session.surface();
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{}px", surface.width));
            let _ = style.set_property("height", &format!("{}px", surface.height));
        }

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_resize(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Grill Arena running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Track the active pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.active_pointer.is_none_or(|id| id == event.pointer_id()) {
                    g.input.pointer = Some(glam::Vec2::new(
                        event.offset_x() as f32,
                        event.offset_y() as f32,
                    ));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Press: capture the pointer, start the round if needed, spray
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let id = event.pointer_id();
                g.active_pointer = Some(id);
                let _ = canvas_clone.set_pointer_capture(id);

                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                g.input.pointer = Some(glam::Vec2::new(x, y));
                g.input.pressed = true;
                // Pressed immediately so a tap shorter than a frame still counts
                g.session.press(x, y);

                if g.session.settings().haptics {
                    if let Some(window) = web_sys::window() {
                        let _ = window.navigator().vibrate_with_duration(10);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release anywhere
        if let Some(window) = web_sys::window() {
            for name in ["pointerup", "pointercancel"] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                    let mut g = game.borrow_mut();
                    if g.active_pointer == Some(event.pointer_id()) {
                        g.active_pointer = None;
                        g.input.pressed = false;
                        g.session.release();
                    }
                });
                let _ =
                    window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restartBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.restart = true;
                log::info!("Restart requested");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(request) = viewport_request(&canvas) {
                game.borrow_mut()
                    .session
                    .request_resize(request, js_sys::Date::now());
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                TICK_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use grill_arena::consts::{MAX_SUBSTEPS, TICK_DT};
    use grill_arena::renderer::Renderer;
    use grill_arena::settings::Settings;
    use grill_arena::sim::{GameEvent, GamePhase, ResizeRequest, Session, autoplay_input, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Grill Arena (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

    let settings = match std::env::var("GRILL_ARENA_SETTINGS") {
        Ok(json) => Settings::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring GRILL_ARENA_SETTINGS: {}", e);
            Settings::default()
        }),
        Err(_) => Settings::load(),
    };

    let mut session = Session::new(settings, seed);
    session.resize_now(ResizeRequest {
        viewport_width: 640.0,
        viewport_height: 420.0,
        device_pixel_ratio: 1.0,
    });
    session.start();
    log::info!("Autoplay with seed {}", seed);

    // Host frames at ~50 Hz feed a fixed 60 Hz simulation
    let frame_dt = 1.0 / 50.0;
    let mut accumulator = 0.0;
    let mut renderer = Renderer::new();
    let mut frames = 0u32;

    while session.phase() == GamePhase::Playing {
        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= TICK_DT && substeps < MAX_SUBSTEPS {
            let input = autoplay_input(&session);
            tick(&mut session, &input, TICK_DT);
            accumulator -= TICK_DT;
            substeps += 1;
        }
        renderer.render(&session);
        frames += 1;

        for event in session.drain_events() {
            match event {
                GameEvent::TargetEliminated { target_id, score } => {
                    log::info!(
                        "[{}] target {} down, score {}",
                        session.timer_text(),
                        target_id,
                        score
                    );
                }
                GameEvent::RoundWon { score } => println!("Arena cleared! {} targets", score),
                GameEvent::RoundLost { score } => println!("Time's up: {} targets", score),
                GameEvent::RoundStarted => {}
            }
        }
    }

    let frame = renderer.frame();
    log::info!(
        "{} frames rendered at {}x{}",
        frames,
        frame.width(),
        frame.height()
    );
}
