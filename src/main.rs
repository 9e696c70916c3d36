//! Vast Unknown entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use vast_unknown::consts::*;
    use vast_unknown::renderer::{RenderState, build_scene};
    use vast_unknown::sessions::{self, SessionRecord};
    use vast_unknown::sim::{GamePhase, GameState, StrokeEvent, TickInput, tick};
    use vast_unknown::{Leaderboard, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        settings: Settings,
        leaderboard: Leaderboard,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        pointer_down: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Track phase for session recording
        last_phase: GamePhase,
    }

    impl Game {
        fn new(seed: u64, field_size: (f32, f32), settings: Settings) -> Self {
            let mut state = GameState::new(seed);
            configure_field(&mut state, field_size, &settings);
            Self {
                state,
                render_state: None,
                settings,
                leaderboard: Leaderboard::load(),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                pointer_down: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_phase: GamePhase::Ready,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear_oneshot();
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_idx = self.frame_index;
            let oldest_time = self.frame_times[oldest_idx];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            // Record the finished session once, on the transition
            let current_phase = self.state.phase;
            if current_phase != self.last_phase {
                if current_phase == GamePhase::GameOver {
                    self.finish_session();
                }
                self.last_phase = current_phase;
            }
        }

        /// Record a finished game: leaderboard, stats, remote submission
        fn finish_session(&mut self) {
            let record = SessionRecord {
                score: self.state.score,
                survival_time: self.state.survival_secs(),
                complexity_peak: self.state.complexity_peak,
                timestamp: js_sys::Date::now(),
            };
            if record.score > 0 {
                sessions::submit_session(&record);
            }
            let rank = self.leaderboard.add_record(record);
            self.leaderboard.save();
            if let Some(rank) = rank {
                log::info!("Session placed #{} on the leaderboard", rank);
            }
            render_leaderboard(&self.leaderboard);
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = build_scene(&self.state, &self.settings);
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            // Update score
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.score.to_string()));
            }

            // Update survival time
            if let Some(el) = document.query_selector("#hud-time .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{}s", self.state.survival_secs() as u32)));
            }

            // Update complexity readout and meter bar
            if let Some(el) = document
                .query_selector("#hud-complexity .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&format!("{:.0}%", self.state.complexity)));
            }
            if let Some(bar) = document.get_element_by_id("complexity-bar") {
                let _ = bar.set_attribute("style", &format!("width:{:.1}%", self.state.complexity));
            }

            // Update FPS
            if self.settings.show_fps {
                if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }

            // Show/hide start prompt
            if let Some(el) = document.get_element_by_id("start-prompt") {
                if self.state.phase == GamePhase::Ready {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Show/hide pause menu
            if let Some(el) = document.get_element_by_id("pause-menu") {
                if self.state.phase == GamePhase::Paused {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    // Update final stats
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&self.state.score.to_string()));
                    }
                    if let Some(time_el) = document.get_element_by_id("final-time") {
                        time_el.set_text_content(Some(&format!(
                            "{}s",
                            self.state.survival_secs() as u32
                        )));
                    }
                    if let Some(peak_el) = document.get_element_by_id("final-complexity") {
                        peak_el.set_text_content(Some(&format!(
                            "{:.0}%",
                            self.state.complexity_peak
                        )));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        /// Reset for a fresh session, keeping field size and settings
        fn restart(&mut self, seed: u64) {
            let field = (self.state.field_width, self.state.field_height);
            self.state = GameState::new(seed);
            configure_field(&mut self.state, field, &self.settings);
            self.accumulator = 0.0;
            self.input = TickInput::default();
            self.pointer_down = false;
            self.last_phase = GamePhase::Ready;
        }
    }

    /// Size the field to the canvas and respawn particles inside it
    fn configure_field(state: &mut GameState, field_size: (f32, f32), settings: &Settings) {
        state.field_width = field_size.0;
        state.field_height = field_size.1;
        // Respawn so particle homes land inside the actual field
        state.resize_particles(0);
        state.resize_particles(settings.particle_population());
    }

    /// Fill the game-over leaderboard list and stats line
    fn render_leaderboard(board: &Leaderboard) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(list) = document.get_element_by_id("leaderboard-list") {
            if board.is_empty() {
                list.set_inner_html("<li>No sessions yet</li>");
            } else {
                let mut html = String::new();
                for (i, record) in board.records.iter().enumerate() {
                    html.push_str(&format!(
                        "<li>#{} {} pts, {}s, {}</li>",
                        i + 1,
                        record.score,
                        record.survival_time as u32,
                        sessions::format_date(record.timestamp)
                    ));
                }
                list.set_inner_html(&html);
            }
        }
        if let Some(el) = document.get_element_by_id("leaderboard-stats") {
            let stats = &board.stats;
            el.set_text_content(Some(&format!(
                "{} games, best {}, avg score {:.0}, avg survival {:.0}s",
                stats.games_played,
                stats.best_score,
                stats.average_score(),
                stats.average_survival()
            )));
        }
    }

    /// Download the current canvas as a PNG
    fn export_snapshot(canvas: &HtmlCanvasElement) {
        let data_url = match canvas.to_data_url() {
            Ok(url) => url,
            Err(_) => {
                log::warn!("Snapshot capture failed");
                return;
            }
        };
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let anchor = document
            .create_element("a")
            .ok()
            .and_then(|el| el.dyn_into::<web_sys::HtmlAnchorElement>().ok());
        if let Some(anchor) = anchor {
            anchor.set_href(&data_url);
            anchor.set_download(&format!("vast-unknown-{}.png", js_sys::Date::now() as u64));
            anchor.click();
            log::info!("Snapshot exported");
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Vast Unknown starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game; the field uses canvas client units directly, so
        // pointer offsets map 1:1 onto field coordinates
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let field_size = (client_w as f32, client_h as f32);
        let game = Rc::new(RefCell::new(Game::new(seed, field_size, settings)));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, field_size).await;
        game.borrow_mut().render_state = Some(render_state);

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Set up overlay buttons
        setup_buttons(&canvas, game.clone());

        // Set up auto-pause on visibility change
        setup_auto_pause(game.clone());

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Vast Unknown running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer down - begin a stroke (and the session, from Ready)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Ready {
                    g.input.start = true;
                }
                g.pointer_down = true;
                let point = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                g.input.stroke_events.push(StrokeEvent::Start(point));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move - extend the in-progress stroke
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if !g.pointer_down {
                    return;
                }
                let point = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                g.input.stroke_events.push(StrokeEvent::Move(point));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up / cancel - finalize the stroke
        for event_name in ["pointerup", "pointercancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.pointer_down {
                    g.pointer_down = false;
                    g.input.stroke_events.push(StrokeEvent::End);
                }
            });
            let _ =
                canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => g.input.start = true,
                    "Escape" | "p" | "P" => g.input.pause = true,
                    "q" | "Q" => {
                        let preset = g.settings.quality.next();
                        g.settings.apply_preset(preset);
                        g.settings.save();
                        let population = g.settings.particle_population();
                        g.state.resize_particles(population);
                        log::info!("Quality preset: {}", preset.as_str());
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_buttons(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Start button
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.start = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restart button (game-over overlay)
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                log::info!("Game restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resume button (pause menu)
        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.pause = true; // Toggle back to playing
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // End session button (pause menu)
        if let Some(btn) = document.get_element_by_id("end-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.end = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Quality toggle (pause menu)
        if let Some(btn) = document.get_element_by_id("quality-btn") {
            let game = game.clone();
            let btn_clone = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let preset = g.settings.quality.next();
                g.settings.apply_preset(preset);
                g.settings.save();
                let population = g.settings.particle_population();
                g.state.resize_particles(population);
                btn_clone.set_text_content(Some(&format!("Quality: {}", preset.as_str())));
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Snapshot export button
        if let Some(btn) = document.get_element_by_id("snapshot-btn") {
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                export_snapshot(&canvas);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    // Auto-pause if playing
                    if g.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Vast Unknown (native) starting...");
    log::info!("Native mode runs a headless demo - use `trunk serve` for the web version");

    demo_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: draw a few strokes and let the field evolve
#[cfg(not(target_arch = "wasm32"))]
fn demo_session() {
    use glam::Vec2;
    use vast_unknown::consts::SIM_DT;
    use vast_unknown::sim::{GamePhase, GameState, StrokeEvent, TickInput, tick};

    let mut state = GameState::new(42);
    let mut input = TickInput {
        start: true,
        ..Default::default()
    };

    let mut tick_count = 0u32;
    for stroke in 0..6 {
        let origin = Vec2::new(120.0 + stroke as f32 * 150.0, 160.0);
        input.stroke_events.push(StrokeEvent::Start(origin));
        for i in 1..40 {
            input.stroke_events.push(StrokeEvent::Move(
                origin + Vec2::new(i as f32 * 4.0, (i as f32 * 0.4).sin() * 24.0),
            ));
        }
        input.stroke_events.push(StrokeEvent::End);

        for _ in 0..120 {
            tick(&mut state, &input, SIM_DT);
            input.clear_oneshot();
            tick_count += 1;
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        log::info!(
            "After stroke {}: score {} complexity {:.1} fragments {} curves {}",
            stroke + 1,
            state.score,
            state.complexity,
            state.fragments.len(),
            state.curves.len()
        );
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Demo over after {} ticks: phase {:?}, score {}, complexity peak {:.1}",
        tick_count,
        state.phase,
        state.score,
        state.complexity_peak
    );
}
