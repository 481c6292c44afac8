//! Galactic Justice entry point
//!
//! Web: WebGPU canvas driven by requestAnimationFrame.
//! Native: headless autopilot run that exercises the whole frame pipeline.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use galactic_justice::consts::*;
    use galactic_justice::persistence::LocalStorage;
    use galactic_justice::renderer::{RenderState, SpriteSheet, build_frame};
    use galactic_justice::sim::{GamePhase, GameState, LevelConfig, TickInput, tick};
    use galactic_justice::{Difficulty, ProgressionStore, Settings, Viewport};

    /// Directional keys currently held
    #[derive(Debug, Default, Clone, Copy)]
    struct HeldKeys {
        left: bool,
        right: bool,
        up: bool,
        down: bool,
        fire: bool,
    }

    impl HeldKeys {
        fn direction(&self) -> Vec2 {
            let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
            Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
        }

        /// Returns false for keys that are not bound
        fn set(&mut self, key: &str, down: bool) -> bool {
            match key {
                "ArrowLeft" | "a" | "A" => self.left = down,
                "ArrowRight" | "d" | "D" => self.right = down,
                "ArrowUp" | "w" | "W" => self.up = down,
                "ArrowDown" | "s" | "S" => self.down = down,
                " " | "z" | "Z" => self.fire = down,
                _ => return false,
            }
            true
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        progression: ProgressionStore,
        settings: Settings,
        viewport: Viewport,
        sprites: SpriteSheet,
        render_state: Option<RenderState>,
        last_time: f64,
        keys: HeldKeys,
        input: TickInput,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load(&LocalStorage);
            let progression = ProgressionStore::load(Box::new(LocalStorage));
            let level = LevelConfig::new(progression.data().unlocked_level, Difficulty::Easy);
            let state = GameState::new(seed, level, &progression, &settings);
            Self {
                state,
                progression,
                settings,
                viewport: Viewport::default(),
                sprites: SpriteSheet::default(),
                render_state: None,
                last_time: 0.0,
                keys: HeldKeys::default(),
                input: TickInput::default(),
                last_phase: GamePhase::Playing,
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            if let Err(e) = self.viewport.set_resolution(width as f32, height as f32) {
                log::warn!("{}", e);
                return;
            }
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height);
            }
        }

        fn update(&mut self, dt: f32) {
            self.input.direction = self.keys.direction();
            self.input.fire = self.keys.fire;
            let input = self.input.clone();
            tick(&mut self.state, &input, dt, &mut self.progression);

            // One-shot inputs
            self.input.pause = false;
            self.input.toggle_control = false;

            for event in self.state.drain_events() {
                log::debug!("{:?}", event);
            }

            if self.state.phase != self.last_phase {
                log::info!("Phase: {:?} (score {})", self.state.phase, self.state.score);
                self.last_phase = self.state.phase;
            }
        }

        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let commands = build_frame(&self.state, &self.viewport, &self.sprites, &self.settings);
            match render_state.render(&commands) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Start the next level, or replay this one after a defeat
        fn restart(&mut self, seed: u64) {
            let level = match self.state.phase {
                GamePhase::Victory => self.state.level.level + 1,
                _ => self.state.level.level,
            };
            let level = if self.progression.is_level_unlocked(level) {
                level
            } else {
                self.state.level.level
            };
            let config = LevelConfig::new(level, self.state.level.difficulty);
            self.state = GameState::new(seed, config, &self.progression, &self.settings);
            self.input = TickInput::default();
            self.last_phase = GamePhase::Playing;
        }
    }

    pub async fn run() -> Result<(), String> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Galactic Justice starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "element #canvas is not a canvas")?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| format!("failed to create surface: {e}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| format!("failed to get adapter: {e}"))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let vsync = game.borrow().settings.vsync;
        let render_state = RenderState::new(surface, &adapter, width, height, vsync)
            .await
            .map_err(|e| format!("failed to create device: {e}"))?;
        {
            let mut g = game.borrow_mut();
            g.render_state = Some(render_state);
            g.resize(width, height);
        }

        setup_input_handlers(&window, &canvas, game.clone());
        setup_auto_pause(&window, &document, game.clone());

        request_animation_frame(game);

        log::info!("Galactic Justice running!");
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move steers in pointer mode
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()) as f32;
                let physical = Vec2::new(event.offset_x() as f32, event.offset_y() as f32) * dpr;
                g.input.pointer = if g.viewport.contains_physical(physical) {
                    Some(g.viewport.to_logical(physical))
                } else {
                    None
                };
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse button fires
        for (name, down) in [("mousedown", true), ("mouseup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().keys.fire = down;
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if g.keys.set(&key, true) {
                    event.prevent_default();
                    return;
                }
                match key.as_str() {
                    "Escape" | "p" | "P" => g.input.pause = true,
                    "m" | "M" => g.input.toggle_control = true,
                    "i" | "I" => {
                        g.input.idle_mode = !g.input.idle_mode;
                        log::info!("Idle mode: {}", g.input.idle_mode);
                    }
                    "Enter" if g.state.is_over() => {
                        let seed = js_sys::Date::now() as u64;
                        g.restart(seed);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().keys.set(&event.key(), false);
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        // Tab hidden
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
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

        // Window blur also drops held keys
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.keys = HeldKeys::default();
                if g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Canvas follows the window size
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let Some(canvas) = window
                    .document()
                    .and_then(|d| d.get_element_by_id("canvas"))
                    .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
                else {
                    return;
                };
                let dpr = window.device_pixel_ratio();
                let width = (canvas.client_width() as f64 * dpr) as u32;
                let height = (canvas.client_height() as f64 * dpr) as u32;
                canvas.set_width(width);
                canvas.set_height(height);
                game.borrow_mut().resize(width, height);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                NOMINAL_DT
            };
            g.last_time = time;

            g.update(dt.min(MAX_FRAME_DT));
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Galactic Justice (native) starting...");
    log::info!("Native mode runs headless - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let level = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let difficulty = match args.next() {
        Some(name) => galactic_justice::Difficulty::from_name(&name).unwrap_or_else(|| {
            log::warn!("Unknown difficulty '{}', using easy", name);
            galactic_justice::Difficulty::Easy
        }),
        None => galactic_justice::Difficulty::Easy,
    };
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);

    headless::run(level, difficulty, seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use galactic_justice::consts::NOMINAL_DT;
    use galactic_justice::persistence::FileStorage;
    use galactic_justice::renderer::{SpriteSheet, build_frame, tessellate};
    use galactic_justice::sim::{GameEvent, GameState, LevelConfig, TickInput, tick};
    use galactic_justice::{Difficulty, ProgressionStore, Settings, Viewport};

    /// Save directory override
    const DATA_DIR_ENV: &str = "GALACTIC_JUSTICE_DATA";

    /// Autopilot a single level for up to `seconds` of simulated time
    pub fn run(level: u32, difficulty: Difficulty, seconds: f32) {
        let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| "./save".to_string());
        let mut storage = FileStorage::new(&dir);
        let settings = Settings::load(&storage);
        settings.save(&mut storage);
        let mut progression = ProgressionStore::load(Box::new(storage));

        if !progression.is_level_unlocked(level) {
            log::warn!("Level {} is locked; playing it anyway", level);
        }

        let mut viewport = Viewport::default();
        if let Err(e) = settings.apply_to(&mut viewport) {
            log::warn!("{}", e);
        }
        let sprites = SpriteSheet::default();

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        let config = LevelConfig::new(level, difficulty);
        let mut state = GameState::new(seed, config, &progression, &settings);

        let input = TickInput {
            fire: true,
            idle_mode: true,
            ..Default::default()
        };

        let mut frames = 0u64;
        let mut vertices = 0usize;
        let mut kills = 0u32;
        while !state.is_over() && state.time < seconds {
            tick(&mut state, &input, NOMINAL_DT, &mut progression);
            let commands = build_frame(&state, &viewport, &sprites, &settings);
            vertices = vertices.max(tessellate(&commands).len());
            frames += 1;

            for event in state.drain_events() {
                match event {
                    GameEvent::EnemyKilled { .. } => {
                        kills += 1;
                        log::debug!("{:?}", event);
                    }
                    GameEvent::PlayerFired => {}
                    _ => log::info!("{:?}", event),
                }
            }
        }

        log::info!(
            "Finished {:?} after {:.1}s ({} frames): score {}, {} kills, wave {}, peak {} vertices",
            state.phase,
            state.time,
            frames,
            state.score,
            kills,
            state.waves.wave(),
            vertices
        );
        if let Some(best) = progression.high_score(state.level.level) {
            log::info!("Best score on level {}: {}", state.level.level, best);
        }
        log::info!("Saved to {}", dir);
    }
}
