//! Space Invaders entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Event, EventTarget, KeyboardEvent, PageTransitionEvent};

    use space_invaders::input::{Affordances, Control, map_control, map_key};
    use space_invaders::persistence::open_default_store;
    use space_invaders::platform::{PageHide, detect_device, measure_element_width};
    use space_invaders::renderer::CanvasRenderer;
    use space_invaders::sim::GamePhase;
    use space_invaders::{HighScores, Intent, Session, Settings};

    const FIELD_ELEMENT_ID: &str = "game-window";
    const CANVAS_ID: &str = "canvas";
    /// Longest frame we replay (tab switches produce huge gaps)
    const MAX_FRAME_MS: f64 = 100.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        renderer: CanvasRenderer,
        affordances: Affordances,
        last_time: f64,
        frame_handle: Option<i32>,
    }

    impl Game {
        fn dispatch(&mut self, intent: Intent) {
            self.session.dispatch(intent);
        }

        /// Advance the clocks and draw
        fn frame(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                0.0
            };
            self.last_time = time;

            self.session.advance(elapsed.min(MAX_FRAME_MS));
            self.renderer.render(self.session.state());
            self.renderer.update_hud(self.session.state(), &self.affordances);
        }
    }

    /// DOM listeners owned by the game, removed on teardown
    #[derive(Default)]
    struct Listeners {
        entries: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
    }

    impl Listeners {
        fn add(
            &mut self,
            target: &EventTarget,
            kind: &'static str,
            handler: impl FnMut(Event) + 'static,
        ) {
            let closure = Closure::<dyn FnMut(Event)>::new(handler);
            match target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
                Ok(()) => self.entries.push((target.clone(), kind, closure)),
                Err(e) => log::warn!("Failed to listen for {}: {:?}", kind, e),
            }
        }

        fn detach_all(&mut self) {
            for (target, kind, closure) in self.entries.drain(..) {
                let _ = target
                    .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Space Invaders starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let mut store = open_default_store();
        let mut settings = Settings::load(store.as_ref());
        if let Ok(query) = window.location().search() {
            if settings.apply_query(&query) {
                settings.save(store.as_mut());
            }
        }
        let device = detect_device();
        let affordances = Affordances::resolve(device, settings.controls);
        log::info!(
            "Device {:?}, controls {}",
            device,
            settings.controls.as_str()
        );

        let session = Session::new(
            settings,
            HighScores::new(store),
            measure_element_width(FIELD_ELEMENT_ID),
        );

        let Some(renderer) = CanvasRenderer::new(document.clone(), CANVAS_ID) else {
            log::error!("No 2D canvas with id `{}`", CANVAS_ID);
            return;
        };

        let game = Rc::new(RefCell::new(Game {
            session,
            renderer,
            affordances,
            last_time: 0.0,
            frame_handle: None,
        }));

        let listeners = Rc::new(RefCell::new(Listeners::default()));
        {
            let mut listeners = listeners.borrow_mut();
            setup_keyboard(&window, game.clone(), &mut listeners);
            setup_controls(&document, game.clone(), &mut listeners);
            setup_resize(&window, game.clone(), &mut listeners);
        }
        setup_teardown(&window, game.clone(), listeners);

        // Start game loop
        request_animation_frame(game);

        log::info!("Space Invaders running!");
    }

    fn setup_keyboard(
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
        listeners: &mut Listeners,
    ) {
        listeners.add(window, "keydown", move |event: Event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let mut g = game.borrow_mut();
            let phase = g.session.state().phase;
            if let Some(intent) = map_key(&key_event.key(), phase) {
                // Keep arrows and space from scrolling the page mid-game
                if phase == GamePhase::Playing {
                    event.prevent_default();
                }
                g.dispatch(intent);
            }
        });
    }

    fn setup_controls(
        document: &web_sys::Document,
        game: Rc<RefCell<Game>>,
        listeners: &mut Listeners,
    ) {
        let controls = [
            ("btn-left", Control::Left),
            ("btn-right", Control::Right),
            ("btn-fire", Control::Fire),
            ("start-screen", Control::Screen),
            ("play-again", Control::PlayAgain),
        ];

        for (id, control) in controls {
            let Some(element) = document.get_element_by_id(id) else {
                log::warn!("Missing control #{}", id);
                continue;
            };
            let game = game.clone();
            listeners.add(&element, "pointerdown", move |event: Event| {
                event.prevent_default();
                game.borrow_mut().dispatch(map_control(control));
            });
        }
    }

    fn setup_resize(window: &web_sys::Window, game: Rc<RefCell<Game>>, listeners: &mut Listeners) {
        listeners.add(window, "resize", move |_event: Event| {
            game.borrow_mut()
                .session
                .resize(measure_element_width(FIELD_ELEMENT_ID));
        });
    }

    /// Pause when the page enters the back/forward cache, tear down when it unloads
    fn setup_teardown(
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
        listeners: Rc<RefCell<Listeners>>,
    ) {
        let hidden = game.clone();
        let on_hide = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            let mut g = hidden.borrow_mut();
            if let Some(handle) = g.frame_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
            match PageHide::from_persisted(persisted) {
                PageHide::Suspend => log::info!("Page cached, pausing"),
                PageHide::Teardown => {
                    listeners.borrow_mut().detach_all();
                    g.session.stop();
                }
            }
        });
        let _ =
            window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref());
        on_hide.forget();

        let on_show = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            {
                let mut g = game.borrow_mut();
                if !persisted || g.session.is_stopped() || g.frame_handle.is_some() {
                    return;
                }
                // Time spent in the cache is not game time
                g.last_time = 0.0;
            }
            log::info!("Page restored, resuming");
            request_animation_frame(game.clone());
        });
        let _ =
            window.add_event_listener_with_callback("pageshow", on_show.as_ref().unchecked_ref());
        on_show.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = game.clone();
        let callback = Closure::once_into_js(move |time: f64| {
            game_loop(next, time);
        });
        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(handle) => game.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame_handle = None;
            if g.session.is_stopped() {
                return;
            }
            g.frame(time);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Space Invaders (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    run_autopilot();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one full game with a simple aim-and-fire bot
#[cfg(not(target_arch = "wasm32"))]
fn run_autopilot() {
    use space_invaders::consts::*;
    use space_invaders::persistence::MemoryStore;
    use space_invaders::sim::{GameEvent, GamePhase};
    use space_invaders::{HighScores, Intent, Session, Settings};

    /// Frame length fed to the session
    const FRAME_MS: f64 = 50.0;
    /// Give up after ten minutes of game time
    const MAX_FRAMES: u32 = 12_000;

    let scores = HighScores::new(Box::new(MemoryStore::new()));
    let mut session = Session::new(Settings::default(), scores, Some(DEFAULT_FIELD_WIDTH));
    session.dispatch(Intent::Start);

    let mut frames = 0;
    let mut kills = 0;
    while session.state().phase == GamePhase::Playing && frames < MAX_FRAMES {
        let state = session.state();
        // Lowest invader first, leftmost on ties
        let target = state
            .invaders
            .iter()
            .max_by_key(|i| (i.pos.y, -i.pos.x))
            .map(|i| i.pos.x + INVADER_SIZE / 2);

        if let Some(aim) = target {
            let gun = state.player_x + PLAYER_GUN_OFFSET;
            if gun < aim - PLAYER_STEP / 2 {
                session.dispatch(Intent::MoveRight);
            } else if gun > aim + PLAYER_STEP / 2 {
                session.dispatch(Intent::MoveLeft);
            } else if frames.is_multiple_of(3) {
                session.dispatch(Intent::Fire);
            }
        }

        session.advance(FRAME_MS);
        kills += session
            .last_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::InvaderDestroyed { .. }))
            .count();
        frames += 1;
    }

    let state = session.state();
    log::info!(
        "Autopilot finished after {:.1}s: {:?}, level {}, {} kills, score {}, high score {}",
        frames as f64 * FRAME_MS / 1000.0,
        state.phase,
        state.level,
        kills,
        state.score,
        session.high_scores().get()
    );
    session.stop();
}
