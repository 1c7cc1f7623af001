//! Browser bindings
//!
//! Frames come from requestAnimationFrame, the spawn timer from setInterval,
//! keys from a window keydown listener. The view drives everything else
//! through the exported [`WasmGame`] handle and receives snapshots as plain
//! JS objects.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Once;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{Delivery, Handle, Scheduler, deliver};
use crate::game::Game;
use crate::keymap::KeyInput;
use crate::sim::{KeyOutcome, Snapshot};
use crate::tuning::{Difficulty, Tuning};
use crate::words::WordPool;

type WeakGame = Weak<RefCell<Game<WebScheduler>>>;

static INIT: Once = Once::new();

/// Panic hook and console logger; safe to call more than once
pub fn init() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }
        log::info!("Akshar Strike core loaded");
    });
}

/// Host timestamp in ms, same time base as requestAnimationFrame
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Run `f` against the game, logging when the call could not be made
fn with_game(game: &WeakGame, f: impl FnOnce(&mut Game<WebScheduler>)) {
    if deliver(game, f) == Delivery::Busy {
        log::warn!("Game busy, callback dropped");
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_animation_frame(
    window: &web_sys::Window,
    slot: &RefCell<Option<Closure<dyn FnMut(f64)>>>,
) -> Handle {
    let Some(callback) = slot.borrow().as_ref().map(|c| c.as_ref().clone()) else {
        return 0;
    };
    window
        .request_animation_frame(callback.unchecked_ref())
        .unwrap_or_else(|e| {
            log::error!("requestAnimationFrame failed: {:?}", e);
            0
        })
}

/// Scheduler backed by the browser event loop.
///
/// The two callbacks are created once and reused for every request, so a
/// running callback is never dropped from under itself. A frame that finds
/// the game busy asks for the next frame itself; `frame_id` always holds the
/// live request, since at most one is outstanding.
pub struct WebScheduler {
    window: web_sys::Window,
    frame_id: Rc<Cell<Handle>>,
    on_frame: FrameSlot,
    on_spawn: Closure<dyn FnMut()>,
}

impl WebScheduler {
    fn new(window: web_sys::Window, game: WeakGame) -> Self {
        let frame_id = Rc::new(Cell::new(0));
        let on_frame: FrameSlot = Rc::new(RefCell::new(None));

        let frame_game = game.clone();
        let retry_window = window.clone();
        let retry_id = frame_id.clone();
        // Weak, or the closure would keep its own slot alive forever
        let retry_slot = Rc::downgrade(&on_frame);
        *on_frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            if deliver(&frame_game, |g| g.on_frame(time)) != Delivery::Busy {
                return;
            }
            log::warn!("Game busy, frame deferred");
            if let Some(slot) = retry_slot.upgrade() {
                retry_id.set(request_animation_frame(&retry_window, &slot));
            }
        }));

        let on_spawn = Closure::<dyn FnMut()>::new(move || {
            let now = now_ms();
            with_game(&game, |g| g.on_spawn_timer(now));
        });
        Self {
            window,
            frame_id,
            on_frame,
            on_spawn,
        }
    }
}

impl Scheduler for WebScheduler {
    fn request_frame(&mut self) -> Handle {
        let id = request_animation_frame(&self.window, &self.on_frame);
        self.frame_id.set(id);
        id
    }

    fn cancel_frame(&mut self, _handle: Handle) {
        // The game's handle may predate a deferred retry
        if let Err(e) = self.window.cancel_animation_frame(self.frame_id.get()) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }

    fn start_spawn_timer(&mut self, interval_ms: f64) -> Handle {
        self.window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                self.on_spawn.as_ref().unchecked_ref(),
                interval_ms as i32,
            )
            .unwrap_or_else(|e| {
                log::error!("setInterval failed: {:?}", e);
                0
            })
    }

    fn cancel_spawn_timer(&mut self, handle: Handle) {
        self.window.clear_interval_with_handle(handle);
    }
}

/// JS handle to one game session
#[wasm_bindgen]
pub struct WasmGame {
    game: Rc<RefCell<Game<WebScheduler>>>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game using the built-in word pool. Listens for keydown on
    /// the window and pauses itself when the tab is hidden or loses focus.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> Result<WasmGame, JsValue> {
        init();
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let words = WordPool::builtin().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;

        let game = Rc::new_cyclic(|weak: &WeakGame| {
            let scheduler = WebScheduler::new(window.clone(), weak.clone());
            RefCell::new(Game::new(Tuning::default(), Box::new(words), scheduler, seed))
        });

        setup_keyboard(&window, Rc::downgrade(&game))?;
        setup_auto_pause(&window, Rc::downgrade(&game))?;
        Ok(Self { game })
    }

    /// Receive every published snapshot as a JS object.
    /// The callback must not call back into this handle synchronously.
    pub fn subscribe(&self, callback: js_sys::Function) {
        let sink = move |snapshot: &Snapshot| match snapshot_to_js(snapshot) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    log::error!("Snapshot callback threw: {:?}", e);
                }
            }
            Err(e) => log::error!("Snapshot serialisation failed: {:?}", e),
        };
        self.with(|g| g.subscribe(Box::new(sink)));
    }

    /// Current snapshot on demand
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self
            .game
            .try_borrow()
            .map_err(|_| JsValue::from_str("game busy"))?
            .snapshot(now_ms());
        snapshot_to_js(&snapshot)
    }

    /// Feed a key press from an on-screen keyboard; returns whether it was used
    pub fn press_key(&self, key: &str, code: &str, shift: bool) -> bool {
        let input = KeyInput::with_code(key, code, shift);
        self.with(|g| g.on_key(&input, now_ms()))
            .is_some_and(|outcome| outcome != KeyOutcome::Ignored)
    }

    pub fn select_round(&self, round: u32) -> bool {
        self.with(|g| g.select_round(round, now_ms())).unwrap_or(false)
    }

    pub fn start(&self, difficulty: &str) -> Result<bool, JsValue> {
        let difficulty = parse_difficulty(difficulty)?;
        Ok(self.with(|g| g.start_selected(difficulty, now_ms())).unwrap_or(false))
    }

    pub fn select_round_and_start(&self, round: u32, difficulty: &str) -> Result<bool, JsValue> {
        let difficulty = parse_difficulty(difficulty)?;
        Ok(self
            .with(|g| g.select_round_and_start(round, difficulty, now_ms()))
            .unwrap_or(false))
    }

    pub fn pause(&self) -> bool {
        self.with(|g| g.pause(now_ms())).unwrap_or(false)
    }

    pub fn resume(&self) -> bool {
        self.with(|g| g.resume(now_ms())).unwrap_or(false)
    }

    pub fn toggle_pause(&self) -> bool {
        self.with(|g| g.toggle_pause(now_ms())).unwrap_or(false)
    }

    pub fn change_difficulty(&self, difficulty: &str) -> Result<bool, JsValue> {
        let difficulty = parse_difficulty(difficulty)?;
        Ok(self
            .with(|g| g.change_difficulty(difficulty, now_ms()))
            .unwrap_or(false))
    }

    pub fn continue_to_next_round(&self) -> bool {
        self.with(|g| g.continue_to_next_round(now_ms())).unwrap_or(false)
    }

    pub fn retry_round(&self) -> bool {
        self.with(|g| g.retry_round(now_ms())).unwrap_or(false)
    }

    pub fn restart_from_current_difficulty(&self) -> bool {
        self.with(|g| g.restart_from_current_difficulty(now_ms()))
            .unwrap_or(false)
    }

    pub fn go_to_round_select(&self) {
        self.with(|g| g.go_to_round_select(now_ms()));
    }

    /// Explosion animation finished
    pub fn remove_explosion(&self, id: u32) -> bool {
        self.with(|g| g.remove_explosion(id, now_ms())).unwrap_or(false)
    }

    /// Promotion banner animation finished
    pub fn hide_difficulty_up(&self) {
        self.with(|g| g.hide_difficulty_up(now_ms()));
    }
}

impl WasmGame {
    fn with<R>(&self, f: impl FnOnce(&mut Game<WebScheduler>) -> R) -> Option<R> {
        match self.game.try_borrow_mut() {
            Ok(mut g) => Some(f(&mut g)),
            Err(_) => {
                log::warn!("Game busy, call ignored");
                None
            }
        }
    }
}

fn parse_difficulty(s: &str) -> Result<Difficulty, JsValue> {
    Difficulty::from_str(s).ok_or_else(|| JsValue::from_str(&format!("unknown difficulty: {}", s)))
}

fn snapshot_to_js(snapshot: &Snapshot) -> Result<JsValue, JsValue> {
    let json = snapshot
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

fn setup_keyboard(window: &web_sys::Window, game: WeakGame) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
        let input = KeyInput {
            key: event.key(),
            code: event.code(),
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        };
        let mut used = false;
        with_game(&game, |g| used = g.on_key(&input, now_ms()) != KeyOutcome::Ignored);
        if used {
            // Keep Backspace from navigating and Escape from leaving fullscreen
            event.prevent_default();
        }
    });
    window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn setup_auto_pause(window: &web_sys::Window, game: WeakGame) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Visibility change (tab switch, minimize)
    {
        let game = game.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                with_game(&game, |g| {
                    if g.pause(now_ms()) {
                        log::info!("Auto-paused (tab hidden)");
                    }
                });
            }
        });
        document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Window blur (click outside)
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            with_game(&game, |g| {
                if g.pause(now_ms()) {
                    log::info!("Auto-paused (window blur)");
                }
            });
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}
