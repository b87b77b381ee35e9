//! Browser binding
//!
//! Exposes the engine to the page and owns the `requestAnimationFrame` loop.
//! The page draws from the JSON snapshot handed to its frame callback.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::engine::Engine;
use crate::sim::{LevelCatalog, LevelData};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second module instance finds the logger already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Bunny hop engine ready");
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct Inner {
    engine: Engine,
    catalog: LevelCatalog,
    frame_id: Option<i32>,
    on_frame: Option<js_sys::Function>,
}

impl Inner {
    fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.state()).map_err(js_error)
    }
}

#[wasm_bindgen]
pub struct WebGame {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let catalog = LevelCatalog::builtin().map_err(js_error)?;
        Ok(WebGame {
            inner: Rc::new(RefCell::new(Inner {
                engine: Engine::new(),
                catalog,
                frame_id: None,
                on_frame: None,
            })),
        })
    }

    /// Called with the JSON snapshot after every frame, and once on reset
    #[wasm_bindgen(js_name = setOnFrame)]
    pub fn set_on_frame(&self, callback: Option<js_sys::Function>) {
        self.inner.borrow_mut().on_frame = callback;
    }

    #[wasm_bindgen(js_name = levelNumbers)]
    pub fn level_numbers(&self) -> Vec<u32> {
        self.inner.borrow().catalog.numbers().collect()
    }

    #[wasm_bindgen(js_name = levelInfo)]
    pub fn level_info(&self, number: u32) -> Result<String, JsValue> {
        let inner = self.inner.borrow();
        let data = inner.catalog.get(number).map_err(js_error)?;
        serde_json::to_string(data).map_err(js_error)
    }

    /// Level to offer after `number` is completed, if any
    #[wasm_bindgen(js_name = nextLevel)]
    pub fn next_level(&self, number: u32) -> Option<u32> {
        self.inner.borrow().catalog.next_after(number)
    }

    #[wasm_bindgen(js_name = loadLevel)]
    pub fn load_level(&self, number: u32) -> Result<(), JsValue> {
        cancel_frame(&self.inner);
        let mut inner = self.inner.borrow_mut();
        let Inner {
            engine, catalog, ..
        } = &mut *inner;
        engine.load_from_catalog(catalog, number).map_err(js_error)
    }

    /// Load a descriptor that is not in the built-in catalog
    #[wasm_bindgen(js_name = loadLevelJson)]
    pub fn load_level_json(&self, json: &str) -> Result<(), JsValue> {
        let data = LevelData::from_json(json).map_err(js_error)?;
        cancel_frame(&self.inner);
        self.inner.borrow_mut().engine.load_level(&data);
        Ok(())
    }

    pub fn start(&self) -> Result<(), JsValue> {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            inner.engine.start();
            if !inner.engine.wants_frame() {
                return Ok(());
            }
            inner.frame_id.is_some()
        };
        if pending {
            return Ok(());
        }
        request_frame(&self.inner)
    }

    pub fn stop(&self) {
        self.inner.borrow_mut().engine.stop();
        cancel_frame(&self.inner);
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        cancel_frame(&self.inner);
        self.inner.borrow_mut().engine.reset();
        render(&self.inner)
    }

    // === Commands ===

    #[wasm_bindgen(js_name = moveRight)]
    pub fn move_right(&self, steps: Option<f32>) {
        self.inner.borrow_mut().engine.move_right(steps.unwrap_or(1.0));
    }

    #[wasm_bindgen(js_name = moveLeft)]
    pub fn move_left(&self, steps: Option<f32>) {
        self.inner.borrow_mut().engine.move_left(steps.unwrap_or(1.0));
    }

    pub fn jump(&self) {
        self.inner.borrow_mut().engine.jump();
    }

    pub fn collect(&self) -> u32 {
        self.inner.borrow_mut().engine.collect() as u32
    }

    /// Records the wait only. The page sleeps on its side.
    pub fn wait(&self, seconds: f32) {
        self.inner.borrow_mut().engine.wait(seconds);
    }

    // === Queries ===

    /// `[x, y]` of the bunny's top-left corner
    pub fn position(&self) -> Vec<f32> {
        let pos = self.inner.borrow().engine.position();
        vec![pos.x, pos.y]
    }

    #[wasm_bindgen(js_name = carrotCount)]
    pub fn carrot_count(&self) -> u32 {
        self.inner.borrow().engine.carrot_count()
    }

    #[wasm_bindgen(js_name = moveCount)]
    pub fn move_count(&self) -> u32 {
        self.inner.borrow().engine.move_count()
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.inner.borrow().engine.current_time() as f64
    }

    #[wasm_bindgen(js_name = isOnGround)]
    pub fn is_on_ground(&self) -> bool {
        self.inner.borrow().engine.is_on_ground()
    }

    #[wasm_bindgen(js_name = canJump)]
    pub fn can_jump(&self) -> bool {
        self.inner.borrow().engine.can_jump()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().engine.is_running()
    }

    #[wasm_bindgen(js_name = levelComplete)]
    pub fn level_complete(&self) -> bool {
        self.inner.borrow().engine.level_complete()
    }

    pub fn stats(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.borrow().engine.stats()).map_err(js_error)
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.inner.borrow().snapshot()
    }
}

fn request_frame(inner: &Rc<RefCell<Inner>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let handle = Rc::clone(inner);
    let closure = Closure::once(move |_time: f64| on_animation_frame(handle));
    let id = window.request_animation_frame(closure.as_ref().unchecked_ref())?;
    closure.forget();
    inner.borrow_mut().frame_id = Some(id);
    Ok(())
}

fn cancel_frame(inner: &Rc<RefCell<Inner>>) {
    let Some(id) = inner.borrow_mut().frame_id.take() else {
        return;
    };
    if let Some(window) = web_sys::window() {
        let _ = window.cancel_animation_frame(id);
    }
}

/// Hand the snapshot to the page. The borrow is released before calling
/// out so the callback may use the game freely.
fn render(inner: &Rc<RefCell<Inner>>) -> Result<(), JsValue> {
    let (callback, json) = {
        let inner = inner.borrow();
        let Some(callback) = inner.on_frame.clone() else {
            return Ok(());
        };
        (callback, inner.snapshot()?)
    };
    callback.call1(&JsValue::NULL, &JsValue::from_str(&json))?;
    Ok(())
}

fn on_animation_frame(inner: Rc<RefCell<Inner>>) {
    {
        let mut game = inner.borrow_mut();
        game.frame_id = None;
        game.engine.tick();
    }

    if let Err(err) = render(&inner) {
        log::error!("Frame callback failed: {err:?}");
    }

    // The callback may have stopped or reset the game
    let again = {
        let game = inner.borrow();
        game.engine.wants_frame() && game.frame_id.is_none()
    };
    if again {
        if let Err(err) = request_frame(&inner) {
            log::error!("requestAnimationFrame failed: {err:?}");
        }
    }
}
