//! TetriBASS Web - Browser bindings for the prompt overlay.
//!
//! Connects [`tetribass_core::prompt::PromptController`] to the page: the
//! `document` key and visibility listeners, clicks on the `#prompt` overlay,
//! the game engine's controls, and score reporting for signed-in players.
//!
//! # Building
//!
//! ```bash
//! wasm-pack build crates/web --target web --out-dir ../server/static/pkg
//! ```
//!
//! `static/js/boot.js` loads the module and mounts it once the engine has
//! published its controls as `window.tetribassEngine`.

// wasm-bindgen expands exports and imports into unsafe glue
#![allow(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use tetribass_core::prompt::{ActiveController, AuthAffordance, PromptController, PromptEvent};

pub mod document;
pub mod engine;
pub mod overlay;
pub mod scores;

use document::{BrowserDocument, DomListener};
use engine::{GameEngine, JsEngine};
use overlay::Overlay;

/// Id of the game shell; carries `data-signed-in`.
pub const GAME_ID: &str = "game";

type SharedController = Rc<RefCell<PromptController<JsEngine>>>;

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default();
}

/// A mounted overlay. Dropping it (or calling `free()` from JS) detaches
/// every listener.
#[wasm_bindgen]
pub struct GameShell {
    controller: SharedController,
    signed_in: bool,
    _clicks: DomListener,
    _document: ActiveController<'static, BrowserDocument>,
}

#[wasm_bindgen]
impl GameShell {
    /// Take over the overlay rendered by the server and drive `engine`.
    ///
    /// Mount once per page: the document listener registry lives for the
    /// rest of the page.
    ///
    /// # Errors
    ///
    /// Fails if the page is missing the game shell or listeners cannot be
    /// attached.
    pub fn mount(engine: GameEngine) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let signed_in = document
            .get_element_by_id(GAME_ID)
            .and_then(|game| game.get_attribute("data-signed-in"))
            .is_some_and(|value| value == "true");
        let auth = if signed_in {
            AuthAffordance::LogOut
        } else {
            AuthAffordance::LogIn
        };

        let overlay = Overlay::find(&document, auth)?;
        let controller: SharedController =
            Rc::new(RefCell::new(PromptController::new(JsEngine::new(engine))));

        let on_change = overlay.clone();
        controller
            .borrow_mut()
            .on_change(move |state| on_change.render(state));

        let on_click = Rc::clone(&controller);
        let clicks = DomListener::attach(overlay.element(), "click", move |event| {
            let Some(action) = overlay::clicked_action(&event) else {
                return;
            };
            let Some(event) = PromptEvent::from_action(&action) else {
                return;
            };
            if let Ok(mut controller) = on_click.try_borrow_mut() {
                controller.dispatch(event);
            }
        })?;

        let events: &'static BrowserDocument = Box::leak(Box::new(BrowserDocument::new(document)));
        let listeners = PromptController::activate(&controller, events);

        overlay.render(controller.borrow().state());
        tracing::debug!(signed_in, "Prompt overlay mounted");

        Ok(Self {
            controller,
            signed_in,
            _clicks: clicks,
            _document: listeners,
        })
    }

    /// Feed the engine's state after each update.
    ///
    /// When this report ends a game of a signed-in player, `points` is
    /// recorded. Reports made from inside an engine control are applied once
    /// that control returns.
    #[wasm_bindgen(js_name = reportEngine)]
    pub fn report_engine(&self, is_over: bool, points: u32) {
        if apply_report(&self.controller, self.signed_in, is_over, points) {
            return;
        }

        let controller = Rc::clone(&self.controller);
        let signed_in = self.signed_in;
        spawn_local(async move {
            if !apply_report(&controller, signed_in, is_over, points) {
                tracing::warn!(is_over, "Dropped engine report");
            }
        });
    }
}

fn apply_report(controller: &SharedController, signed_in: bool, is_over: bool, points: u32) -> bool {
    let Ok(mut controller) = controller.try_borrow_mut() else {
        return false;
    };
    let before = controller.state().phase();
    let after = controller.report_engine(is_over);
    drop(controller);

    if signed_in && scores::finished_game(before, after) {
        spawn_local(async move {
            match scores::record(points).await {
                Ok(history) => {
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        scores::show_history(&document, &history);
                    }
                }
                Err(error) => tracing::warn!(%error, points, "Failed to record score"),
            }
        });
    }

    true
}
