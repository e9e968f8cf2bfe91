//! The game engine's control surface, as seen from the overlay.

use wasm_bindgen::prelude::*;

use tetribass_core::prompt::EngineControls;

#[wasm_bindgen]
extern "C" {
    /// Controls object published by the game engine.
    pub type GameEngine;

    #[wasm_bindgen(method, js_name = startFirstGame)]
    fn start_first_game(this: &GameEngine);

    #[wasm_bindgen(method, js_name = togglePause)]
    fn toggle_pause(this: &GameEngine);

    #[wasm_bindgen(method, js_name = restartGame)]
    fn restart_game(this: &GameEngine);

    #[wasm_bindgen(method, js_name = toggleGrid)]
    fn toggle_grid(this: &GameEngine);
}

/// [`EngineControls`] forwarding to the JS engine object.
pub struct JsEngine(GameEngine);

impl JsEngine {
    #[must_use]
    pub const fn new(engine: GameEngine) -> Self {
        Self(engine)
    }
}

impl std::fmt::Debug for JsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsEngine")
    }
}

impl EngineControls for JsEngine {
    fn start_first_game(&mut self) {
        self.0.start_first_game();
    }

    fn toggle_pause(&mut self) {
        self.0.toggle_pause();
    }

    fn restart(&mut self) {
        self.0.restart_game();
    }

    fn toggle_grid(&mut self) {
        self.0.toggle_grid();
    }
}
