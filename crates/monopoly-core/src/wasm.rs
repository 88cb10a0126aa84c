//! WebAssembly bindings for the game engine.
//!
//! The browser drives the clock with `requestAnimationFrame` and exchanges
//! commands, events and snapshots as JSON strings.

use wasm_bindgen::prelude::*;

use crate::actions::Command;
use crate::config::GameConfig;
use crate::game::GameState;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game waiting for the player count. An empty config string
    /// uses the default rules.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed: Option<u64>) -> Result<WasmGame, JsValue> {
        let config = if config_json.trim().is_empty() {
            GameConfig::default()
        } else {
            GameConfig::from_json_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let state = match seed {
            Some(seed) => GameState::new(config, seed),
            None => GameState::new_random(config),
        };
        Ok(WasmGame { state })
    }

    /// Apply a command from JSON right away, returns events JSON or error
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, command_json: &str) -> Result<String, JsValue> {
        let command: Command = serde_json::from_str(command_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid command JSON: {}", e)))?;

        match self.state.apply_command(command) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Command failed: {}", e))),
        }
    }

    /// Queue a command for the next tick
    #[wasm_bindgen(js_name = enqueueCommand)]
    pub fn enqueue_command(&mut self, command_json: &str) -> Result<(), JsValue> {
        let command: Command = serde_json::from_str(command_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid command JSON: {}", e)))?;
        self.state.enqueue(command);
        Ok(())
    }

    /// Advance one tick, returns events JSON
    pub fn tick(&mut self) -> String {
        let events = self.state.tick();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Get everything needed to draw a frame as JSON
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get valid commands as JSON array
    #[wasm_bindgen(js_name = getValidCommands)]
    pub fn get_valid_commands(&self) -> String {
        serde_json::to_string(&self.state.valid_commands()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Get the winner (if game is finished)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.state.get_winner()
    }

    /// Seed used for this game, for replays
    #[wasm_bindgen(js_name = getSeed)]
    pub fn get_seed(&self) -> u64 {
        self.state.seed()
    }
}
