//! Browser bindings
//!
//! A thin JS-facing wrapper: the page owns rendering, audio and input capture
//! and talks to the simulation through packed input bits and JSON.

use wasm_bindgen::prelude::*;

use super::{FrameClock, now_ms, seed_or_clock};
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, InputIntent, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Rift Runner core loaded");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One simulation instance driven by the page's animation frame loop
#[wasm_bindgen]
pub struct WebSim {
    state: GameState,
    clock: FrameClock,
    scores: HighScores,
    last_phase: GamePhase,
}

#[wasm_bindgen]
impl WebSim {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> WebSim {
        Self::with_settings(seed_or_clock(seed), Settings::default())
    }

    /// Build from settings JSON (as persisted by the page). A zero seed picks one from the clock.
    pub fn from_settings(seed: f64, settings_json: &str) -> Result<WebSim, JsValue> {
        let settings = Settings::from_json(settings_json).map_err(to_js)?;
        Ok(Self::with_settings(seed_or_clock(seed), settings))
    }

    /// Advance one frame. `input_bits` follows [`InputIntent::from_bits`];
    /// pass `dt <= 0` to let the wall clock decide the delta.
    pub fn tick(&mut self, input_bits: u32, dt: f32) {
        let dt = if dt > 0.0 {
            dt
        } else {
            self.clock.advance(now_ms())
        };
        tick(&mut self.state, &InputIntent::from_bits(input_bits), dt);

        if self.state.phase == GamePhase::GameOver && self.last_phase != GamePhase::GameOver {
            if let Some(run) = self.state.last_run {
                self.scores.add_score(run, now_ms());
            }
        }
        self.last_phase = self.state.phase;
    }

    pub fn restart(&mut self) {
        self.state.reset();
        self.clock.reset();
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.snapshot()).map_err(to_js)
    }

    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.drain_events()).map_err(to_js)
    }

    pub fn buildings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.skylines).map_err(to_js)
    }

    pub fn load_scores(&mut self, json: &str) -> Result<(), JsValue> {
        self.scores = HighScores::from_json(json).map_err(to_js)?;
        Ok(())
    }

    pub fn scores_json(&self) -> Result<String, JsValue> {
        self.scores.to_json().map_err(to_js)
    }
}

impl WebSim {
    fn with_settings(seed: u64, settings: Settings) -> WebSim {
        let mut state = settings.new_game(seed, &Tuning::default());
        state.start();
        log::info!("Game initialized with seed: {}", seed);
        WebSim {
            state,
            clock: FrameClock::new(),
            scores: HighScores::new(),
            last_phase: GamePhase::Running,
        }
    }
}
