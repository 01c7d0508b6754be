//! Rift Runner - A two-realm rooftop brawler
//!
//! Core modules:
//! - `sim`: Simulation engine (skyline, physics, combat, enemy AI, waves)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player-facing preferences
//! - `highscores`: Top-5 leaderboard
//! - `platform`: Host frame clock and web bindings

pub mod error;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Structural constants (balance values live in [`tuning::Tuning`])
pub mod consts {
    /// Reference frame rate the per-tick probabilities are expressed against
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest frame delta the simulation accepts (prevents tunneling after a long pause)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Fighter bounding box
    pub const FIGHTER_WIDTH: f32 = 30.0;
    pub const FIGHTER_HEIGHT: f32 = 70.0;

    /// Distance below which a climbing fighter snaps onto its ledge
    pub const CLIMB_EPSILON: f32 = 2.0;

    /// Player entity id (enemies are numbered from 1)
    pub const PLAYER_ID: u32 = 0;
}

/// Clamp a host frame delta to the range the simulation accepts
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Convert a per-frame probability (at [`consts::REFERENCE_FPS`]) into the
/// probability for a frame of length `dt`
#[inline]
pub fn per_tick_chance(chance: f32, dt: f32) -> f32 {
    let chance = chance.clamp(0.0, 1.0);
    1.0 - (1.0 - chance).powf(dt * consts::REFERENCE_FPS)
}
