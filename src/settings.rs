//! Player-facing preferences
//!
//! Persisted by the host separately from high scores. Settings never change
//! the simulation directly: they produce an adjusted [`Tuning`] for new runs.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::sim::GameState;
use crate::tuning::Tuning;

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on enemy hit damage
    pub fn damage_mult(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.4,
        }
    }

    /// Multiplier on enemy attack chance
    pub fn aggression_mult(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Slowly heal while out of combat
    pub passive_regen: bool,
    /// Start a new run when the game-over countdown ends
    pub auto_restart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            passive_regen: true,
            auto_restart: true,
        }
    }
}

impl Settings {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Balance values for a new run under these settings
    pub fn apply(&self, base: &Tuning) -> Tuning {
        let mut tuning = base.clone();
        let damage = self.difficulty.damage_mult();
        let aggression = self.difficulty.aggression_mult();

        tuning.combat.enemy_punch_damage *= damage;
        tuning.combat.enemy_kick_damage *= damage;
        tuning.ai.attack_base_chance *= aggression;
        tuning.waves.aggression_base *= aggression;
        tuning.waves.aggression_per_wave *= aggression;

        if !self.passive_regen {
            tuning.player.regen_per_sec = 0.0;
        }
        tuning
    }

    /// Fresh session configured by these settings
    pub fn new_game(&self, seed: u64, base: &Tuning) -> GameState {
        let mut state = GameState::new(seed, self.apply(base));
        state.auto_restart = self.auto_restart;
        state
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_normal_leaves_tuning_alone() {
        let base = Tuning::default();
        let tuned = Settings::default().apply(&base);
        assert_eq!(tuned.combat.enemy_kick_damage, base.combat.enemy_kick_damage);
        assert_eq!(tuned.waves.aggression_base, base.waves.aggression_base);
        assert_eq!(tuned.player.regen_per_sec, base.player.regen_per_sec);
    }

    #[test]
    fn test_hard_scales_enemies() {
        let base = Tuning::default();
        let tuned = Settings::from_difficulty(Difficulty::Hard).apply(&base);
        assert!(tuned.combat.enemy_punch_damage > base.combat.enemy_punch_damage);
        assert!(tuned.ai.attack_base_chance > base.ai.attack_base_chance);
        // Player damage is never touched
        assert_eq!(tuned.combat.player_punch_damage, base.combat.player_punch_damage);
    }

    #[test]
    fn test_regen_switch_and_restart_flag() {
        let settings = Settings {
            passive_regen: false,
            auto_restart: false,
            ..Settings::default()
        };
        let state = settings.new_game(3, &Tuning::default());
        assert_eq!(state.tuning.player.regen_per_sec, 0.0);
        assert!(!state.auto_restart);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"difficulty":"Easy"}"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert!(settings.passive_regen);
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
    }
}
