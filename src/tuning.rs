//! Data-driven game balance
//!
//! Every balance knob the simulation reads lives here. `Tuning::default()` is
//! the canonical ruleset; a JSON file may override any subset of it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::EnemyVariant;

/// Inclusive-exclusive range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample; a degenerate span returns `min`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

/// World geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Y of the ground the skyline stands on (also the kill plane)
    pub floor_y: f32,
    /// How far below `floor_y` a fighter may fall before it counts as dead
    pub pit_margin: f32,
    /// Camera follow rate (1/s)
    pub camera_follow: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            floor_y: 800.0,
            pit_margin: 200.0,
            camera_follow: 8.0,
        }
    }
}

/// Physics stepper constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    /// Fraction of remaining climb distance covered per second
    pub climb_rate: f32,
    /// Max fall speed while pressed against a wall
    pub wall_slide_speed: f32,
    /// Ledge-grab band: feet between `top - ledge_above` and `top + ledge_below`
    pub ledge_above: f32,
    pub ledge_below: f32,
    /// Horizontal distance from a wall face that counts as "at the edge"
    pub edge_tolerance: f32,
    /// Feet must be this far below a roof before the face counts as a wall
    pub wall_contact_depth: f32,
    /// Landing snaps when feet cross a roof by less than this
    pub landing_window: f32,
    /// Horizontal inset on roof edges for landing
    pub landing_inset: f32,
    /// How far onto the roof a finished climb places the fighter
    pub mantle_inset: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            climb_rate: 6.0,
            wall_slide_speed: 50.0,
            ledge_above: 10.0,
            ledge_below: 60.0,
            edge_tolerance: 12.0,
            wall_contact_depth: 10.0,
            landing_window: 40.0,
            landing_inset: 2.0,
            mantle_inset: 4.0,
        }
    }
}

/// Player movement and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    /// Upward speed is cut to this when jump is released early
    pub jump_cut_velocity: f32,
    /// Exponential horizontal damping on the ground (1/s)
    pub ground_friction: f32,
    /// Exponential horizontal damping in the air (1/s)
    pub air_friction: f32,
    pub rift_cooldown: f32,
    /// Seconds without damage before passive regeneration starts
    pub regen_delay: f32,
    pub regen_per_sec: f32,
    /// Game-over countdown before the session resets
    pub respawn_countdown: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            move_speed: 450.0,
            jump_velocity: -850.0,
            jump_cut_velocity: -300.0,
            ground_friction: 12.0,
            air_friction: 2.0,
            rift_cooldown: 1.0,
            regen_delay: 4.0,
            regen_per_sec: 4.0,
            respawn_countdown: 5.0,
        }
    }
}

/// Combat resolver constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Hitbox length in front of the attacker's leading edge
    pub punch_reach: f32,
    pub kick_reach: f32,
    /// Attack window durations (seconds)
    pub punch_window: f32,
    pub kick_window: f32,
    pub player_punch_damage: f32,
    pub player_kick_damage: f32,
    /// Enemy base damage, multiplied by the attacker's damage multiplier
    pub enemy_punch_damage: f32,
    pub enemy_kick_damage: f32,
    /// Hit-stun applied to a player victim
    pub player_stun: f32,
    /// Hit-stun applied to an enemy victim
    pub enemy_stun: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub hit_anim: f32,
    pub death_anim: f32,
    pub death_fade: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            punch_reach: 40.0,
            kick_reach: 55.0,
            punch_window: 0.30,
            kick_window: 0.45,
            player_punch_damage: 10.0,
            player_kick_damage: 15.0,
            enemy_punch_damage: 6.0,
            enemy_kick_damage: 9.0,
            player_stun: 0.25,
            enemy_stun: 0.45,
            knockback_x: 260.0,
            knockback_y: -220.0,
            hit_anim: 0.2,
            death_anim: 0.8,
            death_fade: 0.8,
        }
    }
}

/// Enemy decision constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub sight_range: f32,
    /// Melee engagement box (absolute dx / dy between fighter origins)
    pub melee_dx: f32,
    pub melee_dy: f32,
    /// Per-frame attack chance before the aggression term
    pub attack_base_chance: f32,
    /// HP fraction under which elites and bosses turn evasive
    pub low_hp_fraction: f32,
    /// Evasive enemies shadow the target only within this distance
    pub evasive_cutoff: f32,
    /// No horizontal input when this close to the target's X
    pub move_deadzone: f32,
    pub look_ahead: f32,
    /// Roof counts as "underfoot ahead" when within this of the feet
    pub platform_tolerance: f32,
    /// Jump a wall ahead when the target is at least this far below
    pub wall_jump_dy: f32,
    pub random_jump_chance: f32,
    /// Release a climb when the target is at least this far below
    pub climb_release_dy: f32,
    pub rift_cooldown: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            sight_range: 800.0,
            melee_dx: 30.0,
            melee_dy: 50.0,
            attack_base_chance: 0.01,
            low_hp_fraction: 0.3,
            evasive_cutoff: 300.0,
            move_deadzone: 30.0,
            look_ahead: 20.0,
            platform_tolerance: 25.0,
            wall_jump_dy: 50.0,
            random_jump_chance: 0.005,
            climb_release_dy: 100.0,
            rift_cooldown: 2.5,
        }
    }
}

/// Base stats for one enemy variant (before wave scaling)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VariantStats {
    pub hp: f32,
    pub speed: f32,
    pub score: u64,
}

/// Wave director constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub base_count: u32,
    pub count_per_wave: f32,
    /// Every n-th wave ends with a boss
    pub boss_every: u32,
    pub elite_base_chance: f32,
    pub elite_chance_per_wave: f32,
    pub elite_chance_cap: f32,
    pub hp_scale: f32,
    pub speed_scale: f32,
    pub speed_cap: f32,
    pub damage_scale: f32,
    pub aggression_base: f32,
    pub aggression_per_wave: f32,
    pub spawn_delay_base: f32,
    pub spawn_delay_step: f32,
    pub spawn_delay_floor: f32,
    pub spawn_jitter: f32,
    /// Rest between a cleared wave and the next one
    pub breather: f32,
    pub wake_distance: f32,
    pub sleep_distance: f32,
    /// Horizontal distance window (from the player) for spawn points
    pub spawn_distance: Span,
    /// Chance an enemy spawns in the player's realm
    pub same_realm_chance: f32,
    pub grunt: VariantStats,
    pub elite: VariantStats,
    pub boss: VariantStats,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            base_count: 2,
            count_per_wave: 1.5,
            boss_every: 3,
            elite_base_chance: 0.10,
            elite_chance_per_wave: 0.02,
            elite_chance_cap: 0.5,
            hp_scale: 0.05,
            speed_scale: 0.04,
            speed_cap: 2.5,
            damage_scale: 0.10,
            aggression_base: 0.01,
            aggression_per_wave: 0.002,
            spawn_delay_base: 1.6,
            spawn_delay_step: 0.1,
            spawn_delay_floor: 0.4,
            spawn_jitter: 0.6,
            breather: 3.0,
            wake_distance: 1000.0,
            sleep_distance: 1400.0,
            spawn_distance: Span::new(350.0, 900.0),
            same_realm_chance: 0.7,
            grunt: VariantStats { hp: 100.0, speed: 220.0, score: 100 },
            elite: VariantStats { hp: 200.0, speed: 260.0, score: 250 },
            boss: VariantStats { hp: 500.0, speed: 200.0, score: 1000 },
        }
    }
}

impl WaveTuning {
    pub fn stats(&self, variant: EnemyVariant) -> VariantStats {
        match variant {
            EnemyVariant::Grunt => self.grunt,
            EnemyVariant::Elite => self.elite,
            EnemyVariant::Boss => self.boss,
        }
    }
}

/// Skyline generator constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkylineTuning {
    /// Minimum number of buildings per realm
    pub count: u32,
    /// Keep appending buildings until the layout is at least this long
    pub min_span: f32,
    pub gap_chance: f32,
    pub gap: Span,
    pub width: Span,
    pub height: Span,
    /// Random alley between adjacent buildings
    pub spacing: Span,
}

impl Default for SkylineTuning {
    fn default() -> Self {
        Self {
            count: 50,
            min_span: 8000.0,
            gap_chance: 0.2,
            gap: Span::new(100.0, 200.0),
            width: Span::new(100.0, 300.0),
            height: Span::new(100.0, 400.0),
            spacing: Span::new(0.0, 20.0),
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub combat: CombatTuning,
    pub ai: AiTuning,
    pub waves: WaveTuning,
    pub skyline: SkylineTuning,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidTuning {
        field,
        reason: reason.into(),
    }
}

fn check_span(field: &'static str, span: &Span) -> Result<()> {
    if !(span.min.is_finite() && span.max.is_finite()) || span.min > span.max {
        return Err(invalid(field, format!("bad range {}..{}", span.min, span.max)));
    }
    Ok(())
}

fn check_chance(field: &'static str, p: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(field, format!("{p} is not a probability")));
    }
    Ok(())
}

fn check_positive(field: &'static str, v: f32) -> Result<()> {
    if !(v.is_finite() && v > 0.0) {
        return Err(invalid(field, format!("{v} must be positive")));
    }
    Ok(())
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        if let Err(e) = tuning.validate() {
            log::warn!("Rejected tuning override: {}", e);
            return Err(e);
        }
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        check_positive("world.floor_y", self.world.floor_y)?;
        check_positive("world.pit_margin", self.world.pit_margin)?;
        check_positive("physics.gravity", self.physics.gravity)?;
        check_positive("physics.climb_rate", self.physics.climb_rate)?;
        check_positive("player.max_hp", self.player.max_hp)?;
        check_positive("player.move_speed", self.player.move_speed)?;
        if self.player.jump_velocity >= 0.0 {
            return Err(invalid("player.jump_velocity", "must point upward (negative)"));
        }
        check_positive("combat.punch_window", self.combat.punch_window)?;
        check_positive("combat.kick_window", self.combat.kick_window)?;
        check_chance("ai.attack_base_chance", self.ai.attack_base_chance)?;
        check_chance("ai.random_jump_chance", self.ai.random_jump_chance)?;
        check_chance("ai.low_hp_fraction", self.ai.low_hp_fraction)?;
        check_chance("waves.elite_chance_cap", self.waves.elite_chance_cap)?;
        check_chance("waves.same_realm_chance", self.waves.same_realm_chance)?;
        check_chance("skyline.gap_chance", self.skyline.gap_chance)?;
        if self.waves.boss_every == 0 {
            return Err(invalid("waves.boss_every", "must be at least 1"));
        }
        if self.waves.wake_distance > self.waves.sleep_distance {
            return Err(invalid(
                "waves.sleep_distance",
                "must not be smaller than wake_distance",
            ));
        }
        if self.skyline.count == 0 {
            return Err(invalid("skyline.count", "must be at least 1"));
        }
        check_span("waves.spawn_distance", &self.waves.spawn_distance)?;
        check_span("skyline.gap", &self.skyline.gap)?;
        check_span("skyline.width", &self.skyline.width)?;
        check_span("skyline.height", &self.skyline.height)?;
        check_span("skyline.spacing", &self.skyline.spacing)?;
        check_positive("skyline.width.min", self.skyline.width.min)?;
        check_positive("skyline.height.min", self.skyline.height.min)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{ "physics": { "gravity": 1500.0 } }"#).unwrap();
        assert_eq!(tuning.physics.gravity, 1500.0);
        // Untouched values keep their defaults
        assert_eq!(tuning.physics.climb_rate, 6.0);
        assert_eq!(tuning.player.max_hp, 100.0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = Tuning::from_json(r#"{ "skyline": { "width": { "min": 300.0, "max": 100.0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTuning { field: "skyline.width", .. }));
    }

    #[test]
    fn test_wake_sleep_hysteresis_enforced() {
        let mut tuning = Tuning::default();
        tuning.waves.sleep_distance = tuning.waves.wake_distance - 1.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(Error::Json(_))));
    }
}
