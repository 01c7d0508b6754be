//! Wave director: spawn queue, difficulty curve, pacing and clear detection

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::skyline;
use super::state::{EnemyTraits, EnemyVariant, Fighter, GameEvent, Skylines};
use crate::tuning::{Tuning, WaveTuning};

/// An enemy waiting in the spawn queue, stats already rolled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEnemy {
    pub variant: EnemyVariant,
    pub max_hp: f32,
    pub speed: f32,
    pub damage_mult: f32,
    pub aggression: f32,
}

/// Number of enemies in wave `n`
pub fn wave_size(n: u32, tuning: &WaveTuning) -> u32 {
    tuning.base_count + (n as f32 * tuning.count_per_wave).floor() as u32
}

/// Chance a non-boss slot rolls elite in wave `n`
pub fn elite_chance(n: u32, tuning: &WaveTuning) -> f32 {
    (tuning.elite_base_chance + tuning.elite_chance_per_wave * n as f32)
        .min(tuning.elite_chance_cap)
        .clamp(0.0, 1.0)
}

/// Seconds until the next dequeue in wave `n`
pub fn spawn_delay(n: u32, tuning: &WaveTuning, rng: &mut impl Rng) -> f32 {
    let base = (tuning.spawn_delay_base - tuning.spawn_delay_step * n as f32)
        .max(tuning.spawn_delay_floor);
    let jitter = if tuning.spawn_jitter > 0.0 {
        rng.random_range(0.0..tuning.spawn_jitter)
    } else {
        0.0
    };
    base + jitter
}

/// Roll every enemy for wave `n` (boss, if any, is last)
pub fn roll_wave(n: u32, tuning: &WaveTuning, rng: &mut impl Rng) -> Vec<PendingEnemy> {
    let count = wave_size(n, tuning);
    let boss_wave = n > 0 && n.is_multiple_of(tuning.boss_every.max(1));
    let elite_p = elite_chance(n, tuning) as f64;

    let hp_mult = 1.0 + tuning.hp_scale * n as f32;
    let speed_mult = (1.0 + tuning.speed_scale * n as f32).min(tuning.speed_cap);
    let damage_mult = 1.0 + tuning.damage_scale * n as f32;
    let aggression = tuning.aggression_base + tuning.aggression_per_wave * n as f32;

    (0..count)
        .map(|slot| {
            let variant = if boss_wave && slot + 1 == count {
                EnemyVariant::Boss
            } else if rng.random_bool(elite_p) {
                EnemyVariant::Elite
            } else {
                EnemyVariant::Grunt
            };
            let base = tuning.stats(variant);
            PendingEnemy {
                variant,
                max_hp: base.hp * hp_mult,
                speed: base.speed * speed_mult,
                damage_mult,
                aggression,
            }
        })
        .collect()
}

/// Spawn queue and wave progression
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveDirector {
    /// Current wave (0 before the first wave is queued)
    pub wave: u32,
    pub pending: VecDeque<PendingEnemy>,
    /// Seconds until the next enemy leaves the queue
    pub spawn_timer: f32,
    /// Rest remaining after a clear; the next wave is queued when it runs out
    pub breather: Option<f32>,
    pub wave_total: u32,
    next_id: u32,
}

impl WaveDirector {
    /// Populate the pending queue for wave `n`
    pub fn queue_wave(
        &mut self,
        n: u32,
        tuning: &WaveTuning,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        let rolled = roll_wave(n, tuning, rng);
        let bosses = rolled.iter().filter(|e| e.variant == EnemyVariant::Boss).count();
        log::info!("Wave {}: {} enemies ({} boss)", n, rolled.len(), bosses);

        self.wave = n;
        self.wave_total = rolled.len() as u32;
        self.pending = rolled.into();
        self.spawn_timer = 0.0;
        self.breather = None;
        events.push(GameEvent::WaveStarted {
            wave: n,
            enemies: self.wave_total,
        });
    }

    /// Whether the wave has been cleared and we are resting
    pub fn in_breather(&self) -> bool {
        self.breather.is_some()
    }

    fn allocate_id(&mut self) -> u32 {
        // Player owns id 0
        self.next_id = self.next_id.max(crate::consts::PLAYER_ID + 1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build a live enemy from a queue entry, on a roof near the player
    pub fn spawn(
        &mut self,
        pending: &PendingEnemy,
        player: &Fighter,
        skylines: &Skylines,
        tuning: &Tuning,
        rng: &mut impl Rng,
    ) -> Fighter {
        let same_realm = rng.random_bool(tuning.waves.same_realm_chance.clamp(0.0, 1.0) as f64);
        let realm = if same_realm {
            player.realm
        } else {
            player.realm.other()
        };
        let size = player.size;
        let pos = skyline::safe_spawn_near(
            skylines.get(realm),
            tuning.world.floor_y,
            size,
            player.center().x,
            tuning.waves.spawn_distance,
            rng,
        );

        let traits = EnemyTraits {
            variant: pending.variant,
            speed: pending.speed,
            damage_mult: pending.damage_mult,
            aggression: pending.aggression,
            awake: false,
        };
        let mut enemy = Fighter::enemy(self.allocate_id(), pos, realm, pending.max_hp, traits);
        enemy.grounded = true;
        enemy.facing_right = player.center().x > enemy.center().x;

        if pending.variant == EnemyVariant::Boss {
            log::info!("Boss {} entered the {} realm", enemy.id, realm.as_str());
        }
        enemy
    }

    /// Advance spawn pacing and wave-clear detection by `dt`
    pub fn update(
        &mut self,
        dt: f32,
        player: &Fighter,
        enemies: &mut Vec<Fighter>,
        skylines: &Skylines,
        tuning: &Tuning,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        if self.wave == 0 {
            return;
        }

        if let Some(rest) = self.breather {
            let rest = (rest - dt).max(0.0);
            // Next wave only once the arena is empty
            if rest <= 0.0 && enemies.is_empty() {
                self.queue_wave(self.wave + 1, &tuning.waves, rng, events);
            } else {
                self.breather = Some(rest);
            }
            return;
        }

        if !self.pending.is_empty() {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0
                && let Some(next) = self.pending.pop_front()
            {
                let enemy = self.spawn(&next, player, skylines, tuning, rng);
                enemies.push(enemy);
                self.spawn_timer = spawn_delay(self.wave, &tuning.waves, rng);
            }
        }

        if self.pending.is_empty() && enemies.iter().all(|e| !e.is_alive()) {
            log::info!("Wave {} cleared", self.wave);
            events.push(GameEvent::WaveCleared { wave: self.wave });
            self.breather = Some(tuning.waves.breather);
        }
    }
}

/// Update an enemy's sleep state from its distance to the player.
/// Returns the new state on a transition.
pub fn update_wake(enemy: &mut Fighter, player: &Fighter, tuning: &WaveTuning) -> Option<bool> {
    let distance = enemy.center().distance(player.center());
    let traits = enemy.enemy_traits_mut()?;

    let awake = if traits.awake {
        distance <= tuning.sleep_distance
    } else {
        distance <= tuning.wake_distance
    };
    if awake == traits.awake {
        return None;
    }
    traits.awake = awake;
    if !awake {
        enemy.vel.x = 0.0;
    }
    log::debug!(
        "Enemy {} {} at {:.0}px",
        enemy.id,
        if awake { "woke" } else { "fell asleep" },
        distance
    );
    Some(awake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Realm;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wave_size_grows() {
        let tuning = WaveTuning::default();
        assert_eq!(wave_size(1, &tuning), 3);
        assert_eq!(wave_size(3, &tuning), 6);
        assert_eq!(wave_size(10, &tuning), 17);
    }

    #[test]
    fn test_boss_only_on_boss_waves_and_last() {
        let tuning = WaveTuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        for n in 1..=12 {
            let wave = roll_wave(n, &tuning, &mut rng);
            let bosses: Vec<_> = wave
                .iter()
                .enumerate()
                .filter(|(_, e)| e.variant == EnemyVariant::Boss)
                .map(|(i, _)| i)
                .collect();
            if n % 3 == 0 {
                assert_eq!(bosses, vec![wave.len() - 1]);
            } else {
                assert!(bosses.is_empty());
            }
        }
    }

    #[test]
    fn test_scaling_curves() {
        let tuning = WaveTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let wave = roll_wave(10, &tuning, &mut rng);
        for e in &wave {
            let base = tuning.stats(e.variant);
            assert!((e.max_hp - base.hp * 1.5).abs() < 1e-3);
            assert!((e.speed - base.speed * 1.4).abs() < 1e-3);
            assert!((e.damage_mult - 2.0).abs() < 1e-5);
            assert!((e.aggression - 0.03).abs() < 1e-6);
        }

        // Speed multiplier caps
        let late = roll_wave(100, &tuning, &mut rng);
        let base = tuning.stats(late[0].variant);
        assert!((late[0].speed - base.speed * 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_spawn_delay_floor() {
        let tuning = WaveTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for n in 0..40 {
            let d = spawn_delay(n, &tuning, &mut rng);
            assert!(d >= tuning.spawn_delay_floor);
            assert!(d < tuning.spawn_delay_base + tuning.spawn_jitter);
        }
    }

    #[test]
    fn test_queue_wave_emits_start() {
        let tuning = WaveTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let mut director = WaveDirector::default();
        director.queue_wave(3, &tuning, &mut rng, &mut events);
        assert_eq!(director.wave, 3);
        assert_eq!(director.pending.len(), 6);
        assert_eq!(events, vec![GameEvent::WaveStarted { wave: 3, enemies: 6 }]);
    }

    #[test]
    fn test_wake_hysteresis() {
        let tuning = WaveTuning::default();
        let player = Fighter::player(Vec2::ZERO, Realm::Normal, 100.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let pending = &roll_wave(1, &tuning, &mut rng)[0];
        let traits = EnemyTraits {
            variant: pending.variant,
            speed: pending.speed,
            damage_mult: 1.0,
            aggression: 0.0,
            awake: false,
        };
        let mut enemy = Fighter::enemy(1, Vec2::new(1200.0, 0.0), Realm::Normal, 100.0, traits);

        assert_eq!(update_wake(&mut enemy, &player, &tuning), None);
        enemy.pos.x = 900.0;
        assert_eq!(update_wake(&mut enemy, &player, &tuning), Some(true));
        // Between wake and sleep distance: stays awake
        enemy.pos.x = 1200.0;
        enemy.vel.x = 100.0;
        assert_eq!(update_wake(&mut enemy, &player, &tuning), None);
        enemy.pos.x = 1500.0;
        assert_eq!(update_wake(&mut enemy, &player, &tuning), Some(false));
        assert_eq!(enemy.vel.x, 0.0);
    }
}
