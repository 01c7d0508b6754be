//! Per-frame simulation tick
//!
//! Advances the game by one host frame in a fixed order: player input, player
//! physics, camera, enemy AI, enemy physics, reaping, wave director,
//! regeneration, player death.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai::{self, BotIntent};
use super::anim::advance_lifecycle;
use super::combat::resolve_hit;
use super::physics::{self, StepOutcome};
use super::state::{
    AttackKind, DeathCause, Fighter, GameEvent, GameOverSummary, GamePhase, GameState, Life,
};
use super::waves::update_wake;
use crate::clamp_dt;
use crate::tuning::{PlayerTuning, Tuning};

/// Aggression the demo pilot fights with
const DEMO_AGGRESSION: f32 = 0.15;
/// Share of run speed a fighter keeps when hopping off a wall
const WALL_HOP_FRACTION: f32 = 0.5;

/// Flat input state for one frame, filled in by the host's input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub left: bool,
    pub right: bool,
    /// Jump pressed this frame
    pub jump: bool,
    /// Jump still held (releasing early cuts the jump short)
    pub jump_held: bool,
    pub punch: bool,
    pub punch_held: bool,
    pub kick: bool,
    pub kick_held: bool,
    pub realm_switch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode: the enemy AI drives the player
    pub demo: bool,
}

impl InputIntent {
    /// Decode a packed bitfield, bit 0 = `left` through bit 10 = `demo` in field order
    pub fn from_bits(bits: u32) -> Self {
        let bit = |n: u32| bits & (1 << n) != 0;
        Self {
            left: bit(0),
            right: bit(1),
            jump: bit(2),
            jump_held: bit(3),
            punch: bit(4),
            punch_held: bit(5),
            kick: bit(6),
            kick_held: bit(7),
            realm_switch: bit(8),
            pause: bit(9),
            demo: bit(10),
        }
    }

    fn controls(&self) -> Controls {
        let attack = if self.punch || self.punch_held {
            Some(AttackKind::Punch)
        } else if self.kick || self.kick_held {
            Some(AttackKind::Kick)
        } else {
            None
        };
        Controls {
            left: self.left,
            right: self.right,
            jump: self.jump,
            jump_held: self.jump_held,
            attack,
            realm_switch: self.realm_switch,
        }
    }
}

/// Controls shared by the human player and AI-driven fighters
#[derive(Debug, Clone, Copy, Default)]
struct Controls {
    left: bool,
    right: bool,
    jump: bool,
    jump_held: bool,
    attack: Option<AttackKind>,
    realm_switch: bool,
}

impl From<BotIntent> for Controls {
    fn from(intent: BotIntent) -> Self {
        let attack = if intent.punch {
            Some(AttackKind::Punch)
        } else if intent.kick {
            Some(AttackKind::Kick)
        } else {
            None
        };
        Self {
            left: intent.left,
            right: intent.right,
            jump: intent.jump,
            // Bots never release jump early
            jump_held: true,
            attack,
            realm_switch: intent.realm_switch,
        }
    }
}

/// Advance the game by one host frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &InputIntent, dt: f32) {
    let dt = clamp_dt(dt);

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                log::debug!("Paused at t={:.2}", state.now);
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Running,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Idle | GamePhase::Paused => return,
        GamePhase::GameOver => {
            game_over_tick(state, dt);
            return;
        }
        GamePhase::Running => {}
    }

    state.now += dt as f64;
    state.time_ticks += 1;

    let controls = if input.demo {
        demo_controls(state, dt)
    } else {
        input.controls()
    };

    step_player(state, controls, dt);
    follow_camera(state, dt);
    run_enemy_ai(state, dt);
    step_enemies(state, dt);
    reap(state);

    let GameState {
        director,
        player,
        enemies,
        skylines,
        tuning,
        rng,
        events,
        ..
    } = state;
    director.update(dt, player, enemies, skylines, tuning, rng, events);

    regenerate(state, dt);
    check_player_death(state);
    state.normalize_order();
}

fn apply_friction(f: &mut Fighter, tuning: &PlayerTuning, dt: f32) {
    let rate = if f.grounded {
        tuning.ground_friction
    } else {
        tuning.air_friction
    };
    f.vel.x *= (-rate * dt).exp();
    if f.vel.x.abs() < 1.0 {
        f.vel.x = 0.0;
    }
}

/// Apply one fighter's controls. Returns the attack opened this frame, if any.
#[allow(clippy::too_many_arguments)]
fn drive(
    f: &mut Fighter,
    c: Controls,
    speed: f32,
    rift_cooldown: f32,
    now: f64,
    dt: f32,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> Option<AttackKind> {
    if !f.is_alive() {
        apply_friction(f, &tuning.player, dt);
        return None;
    }

    // Stun swallows every voluntary input, rift included
    if f.is_stunned(now) {
        apply_friction(f, &tuning.player, dt);
        return None;
    }

    if c.realm_switch && f.rift_ready(now, rift_cooldown) {
        f.switch_realm(now);
        log::debug!("Fighter {} switched to the {} realm", f.id, f.realm.as_str());
        events.push(GameEvent::RealmSwitched {
            id: f.id,
            realm: f.realm,
        });
    }

    if let Some(climb) = f.climb {
        if c.jump {
            // Hop off the wall, facing away from it so we don't re-grab
            f.climb = None;
            f.facing_right = climb.mantle_x < climb.lock_x;
            let away = if f.facing_right { 1.0 } else { -1.0 };
            f.vel = Vec2::new(
                away * speed * WALL_HOP_FRACTION,
                tuning.player.jump_cut_velocity,
            );
            events.push(GameEvent::Jumped { id: f.id });
        }
        return None;
    }

    let dir = match (c.left, c.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    if dir != 0.0 {
        f.vel.x = dir * speed;
        f.facing_right = dir > 0.0;
    } else {
        apply_friction(f, &tuning.player, dt);
    }

    if c.jump && f.grounded {
        f.vel.y = tuning.player.jump_velocity;
        f.grounded = false;
        events.push(GameEvent::Jumped { id: f.id });
    } else if !c.jump
        && !c.jump_held
        && !f.grounded
        && f.vel.y < tuning.player.jump_cut_velocity
    {
        f.vel.y = tuning.player.jump_cut_velocity;
    }

    let kind = c.attack?;
    if f.is_attacking(now) {
        return None;
    }
    let window = match kind {
        AttackKind::Punch => tuning.combat.punch_window,
        AttackKind::Kick => tuning.combat.kick_window,
    };
    f.begin_attack(kind, now, window);
    Some(kind)
}

fn emit_step_events(id: u32, outcome: StepOutcome, events: &mut Vec<GameEvent>) {
    if outcome.grabbed_ledge {
        events.push(GameEvent::LedgeGrabbed { id });
    }
    if outcome.landed {
        events.push(GameEvent::Landed { id });
    }
}

/// Demo pilot: chase the nearest awake enemy with the enemy AI
fn demo_controls(state: &mut GameState, dt: f32) -> Controls {
    let GameState {
        player,
        enemies,
        skylines,
        tuning,
        rng,
        now,
        ..
    } = state;

    let origin = player.center();
    let target = enemies
        .iter()
        .filter(|e| e.is_alive() && e.enemy_traits().is_some_and(|t| t.awake))
        .min_by(|a, b| {
            let da = a.center().distance_squared(origin);
            let db = b.center().distance_squared(origin);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(target) = target else {
        return Controls::default();
    };

    ai::decide(
        player,
        target,
        skylines.get(player.realm),
        tuning.world.floor_y,
        dt,
        DEMO_AGGRESSION,
        *now,
        &tuning.ai,
        rng,
    )
    .into()
}

/// Input, player attacks and player physics
fn step_player(state: &mut GameState, controls: Controls, dt: f32) {
    let GameState {
        player,
        enemies,
        skylines,
        tuning,
        now,
        events,
        score,
        kills,
        ..
    } = state;
    let now = *now;

    let attack = drive(
        player,
        controls,
        tuning.player.move_speed,
        tuning.player.rift_cooldown,
        now,
        dt,
        tuning,
        events,
    );

    // One resolution per window: the attack only fires on the frame it opens
    if let Some(kind) = attack {
        for enemy in enemies.iter_mut() {
            let Some(hit) = resolve_hit(player, enemy, kind, now, &tuning.combat) else {
                continue;
            };
            if !hit.killed {
                continue;
            }
            if let Some(variant) = enemy.variant() {
                *score += tuning.waves.stats(variant).score;
                *kills += 1;
                log::debug!("{} {} killed", variant.as_str(), enemy.id);
                events.push(GameEvent::EnemyKilled {
                    id: enemy.id,
                    variant,
                    cause: DeathCause::Combat,
                });
            }
        }
    }

    let outcome = physics::step(
        player,
        dt,
        skylines.get(player.realm),
        tuning.world.floor_y,
        &tuning.physics,
    );
    emit_step_events(player.id, outcome, events);
}

fn follow_camera(state: &mut GameState, dt: f32) {
    let target = state.player.center().x;
    let t = (state.tuning.world.camera_follow * dt).clamp(0.0, 1.0);
    let track = state.camera.get_mut(state.player.realm);
    *track += (target - *track) * t;
}

/// Wake/sleep, AI decisions and enemy attacks
fn run_enemy_ai(state: &mut GameState, dt: f32) {
    let GameState {
        player,
        enemies,
        skylines,
        tuning,
        rng,
        now,
        events,
        ..
    } = state;
    let now = *now;

    for enemy in enemies.iter_mut() {
        if enemy.is_alive() {
            update_wake(enemy, player, &tuning.waves);
        }
        let Some((speed, aggression)) = enemy
            .enemy_traits()
            .filter(|t| t.awake && enemy.is_alive())
            .map(|t| (t.speed, t.aggression))
        else {
            apply_friction(enemy, &tuning.player, dt);
            continue;
        };

        let intent = ai::decide(
            enemy,
            player,
            skylines.get(enemy.realm),
            tuning.world.floor_y,
            dt,
            aggression,
            now,
            &tuning.ai,
            rng,
        );
        let attack = drive(
            enemy,
            intent.into(),
            speed,
            tuning.ai.rift_cooldown,
            now,
            dt,
            tuning,
            events,
        );

        if let Some(kind) = attack
            && let Some(hit) = resolve_hit(enemy, player, kind, now, &tuning.combat)
        {
            events.push(GameEvent::PlayerHit {
                damage: hit.damage,
                hp: player.hp,
            });
        }
    }
}

/// Enemy physics and pit deaths
fn step_enemies(state: &mut GameState, dt: f32) {
    let GameState {
        enemies,
        skylines,
        tuning,
        now,
        events,
        ..
    } = state;
    let floor_y = tuning.world.floor_y;

    for enemy in enemies.iter_mut() {
        let outcome = physics::step(
            enemy,
            dt,
            skylines.get(enemy.realm),
            floor_y,
            &tuning.physics,
        );
        emit_step_events(enemy.id, outcome, events);

        if physics::fell_out_of_world(enemy, floor_y, tuning.world.pit_margin) {
            // Pits kill without score
            if enemy.start_dying(*now)
                && let Some(variant) = enemy.variant()
            {
                events.push(GameEvent::EnemyKilled {
                    id: enemy.id,
                    variant,
                    cause: DeathCause::Fall,
                });
            }
            enemy.life = Life::Dead;
        }
    }
}

/// Advance death fades and drop faded enemies
fn reap(state: &mut GameState) {
    let now = state.now;
    let combat = &state.tuning.combat;
    advance_lifecycle(&mut state.player, now, combat);
    for enemy in state.enemies.iter_mut() {
        advance_lifecycle(enemy, now, combat);
    }
    state.enemies.retain(|e| !e.is_dead());
}

fn regenerate(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning.player;
    let player = &mut state.player;
    if !player.is_alive() || player.hp >= player.max_hp {
        return;
    }
    if state.now - player.last_hit_time >= tuning.regen_delay as f64 {
        player.hp = (player.hp + tuning.regen_per_sec * dt).min(player.max_hp);
    }
}

fn check_player_death(state: &mut GameState) {
    let world = &state.tuning.world;
    if physics::fell_out_of_world(&state.player, world.floor_y, world.pit_margin) {
        state.player.start_dying(state.now);
    }
    if state.player.is_alive() {
        return;
    }

    let summary = GameOverSummary {
        score: state.score,
        kills: state.kills,
        wave: state.wave(),
    };
    log::info!(
        "Player died on wave {}: score {}, {} kills",
        summary.wave,
        summary.score,
        summary.kills
    );
    state.phase = GamePhase::GameOver;
    state.respawn_timer = state.tuning.player.respawn_countdown;
    state.last_run = Some(summary);
    state.emit(GameEvent::PlayerDied {
        score: summary.score,
        kills: summary.kills,
        wave: summary.wave,
    });
}

/// Death animation plays out under the summary while the countdown runs
fn game_over_tick(state: &mut GameState, dt: f32) {
    state.now += dt as f64;
    state.time_ticks += 1;

    let GameState {
        player,
        skylines,
        tuning,
        now,
        ..
    } = state;
    apply_friction(player, &tuning.player, dt);
    physics::step(
        player,
        dt,
        skylines.get(player.realm),
        tuning.world.floor_y,
        &tuning.physics,
    );
    advance_lifecycle(player, *now, &tuning.combat);

    state.respawn_timer = (state.respawn_timer - dt).max(0.0);
    if state.respawn_timer <= 0.0 && state.auto_restart {
        log::info!("Restarting run");
        state.reset();
    }
}
