//! Melee hit resolution
//!
//! One call resolves one attack against one victim. Callers gate calls by the
//! attacker's attack window so each window lands at most once.

use super::collision::hitbox;
use super::state::{AttackKind, Fighter, FighterKind};
use crate::tuning::CombatTuning;

/// A landed hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub damage: f32,
    /// This hit took the victim from alive to dying
    pub killed: bool,
}

fn reach(attack: AttackKind, tuning: &CombatTuning) -> f32 {
    match attack {
        AttackKind::Punch => tuning.punch_reach,
        AttackKind::Kick => tuning.kick_reach,
    }
}

/// Damage dealt by `attacker` with `attack`
pub fn damage_for(attacker: &Fighter, attack: AttackKind, tuning: &CombatTuning) -> f32 {
    match (&attacker.kind, attack) {
        (FighterKind::Player, AttackKind::Punch) => tuning.player_punch_damage,
        (FighterKind::Player, AttackKind::Kick) => tuning.player_kick_damage,
        (FighterKind::Enemy(traits), AttackKind::Punch) => {
            tuning.enemy_punch_damage * traits.damage_mult
        }
        (FighterKind::Enemy(traits), AttackKind::Kick) => {
            tuning.enemy_kick_damage * traits.damage_mult
        }
    }
}

/// Resolve `attack` from `attacker` against `victim`
///
/// Returns `None` when nothing landed: the victim is already dying/dead, the
/// two are in different realms, or the hitbox misses. On a hit the victim
/// takes damage (floored at zero), knockback, hit-stun and a hit reaction,
/// and starts dying if its HP reached zero.
pub fn resolve_hit(
    attacker: &Fighter,
    victim: &mut Fighter,
    attack: AttackKind,
    now: f64,
    tuning: &CombatTuning,
) -> Option<Hit> {
    if !attacker.is_alive() || !victim.is_alive() {
        return None;
    }
    if attacker.realm != victim.realm {
        return None;
    }

    let strike = hitbox(&attacker.aabb(), attacker.facing_right, reach(attack, tuning));
    if !strike.overlaps(&victim.aabb()) {
        return None;
    }

    let damage = damage_for(attacker, attack, tuning).max(0.0);
    victim.hp = (victim.hp - damage).max(0.0);
    victim.last_hit_time = now;

    let away = match victim.center().x - attacker.center().x {
        dx if dx > 0.0 => 1.0,
        dx if dx < 0.0 => -1.0,
        _ if attacker.facing_right => 1.0,
        _ => -1.0,
    };
    victim.vel.x = away * tuning.knockback_x;
    victim.vel.y = tuning.knockback_y;
    victim.grounded = false;
    victim.climb = None;

    let stun = if victim.is_player() {
        tuning.player_stun
    } else {
        tuning.enemy_stun
    };
    victim.stun_until = victim.stun_until.max(now + stun as f64);
    victim.hit_anim = Some(attack);
    victim.hit_until = victim.hit_until.max(now + tuning.hit_anim as f64);
    victim.attack = None;

    let killed = victim.hp <= 0.0 && victim.start_dying(now);

    Some(Hit { damage, killed })
}
