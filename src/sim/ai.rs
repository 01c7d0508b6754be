//! Enemy decision making
//!
//! A fixed priority ladder re-evaluated every tick. `decide` only reads its
//! inputs; the caller applies the returned intent (and enforces cooldowns).

use rand::Rng;

use super::state::{Building, Fighter};
use crate::per_tick_chance;
use crate::tuning::AiTuning;

/// Discrete inputs an enemy wants this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub punch: bool,
    pub kick: bool,
    pub realm_switch: bool,
}

impl BotIntent {
    fn toward(dx: f32) -> Self {
        Self {
            right: dx > 0.0,
            left: dx < 0.0,
            ..Default::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Pick this tick's intent for `me` chasing `target`
#[allow(clippy::too_many_arguments)]
pub fn decide(
    me: &Fighter,
    target: &Fighter,
    terrain: &[Building],
    floor_y: f32,
    dt: f32,
    aggression: f32,
    now: f64,
    tuning: &AiTuning,
    rng: &mut impl Rng,
) -> BotIntent {
    let mut intent = BotIntent::default();

    if !me.is_alive() || !target.is_alive() {
        return intent;
    }

    let dx = target.pos.x - me.pos.x;
    let dy = target.pos.y - me.pos.y;
    let same_realm = me.realm == target.realm;

    // Hurt elites and bosses hit and run through the rift
    let low_hp = me.hp < me.max_hp * tuning.low_hp_fraction;
    let smart = me.variant().is_some_and(|v| v.is_smart());
    if smart && low_hp {
        if same_realm {
            intent.realm_switch = true;
        } else if dx.abs() < tuning.evasive_cutoff {
            intent = BotIntent::toward(dx);
        }
        return intent;
    }

    if !same_realm {
        intent.realm_switch = true;
        return intent;
    }

    if me.is_attacking(now) {
        return intent;
    }

    if dx.hypot(dy) > tuning.sight_range {
        return intent;
    }

    if me.is_climbing() {
        intent.jump = dy > tuning.climb_release_dy;
        return intent;
    }

    if dx.abs() < tuning.melee_dx && dy.abs() < tuning.melee_dy {
        if me.grounded {
            let chance = per_tick_chance(tuning.attack_base_chance + aggression, dt);
            if rng.random::<f32>() < chance {
                intent.punch = true;
            } else if rng.random::<f32>() < chance {
                intent.kick = true;
            }
        }
        if dx > 0.0 && !me.facing_right {
            intent.right = true;
        } else if dx < 0.0 && me.facing_right {
            intent.left = true;
        }
        return intent;
    }

    if dx > tuning.move_deadzone {
        intent.right = true;
    } else if dx < -tuning.move_deadzone {
        intent.left = true;
    } else {
        return intent;
    }

    if me.grounded {
        let ahead_x = if intent.right {
            me.right() + tuning.look_ahead
        } else {
            me.pos.x - tuning.look_ahead
        };
        let feet = me.feet();
        let ahead: Vec<f32> = terrain
            .iter()
            .filter(|b| b.spans(ahead_x))
            .map(|b| b.roof_y(floor_y))
            .collect();

        let platform_ahead = ahead
            .iter()
            .any(|&top| (feet - top).abs() < tuning.platform_tolerance);
        let wall_ahead = ahead.iter().any(|&top| feet > top);

        intent.jump = if !platform_ahead {
            true
        } else if wall_ahead && dy > tuning.wall_jump_dy {
            true
        } else {
            rng.random::<f32>() < per_tick_chance(tuning.random_jump_chance, dt)
        };
    }

    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EnemyTraits, EnemyVariant, Realm, Tint};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FLOOR: f32 = 800.0;
    const DT: f32 = 1.0 / 60.0;

    fn roof(x: f32, width: f32, height: f32) -> Building {
        Building {
            id: 0,
            x,
            width,
            height,
            realm: Realm::Normal,
            tint: Tint { hue: 0.0, saturation: 0.0, lightness: 0.0 },
        }
    }

    fn enemy(variant: EnemyVariant, x: f32, hp_fraction: f32) -> Fighter {
        let mut e = Fighter::enemy(
            1,
            Vec2::new(x, 530.0),
            Realm::Normal,
            100.0,
            EnemyTraits {
                variant,
                speed: 200.0,
                damage_mult: 1.0,
                aggression: 0.0,
                awake: true,
            },
        );
        e.hp = 100.0 * hp_fraction;
        e.grounded = true;
        e
    }

    fn target(x: f32) -> Fighter {
        let mut p = Fighter::player(Vec2::new(x, 530.0), Realm::Normal, 100.0);
        p.grounded = true;
        p
    }

    fn run(me: &Fighter, target: &Fighter, terrain: &[Building], rng: &mut Pcg32) -> BotIntent {
        decide(me, target, terrain, FLOOR, DT, 0.0, 10.0, &AiTuning::default(), rng)
    }

    #[test]
    fn test_dead_target_idles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let me = enemy(EnemyVariant::Grunt, 0.0, 1.0);
        let mut t = target(100.0);
        t.start_dying(0.0);
        assert!(run(&me, &t, &[], &mut rng).is_idle());
    }

    #[test]
    fn test_hurt_boss_escapes_through_rift() {
        let mut rng = Pcg32::seed_from_u64(1);
        let me = enemy(EnemyVariant::Boss, 0.0, 0.2);
        let intent = run(&me, &target(40.0), &[], &mut rng);
        assert!(intent.realm_switch);
        assert!(!intent.punch && !intent.kick);
    }

    #[test]
    fn test_hurt_elite_shadows_from_other_realm() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut me = enemy(EnemyVariant::Elite, 0.0, 0.2);
        me.realm = Realm::Rift;

        let near = run(&me, &target(200.0), &[], &mut rng);
        assert!(near.right && !near.realm_switch);

        let far = run(&me, &target(-500.0), &[], &mut rng);
        assert!(far.is_idle());
    }

    #[test]
    fn test_hurt_grunt_chases_through_rift() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut me = enemy(EnemyVariant::Grunt, 0.0, 0.1);
        me.realm = Realm::Rift;
        assert!(run(&me, &target(100.0), &[], &mut rng).realm_switch);
    }

    #[test]
    fn test_mid_attack_idles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut me = enemy(EnemyVariant::Grunt, 0.0, 1.0);
        me.begin_attack(crate::sim::AttackKind::Punch, 10.0, 0.3);
        assert!(run(&me, &target(300.0), &[], &mut rng).is_idle());
    }

    #[test]
    fn test_out_of_sight_idles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let me = enemy(EnemyVariant::Grunt, 0.0, 1.0);
        assert!(run(&me, &target(5000.0), &[], &mut rng).is_idle());
    }

    #[test]
    fn test_melee_eventually_attacks_and_faces_target() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut me = enemy(EnemyVariant::Grunt, 100.0, 1.0);
        me.facing_right = true;
        let t = target(80.0);

        let mut attacked = false;
        for _ in 0..2000 {
            let intent = run(&me, &t, &[], &mut rng);
            assert!(intent.left, "should turn toward the target");
            assert!(!intent.jump);
            attacked |= intent.punch || intent.kick;
        }
        assert!(attacked);
    }

    #[test]
    fn test_chases_and_jumps_gap() {
        let mut rng = Pcg32::seed_from_u64(1);
        // Standing at the right edge of a roof with a gap ahead
        let terrain = vec![roof(0.0, 300.0, 200.0), roof(400.0, 300.0, 200.0)];
        let me = enemy(EnemyVariant::Grunt, 260.0, 1.0);
        let intent = run(&me, &target(600.0), &terrain, &mut rng);
        assert!(intent.right);
        assert!(intent.jump);
    }

    #[test]
    fn test_flat_roof_rarely_jumps() {
        let mut rng = Pcg32::seed_from_u64(2);
        let terrain = vec![roof(0.0, 2000.0, 200.0)];
        let me = enemy(EnemyVariant::Grunt, 100.0, 1.0);
        let jumps = (0..1000)
            .filter(|_| run(&me, &target(600.0), &terrain, &mut rng).jump)
            .count();
        assert!(jumps < 30);
    }

    #[test]
    fn test_climbing_releases_when_target_far_below() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut me = enemy(EnemyVariant::Grunt, 0.0, 1.0);
        me.grounded = false;
        me.climb = Some(crate::sim::state::Climb { target_y: 400.0, lock_x: 0.0, mantle_x: 4.0 });
        let mut below = target(200.0);
        below.pos.y = me.pos.y + 150.0;
        assert!(run(&me, &below, &[], &mut rng).jump);
        assert!(!run(&me, &target(200.0), &[], &mut rng).jump);
    }
}
