//! Lifecycle state machine and presentation views
//!
//! Death fades and hit reactions run on the simulation clock, never on a
//! renderer callback. Renderers read [`Snapshot`]s built after a tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{AttackKind, Camera, EnemyVariant, Fighter, GamePhase, Life, Realm};
use crate::tuning::CombatTuning;

/// Speed above which a grounded fighter is shown running
pub const RUN_SPEED_THRESHOLD: f32 = 350.0;
/// Speed above which a grounded fighter is shown walking
pub const WALK_SPEED_THRESHOLD: f32 = 10.0;

/// Coarse behavioural state derived from a fighter each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionState {
    Idle,
    Attacking(AttackKind),
    Stunned,
    Dying,
    Faded,
}

impl ActionState {
    pub fn of(f: &Fighter, now: f64) -> Self {
        match f.life {
            Life::Dead => ActionState::Faded,
            Life::Dying { .. } => ActionState::Dying,
            Life::Alive if f.is_stunned(now) => ActionState::Stunned,
            Life::Alive => match f.attack {
                Some(kind) if f.is_attacking(now) => ActionState::Attacking(kind),
                _ => ActionState::Idle,
            },
        }
    }
}

/// Animation the renderer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimTag {
    Death,
    Climb,
    Hit,
    Punch,
    Kick,
    Jump,
    Fall,
    Run,
    Walk,
    Idle,
}

impl AnimTag {
    /// Priority: death > climb > hit reaction > attack > airborne > run/walk > idle
    pub fn of(f: &Fighter, now: f64) -> Self {
        if !f.is_alive() {
            return AnimTag::Death;
        }
        if f.is_climbing() {
            return AnimTag::Climb;
        }
        if f.hit_anim.is_some() && now < f.hit_until {
            return AnimTag::Hit;
        }
        if f.is_attacking(now) {
            match f.attack {
                Some(AttackKind::Punch) => return AnimTag::Punch,
                Some(AttackKind::Kick) => return AnimTag::Kick,
                None => {}
            }
        }
        if !f.grounded {
            return if f.vel.y < 0.0 { AnimTag::Jump } else { AnimTag::Fall };
        }
        let speed = f.vel.x.abs();
        if speed > RUN_SPEED_THRESHOLD {
            AnimTag::Run
        } else if speed > WALK_SPEED_THRESHOLD {
            AnimTag::Walk
        } else {
            AnimTag::Idle
        }
    }

    /// Plays once rather than looping
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            AnimTag::Death | AnimTag::Climb | AnimTag::Punch | AnimTag::Kick | AnimTag::Jump
        )
    }
}

/// Advance a dying fighter toward `Dead`; returns true on the tick the fade completes
pub fn advance_lifecycle(f: &mut Fighter, now: f64, tuning: &CombatTuning) -> bool {
    if let Life::Dying { since } = f.life {
        let total = (tuning.death_anim + tuning.death_fade) as f64;
        if now - since >= total {
            f.life = Life::Dead;
            f.vel = Vec2::ZERO;
            return true;
        }
    }
    // Expired reactions are cleared so the tag reads stay simple
    if f.hit_anim.is_some() && now >= f.hit_until {
        f.hit_anim = None;
    }
    if f.attack.is_some() && now >= f.attack_until {
        f.attack = None;
    }
    false
}

/// Opacity for the death fade (1 while alive or still playing the death animation)
pub fn fade_alpha(f: &Fighter, now: f64, tuning: &CombatTuning) -> f32 {
    match f.life {
        Life::Alive => 1.0,
        Life::Dead => 0.0,
        Life::Dying { since } => {
            let into_fade = (now - since) as f32 - tuning.death_anim;
            if into_fade <= 0.0 || tuning.death_fade <= 0.0 {
                1.0
            } else {
                (1.0 - into_fade / tuning.death_fade).clamp(0.0, 1.0)
            }
        }
    }
}

/// Everything a renderer/HUD needs about one fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterView {
    pub id: u32,
    pub variant: Option<EnemyVariant>,
    pub pos: Vec2,
    pub size: Vec2,
    pub facing_right: bool,
    pub realm: Realm,
    pub hp: f32,
    pub max_hp: f32,
    pub anim: AnimTag,
    /// `anim` plays once rather than looping
    pub one_shot: bool,
    pub state: ActionState,
    /// Death fade opacity
    pub alpha: f32,
}

impl FighterView {
    pub fn of(f: &Fighter, now: f64, tuning: &CombatTuning) -> Self {
        let anim = AnimTag::of(f, now);
        Self {
            id: f.id,
            variant: f.variant(),
            pos: f.pos,
            size: f.size,
            facing_right: f.facing_right,
            realm: f.realm,
            hp: f.hp,
            max_hp: f.max_hp,
            anim,
            one_shot: anim.is_one_shot(),
            state: ActionState::of(f, now),
            alpha: fade_alpha(f, now, tuning),
        }
    }
}

/// Immutable post-tick view of the session (player first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub now: f64,
    pub wave: u32,
    pub score: u64,
    pub kills: u32,
    pub camera: Camera,
    pub respawn_timer: f32,
    /// Enemies rolled for the current wave
    pub wave_total: u32,
    /// Enemies still fighting (spawned and not dying)
    pub alive_enemies: usize,
    /// Resting between a clear and the next wave
    pub breather: bool,
    /// Live boss, for the boss HP bar
    pub boss: Option<FighterView>,
    pub fighters: Vec<FighterView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> Fighter {
        let mut f = Fighter::player(Vec2::ZERO, Realm::Normal, 100.0);
        f.grounded = true;
        f
    }

    #[test]
    fn test_tag_priority() {
        let mut f = fighter();
        assert_eq!(AnimTag::of(&f, 0.0), AnimTag::Idle);

        f.vel.x = 100.0;
        assert_eq!(AnimTag::of(&f, 0.0), AnimTag::Walk);
        f.vel.x = 450.0;
        assert_eq!(AnimTag::of(&f, 0.0), AnimTag::Run);

        f.grounded = false;
        f.vel.y = -100.0;
        assert_eq!(AnimTag::of(&f, 0.0), AnimTag::Jump);
        f.vel.y = 100.0;
        assert_eq!(AnimTag::of(&f, 0.0), AnimTag::Fall);

        f.begin_attack(AttackKind::Kick, 0.0, 0.5);
        assert_eq!(AnimTag::of(&f, 0.1), AnimTag::Kick);

        f.hit_anim = Some(AttackKind::Punch);
        f.hit_until = 0.2;
        assert_eq!(AnimTag::of(&f, 0.1), AnimTag::Hit);

        f.climb = Some(crate::sim::state::Climb { target_y: 0.0, lock_x: 0.0, mantle_x: 0.0 });
        assert_eq!(AnimTag::of(&f, 0.1), AnimTag::Climb);

        f.start_dying(0.1);
        assert_eq!(AnimTag::of(&f, 0.1), AnimTag::Death);
    }

    #[test]
    fn test_action_states() {
        let mut f = fighter();
        assert_eq!(ActionState::of(&f, 0.0), ActionState::Idle);
        f.begin_attack(AttackKind::Punch, 0.0, 0.3);
        assert_eq!(ActionState::of(&f, 0.1), ActionState::Attacking(AttackKind::Punch));
        f.stun_until = 0.5;
        assert_eq!(ActionState::of(&f, 0.1), ActionState::Stunned);
        f.start_dying(0.2);
        assert_eq!(ActionState::of(&f, 0.2), ActionState::Dying);
        f.life = Life::Dead;
        assert_eq!(ActionState::of(&f, 0.2), ActionState::Faded);
    }

    #[test]
    fn test_death_fade_completes_once() {
        let tuning = CombatTuning::default();
        let mut f = fighter();
        f.start_dying(1.0);

        assert!(!advance_lifecycle(&mut f, 1.5, &tuning));
        assert_eq!(fade_alpha(&f, 1.5, &tuning), 1.0);
        let mid = 1.0 + (tuning.death_anim + tuning.death_fade / 2.0) as f64;
        assert!((fade_alpha(&f, mid, &tuning) - 0.5).abs() < 1e-3);

        let done = 1.0 + (tuning.death_anim + tuning.death_fade) as f64;
        assert!(advance_lifecycle(&mut f, done, &tuning));
        assert!(f.is_dead());
        assert!(!advance_lifecycle(&mut f, done + 1.0, &tuning));
    }

    #[test]
    fn test_view_carries_fade_and_one_shot() {
        let tuning = CombatTuning::default();
        let mut f = fighter();
        let view = FighterView::of(&f, 0.0, &tuning);
        assert_eq!(view.anim, AnimTag::Idle);
        assert!(!view.one_shot);
        assert_eq!(view.alpha, 1.0);

        f.start_dying(0.0);
        let late = (tuning.death_anim + tuning.death_fade * 0.75) as f64;
        let view = FighterView::of(&f, late, &tuning);
        assert_eq!(view.anim, AnimTag::Death);
        assert!(view.one_shot);
        assert!((view.alpha - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_expired_reactions_cleared() {
        let tuning = CombatTuning::default();
        let mut f = fighter();
        f.begin_attack(AttackKind::Punch, 0.0, 0.3);
        f.hit_anim = Some(AttackKind::Kick);
        f.hit_until = 0.2;
        advance_lifecycle(&mut f, 0.25, &tuning);
        assert!(f.hit_anim.is_none());
        assert!(f.attack.is_some());
        advance_lifecycle(&mut f, 0.31, &tuning);
        assert!(f.attack.is_none());
    }
}
