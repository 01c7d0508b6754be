//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped frame deltas on a simulation-owned clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod anim;
pub mod collision;
pub mod combat;
pub mod physics;
pub mod skyline;
pub mod state;
pub mod tick;
pub mod waves;

pub use ai::{BotIntent, decide};
pub use anim::{ActionState, AnimTag, FighterView, Snapshot};
pub use collision::Aabb;
pub use combat::{Hit, resolve_hit};
pub use physics::{StepOutcome, step};
pub use state::{
    AttackKind, Building, Camera, Climb, DeathCause, EnemyTraits, EnemyVariant, Fighter,
    FighterKind, GameEvent, GameOverSummary, GamePhase, GameState, Life, Realm, Skylines, Tint,
};
pub use tick::{InputIntent, tick};
pub use waves::{PendingEnemy, WaveDirector};
