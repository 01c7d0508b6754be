//! Game state and core simulation types
//!
//! Everything the orchestrator mutates during a tick lives here. Presentation
//! layers only ever see it through [`GameState::snapshot`] after a tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::anim::{FighterView, Snapshot};
use super::collision::Aabb;
use super::skyline;
use super::waves::WaveDirector;
use crate::consts::*;
use crate::tuning::Tuning;

/// One of the two parallel copies of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Realm {
    Normal,
    Rift,
}

impl Realm {
    pub fn other(self) -> Self {
        match self {
            Realm::Normal => Realm::Rift,
            Realm::Rift => Realm::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Normal => "normal",
            Realm::Rift => "rift",
        }
    }
}

/// HSL building tint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

/// A static rooftop span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub realm: Realm,
    pub tint: Tint,
}

impl Building {
    /// Y of the roof surface
    #[inline]
    pub fn roof_y(&self, floor_y: f32) -> f32 {
        floor_y - self.height
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether `x` lies strictly over this building
    #[inline]
    pub fn spans(&self, x: f32) -> bool {
        x > self.x && x < self.right()
    }
}

/// Per-realm building layouts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skylines {
    pub normal: Vec<Building>,
    pub rift: Vec<Building>,
}

impl Skylines {
    pub fn generate(tuning: &Tuning, rng: &mut Pcg32) -> Self {
        Self {
            normal: skyline::generate(Realm::Normal, &tuning.skyline, rng),
            rift: skyline::generate(Realm::Rift, &tuning.skyline, rng),
        }
    }

    pub fn get(&self, realm: Realm) -> &[Building] {
        match realm {
            Realm::Normal => &self.normal,
            Realm::Rift => &self.rift,
        }
    }
}

/// Enemy tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    Grunt,
    Elite,
    Boss,
}

impl EnemyVariant {
    /// Elites and bosses turn evasive when hurt
    pub fn is_smart(&self) -> bool {
        matches!(self, EnemyVariant::Elite | EnemyVariant::Boss)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyVariant::Grunt => "grunt",
            EnemyVariant::Elite => "elite",
            EnemyVariant::Boss => "boss",
        }
    }
}

/// Melee attack types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Punch,
    Kick,
}

/// Enemy-only stats, fixed at construction apart from `awake`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTraits {
    pub variant: EnemyVariant,
    /// Horizontal run speed (px/s)
    pub speed: f32,
    pub damage_mult: f32,
    pub aggression: f32,
    /// AI only runs while awake
    pub awake: bool,
}

/// Player or enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FighterKind {
    Player,
    Enemy(EnemyTraits),
}

/// Active ledge climb
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    /// Y (top of box) the climb ends at
    pub target_y: f32,
    /// X the fighter is pinned to against the wall face
    pub lock_x: f32,
    /// X on the roof the fighter steps onto when the climb finishes
    pub mantle_x: f32,
}

/// Lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Life {
    Alive,
    /// HP hit zero; death animation/fade in progress since `since`
    Dying { since: f64 },
    /// Fade finished, ready for removal
    Dead,
}

/// Shared shape for the player and every enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub id: u32,
    pub kind: FighterKind,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub climb: Option<Climb>,
    pub hp: f32,
    pub max_hp: f32,
    pub life: Life,
    pub last_hit_time: f64,
    pub attack: Option<AttackKind>,
    pub attack_until: f64,
    pub stun_until: f64,
    /// What last hit us, shown until `hit_until`
    pub hit_anim: Option<AttackKind>,
    pub hit_until: f64,
    pub facing_right: bool,
    pub realm: Realm,
    pub last_rift_switch: Option<f64>,
}

impl Fighter {
    fn base(id: u32, kind: FighterKind, pos: Vec2, realm: Realm, hp: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(FIGHTER_WIDTH, FIGHTER_HEIGHT),
            grounded: false,
            climb: None,
            hp,
            max_hp: hp,
            life: Life::Alive,
            last_hit_time: 0.0,
            attack: None,
            attack_until: 0.0,
            stun_until: 0.0,
            hit_anim: None,
            hit_until: 0.0,
            facing_right: true,
            realm,
            last_rift_switch: None,
        }
    }

    pub fn player(pos: Vec2, realm: Realm, max_hp: f32) -> Self {
        Self::base(PLAYER_ID, FighterKind::Player, pos, realm, max_hp)
    }

    pub fn enemy(id: u32, pos: Vec2, realm: Realm, max_hp: f32, traits: EnemyTraits) -> Self {
        let mut enemy = Self::base(id, FighterKind::Enemy(traits), pos, realm, max_hp);
        enemy.facing_right = false;
        enemy
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, FighterKind::Player)
    }

    pub fn enemy_traits(&self) -> Option<&EnemyTraits> {
        match &self.kind {
            FighterKind::Enemy(traits) => Some(traits),
            FighterKind::Player => None,
        }
    }

    pub fn enemy_traits_mut(&mut self) -> Option<&mut EnemyTraits> {
        match &mut self.kind {
            FighterKind::Enemy(traits) => Some(traits),
            FighterKind::Player => None,
        }
    }

    pub fn variant(&self) -> Option<EnemyVariant> {
        self.enemy_traits().map(|t| t.variant)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self.life, Life::Alive)
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        matches!(self.life, Life::Dying { .. })
    }

    /// Terminal: the fade has finished
    #[inline]
    pub fn is_dead(&self) -> bool {
        matches!(self.life, Life::Dead)
    }

    #[inline]
    pub fn is_climbing(&self) -> bool {
        self.climb.is_some()
    }

    #[inline]
    pub fn is_stunned(&self, now: f64) -> bool {
        now < self.stun_until
    }

    #[inline]
    pub fn is_attacking(&self, now: f64) -> bool {
        self.attack.is_some() && now < self.attack_until
    }

    #[inline]
    pub fn feet(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Open an attack window. Timestamps never move backwards.
    pub fn begin_attack(&mut self, kind: AttackKind, now: f64, window: f32) {
        self.attack = Some(kind);
        self.attack_until = self.attack_until.max(now + window as f64);
    }

    pub fn rift_ready(&self, now: f64, cooldown: f32) -> bool {
        self.last_rift_switch
            .is_none_or(|t| now - t >= cooldown as f64)
    }

    /// Move to the other realm. Drops any climb since the wall is gone.
    pub fn switch_realm(&mut self, now: f64) {
        self.realm = self.realm.other();
        self.last_rift_switch = Some(now);
        self.climb = None;
        self.grounded = false;
    }

    /// Begin the death sequence. Returns false if already dying or dead.
    pub fn start_dying(&mut self, now: f64) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = 0.0;
        self.life = Life::Dying { since: now };
        self.attack = None;
        self.climb = None;
        true
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the host to start a run
    Idle,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Player died; counting down to an automatic reset
    GameOver,
}

/// Why a fighter died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Combat,
    Fall,
}

/// Outbound signals drained once per tick by audio/HUD layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { wave: u32, enemies: u32 },
    WaveCleared { wave: u32 },
    EnemyKilled { id: u32, variant: EnemyVariant, cause: DeathCause },
    PlayerHit { damage: f32, hp: f32 },
    PlayerDied { score: u64, kills: u32, wave: u32 },
    Jumped { id: u32 },
    Landed { id: u32 },
    LedgeGrabbed { id: u32 },
    RealmSwitched { id: u32, realm: Realm },
}

/// Per-realm camera track positions (world X at screen centre)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Camera {
    pub normal: f32,
    pub rift: f32,
}

impl Camera {
    pub fn get(&self, realm: Realm) -> f32 {
        match realm {
            Realm::Normal => self.normal,
            Realm::Rift => self.rift,
        }
    }

    pub fn get_mut(&mut self, realm: Realm) -> &mut f32 {
        match realm {
            Realm::Normal => &mut self.normal,
            Realm::Rift => &mut self.rift,
        }
    }
}

/// Final numbers shown on the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub score: u64,
    pub kills: u32,
    pub wave: u32,
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    /// Simulation clock (seconds)
    pub now: f64,
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Seconds left before a game-over resets the run
    pub respawn_timer: f32,
    pub skylines: Skylines,
    pub camera: Camera,
    pub player: Fighter,
    /// Live enemies (sorted by id for determinism)
    pub enemies: Vec<Fighter>,
    pub director: WaveDirector,
    pub score: u64,
    pub kills: u32,
    pub last_run: Option<GameOverSummary>,
    /// Reset automatically when the game-over countdown runs out
    pub auto_restart: bool,
    /// Outbound events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session. Skylines are generated once here and kept across resets.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let skylines = Skylines::generate(&tuning, &mut rng);
        let player = Self::fresh_player(&skylines, &tuning);

        let mut state = Self {
            seed,
            tuning,
            rng,
            now: 0.0,
            time_ticks: 0,
            phase: GamePhase::Idle,
            respawn_timer: 0.0,
            skylines,
            camera: Camera::default(),
            player,
            enemies: Vec::new(),
            director: WaveDirector::default(),
            score: 0,
            kills: 0,
            last_run: None,
            auto_restart: true,
            events: Vec::new(),
        };
        state.snap_camera();
        state
    }

    fn fresh_player(skylines: &Skylines, tuning: &Tuning) -> Fighter {
        let realm = Realm::Normal;
        let buildings = skylines.get(realm);
        let spawn = skyline::first_safe_spawn(
            buildings,
            tuning.world.floor_y,
            Vec2::new(FIGHTER_WIDTH, FIGHTER_HEIGHT),
        );
        let mut player = Fighter::player(spawn, realm, tuning.player.max_hp);
        player.grounded = true;
        player
    }

    /// Leave `Idle` and queue the first wave
    pub fn start(&mut self) {
        if self.phase != GamePhase::Idle {
            return;
        }
        log::info!("Run started (seed {})", self.seed);
        self.phase = GamePhase::Running;
        self.director
            .queue_wave(1, &self.tuning.waves, &mut self.rng, &mut self.events);
    }

    /// Back to a fresh run on the same skyline
    pub fn reset(&mut self) {
        self.player = Self::fresh_player(&self.skylines, &self.tuning);
        self.enemies.clear();
        self.director = WaveDirector::default();
        self.score = 0;
        self.kills = 0;
        self.respawn_timer = 0.0;
        self.phase = GamePhase::Idle;
        self.snap_camera();
        self.start();
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn wave(&self) -> u32 {
        self.director.wave
    }

    pub fn buildings(&self, realm: Realm) -> &[Building] {
        self.skylines.get(realm)
    }

    pub fn find_enemy(&self, id: u32) -> Option<&Fighter> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Enemies still in the fight (for the HUD's hostiles counter)
    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Live boss, if any (for the boss HP bar)
    pub fn boss(&self) -> Option<&Fighter> {
        self.enemies
            .iter()
            .find(|e| e.is_alive() && e.variant() == Some(EnemyVariant::Boss))
    }

    pub fn snap_camera(&mut self) {
        let x = self.player.center().x;
        self.camera = Camera { normal: x, rift: x };
    }

    /// Ensure enemies are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }

    /// Read-only view for rendering/HUD, taken after a tick completes
    pub fn snapshot(&self) -> Snapshot {
        let combat = &self.tuning.combat;
        let view = |f: &Fighter| FighterView::of(f, self.now, combat);
        let mut fighters = Vec::with_capacity(self.enemies.len() + 1);
        fighters.push(view(&self.player));
        fighters.extend(self.enemies.iter().map(view));
        Snapshot {
            phase: self.phase,
            now: self.now,
            wave: self.director.wave,
            score: self.score,
            kills: self.kills,
            camera: self.camera,
            respawn_timer: self.respawn_timer,
            wave_total: self.director.wave_total,
            alive_enemies: self.alive_enemies(),
            breather: self.director.in_breather(),
            boss: self.boss().map(view),
            fighters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_with_grounded_player() {
        let state = GameState::new(7, Tuning::default());
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.player.grounded);
        assert!(state.enemies.is_empty());
        assert!(!state.skylines.normal.is_empty());
        assert!(!state.skylines.rift.is_empty());

        // Player stands on some roof
        let floor_y = state.tuning.world.floor_y;
        let feet = state.player.feet();
        assert!(
            state
                .buildings(Realm::Normal)
                .iter()
                .any(|b| (b.roof_y(floor_y) - feet).abs() < 0.001)
        );
    }

    #[test]
    fn test_start_queues_first_wave() {
        let mut state = GameState::new(7, Tuning::default());
        state.start();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.wave(), 1);
        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::WaveStarted { wave: 1, enemies: 3 }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_realm_switch_drops_climb() {
        let mut f = Fighter::player(Vec2::ZERO, Realm::Normal, 100.0);
        f.climb = Some(Climb { target_y: 0.0, lock_x: 0.0, mantle_x: 0.0 });
        assert!(f.rift_ready(0.0, 1.0));
        f.switch_realm(3.0);
        assert_eq!(f.realm, Realm::Rift);
        assert!(!f.is_climbing());
        assert!(!f.rift_ready(3.5, 1.0));
        assert!(f.rift_ready(4.0, 1.0));
    }

    #[test]
    fn test_start_dying_once() {
        let mut f = Fighter::player(Vec2::ZERO, Realm::Normal, 100.0);
        assert!(f.start_dying(1.0));
        assert!(f.is_dying());
        assert_eq!(f.hp, 0.0);
        assert!(!f.start_dying(2.0));
        assert_eq!(f.life, Life::Dying { since: 1.0 });
    }

    #[test]
    fn test_attack_window_monotonic() {
        let mut f = Fighter::player(Vec2::ZERO, Realm::Normal, 100.0);
        f.begin_attack(AttackKind::Kick, 1.0, 0.45);
        f.begin_attack(AttackKind::Punch, 1.0, 0.1);
        assert!((f.attack_until - 1.45).abs() < 1e-6);
        assert!(f.is_attacking(1.2));
        assert!(!f.is_attacking(1.5));
    }
}
