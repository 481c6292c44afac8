//! Game state and core simulation types
//!
//! Every simulated object is an [`Entity`] owned by the [`Registry`]; what it
//! is and how it behaves comes from its closed [`EntityKind`] variant.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::boss::BOSS_SPAWN_Y;
use super::collision::Aabb;
use super::effects::{EffectsPool, MotionTrail};
use super::level::LevelConfig;
use super::registry::{EntityId, Registry};
use super::waves::WaveDirector;
use crate::consts::*;
use crate::progression::{PlayerStats, ProgressionStore};
use crate::settings::Settings;

/// Draw order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderLayer {
    Background,
    Particle,
    Enemy,
    Player,
    Projectile,
    /// Beams and other overlays
    Effects,
}

/// Collision/iteration group; fixed by kind at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Player,
    Companion,
    Enemy,
    Boss,
    PlayerProjectile,
    EnemyProjectile,
    PowerUp,
}

/// Health pool clamped to `[0, max]` on every mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    health: f32,
    max: f32,
}

impl Vitals {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { health: max, max }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Remaining fraction of max health (0 when max is 0)
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.health / self.max
        } else {
            0.0
        }
    }

    /// Subtract `amount`, returns the new health
    pub fn damage(&mut self, amount: f32) -> f32 {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max);
        self.health
    }

    /// Add `amount`, returns the new health
    pub fn heal(&mut self, amount: f32) -> f32 {
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max);
        self.health
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }
}

/// How the player steers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Directional keys move on both axes
    #[default]
    Keys,
    /// Ship follows the pointer horizontally
    Pointer,
}

/// Timed player buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuffKind {
    TripleShot,
    SpreadShot,
    RapidFire,
    Shield,
}

/// Remaining seconds per buff
#[derive(Debug, Clone, Default)]
pub struct Buffs {
    pub triple_shot: f32,
    pub spread_shot: f32,
    pub rapid_fire: f32,
    pub shield: f32,
}

impl Buffs {
    fn slot(&mut self, kind: BuffKind) -> &mut f32 {
        match kind {
            BuffKind::TripleShot => &mut self.triple_shot,
            BuffKind::SpreadShot => &mut self.spread_shot,
            BuffKind::RapidFire => &mut self.rapid_fire,
            BuffKind::Shield => &mut self.shield,
        }
    }

    /// Arm (or re-arm) a buff for `duration` seconds
    pub fn arm(&mut self, kind: BuffKind, duration: f32) {
        *self.slot(kind) = duration;
    }

    pub fn is_active(&self, kind: BuffKind) -> bool {
        let remaining = match kind {
            BuffKind::TripleShot => self.triple_shot,
            BuffKind::SpreadShot => self.spread_shot,
            BuffKind::RapidFire => self.rapid_fire,
            BuffKind::Shield => self.shield,
        };
        remaining > 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        for t in [
            &mut self.triple_shot,
            &mut self.spread_shot,
            &mut self.rapid_fire,
            &mut self.shield,
        ] {
            if *t > 0.0 {
                *t = (*t - dt).max(0.0);
            }
        }
    }
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub vitals: Vitals,
    pub speed: f32,
    pub control: ControlMode,
    /// Fire without holding the fire input
    pub auto_fire: bool,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    /// Seconds of remaining freeze (no movement, no fire)
    pub frozen: f32,
    pub buffs: Buffs,
    /// Damage multiplier from progression level
    pub damage_mult: f32,
}

impl Player {
    pub fn new(stats: PlayerStats) -> Self {
        Self {
            vitals: Vitals::new(PLAYER_BASE_HEALTH + stats.health_bonus),
            speed: PLAYER_SPEED,
            control: ControlMode::Keys,
            auto_fire: false,
            fire_cooldown: 0.0,
            frozen: 0.0,
            buffs: Buffs::default(),
            damage_mult: stats.damage_mult,
        }
    }

    /// Freeze for `duration` seconds; returns false when the shield blocks it
    pub fn freeze(&mut self, duration: f32) -> bool {
        if self.buffs.is_active(BuffKind::Shield) {
            return false;
        }
        self.frozen = self.frozen.max(duration);
        true
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen > 0.0
    }

    /// Cooldown applied after each shot
    pub fn cooldown(&self) -> f32 {
        if self.buffs.is_active(BuffKind::RapidFire) {
            RAPID_FIRE_COOLDOWN
        } else {
            FIRE_COOLDOWN
        }
    }
}

/// Helper drone that trails the player and fires homing shots
#[derive(Debug, Clone)]
pub struct Companion {
    /// Rest position relative to the player
    pub offset: Vec2,
    pub shoot_timer: f32,
    pub shoot_delay: f32,
}

impl Default for Companion {
    fn default() -> Self {
        Self {
            offset: Vec2::new(-40.0, 20.0),
            shoot_timer: 0.0,
            shoot_delay: 1.5,
        }
    }
}

/// Regular enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Basic,
    Fast,
}

/// Per-kind enemy constants
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub min_speed: f32,
    pub max_speed: f32,
    pub health: f32,
    pub score_value: u32,
    pub size: Vec2,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats {
                min_speed: 120.0,
                max_speed: 250.0,
                health: 1.0,
                score_value: 100,
                size: Vec2::splat(64.0),
            },
            EnemyKind::Fast => EnemyStats {
                min_speed: 300.0,
                max_speed: 450.0,
                health: 1.0,
                score_value: 150,
                size: Vec2::splat(48.0),
            },
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Some(EnemyKind::Basic),
            "fast" => Some(EnemyKind::Fast),
            _ => None,
        }
    }
}

/// A regular enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub vitals: Vitals,
    pub score_value: u32,
}

impl Enemy {
    pub fn new(kind: EnemyKind) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            vitals: Vitals::new(stats.health),
            score_value: stats.score_value,
        }
    }
}

/// Boss behavior states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    Entering,
    Idle,
    Moving,
    Attacking,
    LaserCharge,
    LaserFire,
}

/// The level boss
#[derive(Debug, Clone)]
pub struct Boss {
    pub vitals: Vitals,
    pub phase: BossPhase,
    /// Seconds left in the current phase
    pub timer: f32,
    /// Destination while Moving
    pub target_x: f32,
    /// Telegraph/beam width (0 outside the laser phases)
    pub beam_width: f32,
    pub speed: f32,
    pub shoot_timer: f32,
    pub shoot_delay: f32,
    /// Lob a homing snowball when an attack starts
    pub lobs_snowballs: bool,
}

impl Boss {
    pub fn new(level: &LevelConfig) -> Self {
        Self {
            vitals: Vitals::new(level.boss_max_health),
            phase: BossPhase::Entering,
            timer: 0.0,
            target_x: LOGICAL_WIDTH / 2.0,
            beam_width: 0.0,
            speed: level.boss_speed,
            shoot_timer: 0.0,
            shoot_delay: level.boss_shoot_delay,
            lobs_snowballs: level.boss_lobs_snowballs,
        }
    }

    /// Strictly below the enrage threshold
    pub fn is_enraged(&self) -> bool {
        self.vitals.health() < self.vitals.max() * super::boss::ENRAGE_FRACTION
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

/// Projectile visuals; `Snowball` also freezes on hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    Bullet,
    Bottle,
    Snowball,
    Juice,
}

impl ProjectileKind {
    pub fn size(self) -> Vec2 {
        match self {
            ProjectileKind::Bullet => Vec2::new(20.0, 48.0),
            // Boss bottles are drawn 1.5x the base 24x56 sprite
            ProjectileKind::Bottle => Vec2::new(36.0, 84.0),
            ProjectileKind::Snowball => Vec2::splat(16.0),
            ProjectileKind::Juice => Vec2::new(10.0, 20.0),
        }
    }

    pub fn freezes(self) -> bool {
        self == ProjectileKind::Snowball
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bullet" => Some(ProjectileKind::Bullet),
            "bottle" => Some(ProjectileKind::Bottle),
            "snowball" => Some(ProjectileKind::Snowball),
            "juice" => Some(ProjectileKind::Juice),
            _ => None,
        }
    }
}

/// Guidance toward another entity; the handle is re-checked every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homing {
    pub target: EntityId,
    /// Max turn rate (radians/s)
    pub turn_rate: f32,
}

/// A projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    pub damage: f32,
    pub faction: Faction,
    pub kind: ProjectileKind,
    /// `None` once homing ends (never set, target lost or passed)
    pub homing: Option<Homing>,
    pub trail: Option<MotionTrail>,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, faction: Faction, damage: f32) -> Self {
        Self {
            damage,
            faction,
            kind,
            homing: None,
            trail: None,
        }
    }

    /// Home in on `target`; homing shots also leave a trail
    pub fn with_homing(mut self, target: EntityId, turn_rate: f32) -> Self {
        self.homing = Some(Homing { target, turn_rate });
        self.trail = Some(MotionTrail::new(TRAIL_LENGTH));
        self
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Health,
    TripleShot,
    Spread,
    RapidFire,
    Shield,
}

/// What a pickup does to the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerUpEffect {
    Heal(f32),
    Buff { kind: BuffKind, duration: f32 },
}

impl PowerUpKind {
    pub fn effect(self) -> PowerUpEffect {
        match self {
            PowerUpKind::Health => PowerUpEffect::Heal(25.0),
            PowerUpKind::TripleShot => PowerUpEffect::Buff {
                kind: BuffKind::TripleShot,
                duration: 10.0,
            },
            PowerUpKind::Spread => PowerUpEffect::Buff {
                kind: BuffKind::SpreadShot,
                duration: 10.0,
            },
            PowerUpKind::RapidFire => PowerUpEffect::Buff {
                kind: BuffKind::RapidFire,
                duration: 8.0,
            },
            PowerUpKind::Shield => PowerUpEffect::Buff {
                kind: BuffKind::Shield,
                duration: 5.0,
            },
        }
    }

    /// Score granted on pickup
    pub fn score_bonus(self) -> u64 {
        match self {
            PowerUpKind::Health => 50,
            PowerUpKind::TripleShot | PowerUpKind::Spread | PowerUpKind::RapidFire => 100,
            PowerUpKind::Shield => 150,
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "health" => Some(PowerUpKind::Health),
            "triple_shot" | "triple" => Some(PowerUpKind::TripleShot),
            "spread" | "spread_shot" => Some(PowerUpKind::Spread),
            "rapid_fire" | "rapid" => Some(PowerUpKind::RapidFire),
            "shield" => Some(PowerUpKind::Shield),
            _ => None,
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
}

/// Closed set of simulated object kinds
#[derive(Debug, Clone)]
pub enum EntityKind {
    Player(Player),
    Companion(Companion),
    Enemy(Enemy),
    Boss(Boss),
    Projectile(Projectile),
    PowerUp(PowerUp),
}

impl EntityKind {
    pub fn role(&self) -> Role {
        match self {
            EntityKind::Player(_) => Role::Player,
            EntityKind::Companion(_) => Role::Companion,
            EntityKind::Enemy(_) => Role::Enemy,
            EntityKind::Boss(_) => Role::Boss,
            EntityKind::Projectile(p) => match p.faction {
                Faction::Player => Role::PlayerProjectile,
                Faction::Enemy => Role::EnemyProjectile,
            },
            EntityKind::PowerUp(_) => Role::PowerUp,
        }
    }

    pub fn layer(&self) -> RenderLayer {
        match self {
            EntityKind::Player(_) | EntityKind::Companion(_) => RenderLayer::Player,
            EntityKind::Enemy(_) | EntityKind::Boss(_) => RenderLayer::Enemy,
            EntityKind::Projectile(_) | EntityKind::PowerUp(_) => RenderLayer::Projectile,
        }
    }

    /// Collision box size
    pub fn size(&self) -> Vec2 {
        match self {
            EntityKind::Player(_) => Vec2::splat(PLAYER_SIZE),
            EntityKind::Companion(_) => Vec2::new(24.0, 48.0),
            EntityKind::Enemy(e) => e.kind.stats().size,
            EntityKind::Boss(_) => Vec2::new(260.0, 150.0),
            EntityKind::Projectile(p) => p.kind.size(),
            EntityKind::PowerUp(_) => Vec2::splat(24.0),
        }
    }
}

/// A simulated object (position is the box center)
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub alive: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn role(&self) -> Role {
        self.kind.role()
    }

    pub fn layer(&self) -> RenderLayer {
        self.kind.layer()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }
}

/// Notable things that happened during a frame (drained by the front end)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    EnemyKilled { kind: EnemyKind, score: u64 },
    PowerUpDropped(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    PlayerFired,
    PlayerHit { damage: f32 },
    PlayerFrozen,
    BossSpawned,
    BossDefeated,
    LevelComplete,
    Victory,
    Defeat,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Boss down; effects keep running until the delay ends
    LevelComplete,
    /// Terminal: level cleared
    Victory,
    /// Terminal: player destroyed
    Defeat,
}

/// Complete simulation state for one level attempt
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub level: LevelConfig,
    pub phase: GamePhase,
    pub registry: Registry,
    pub effects: EffectsPool,
    pub waves: WaveDirector,
    pub player: EntityId,
    pub boss: Option<EntityId>,
    pub boss_spawned: bool,
    pub score: u64,
    pub combo: u32,
    /// Seconds left in the combo window
    pub combo_timer: f32,
    /// Currency earned during this run
    pub coins_collected: u64,
    pub level_complete_timer: f32,
    /// Simulated seconds
    pub time: f32,
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a level using player stats and unlocks from `progression`
    pub fn new(
        seed: u64,
        level: LevelConfig,
        progression: &ProgressionStore,
        settings: &Settings,
    ) -> Self {
        let mut registry = Registry::new();
        let player = registry.spawn(
            EntityKind::Player(Player::new(progression.player_stats())),
            Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT - 100.0),
            Vec2::ZERO,
        );

        // Companion is free from level 2 on
        if progression.has_companion(COMPANION_UNLOCK) || level.level > 1 {
            registry.spawn(
                EntityKind::Companion(Companion::default()),
                Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT - 100.0) + Companion::default().offset,
                Vec2::ZERO,
            );
        }

        log::info!(
            "Level {} ({}) - {} - seed {}",
            level.level,
            level.difficulty.as_str(),
            level.theme.name,
            seed
        );

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            waves: WaveDirector::new(level.base_spawn_interval),
            level,
            phase: GamePhase::Playing,
            registry,
            effects: EffectsPool::new(PARTICLE_POOL_SIZE, settings.emission_scale()),
            player,
            boss: None,
            boss_spawned: false,
            score: 0,
            combo: 0,
            combo_timer: 0.0,
            coins_collected: 0,
            level_complete_timer: 0.0,
            time: 0.0,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> Option<&Player> {
        match &self.registry.get(self.player)?.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.registry.get_mut(self.player)?.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.registry.get(self.player)
    }

    pub fn boss(&self) -> Option<&Boss> {
        match &self.registry.get(self.boss?)?.kind {
            EntityKind::Boss(b) => Some(b),
            _ => None,
        }
    }

    pub fn boss_entity(&self) -> Option<&Entity> {
        self.registry.get(self.boss?)
    }

    /// Terminal phases end the run
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Victory | GamePhase::Defeat)
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn an enemy above the canvas at a random column
    pub fn spawn_enemy(&mut self, kind: EnemyKind) -> EntityId {
        let stats = kind.stats();
        let pos = Vec2::new(
            self.rng.random_range(40.0..LOGICAL_WIDTH - 40.0),
            self.rng.random_range(-200.0..-80.0),
        );
        let vel = Vec2::new(
            self.rng.random_range(-60.0..60.0),
            self.rng.random_range(stats.min_speed..stats.max_speed),
        );
        let id = self
            .registry
            .spawn(EntityKind::Enemy(Enemy::new(kind)), pos, vel);
        log::debug!("Spawned {:?} enemy {:?} at {:?}", kind, id, pos);
        id
    }

    /// Spawn the level boss above the canvas and clear the regular enemies
    pub fn spawn_boss(&mut self) -> EntityId {
        let cleared = self.registry.clear_role(Role::Enemy);
        let id = self.registry.spawn(
            EntityKind::Boss(Boss::new(&self.level)),
            Vec2::new(LOGICAL_WIDTH / 2.0, BOSS_SPAWN_Y),
            Vec2::new(0.0, super::boss::ENTRY_SPEED),
        );
        self.boss = Some(id);
        self.boss_spawned = true;
        self.events.push(GameEvent::BossSpawned);
        log::info!(
            "Boss incoming (score {}, {} enemies cleared, hp {:.0})",
            self.score,
            cleared,
            self.level.boss_max_health
        );
        id
    }

    /// Spawn a projectile centered at `pos`
    pub fn spawn_projectile(&mut self, projectile: Projectile, pos: Vec2, vel: Vec2) -> EntityId {
        self.registry
            .spawn(EntityKind::Projectile(projectile), pos, vel)
    }

    /// Spawn a pickup falling from `pos`
    pub fn spawn_power_up(&mut self, kind: PowerUpKind, pos: Vec2) -> EntityId {
        self.events.push(GameEvent::PowerUpDropped(kind));
        self.registry.spawn(
            EntityKind::PowerUp(PowerUp { kind }),
            pos,
            Vec2::new(0.0, POWERUP_FALL_SPEED),
        )
    }

    /// Spawn a pickup by name; unknown names create nothing
    pub fn spawn_power_up_named(&mut self, name: &str, pos: Vec2) -> Option<EntityId> {
        match PowerUpKind::from_name(name) {
            Some(kind) => Some(self.spawn_power_up(kind, pos)),
            None => {
                log::warn!("Ignoring unknown power-up kind '{}'", name);
                None
            }
        }
    }

    /// Boss down: unlock the next tier and start the victory delay
    pub(crate) fn enter_level_complete(&mut self, progression: &mut ProgressionStore) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::LevelComplete;
        self.level_complete_timer = LEVEL_COMPLETE_DELAY;
        if let Some(e) = self.registry.get_mut(self.player) {
            e.vel = Vec2::ZERO;
        }
        progression.complete_level(self.level.level, self.level.difficulty);
        progression.record_high_score(self.level.level, self.score);
        self.events.push(GameEvent::LevelComplete);
        log::info!(
            "Level {} complete! score {}, coins {}",
            self.level.level,
            self.score,
            self.coins_collected
        );
    }

    /// Player destroyed
    pub(crate) fn enter_defeat(&mut self, progression: &mut ProgressionStore) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Defeat;
        progression.record_high_score(self.level.level, self.score);
        self.events.push(GameEvent::Defeat);
        log::info!("Defeated at score {}", self.score);
    }
}

/// Progression name of the companion unlock
pub const COMPANION_UNLOCK: &str = "sprite_bot";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Difficulty;

    fn new_state(level: u32) -> GameState {
        GameState::new(
            7,
            LevelConfig::new(level, Difficulty::Easy),
            &ProgressionStore::in_memory(),
            &Settings::default(),
        )
    }

    #[test]
    fn test_vitals_clamp() {
        let mut v = Vitals::new(100.0);
        assert_eq!(v.damage(30.0), 70.0);
        assert_eq!(v.heal(500.0), 100.0);
        assert_eq!(v.damage(1000.0), 0.0);
        assert!(v.is_depleted());
        // Negative amounts never move health the wrong way
        assert_eq!(v.damage(-50.0), 0.0);
        assert_eq!(v.heal(-5.0), 0.0);
    }

    #[test]
    fn test_shield_blocks_freeze() {
        let mut player = Player::new(PlayerStats::default());
        player.buffs.arm(BuffKind::Shield, 5.0);
        assert!(!player.freeze(1.0));
        assert!(!player.is_frozen());

        player.buffs.tick(5.0);
        assert!(player.freeze(1.0));
        assert!(player.is_frozen());
    }

    #[test]
    fn test_role_follows_kind() {
        let shot = EntityKind::Projectile(Projectile::new(
            ProjectileKind::Bullet,
            Faction::Player,
            10.0,
        ));
        assert_eq!(shot.role(), Role::PlayerProjectile);
        let bottle = EntityKind::Projectile(Projectile::new(
            ProjectileKind::Bottle,
            Faction::Enemy,
            15.0,
        ));
        assert_eq!(bottle.role(), Role::EnemyProjectile);
        assert!(RenderLayer::Background < RenderLayer::Particle);
        assert!(RenderLayer::Enemy < RenderLayer::Player);
        assert!(RenderLayer::Player < RenderLayer::Projectile);
    }

    #[test]
    fn test_companion_only_from_level_two() {
        assert_eq!(new_state(1).registry.count(Role::Companion), 0);
        assert_eq!(new_state(2).registry.count(Role::Companion), 1);

        let mut progression = ProgressionStore::in_memory();
        progression.unlock_companion(COMPANION_UNLOCK);
        let state = GameState::new(
            1,
            LevelConfig::new(1, Difficulty::Easy),
            &progression,
            &Settings::default(),
        );
        assert_eq!(state.registry.count(Role::Companion), 1);
    }

    #[test]
    fn test_unknown_power_up_name_spawns_nothing() {
        let mut state = new_state(1);
        let before = state.registry.len();
        assert!(state.spawn_power_up_named("mystery", Vec2::ZERO).is_none());
        assert_eq!(state.registry.len(), before);
        assert!(state.spawn_power_up_named("shield", Vec2::ZERO).is_some());
        assert_eq!(state.registry.count(Role::PowerUp), 1);
    }

    #[test]
    fn test_spawn_boss_clears_enemies() {
        let mut state = new_state(1);
        state.spawn_enemy(EnemyKind::Basic);
        state.spawn_enemy(EnemyKind::Fast);
        state.spawn_boss();
        assert_eq!(state.registry.count(Role::Enemy), 0);
        assert!(state.boss().is_some());
        assert!(state.boss_spawned);
    }
}
