//! Frame simulation module
//!
//! All gameplay logic lives here, independent of rendering and platform:
//! - Seeded RNG only (same seed and inputs, same run)
//! - Stable iteration order (spawn order)
//! - Removal deferred to one sweep per frame

pub mod boss;
pub mod collision;
pub mod combat;
pub mod effects;
pub mod homing;
pub mod level;
pub mod registry;
pub mod state;
pub mod tick;
pub mod waves;

pub use collision::Aabb;
pub use effects::{Burst, CameraShake, EffectsPool, MotionTrail, Particle, ParticlePool};
pub use level::{LevelConfig, Theme};
pub use registry::{EntityId, Registry};
pub use state::{
    Boss, BossPhase, BuffKind, ControlMode, Enemy, EnemyKind, Entity, EntityKind, Faction,
    GameEvent, GamePhase, GameState, Player, PowerUpKind, Projectile, ProjectileKind, RenderLayer,
    Role, Vitals,
};
pub use tick::{TickInput, tick};
pub use waves::{WaveDirector, WavePhase};
