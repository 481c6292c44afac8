//! Galactic Justice - simulation core of a 2D arcade shooter
//!
//! Core modules:
//! - `sim`: Frame simulation (entities, combat, waves, boss, effects)
//! - `viewport`: Logical canvas to physical display mapping
//! - `renderer`: Draw list construction and WebGPU pipeline
//! - `persistence`: Storage backends for settings and progression
//! - `progression`: Currency, experience and unlock ladders
//! - `settings`: User preferences

pub mod error;
pub mod persistence;
pub mod progression;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod viewport;

pub use error::{PersistError, ResolutionError};
pub use progression::{Difficulty, ProgressionStore};
pub use settings::{ParticleQuality, Settings};
pub use viewport::Viewport;

/// Game configuration constants
pub mod consts {
    /// Logical canvas (16:9); all gameplay runs in these units
    pub const LOGICAL_WIDTH: f32 = 1920.0;
    pub const LOGICAL_HEIGHT: f32 = 1080.0;

    /// Smallest window the settings layer will apply
    pub const MIN_WIDTH: u32 = 1280;
    pub const MIN_HEIGHT: u32 = 720;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta for headless runs
    pub const NOMINAL_DT: f32 = 1.0 / 144.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 480.0;
    pub const PLAYER_BASE_HEALTH: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 80.0;
    /// Keeps the player this far from the canvas edges
    pub const PLAYER_EDGE_MARGIN: f32 = 20.0;
    pub const FIRE_COOLDOWN: f32 = 0.33;
    pub const RAPID_FIRE_COOLDOWN: f32 = 0.15;
    /// Pointer-follow dead zone (logical px)
    pub const POINTER_DEAD_ZONE: f32 = 10.0;
    pub const FREEZE_DURATION: f32 = 1.0;

    /// Player bullet
    pub const BULLET_SPEED: f32 = 720.0;
    pub const BULLET_DAMAGE: f32 = 10.0;

    /// Projectiles further than this outside the canvas are culled
    pub const PROJECTILE_CULL_MARGIN: f32 = 50.0;
    /// Enemies are culled this far below the canvas bottom
    pub const ENEMY_CULL_MARGIN: f32 = 20.0;

    /// Combo window after a kill (seconds)
    pub const COMBO_WINDOW: f32 = 2.0;
    /// Score multiplier gained per combo step
    pub const COMBO_STEP: f32 = 0.1;

    /// Power-up fall speed
    pub const POWERUP_FALL_SPEED: f32 = 120.0;

    /// Pause after the boss dies before the run reports victory
    pub const LEVEL_COMPLETE_DELAY: f32 = 3.0;

    /// Effects
    pub const PARTICLE_POOL_SIZE: usize = 500;
    pub const TRAIL_LENGTH: usize = 8;
}

/// Shared colors (RGBA, linear 0-1)
pub mod palette {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
    pub const GREEN: [f32; 4] = [0.2, 1.0, 0.2, 1.0];
    pub const BLUE: [f32; 4] = [0.2, 0.2, 1.0, 1.0];
    pub const COKE_RED: [f32; 4] = [0.96, 0.0, 0.035, 1.0];
    pub const GOLD: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const NEON_BLUE: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
    pub const NEON_PURPLE: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const NEON_GREEN: [f32; 4] = [0.0, 1.0, 0.4, 1.0];
    pub const NEON_PINK: [f32; 4] = [1.0, 0.08, 0.58, 1.0];
    pub const LETTERBOX: [f32; 4] = [0.04, 0.04, 0.08, 1.0];
}

/// Scale an RGBA color's alpha by `factor` (clamped to 0-1)
#[inline]
pub fn fade(color: [f32; 4], factor: f32) -> [f32; 4] {
    let f = factor.clamp(0.0, 1.0);
    [color[0], color[1], color[2], color[3] * f]
}
