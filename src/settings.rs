//! Game settings and preferences
//!
//! Persisted separately from progression through a [`Storage`] backend.

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_HEIGHT, MIN_WIDTH};
use crate::error::ResolutionError;
use crate::persistence::{self, SETTINGS_KEY, Storage};
use crate::viewport::Viewport;

/// Particle quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticleQuality {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
}

impl ParticleQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleQuality::Low => "Low",
            ParticleQuality::Medium => "Medium",
            ParticleQuality::High => "High",
            ParticleQuality::Ultra => "Ultra",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(ParticleQuality::Low),
            "medium" | "med" => Some(ParticleQuality::Medium),
            "high" => Some(ParticleQuality::High),
            "ultra" => Some(ParticleQuality::Ultra),
            _ => None,
        }
    }

    /// Multiplier on requested particle counts
    pub fn emission_scale(&self) -> f32 {
        match self {
            ParticleQuality::Low => 0.25,
            ParticleQuality::Medium => 0.5,
            ParticleQuality::High => 1.0,
            ParticleQuality::Ultra => 1.5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub fullscreen: bool,
    pub vsync: bool,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sound_volume: f32,

    // === Visual Effects ===
    pub particle_quality: ParticleQuality,
    /// Screen shake on impacts
    pub screen_shake: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution_width: 1920,
            resolution_height: 1080,
            fullscreen: false,
            vsync: true,

            music_volume: 0.5,
            sound_volume: 0.7,

            particle_quality: ParticleQuality::High,
            screen_shake: true,

            show_fps: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn emission_scale(&self) -> f32 {
        self.particle_quality.emission_scale()
    }

    /// Window size to request, never below the minimum
    pub fn applied_resolution(&self) -> (u32, u32) {
        (
            self.resolution_width.max(MIN_WIDTH),
            self.resolution_height.max(MIN_HEIGHT),
        )
    }

    /// Point `viewport` at the configured resolution
    pub fn apply_to(&self, viewport: &mut Viewport) -> Result<(), ResolutionError> {
        let (w, h) = self.applied_resolution();
        viewport.set_resolution(w as f32, h as f32)
    }

    /// Volumes clamped to 0-1
    pub fn clamp_volumes(&mut self) {
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sound_volume = self.sound_volume.clamp(0.0, 1.0);
    }

    /// Load from storage, defaults when missing or unreadable
    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Settings = persistence::load_or_default(storage, SETTINGS_KEY);
        settings.clamp_volumes();
        settings
    }

    /// Save to storage; failures are logged
    pub fn save(&self, storage: &mut dyn Storage) {
        match persistence::save(storage, SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }
}
