//! Per-level tuning
//!
//! Boss stats and themes are derived from the level number and the chosen
//! difficulty; nothing here is stored.

use crate::progression::Difficulty;

/// Visual theme for a band of levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: [f32; 4],
    pub stars: [f32; 4],
}

const fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

const THEMES: [(u32, Theme); 5] = [
    (
        10,
        Theme {
            name: "Frosty Frontier",
            background: rgb(5, 10, 30),
            stars: rgb(200, 200, 255),
        },
    ),
    (
        20,
        Theme {
            name: "Candy Cane Nebula",
            background: rgb(30, 5, 5),
            stars: rgb(255, 200, 200),
        },
    ),
    (
        30,
        Theme {
            name: "Aurora Borealis",
            background: rgb(5, 20, 10),
            stars: rgb(200, 255, 200),
        },
    ),
    (
        40,
        Theme {
            name: "Deep Space Void",
            background: rgb(0, 0, 0),
            stars: rgb(150, 150, 150),
        },
    ),
    (
        u32::MAX,
        Theme {
            name: "The North Pole Core",
            background: rgb(20, 20, 0),
            stars: rgb(255, 255, 200),
        },
    ),
];

impl Theme {
    pub fn for_level(level: u32) -> Theme {
        THEMES
            .iter()
            .find(|(last, _)| level <= *last)
            .map(|(_, theme)| *theme)
            .unwrap_or(THEMES[THEMES.len() - 1].1)
    }
}

/// Tuning for one level at one difficulty
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub level: u32,
    pub difficulty: Difficulty,
    pub boss_max_health: f32,
    pub boss_speed: f32,
    /// Seconds between boss volleys
    pub boss_shoot_delay: f32,
    /// Score that summons the boss
    pub boss_trigger_score: u64,
    pub boss_lobs_snowballs: bool,
    /// Wave spawn interval at wave 0 (seconds)
    pub base_spawn_interval: f32,
    pub theme: Theme,
}

impl LevelConfig {
    /// Levels below 1 are treated as level 1
    pub fn new(level: u32, difficulty: Difficulty) -> Self {
        let level = level.max(1);
        let l = level as f32;
        let m = difficulty.multiplier();

        Self {
            level,
            difficulty,
            boss_max_health: 1000.0 * (1.0 + 0.2 * l) * m,
            boss_speed: 100.0 * (1.0 + 0.05 * l) * m,
            boss_shoot_delay: (2.0 - 0.05 * l).max(0.5) / m,
            boss_trigger_score: 500 * level as u64,
            boss_lobs_snowballs: difficulty >= Difficulty::Medium,
            base_spawn_interval: 1.0,
            theme: Theme::for_level(level),
        }
    }
}
