//! Player progression: currency, experience, unlocks and high scores
//!
//! The store writes itself back after every change. Writes are best effort:
//! a failed save is logged and play continues on the in-memory state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, MemoryStorage, PROGRESS_KEY, Storage};

/// Difficulty ladder, unlocked in order per level
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "extreme" => Some(Difficulty::Extreme),
            _ => None,
        }
    }

    /// Boss stat multiplier
    pub fn multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
            Difficulty::Extreme => 3.0,
        }
    }

    /// Next tier, `None` at the top
    pub fn next(&self) -> Option<Self> {
        match self {
            Difficulty::Easy => Some(Difficulty::Medium),
            Difficulty::Medium => Some(Difficulty::Hard),
            Difficulty::Hard => Some(Difficulty::Extreme),
            Difficulty::Extreme => None,
        }
    }
}

/// Combat bonuses from player level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub damage_mult: f32,
    pub health_bonus: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            health_bonus: 0.0,
        }
    }
}

/// Persisted progression document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    /// Highest level the player may start
    pub unlocked_level: u32,
    /// Unlocked difficulties per level
    pub level_difficulties: BTreeMap<u32, Vec<Difficulty>>,
    /// Best score per level
    pub high_scores: BTreeMap<u32, u64>,
    pub coins: u64,
    pub xp: u64,
    /// Player level (experience tier)
    pub level: u32,
    pub unlocked_companions: Vec<String>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            unlocked_level: 1,
            level_difficulties: BTreeMap::from([(1, vec![Difficulty::Easy])]),
            high_scores: BTreeMap::new(),
            coins: 0,
            xp: 0,
            level: 1,
            unlocked_companions: Vec::new(),
        }
    }
}

/// Experience needed to leave `level`
pub fn xp_to_next(level: u32) -> u64 {
    level.max(1) as u64 * 1000
}

/// Progression backed by a storage backend
#[derive(Debug)]
pub struct ProgressionStore {
    data: Progression,
    storage: Box<dyn Storage>,
}

impl ProgressionStore {
    /// Load from `storage`; unreadable data starts a fresh profile
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let data = persistence::load_or_default(storage.as_ref(), PROGRESS_KEY);
        Self { data, storage }
    }

    /// Fresh profile that is never written to disk
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    pub fn data(&self) -> &Progression {
        &self.data
    }

    /// Write back, logging failures
    pub fn save(&mut self) {
        if let Err(e) = persistence::save(self.storage.as_mut(), PROGRESS_KEY, &self.data) {
            log::warn!("Progress not saved: {}", e);
        }
    }

    pub fn add_currency(&mut self, amount: u32) {
        self.data.coins += amount as u64;
        self.save();
    }

    /// Add experience; returns how many player levels were gained
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.data.xp += amount as u64;
        let mut gained = 0;
        while self.data.xp >= xp_to_next(self.data.level) {
            self.data.xp -= xp_to_next(self.data.level);
            self.data.level += 1;
            gained += 1;
        }
        if gained > 0 {
            log::info!("Player level {} reached", self.data.level);
        }
        self.save();
        gained
    }

    pub fn player_stats(&self) -> PlayerStats {
        let bonus_levels = self.data.level.saturating_sub(1) as f32;
        PlayerStats {
            damage_mult: 1.0 + 0.1 * bonus_levels,
            health_bonus: 10.0 * bonus_levels,
        }
    }

    pub fn is_level_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.data.unlocked_level
    }

    pub fn is_difficulty_unlocked(&self, level: u32, difficulty: Difficulty) -> bool {
        self.data
            .level_difficulties
            .get(&level)
            .is_some_and(|d| d.contains(&difficulty))
    }

    /// Record a clear: unlocks the next difficulty of this level, and the
    /// next level when easy is beaten on the frontier
    pub fn complete_level(&mut self, level: u32, difficulty: Difficulty) {
        if let Some(next) = difficulty.next() {
            let unlocked = self.data.level_difficulties.entry(level).or_default();
            if !unlocked.contains(&next) {
                unlocked.push(next);
                log::info!("Unlocked {} on level {}", next.as_str(), level);
            }
        }

        if difficulty == Difficulty::Easy && level == self.data.unlocked_level {
            self.data.unlocked_level += 1;
            let new_level = self.data.unlocked_level;
            let unlocked = self.data.level_difficulties.entry(new_level).or_default();
            if !unlocked.contains(&Difficulty::Easy) {
                unlocked.push(Difficulty::Easy);
            }
            log::info!("Unlocked level {}", new_level);
        }
        self.save();
    }

    /// Keep the best score per level; returns true on a new record
    pub fn record_high_score(&mut self, level: u32, score: u64) -> bool {
        let best = self.data.high_scores.get(&level).copied();
        if best.is_some_and(|b| b >= score) {
            return false;
        }
        self.data.high_scores.insert(level, score);
        self.save();
        true
    }

    pub fn high_score(&self, level: u32) -> Option<u64> {
        self.data.high_scores.get(&level).copied()
    }

    pub fn has_companion(&self, name: &str) -> bool {
        self.data.unlocked_companions.iter().any(|c| c == name)
    }

    pub fn unlock_companion(&mut self, name: &str) {
        if !self.has_companion(name) {
            self.data.unlocked_companions.push(name.to_string());
            self.save();
        }
    }
}
