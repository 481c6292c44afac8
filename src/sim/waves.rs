//! Wave director
//!
//! Each wave spawns a quota of enemies on a timer, waits for the field to
//! clear, then rests before the next wave. The boss preempts this machine
//! entirely: once the boss is summoned the director is no longer ticked.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{EnemyKind, GameEvent};

/// Rest between waves (seconds)
pub const WAVE_COOLDOWN: f32 = 3.0;

/// Enemies spawned in `wave` (1-based): `floor(10 * 1.2^(wave-1))`
pub fn enemies_to_spawn(wave: u32) -> u32 {
    let exponent = wave.saturating_sub(1) as i32;
    (10.0 * 1.2f64.powi(exponent)).floor() as u32
}

/// Chance that a spawn is a fast enemy
pub fn fast_probability(wave: u32) -> f64 {
    (0.1 * wave as f64).min(0.8)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WavePhase {
    Spawning,
    /// Quota met, waiting for the last enemy to die or leave
    WaitingClear,
    Cooldown { remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct WaveDirector {
    wave: u32,
    phase: WavePhase,
    spawned: u32,
    spawn_timer: f32,
    base_interval: f32,
    /// `WaveStarted` already announced for the current wave
    announced: bool,
}

impl WaveDirector {
    pub fn new(base_interval: f32) -> Self {
        Self {
            wave: 1,
            phase: WavePhase::Spawning,
            spawned: 0,
            spawn_timer: 0.0,
            base_interval: base_interval.max(0.0),
            announced: false,
        }
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Seconds between spawns in the current wave
    pub fn spawn_interval(&self) -> f32 {
        let divisor = 1.0 + self.wave as f32 * 0.1;
        if divisor > f32::EPSILON {
            self.base_interval / divisor
        } else {
            self.base_interval
        }
    }

    /// Advance by `dt`; returns the kind of enemy to spawn this frame, if any.
    ///
    /// `live_enemies` is the number of enemies currently alive.
    pub fn update(
        &mut self,
        dt: f32,
        live_enemies: usize,
        rng: &mut Pcg32,
        events: &mut Vec<GameEvent>,
    ) -> Option<EnemyKind> {
        match self.phase {
            WavePhase::Spawning => {
                if !self.announced {
                    self.announced = true;
                    events.push(GameEvent::WaveStarted { wave: self.wave });
                    log::info!(
                        "Wave {} started ({} enemies)",
                        self.wave,
                        enemies_to_spawn(self.wave)
                    );
                }

                self.spawn_timer += dt;
                if self.spawn_timer < self.spawn_interval() {
                    return None;
                }
                self.spawn_timer = 0.0;
                self.spawned += 1;
                if self.spawned >= enemies_to_spawn(self.wave) {
                    self.phase = WavePhase::WaitingClear;
                }

                let kind = if rng.random_bool(fast_probability(self.wave)) {
                    EnemyKind::Fast
                } else {
                    EnemyKind::Basic
                };
                Some(kind)
            }
            WavePhase::WaitingClear => {
                if live_enemies == 0 {
                    events.push(GameEvent::WaveCleared { wave: self.wave });
                    log::info!("Wave {} cleared", self.wave);
                    self.phase = WavePhase::Cooldown {
                        remaining: WAVE_COOLDOWN,
                    };
                }
                None
            }
            WavePhase::Cooldown { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.wave += 1;
                    self.spawned = 0;
                    self.spawn_timer = 0.0;
                    self.announced = false;
                    self.phase = WavePhase::Spawning;
                } else {
                    self.phase = WavePhase::Cooldown { remaining };
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_quota_per_wave() {
        assert_eq!(enemies_to_spawn(1), 10);
        assert_eq!(enemies_to_spawn(2), 12);
        assert_eq!(enemies_to_spawn(3), 14);
        assert_eq!(enemies_to_spawn(5), 20);
    }

    #[test]
    fn test_fast_probability_caps() {
        assert!((fast_probability(1) - 0.1).abs() < 1e-9);
        assert!((fast_probability(8) - 0.8).abs() < 1e-9);
        assert!((fast_probability(20) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_zero_base_interval_is_safe() {
        let director = WaveDirector::new(0.0);
        assert_eq!(director.spawn_interval(), 0.0);
        assert!(director.spawn_interval().is_finite());
    }

    #[test]
    fn test_full_cycle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut director = WaveDirector::new(1.0);
        let dt = 0.05;

        let mut spawned = 0;
        for _ in 0..1000 {
            if director.update(dt, spawned, &mut rng, &mut events).is_some() {
                spawned += 1;
            }
            if director.phase() == WavePhase::WaitingClear {
                break;
            }
        }
        assert_eq!(spawned, 10);
        assert_eq!(events.first(), Some(&GameEvent::WaveStarted { wave: 1 }));

        // Enemies still alive: keep waiting
        director.update(dt, 3, &mut rng, &mut events);
        assert_eq!(director.phase(), WavePhase::WaitingClear);

        director.update(dt, 0, &mut rng, &mut events);
        assert!(matches!(director.phase(), WavePhase::Cooldown { .. }));
        assert!(events.contains(&GameEvent::WaveCleared { wave: 1 }));

        // Cooldown lasts 3 seconds
        for _ in 0..59 {
            director.update(dt, 0, &mut rng, &mut events);
        }
        assert!(matches!(director.phase(), WavePhase::Cooldown { .. }));
        director.update(dt, 0, &mut rng, &mut events);
        director.update(dt, 0, &mut rng, &mut events);
        assert_eq!(director.phase(), WavePhase::Spawning);
        assert_eq!(director.wave(), 2);
        assert_eq!(director.spawned(), 0);
    }

    #[test]
    fn test_wave_announced_once() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut events = Vec::new();
        let mut director = WaveDirector::new(1.0);
        for _ in 0..5 {
            director.update(0.0, 0, &mut rng, &mut events);
        }
        assert_eq!(events, vec![GameEvent::WaveStarted { wave: 1 }]);
    }
}
