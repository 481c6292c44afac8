//! Visual effects: particles, camera shake and motion trails
//!
//! None of this feeds back into gameplay. Particles age per update call
//! (life in frames, velocity in pixels per frame) rather than per second.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

/// A single particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per update
    pub vel: Vec2,
    /// Remaining updates
    pub life: f32,
    /// Life at emission, for fading
    pub max_life: f32,
    pub size: f32,
    pub color: [f32; 4],
}

impl Particle {
    /// Remaining life as 0-1
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Emission parameters; each range is sampled uniformly per particle
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    /// Per-axis velocity range (pixels per update)
    pub velocity: (f32, f32),
    pub life: (f32, f32),
    pub size: (f32, f32),
}

impl Burst {
    pub const fn new(count: usize) -> Self {
        Self {
            count,
            velocity: (-3.0, 3.0),
            life: (20.0, 40.0),
            size: (2.0, 5.0),
        }
    }

    pub const fn velocity(mut self, min: f32, max: f32) -> Self {
        self.velocity = (min, max);
        self
    }

    pub const fn life(mut self, min: f32, max: f32) -> Self {
        self.life = (min, max);
        self
    }

    pub const fn size(mut self, min: f32, max: f32) -> Self {
        self.size = (min, max);
        self
    }
}

fn sample(rng: &mut Pcg32, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Bounded particle store; emissions past capacity are dropped
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    /// Multiplier on requested counts (from particle quality)
    emission_scale: f32,
}

impl ParticlePool {
    pub fn new(capacity: usize, emission_scale: f32) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            emission_scale: emission_scale.max(0.0),
        }
    }

    /// Emit a burst at `pos`; returns how many particles were created
    pub fn emit(&mut self, rng: &mut Pcg32, pos: Vec2, color: [f32; 4], burst: Burst) -> usize {
        let requested = (burst.count as f32 * self.emission_scale).round() as usize;
        let room = self.capacity.saturating_sub(self.particles.len());
        let count = requested.min(room);

        for _ in 0..count {
            let life = sample(rng, burst.life);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(sample(rng, burst.velocity), sample(rng, burst.velocity)),
                life,
                max_life: life,
                size: sample(rng, burst.size),
                color,
            });
        }
        count
    }

    /// Age every particle by one update and drop the expired ones
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.life -= 1.0;
            p.size = (p.size - 0.05).max(0.0);
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_emission_scale(&mut self, scale: f32) {
        self.emission_scale = scale.max(0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

/// Trauma-based screen shake
#[derive(Debug, Clone)]
pub struct CameraShake {
    trauma: f32,
    /// Trauma lost per second
    decay: f32,
    /// Offset at full trauma (logical px)
    max_offset: f32,
    offset: Vec2,
}

impl Default for CameraShake {
    fn default() -> Self {
        Self {
            trauma: 0.0,
            decay: 1.5,
            max_offset: 15.0,
            offset: Vec2::ZERO,
        }
    }
}

impl CameraShake {
    /// Add trauma, capped at 1
    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount.max(0.0)).min(1.0);
    }

    pub fn update(&mut self, dt: f32, rng: &mut Pcg32) {
        self.trauma = (self.trauma - self.decay * dt).max(0.0);
        if self.trauma > 0.0 {
            let magnitude = self.trauma * self.trauma * self.max_offset;
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            self.offset = Vec2::from_angle(angle) * magnitude;
        } else {
            self.offset = Vec2::ZERO;
        }
    }

    pub fn trauma(&self) -> f32 {
        self.trauma
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

/// Fixed-length history of recent positions
#[derive(Debug, Clone)]
pub struct MotionTrail {
    points: VecDeque<Vec2>,
    max_len: usize,
}

/// One drawable trail segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub from: Vec2,
    pub to: Vec2,
    /// 0-1, oldest segments are faintest
    pub alpha: f32,
}

impl MotionTrail {
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len),
            max_len: max_len.max(1),
        }
    }

    /// Record a position, dropping the oldest past the limit
    pub fn push(&mut self, pos: Vec2) {
        self.points.push_back(pos);
        while self.points.len() > self.max_len {
            self.points.pop_front();
        }
    }

    /// Segments from oldest to newest
    pub fn segments(&self) -> Vec<TrailSegment> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .enumerate()
            .map(|(i, (&from, &to))| TrailSegment {
                from,
                to,
                alpha: (i + 1) as f32 / (n - 1) as f32,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Particles plus shake; one per run
#[derive(Debug, Clone)]
pub struct EffectsPool {
    pub particles: ParticlePool,
    pub shake: CameraShake,
}

impl EffectsPool {
    pub fn new(capacity: usize, emission_scale: f32) -> Self {
        Self {
            particles: ParticlePool::new(capacity, emission_scale),
            shake: CameraShake::default(),
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut Pcg32) {
        self.particles.update();
        self.shake.update(dt, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_pool_never_exceeds_capacity() {
        let mut rng = rng();
        let mut pool = ParticlePool::new(500, 1.0);
        let emitted = pool.emit(&mut rng, Vec2::ZERO, crate::palette::GOLD, Burst::new(1000));
        assert_eq!(emitted, 500);
        assert_eq!(pool.len(), 500);
        assert_eq!(pool.emit(&mut rng, Vec2::ZERO, crate::palette::GOLD, Burst::new(10)), 0);
        assert_eq!(pool.len(), 500);
    }

    #[test]
    fn test_emission_scale() {
        let mut rng = rng();
        let mut pool = ParticlePool::new(500, 0.25);
        assert_eq!(pool.emit(&mut rng, Vec2::ZERO, crate::palette::RED, Burst::new(20)), 5);
        pool.set_emission_scale(0.0);
        assert_eq!(pool.emit(&mut rng, Vec2::ZERO, crate::palette::RED, Burst::new(20)), 0);
    }

    #[test]
    fn test_particles_age_and_expire() {
        let mut rng = rng();
        let mut pool = ParticlePool::new(100, 1.0);
        let burst = Burst::new(1).velocity(2.0, 2.0).life(3.0, 3.0).size(4.0, 4.0);
        pool.emit(&mut rng, Vec2::ZERO, crate::palette::WHITE, burst);

        pool.update();
        let p = pool.iter().next().cloned().unwrap();
        assert_eq!(p.pos, Vec2::new(2.0, 2.0));
        assert_eq!(p.life, 2.0);
        assert!((p.size - 3.95).abs() < 1e-6);
        assert!((p.life_fraction() - 2.0 / 3.0).abs() < 1e-6);

        pool.update();
        pool.update();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut rng = rng();
        let mut shake = CameraShake::default();
        shake.add_trauma(0.5);
        shake.add_trauma(0.8);
        assert_eq!(shake.trauma(), 1.0);

        shake.update(0.1, &mut rng);
        let expected = 0.85f32 * 0.85 * 15.0;
        assert!((shake.offset().length() - expected).abs() < 1e-3);

        shake.update(1.0, &mut rng);
        assert_eq!(shake.trauma(), 0.0);
        assert_eq!(shake.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_trail_keeps_fixed_length() {
        let mut trail = MotionTrail::new(4);
        for i in 0..10 {
            trail.push(Vec2::new(i as f32, 0.0));
        }
        assert_eq!(trail.len(), 4);
        let segments = trail.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].from, Vec2::new(6.0, 0.0));
        assert_eq!(segments[2].to, Vec2::new(9.0, 0.0));
        assert!(segments[0].alpha < segments[2].alpha);
        assert_eq!(segments[2].alpha, 1.0);
    }
}
