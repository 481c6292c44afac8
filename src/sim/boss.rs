//! Boss director
//!
//! Phase machine driving the boss: descend into view, then alternate idle
//! pauses with a random move, a bottle volley or a charged laser. The
//! director never touches boss health; that belongs to the resolver.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::state::{Boss, BossPhase, Entity, EntityKind, ProjectileKind};
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

pub const BOSS_SPAWN_Y: f32 = -150.0;
/// Resting height after the entrance
pub const BOSS_ENTRY_Y: f32 = 150.0;
pub const ENTRY_SPEED: f32 = 100.0;
/// Below this share of max health the volley widens
pub const ENRAGE_FRACTION: f32 = 0.5;
/// Closer than this to the move target counts as arrived
pub const ARRIVE_DISTANCE: f32 = 10.0;
/// Keep move targets this far from the canvas sides
pub const MOVE_MARGIN: f32 = 150.0;

pub const FAN_NORMAL: [f32; 3] = [-40.0, 0.0, 40.0];
pub const FAN_ENRAGED: [f32; 5] = [-60.0, -30.0, 0.0, 30.0, 60.0];

pub const BOTTLE_SPEED: f32 = 240.0;
pub const BOTTLE_DAMAGE: f32 = 15.0;
pub const SNOWBALL_SPEED: f32 = 300.0;
pub const SNOWBALL_DAMAGE: f32 = 5.0;

pub const LASER_CHARGE_TIME: f32 = 2.0;
pub const LASER_FIRE_TIME: f32 = 1.5;
pub const LASER_START_WIDTH: f32 = 2.0;
/// Telegraph growth while charging (px/s)
pub const LASER_GROWTH: f32 = 20.0;
pub const LASER_FULL_WIDTH: f32 = 60.0;

/// A projectile the boss wants spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossShot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ProjectileKind,
    pub damage: f32,
    /// Guide toward the player
    pub homing: bool,
}

/// Horizontal offsets of the next volley
pub fn fan_offsets(boss: &Boss) -> &'static [f32] {
    if boss.is_enraged() {
        &FAN_ENRAGED
    } else {
        &FAN_NORMAL
    }
}

/// Beam rectangle from the boss's bottom edge to the canvas bottom
pub fn beam_rect(pos: Vec2, size: Vec2, width: f32) -> Option<Aabb> {
    let top = pos.y + size.y / 2.0;
    if width <= 0.0 || top >= LOGICAL_HEIGHT {
        return None;
    }
    Some(Aabb::new(
        Vec2::new(pos.x - width / 2.0, top),
        Vec2::new(pos.x + width / 2.0, LOGICAL_HEIGHT),
    ))
}

fn enter_idle(boss: &mut Boss, vel: &mut Vec2, duration: f32) {
    boss.phase = BossPhase::Idle;
    boss.timer = duration;
    boss.beam_width = 0.0;
    *vel = Vec2::ZERO;
}

fn volley(boss: &Boss, pos: Vec2, size: Vec2, shots: &mut Vec<BossShot>) {
    let muzzle = Vec2::new(pos.x, pos.y + size.y / 2.0);
    for &dx in fan_offsets(boss) {
        shots.push(BossShot {
            pos: muzzle + Vec2::new(dx, 0.0),
            vel: Vec2::new(0.0, BOTTLE_SPEED),
            kind: ProjectileKind::Bottle,
            damage: BOTTLE_DAMAGE,
            homing: false,
        });
    }
}

/// Advance the boss by `dt`, pushing any projectiles it fires into `shots`.
///
/// Non-boss entities are left untouched.
pub fn update(entity: &mut Entity, dt: f32, rng: &mut Pcg32, shots: &mut Vec<BossShot>) {
    let Entity {
        pos, vel, size, kind, ..
    } = entity;
    let EntityKind::Boss(boss) = kind else {
        return;
    };

    match boss.phase {
        BossPhase::Entering => {
            if pos.y >= BOSS_ENTRY_Y {
                pos.y = BOSS_ENTRY_Y;
                enter_idle(boss, vel, 2.0);
                log::debug!("Boss in position");
            } else {
                *vel = Vec2::new(0.0, ENTRY_SPEED);
            }
        }
        BossPhase::Idle => {
            boss.timer -= dt;
            if boss.timer <= 0.0 {
                match rng.random_range(0..3) {
                    0 => {
                        boss.phase = BossPhase::Moving;
                        boss.target_x = rng.random_range(MOVE_MARGIN..=LOGICAL_WIDTH - MOVE_MARGIN);
                    }
                    1 => {
                        boss.phase = BossPhase::Attacking;
                        boss.timer = rng.random_range(2.0..4.0);
                        boss.shoot_timer = 0.0;
                        if boss.lobs_snowballs {
                            shots.push(BossShot {
                                pos: Vec2::new(pos.x, pos.y + size.y / 2.0),
                                vel: Vec2::new(0.0, SNOWBALL_SPEED),
                                kind: ProjectileKind::Snowball,
                                damage: SNOWBALL_DAMAGE,
                                homing: true,
                            });
                        }
                    }
                    _ => {
                        boss.phase = BossPhase::LaserCharge;
                        boss.timer = LASER_CHARGE_TIME;
                        boss.beam_width = LASER_START_WIDTH;
                    }
                }
                log::debug!("Boss -> {:?}", boss.phase);
            }
        }
        BossPhase::Moving => {
            let dx = boss.target_x - pos.x;
            if dx.abs() < ARRIVE_DISTANCE || dx.abs() <= boss.speed * dt {
                pos.x = boss.target_x;
                enter_idle(boss, vel, 1.0);
            } else {
                *vel = Vec2::new(boss.speed * dx.signum(), 0.0);
            }
        }
        BossPhase::Attacking => {
            boss.shoot_timer -= dt;
            if boss.shoot_timer <= 0.0 {
                volley(boss, *pos, *size, shots);
                boss.shoot_timer = boss.shoot_delay;
            }
            boss.timer -= dt;
            if boss.timer <= 0.0 {
                enter_idle(boss, vel, 2.0);
            }
        }
        BossPhase::LaserCharge => {
            boss.timer -= dt;
            boss.beam_width += LASER_GROWTH * dt;
            if boss.timer <= 0.0 {
                boss.phase = BossPhase::LaserFire;
                boss.timer = LASER_FIRE_TIME;
                boss.beam_width = LASER_FULL_WIDTH;
            }
        }
        BossPhase::LaserFire => {
            boss.timer -= dt;
            if boss.timer <= 0.0 {
                enter_idle(boss, vel, 2.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Difficulty;
    use crate::sim::level::LevelConfig;
    use crate::sim::registry::EntityId;
    use rand::SeedableRng;

    fn boss_entity(difficulty: Difficulty) -> Entity {
        let kind = EntityKind::Boss(Boss::new(&LevelConfig::new(1, difficulty)));
        Entity {
            id: EntityId(0),
            pos: Vec2::new(960.0, BOSS_ENTRY_Y),
            vel: Vec2::ZERO,
            size: kind.size(),
            alive: true,
            kind,
        }
    }

    fn boss_mut(e: &mut Entity) -> &mut Boss {
        match &mut e.kind {
            EntityKind::Boss(b) => b,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_entering_settles_then_idles() {
        let mut e = boss_entity(Difficulty::Easy);
        e.pos.y = BOSS_SPAWN_Y;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shots = Vec::new();

        update(&mut e, 0.1, &mut rng, &mut shots);
        assert_eq!(e.vel, Vec2::new(0.0, ENTRY_SPEED));

        e.pos.y = 151.0;
        update(&mut e, 0.1, &mut rng, &mut shots);
        assert_eq!(e.pos.y, BOSS_ENTRY_Y);
        assert_eq!(e.vel, Vec2::ZERO);
        assert_eq!(boss_mut(&mut e).phase, BossPhase::Idle);
        assert!((boss_mut(&mut e).timer - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fan_width_read_at_fire_time() {
        let mut e = boss_entity(Difficulty::Easy);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shots = Vec::new();
        {
            let boss = boss_mut(&mut e);
            boss.phase = BossPhase::Attacking;
            boss.timer = 10.0;
            boss.shoot_timer = 0.0;
            boss.shoot_delay = 1.0;
        }

        update(&mut e, 0.01, &mut rng, &mut shots);
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|s| s.kind == ProjectileKind::Bottle));
        assert!(shots.iter().all(|s| s.vel == Vec2::new(0.0, BOTTLE_SPEED)));

        // Drop below half health between volleys
        let max = boss_mut(&mut e).vitals.max();
        boss_mut(&mut e).vitals.damage(max * 0.6);
        shots.clear();
        update(&mut e, 1.0, &mut rng, &mut shots);
        assert_eq!(shots.len(), 5);
        let xs: Vec<f32> = shots.iter().map(|s| s.pos.x - 960.0).collect();
        assert_eq!(xs, vec![-60.0, -30.0, 0.0, 30.0, 60.0]);
    }

    #[test]
    fn test_exactly_half_health_is_not_enraged() {
        let mut e = boss_entity(Difficulty::Easy);
        let boss = boss_mut(&mut e);
        let half = boss.vitals.max() / 2.0;
        boss.vitals.damage(half);
        assert_eq!(fan_offsets(boss).len(), 3);
    }

    #[test]
    fn test_attack_ends_in_idle() {
        let mut e = boss_entity(Difficulty::Easy);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shots = Vec::new();
        {
            let boss = boss_mut(&mut e);
            boss.phase = BossPhase::Attacking;
            boss.timer = 0.05;
            boss.shoot_timer = 5.0;
        }
        update(&mut e, 0.1, &mut rng, &mut shots);
        assert!(shots.is_empty());
        assert_eq!(boss_mut(&mut e).phase, BossPhase::Idle);
        assert!((boss_mut(&mut e).timer - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_laser_cycle() {
        let mut e = boss_entity(Difficulty::Easy);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shots = Vec::new();
        {
            let boss = boss_mut(&mut e);
            boss.phase = BossPhase::LaserCharge;
            boss.timer = LASER_CHARGE_TIME;
            boss.beam_width = LASER_START_WIDTH;
        }

        update(&mut e, 1.0, &mut rng, &mut shots);
        assert!((boss_mut(&mut e).beam_width - 22.0).abs() < 1e-4);
        assert_eq!(boss_mut(&mut e).phase, BossPhase::LaserCharge);

        update(&mut e, 1.0, &mut rng, &mut shots);
        assert_eq!(boss_mut(&mut e).phase, BossPhase::LaserFire);
        assert_eq!(boss_mut(&mut e).beam_width, LASER_FULL_WIDTH);
        let beam = beam_rect(e.pos, e.size, LASER_FULL_WIDTH).unwrap();
        assert_eq!(beam.max.y, LOGICAL_HEIGHT);
        assert_eq!(beam.min.y, e.pos.y + e.size.y / 2.0);
        assert!((beam.size().x - 60.0).abs() < 1e-4);

        update(&mut e, 1.5, &mut rng, &mut shots);
        assert_eq!(boss_mut(&mut e).phase, BossPhase::Idle);
        assert_eq!(boss_mut(&mut e).beam_width, 0.0);
        assert!(beam_rect(e.pos, e.size, 0.0).is_none());
    }

    #[test]
    fn test_moving_arrives_without_overshoot() {
        let mut e = boss_entity(Difficulty::Easy);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shots = Vec::new();
        {
            let boss = boss_mut(&mut e);
            boss.phase = BossPhase::Moving;
            boss.target_x = 1000.0;
        }
        update(&mut e, 0.1, &mut rng, &mut shots);
        assert!(e.vel.x > 0.0);

        // Next step would pass the target
        e.pos.x = 995.0;
        update(&mut e, 0.1, &mut rng, &mut shots);
        assert_eq!(e.pos.x, 1000.0);
        assert_eq!(e.vel, Vec2::ZERO);
        assert_eq!(boss_mut(&mut e).phase, BossPhase::Idle);
        assert!((boss_mut(&mut e).timer - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_idle_choices_stay_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut shots = Vec::new();
        for _ in 0..200 {
            let mut e = boss_entity(Difficulty::Hard);
            boss_mut(&mut e).phase = BossPhase::Idle;
            boss_mut(&mut e).timer = 0.0;
            shots.clear();
            update(&mut e, 0.016, &mut rng, &mut shots);
            let boss = boss_mut(&mut e);
            match boss.phase {
                BossPhase::Moving => {
                    assert!(boss.target_x >= MOVE_MARGIN);
                    assert!(boss.target_x <= LOGICAL_WIDTH - MOVE_MARGIN);
                }
                BossPhase::Attacking => {
                    // Hard bosses open with a homing snowball
                    assert_eq!(shots.len(), 1);
                    assert!(shots[0].homing);
                    assert_eq!(shots[0].kind, ProjectileKind::Snowball);
                }
                BossPhase::LaserCharge => {
                    assert_eq!(boss.beam_width, LASER_START_WIDTH);
                }
                other => panic!("unexpected phase {other:?}"),
            }
        }
    }
}
