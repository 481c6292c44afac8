//! Homing guidance
//!
//! A homing projectile turns toward its target at a bounded rate and keeps
//! its speed. Guidance ends for good once the target is gone or the
//! projectile has passed it on the vertical axis; the shot then flies
//! straight.

use glam::Vec2;

use super::registry::Registry;
use super::state::{EntityKind, Role};

/// Default max turn rate (radians/s)
pub const HOMING_TURN_RATE: f32 = 3.5;

/// Rotate `vel` toward `target` by at most `max_turn_rate * dt` radians
pub fn steer(vel: Vec2, pos: Vec2, target: Vec2, max_turn_rate: f32, dt: f32) -> Vec2 {
    let desired = target - pos;
    if vel.length_squared() == 0.0 || desired.length_squared() == 0.0 {
        return vel;
    }
    let angle = vel.perp_dot(desired).atan2(vel.dot(desired));
    let max_step = (max_turn_rate * dt).max(0.0);
    Vec2::from_angle(angle.clamp(-max_step, max_step)).rotate(vel)
}

/// True once the projectile is beyond the target along its vertical travel
pub fn has_passed(pos: Vec2, vel: Vec2, target: Vec2) -> bool {
    if vel.y > 0.0 {
        pos.y > target.y
    } else {
        pos.y < target.y
    }
}

/// Steer every homing projectile; drops guidance that can no longer apply
pub fn update_homing(registry: &mut Registry, dt: f32) {
    let mut plans = Vec::new();
    for role in [Role::PlayerProjectile, Role::EnemyProjectile] {
        for i in registry.indices(role) {
            let e = registry.at(i);
            let EntityKind::Projectile(p) = &e.kind else {
                continue;
            };
            if let Some(homing) = p.homing {
                let target = registry.get(homing.target).map(|t| t.pos);
                plans.push((i, target, homing.turn_rate));
            }
        }
    }

    for (i, target, turn_rate) in plans {
        let e = registry.at_mut(i);
        let EntityKind::Projectile(p) = &mut e.kind else {
            continue;
        };
        match target {
            Some(target) if !has_passed(e.pos, e.vel, target) => {
                e.vel = steer(e.vel, e.pos, target, turn_rate, dt);
            }
            _ => p.homing = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, EnemyKind, Faction, Projectile, ProjectileKind};
    use proptest::prelude::*;

    #[test]
    fn test_turn_is_bounded() {
        // Target straight to the right, moving up: needs a 90 degree turn
        let vel = Vec2::new(0.0, -300.0);
        let out = steer(vel, Vec2::ZERO, Vec2::new(100.0, 0.0), 3.5, 0.1);
        let turned = vel.angle_to(out).abs();
        assert!((turned - 0.35).abs() < 1e-4);
        assert!((out.length() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_small_correction_lands_on_target() {
        let vel = Vec2::new(0.0, -300.0);
        let target = Vec2::new(1.0, -100.0);
        let out = steer(vel, Vec2::ZERO, target, 3.5, 0.1);
        assert!(out.normalize().angle_to(target.normalize()).abs() < 1e-4);
    }

    #[test]
    fn test_pass_cutoff() {
        let target = Vec2::new(0.0, 100.0);
        // Moving up, still below the target
        assert!(!has_passed(Vec2::new(0.0, 200.0), Vec2::new(0.0, -1.0), target));
        assert!(has_passed(Vec2::new(0.0, 50.0), Vec2::new(0.0, -1.0), target));
        // Moving down
        assert!(!has_passed(Vec2::new(0.0, 50.0), Vec2::new(0.0, 1.0), target));
        assert!(has_passed(Vec2::new(0.0, 150.0), Vec2::new(0.0, 1.0), target));
    }

    #[test]
    fn test_dead_target_disables_homing() {
        let mut reg = Registry::new();
        let target = reg.spawn(
            EntityKind::Enemy(Enemy::new(EnemyKind::Basic)),
            Vec2::new(300.0, 100.0),
            Vec2::ZERO,
        );
        let shot = reg.spawn(
            EntityKind::Projectile(
                Projectile::new(ProjectileKind::Juice, Faction::Player, 10.0)
                    .with_homing(target, HOMING_TURN_RATE),
            ),
            Vec2::new(0.0, 500.0),
            Vec2::new(0.0, -300.0),
        );

        update_homing(&mut reg, 0.1);
        let vel = reg.get(shot).map(|e| e.vel).unwrap_or_default();
        assert!(vel.x > 0.0, "should curve toward the target");

        reg.mark_dead(target);
        reg.sweep();
        update_homing(&mut reg, 0.1);
        let e = reg.get(shot).unwrap();
        assert_eq!(e.vel, vel, "straight flight after the target is lost");
        match &e.kind {
            EntityKind::Projectile(p) => assert!(p.homing.is_none()),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_steer_preserves_speed(
            vx in -500.0f32..500.0, vy in -500.0f32..500.0,
            tx in -1000.0f32..1000.0, ty in -1000.0f32..1000.0,
            dt in 0.0f32..0.1,
        ) {
            let vel = Vec2::new(vx, vy);
            prop_assume!(vel.length() > 1.0);
            let out = steer(vel, Vec2::ZERO, Vec2::new(tx, ty), HOMING_TURN_RATE, dt);
            prop_assert!((out.length() - vel.length()).abs() <= vel.length() * 1e-4);
            prop_assert!(vel.angle_to(out).abs() <= HOMING_TURN_RATE * dt + 1e-4);
        }
    }
}
