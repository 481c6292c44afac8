//! Frame simulation tick
//!
//! Core game loop: input intent, movement, directors, combat, effects and the
//! deferred sweep, in that order.

use glam::Vec2;

use super::boss;
use super::collision::Aabb;
use super::combat::{self, nearest_target};
use super::homing::{HOMING_TURN_RATE, update_homing};
use super::state::{
    BossPhase, BuffKind, ControlMode, Entity, EntityKind, Faction, GameEvent, GamePhase, GameState,
    Projectile, ProjectileKind, Role,
};
use crate::consts::*;
use crate::progression::ProgressionStore;

/// Companion shot tuning
const JUICE_SPEED: f32 = 300.0;
const JUICE_DAMAGE: f32 = 15.0;
/// Companion follow smoothing (1/s)
const COMPANION_FOLLOW: f32 = 10.0;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional intent, each axis in -1..=1 (+y is down)
    pub direction: Vec2,
    /// Pointer position in logical units (pointer control mode)
    pub pointer: Option<Vec2>,
    /// Fire held
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Switch between key and pointer steering
    pub toggle_control: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Shot layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShotPattern {
    Single,
    Triple,
    Spread,
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, progression: &mut ProgressionStore) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    // Nothing moves while paused or after the run ended
    match state.phase {
        GamePhase::Paused | GamePhase::Victory | GamePhase::Defeat => return,
        _ => {}
    }

    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
    state.time += dt;

    if state.phase == GamePhase::LevelComplete {
        // Let the finale play out, no more combat
        state.registry.integrate(dt);
        clamp_player(state);
        cull_offscreen(state);
        state.effects.update(dt, &mut state.rng);
        state.registry.sweep();

        state.level_complete_timer -= dt;
        if state.level_complete_timer <= 0.0 {
            state.phase = GamePhase::Victory;
            state.events.push(GameEvent::Victory);
            log::info!("Victory! Final score {}", state.score);
        }
        return;
    }

    // Idle/demo mode - AI plays the game
    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    // 1. Intent
    let pattern = update_player(state, input, dt);
    steer_companion(state);

    // 2. Movement
    state.registry.integrate(dt);

    // 3. Role logic
    clamp_player(state);
    if let Some(pattern) = pattern {
        fire_player(state, pattern);
    }
    fire_companion(state, dt);
    update_homing(&mut state.registry, dt);
    cull_offscreen(state);
    record_trails(state);

    // 4. Directors
    run_directors(state, dt);

    // 5. Combo window
    if state.combo_timer > 0.0 {
        state.combo_timer -= dt;
        if state.combo_timer <= 0.0 {
            state.combo_timer = 0.0;
            state.combo = 0;
        }
    }

    // 6. Combat
    combat::resolve(state, progression, dt);

    // 7. Effects
    state.effects.update(dt, &mut state.rng);

    // 8. Sweep
    state.registry.sweep();
}

/// Apply the player's intent; returns the shot pattern to fire this frame
fn update_player(state: &mut GameState, input: &TickInput, dt: f32) -> Option<ShotPattern> {
    let entity = state.registry.get_mut(state.player)?;
    let Entity { pos, vel, kind, .. } = entity;
    let EntityKind::Player(player) = kind else {
        return None;
    };

    player.buffs.tick(dt);
    if input.toggle_control {
        player.control = match player.control {
            ControlMode::Keys => ControlMode::Pointer,
            ControlMode::Pointer => ControlMode::Keys,
        };
        log::info!("Control mode: {:?}", player.control);
    }

    if player.frozen > 0.0 {
        player.frozen = (player.frozen - dt).max(0.0);
        *vel = Vec2::ZERO;
        return None;
    }

    player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);

    *vel = match player.control {
        ControlMode::Keys => input.direction.clamp(Vec2::NEG_ONE, Vec2::ONE) * player.speed,
        ControlMode::Pointer => match input.pointer {
            Some(target) => {
                let dx = target.x - pos.x;
                if dx.abs() <= POINTER_DEAD_ZONE {
                    Vec2::ZERO
                } else if dt > 0.0 && dx.abs() < player.speed * dt {
                    // Land on the pointer instead of overshooting it
                    Vec2::new(dx / dt, 0.0)
                } else {
                    Vec2::new(player.speed * dx.signum(), 0.0)
                }
            }
            None => Vec2::ZERO,
        },
    };

    let wants_fire = input.fire || player.auto_fire;
    if !wants_fire || player.fire_cooldown > 0.0 {
        return None;
    }
    player.fire_cooldown = player.cooldown();

    Some(if player.buffs.is_active(BuffKind::TripleShot) {
        ShotPattern::Triple
    } else if player.buffs.is_active(BuffKind::SpreadShot) {
        ShotPattern::Spread
    } else {
        ShotPattern::Single
    })
}

fn steer_companion(state: &mut GameState) {
    let Some(anchor) = state.player_entity().map(|p| p.pos) else {
        return;
    };
    state.registry.for_each_mut(Role::Companion, |e| {
        if let EntityKind::Companion(c) = &e.kind {
            e.vel = (anchor + c.offset - e.pos) * COMPANION_FOLLOW;
        }
    });
}

fn clamp_player(state: &mut GameState) {
    let Some(e) = state.registry.get_mut(state.player) else {
        return;
    };
    let half = e.size / 2.0 + Vec2::splat(PLAYER_EDGE_MARGIN);
    let max = Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT) - half;
    e.pos = e.pos.clamp(half, max.max(half));
}

fn fire_player(state: &mut GameState, pattern: ShotPattern) {
    let Some(e) = state.player_entity() else {
        return;
    };
    let muzzle = Vec2::new(e.pos.x, e.top());
    let up = Vec2::new(0.0, -BULLET_SPEED);

    let shots: Vec<(Vec2, Vec2)> = match pattern {
        ShotPattern::Single => vec![(muzzle, up)],
        ShotPattern::Triple => vec![
            (muzzle, up),
            (muzzle + Vec2::new(-20.0, 10.0), up),
            (muzzle + Vec2::new(20.0, 10.0), up),
        ],
        ShotPattern::Spread => vec![
            (muzzle, up),
            (muzzle, Vec2::new(-100.0, -BULLET_SPEED * 0.9)),
            (muzzle, Vec2::new(100.0, -BULLET_SPEED * 0.9)),
            (muzzle, Vec2::new(-200.0, -BULLET_SPEED * 0.8)),
            (muzzle, Vec2::new(200.0, -BULLET_SPEED * 0.8)),
        ],
    };

    for (pos, vel) in shots {
        state.spawn_projectile(
            Projectile::new(ProjectileKind::Bullet, Faction::Player, BULLET_DAMAGE),
            pos,
            vel,
        );
    }
    state.events.push(GameEvent::PlayerFired);
}

fn fire_companion(state: &mut GameState, dt: f32) {
    let mut ready = Vec::new();
    state.registry.for_each_mut(Role::Companion, |e| {
        if let EntityKind::Companion(c) = &mut e.kind {
            c.shoot_timer -= dt;
            if c.shoot_timer <= 0.0 {
                ready.push((e.id, Vec2::new(e.pos.x, e.top())));
            }
        }
    });

    for (id, muzzle) in ready {
        // Hold fire until something is in range
        let Some(target) = nearest_target(state, muzzle) else {
            continue;
        };
        state.spawn_projectile(
            Projectile::new(ProjectileKind::Juice, Faction::Player, JUICE_DAMAGE)
                .with_homing(target, HOMING_TURN_RATE),
            muzzle,
            Vec2::new(0.0, -JUICE_SPEED),
        );
        if let Some(EntityKind::Companion(c)) = state.registry.get_mut(id).map(|e| &mut e.kind) {
            c.shoot_timer = c.shoot_delay;
        }
    }
}

fn cull_offscreen(state: &mut GameState) {
    let canvas = Aabb::new(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT));
    let projectile_bounds = canvas.expanded(PROJECTILE_CULL_MARGIN);

    for role in [Role::PlayerProjectile, Role::EnemyProjectile] {
        state.registry.for_each_mut(role, |e| {
            if !e.aabb().overlaps(&projectile_bounds) {
                e.alive = false;
            }
        });
    }
    state.registry.for_each_mut(Role::Enemy, |e| {
        if e.top() > LOGICAL_HEIGHT + ENEMY_CULL_MARGIN {
            e.alive = false;
        }
    });
    state.registry.for_each_mut(Role::PowerUp, |e| {
        if e.top() > LOGICAL_HEIGHT {
            e.alive = false;
        }
    });
}

fn record_trails(state: &mut GameState) {
    for role in [Role::PlayerProjectile, Role::EnemyProjectile] {
        state.registry.for_each_mut(role, |e| {
            let pos = e.pos;
            if let EntityKind::Projectile(p) = &mut e.kind {
                if let Some(trail) = p.trail.as_mut() {
                    trail.push(pos);
                }
            }
        });
    }
}

fn run_directors(state: &mut GameState, dt: f32) {
    if !state.boss_spawned && state.score >= state.level.boss_trigger_score {
        state.spawn_boss();
    }

    if let Some(boss_id) = state.boss {
        let mut shots = Vec::new();
        if let Some(e) = state.registry.get_mut(boss_id) {
            boss::update(e, dt, &mut state.rng, &mut shots);
        }
        for shot in shots {
            let mut projectile = Projectile::new(shot.kind, Faction::Enemy, shot.damage);
            if shot.homing {
                projectile = projectile.with_homing(state.player, HOMING_TURN_RATE);
            }
            state.spawn_projectile(projectile, shot.pos, shot.vel);
        }
    } else if !state.boss_spawned {
        let live = state.registry.count(Role::Enemy);
        if let Some(kind) = state
            .waves
            .update(dt, live, &mut state.rng, &mut state.events)
        {
            state.spawn_enemy(kind);
        }
    }
}

/// Demo AI: dodge what is about to hit, otherwise line up under a target
fn autopilot(state: &GameState, input: &mut TickInput) {
    let Some(me) = state.player_entity() else {
        return;
    };
    input.fire = true;

    // Incoming shots and enemies close above us
    let mut threat: Option<f32> = None;
    let mut consider = |e: &Entity| {
        let dx = e.pos.x - me.pos.x;
        let dy = me.pos.y - e.pos.y;
        if dx.abs() < 110.0 && dy > -40.0 && dy < 320.0 {
            threat = Some(threat.map_or(e.pos.x, |t| if dx.abs() < (t - me.pos.x).abs() { e.pos.x } else { t }));
        }
    };
    state.registry.for_each(Role::EnemyProjectile, &mut consider);
    state.registry.for_each(Role::Enemy, &mut consider);

    // Stand clear of a charging or firing beam
    let beam_x = state.boss_entity().and_then(|e| match &e.kind {
        EntityKind::Boss(b) if matches!(b.phase, BossPhase::LaserCharge | BossPhase::LaserFire) => {
            Some(e.pos.x)
        }
        _ => None,
    });

    let target_x = if let Some(bx) = beam_x.filter(|bx| (bx - me.pos.x).abs() < 140.0) {
        if me.pos.x >= bx { bx + 200.0 } else { bx - 200.0 }
    } else if let Some(tx) = threat {
        if me.pos.x >= tx { me.pos.x + 150.0 } else { me.pos.x - 150.0 }
    } else {
        nearest_target(state, me.pos)
            .and_then(|id| state.registry.get(id))
            .map_or(LOGICAL_WIDTH / 2.0, |t| t.pos.x)
    };
    let target_x = target_x.clamp(PLAYER_SIZE, LOGICAL_WIDTH - PLAYER_SIZE);
    let home_y = LOGICAL_HEIGHT - 100.0;

    let axis = |delta: f32| if delta.abs() > 6.0 { delta.signum() } else { 0.0 };
    input.direction = Vec2::new(axis(target_x - me.pos.x), axis(home_y - me.pos.y));
    input.pointer = Some(Vec2::new(target_x, home_y));
}
