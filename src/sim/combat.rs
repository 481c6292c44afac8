//! Combat and collision resolution
//!
//! Runs once per frame after movement and the directors, in a fixed order:
//!
//! 1. player shots vs enemies
//! 2. player shots vs boss
//! 3. enemies vs player
//! 4. enemy shots vs player, then the boss beam
//! 5. power-ups vs player
//!
//! Anything killed in a pass is flagged dead at once, so later passes skip
//! it; actual removal waits for the registry sweep.

use glam::Vec2;
use rand::Rng;

use super::boss::beam_rect;
use super::effects::Burst;
use super::registry::EntityId;
use super::state::{
    BossPhase, EnemyKind, EntityKind, GameEvent, GameState, PowerUpEffect, PowerUpKind, Role,
};
use crate::consts::{COMBO_STEP, COMBO_WINDOW, FREEZE_DURATION};
use crate::palette;
use crate::progression::ProgressionStore;

/// Contact damage per enemy touching the player
pub const CONTACT_DAMAGE: f32 = 10.0;
/// Beam damage per second while the player stands in it
pub const BEAM_DPS: f32 = 60.0;
/// Experience granted per kill
pub const KILL_XP: u32 = 10;

const HIT_BURST: Burst = Burst::new(15);
const IMPACT_BURST: Burst = Burst::new(5);
const CONTACT_BURST: Burst = Burst::new(20).velocity(-4.0, 4.0);
const SHOT_HIT_BURST: Burst = Burst::new(10);
const BEAM_BURST: Burst = Burst::new(2);
const PICKUP_BURST: Burst = Burst::new(10);
const BOSS_DEATH_ROUNDS: usize = 100;
const BOSS_DEATH_BURST: Burst = Burst::new(2).velocity(-15.0, 15.0).life(40.0, 80.0).size(4.0, 10.0);

/// Kill score at the current combo: `floor(score_value * (1 + combo * 0.1))`
pub fn kill_score(score_value: u32, combo: u32) -> u64 {
    (score_value as f64 * (1.0 + combo as f64 * COMBO_STEP as f64)).floor() as u64
}

/// Loot roll for a destroyed enemy
pub fn roll_drop(kind: EnemyKind, rng: &mut impl Rng) -> Option<PowerUpKind> {
    let roll: f32 = rng.random();
    match kind {
        EnemyKind::Basic => match roll {
            r if r < 0.10 => Some(PowerUpKind::TripleShot),
            r if r < 0.20 => Some(PowerUpKind::Spread),
            r if r < 0.30 => Some(PowerUpKind::RapidFire),
            r if r < 0.35 => Some(PowerUpKind::Shield),
            _ => None,
        },
        EnemyKind::Fast => (roll < 0.20).then_some(PowerUpKind::Health),
    }
}

/// Run every pass for this frame
pub fn resolve(state: &mut GameState, progression: &mut ProgressionStore, dt: f32) {
    player_shots_vs_enemies(state, progression);
    player_shots_vs_boss(state, progression);
    enemies_vs_player(state, progression);
    if player_down(state) {
        return;
    }
    enemy_shots_vs_player(state, progression);
    if player_down(state) {
        return;
    }
    beam_vs_player(state, progression, dt);
    if player_down(state) {
        return;
    }
    power_ups_vs_player(state);
}

/// A depleted player takes no further part in this frame's passes
fn player_down(state: &GameState) -> bool {
    state.player().is_none_or(|p| p.vitals.is_depleted())
}

fn player_damage_mult(state: &GameState) -> f32 {
    state.player().map_or(1.0, |p| p.damage_mult)
}

fn player_shots_vs_enemies(state: &mut GameState, progression: &mut ProgressionStore) {
    let shots = state.registry.indices(Role::PlayerProjectile);
    let enemies = state.registry.indices(Role::Enemy);

    for e in enemies {
        let enemy_box = {
            let enemy = state.registry.at(e);
            if !enemy.alive {
                continue;
            }
            enemy.aabb()
        };
        let hit = shots.iter().copied().find(|&s| {
            let shot = state.registry.at(s);
            shot.alive && shot.aabb().overlaps(&enemy_box)
        });
        let Some(s) = hit else {
            continue;
        };

        let shot = state.registry.at_mut(s);
        shot.alive = false;
        let damage = match &shot.kind {
            EntityKind::Projectile(p) => p.damage,
            _ => 0.0,
        };

        let enemy = state.registry.at_mut(e);
        enemy.alive = false;
        let pos = enemy.pos;
        let EntityKind::Enemy(data) = &mut enemy.kind else {
            continue;
        };
        data.vitals.damage(damage.max(data.vitals.health()));
        let (kind, score_value) = (data.kind, data.score_value);

        let gained = kill_score(score_value, state.combo);
        state.score += gained;
        state.combo += 1;
        state.combo_timer = COMBO_WINDOW;

        let coins = state.rng.random_range(1..=5);
        state.coins_collected += coins as u64;
        progression.add_currency(coins);
        progression.add_experience(KILL_XP);

        if let Some(drop) = roll_drop(kind, &mut state.rng) {
            state.spawn_power_up(drop, pos);
        }

        state
            .effects
            .particles
            .emit(&mut state.rng, pos, palette::GREEN, HIT_BURST);
        state.effects.shake.add_trauma(0.2);
        state.events.push(GameEvent::EnemyKilled {
            kind,
            score: gained,
        });
    }
}

fn player_shots_vs_boss(state: &mut GameState, progression: &mut ProgressionStore) {
    let Some(boss_id) = state.boss else {
        return;
    };
    let Some(boss_box) = state.registry.get(boss_id).map(|b| b.aabb()) else {
        return;
    };
    let mult = player_damage_mult(state);

    for s in state.registry.indices(Role::PlayerProjectile) {
        let shot = state.registry.at_mut(s);
        if !shot.alive || !shot.aabb().overlaps(&boss_box) {
            continue;
        }
        shot.alive = false;
        let hit_pos = shot.pos;
        let damage = match &shot.kind {
            EntityKind::Projectile(p) => p.damage * mult,
            _ => 0.0,
        };

        state
            .effects
            .particles
            .emit(&mut state.rng, hit_pos, palette::RED, IMPACT_BURST);

        let Some(boss_entity) = state.registry.get_mut(boss_id) else {
            return;
        };
        let center = boss_entity.pos;
        let EntityKind::Boss(boss) = &mut boss_entity.kind else {
            return;
        };
        boss.vitals.damage(damage);
        if boss.vitals.is_depleted() {
            boss_entity.alive = false;
            defeat_boss(state, progression, center);
            return;
        }
    }
}

fn defeat_boss(state: &mut GameState, progression: &mut ProgressionStore, center: Vec2) {
    state.boss = None;
    for _ in 0..BOSS_DEATH_ROUNDS {
        for color in [palette::COKE_RED, palette::GOLD, palette::WHITE, palette::NEON_BLUE] {
            state
                .effects
                .particles
                .emit(&mut state.rng, center, color, BOSS_DEATH_BURST);
        }
    }
    state.effects.shake.add_trauma(1.0);
    state.events.push(GameEvent::BossDefeated);
    log::info!("Boss defeated at score {}", state.score);
    state.enter_level_complete(progression);
}

fn enemies_vs_player(state: &mut GameState, progression: &mut ProgressionStore) {
    let Some(player_box) = state.player_entity().map(|p| p.aabb()) else {
        return;
    };

    let mut touching = 0usize;
    for e in state.registry.indices(Role::Enemy) {
        let enemy = state.registry.at_mut(e);
        if enemy.alive && enemy.aabb().overlaps(&player_box) {
            enemy.alive = false;
            touching += 1;
        }
    }
    if touching == 0 {
        return;
    }

    let damage = CONTACT_DAMAGE * touching as f32;
    let center = player_box.center();
    if let Some(player) = state.player_mut() {
        player.vitals.damage(damage);
    }
    state.combo = 0;
    state
        .effects
        .particles
        .emit(&mut state.rng, center, palette::RED, CONTACT_BURST);
    state.effects.shake.add_trauma(0.5);
    state.events.push(GameEvent::PlayerHit { damage });
    check_defeat(state, progression);
}

fn enemy_shots_vs_player(state: &mut GameState, progression: &mut ProgressionStore) {
    let Some(player_box) = state.player_entity().map(|p| p.aabb()) else {
        return;
    };

    for s in state.registry.indices(Role::EnemyProjectile) {
        if player_down(state) {
            break;
        }
        let shot = state.registry.at_mut(s);
        if !shot.alive || !shot.aabb().overlaps(&player_box) {
            continue;
        }
        shot.alive = false;
        let pos = shot.pos;
        let EntityKind::Projectile(p) = &shot.kind else {
            continue;
        };
        let (damage, freezes) = (p.damage, p.kind.freezes());

        let mut frozen = false;
        if let Some(player) = state.player_mut() {
            player.vitals.damage(damage);
            if freezes {
                frozen = player.freeze(FREEZE_DURATION);
            }
        }
        state
            .effects
            .particles
            .emit(&mut state.rng, pos, palette::BLUE, SHOT_HIT_BURST);
        state.effects.shake.add_trauma(0.3);
        state.events.push(GameEvent::PlayerHit { damage });
        if frozen {
            state.events.push(GameEvent::PlayerFrozen);
        }
    }
    check_defeat(state, progression);
}

fn beam_vs_player(state: &mut GameState, progression: &mut ProgressionStore, dt: f32) {
    let Some(beam) = state.boss_entity().and_then(|e| match &e.kind {
        EntityKind::Boss(b) if b.phase == BossPhase::LaserFire => beam_rect(e.pos, e.size, b.beam_width),
        _ => None,
    }) else {
        return;
    };
    let Some(player_box) = state.player_entity().map(|p| p.aabb()) else {
        return;
    };
    if !beam.overlaps(&player_box) {
        return;
    }

    let damage = BEAM_DPS * dt;
    if let Some(player) = state.player_mut() {
        player.vitals.damage(damage);
    }
    state
        .effects
        .particles
        .emit(&mut state.rng, player_box.center(), palette::RED, BEAM_BURST);
    state.effects.shake.add_trauma(0.1);
    check_defeat(state, progression);
}

fn power_ups_vs_player(state: &mut GameState) {
    let Some(player_box) = state.player_entity().map(|p| p.aabb()) else {
        return;
    };

    let mut collected = Vec::new();
    for i in state.registry.indices(Role::PowerUp) {
        let pickup = state.registry.at_mut(i);
        if !pickup.alive || !pickup.aabb().overlaps(&player_box) {
            continue;
        }
        pickup.alive = false;
        if let EntityKind::PowerUp(p) = &pickup.kind {
            collected.push((p.kind, pickup.pos));
        }
    }

    for (kind, pos) in collected {
        apply_power_up(state, kind);
        state.score += kind.score_bonus();
        state
            .effects
            .particles
            .emit(&mut state.rng, pos, palette::GOLD, PICKUP_BURST);
        state.events.push(GameEvent::PowerUpCollected(kind));
    }
}

/// Apply a pickup's effect to the player
pub fn apply_power_up(state: &mut GameState, kind: PowerUpKind) {
    let Some(player) = state.player_mut() else {
        return;
    };
    match kind.effect() {
        PowerUpEffect::Heal(amount) => {
            player.vitals.heal(amount);
        }
        PowerUpEffect::Buff { kind, duration } => player.buffs.arm(kind, duration),
    }
}

fn check_defeat(state: &mut GameState, progression: &mut ProgressionStore) {
    if state.player().is_some_and(|p| p.vitals.is_depleted()) {
        state.enter_defeat(progression);
    }
}

/// Nearest live enemy to `from`, falling back to the boss
pub fn nearest_target(state: &GameState, from: Vec2) -> Option<EntityId> {
    let mut best: Option<(f32, EntityId)> = None;
    state.registry.for_each(Role::Enemy, |e| {
        let d = e.pos.distance_squared(from);
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, e.id));
        }
    });
    best.map(|(_, id)| id)
        .or_else(|| state.boss.filter(|&id| state.registry.is_alive(id)))
}
