//! Draw list construction
//!
//! Turns a [`GameState`] into an ordered list of shapes in physical pixels.
//! Everything is laid out in logical units first (with camera shake), then
//! mapped through the [`Viewport`]; letterbox bars are appended last so they
//! always cover anything that strays off the canvas.

use std::collections::HashMap;

use glam::Vec2;

use super::vertex::colors;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::palette;
use crate::settings::Settings;
use crate::sim::boss::beam_rect;
use crate::sim::collision::Aabb;
use crate::sim::state::{
    BossPhase, BuffKind, EnemyKind, Entity, EntityKind, GameState, PowerUpKind, ProjectileKind,
    RenderLayer,
};
use crate::viewport::Viewport;

/// Fallback visual size for missing or broken sprite entries
pub const PLACEHOLDER_SIZE: f32 = 32.0;

/// Primitive in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { min: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
    Ring { center: Vec2, inner: f32, outer: f32 },
    Segment { from: Vec2, to: Vec2, width: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub layer: RenderLayer,
    pub shape: Shape,
    pub color: [f32; 4],
}

/// What each entity kind looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Player,
    Companion,
    Enemy(EnemyKind),
    Boss,
    Projectile(ProjectileKind),
    PowerUp(PowerUpKind),
}

impl SpriteKey {
    pub fn of(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Player(_) => SpriteKey::Player,
            EntityKind::Companion(_) => SpriteKey::Companion,
            EntityKind::Enemy(e) => SpriteKey::Enemy(e.kind),
            EntityKind::Boss(_) => SpriteKey::Boss,
            EntityKind::Projectile(p) => SpriteKey::Projectile(p.kind),
            EntityKind::PowerUp(p) => SpriteKey::PowerUp(p.kind),
        }
    }
}

/// Logical size, tint and outline of a sprite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub size: Vec2,
    pub color: [f32; 4],
    pub round: bool,
}

impl Sprite {
    pub const PLACEHOLDER: Sprite = Sprite {
        size: Vec2::splat(PLACEHOLDER_SIZE),
        color: palette::WHITE,
        round: false,
    };

    fn is_usable(&self) -> bool {
        self.size.is_finite() && self.size.x > 0.0 && self.size.y > 0.0
    }
}

/// Sprite lookup; unknown or broken entries draw as the placeholder
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    sprites: HashMap<SpriteKey, Sprite>,
}

impl Default for SpriteSheet {
    fn default() -> Self {
        let rect = |w: f32, h: f32, color| Sprite {
            size: Vec2::new(w, h),
            color,
            round: false,
        };
        let round = |d: f32, color| Sprite {
            size: Vec2::splat(d),
            color,
            round: true,
        };
        let sprites = HashMap::from([
            (SpriteKey::Player, rect(80.0, 80.0, colors::PLAYER)),
            (SpriteKey::Companion, rect(24.0, 48.0, colors::COMPANION)),
            (SpriteKey::Enemy(EnemyKind::Basic), rect(64.0, 64.0, colors::ENEMY_BASIC)),
            (SpriteKey::Enemy(EnemyKind::Fast), rect(48.0, 48.0, colors::ENEMY_FAST)),
            (SpriteKey::Boss, rect(260.0, 150.0, colors::BOSS)),
            (SpriteKey::Projectile(ProjectileKind::Bullet), rect(20.0, 48.0, colors::BULLET)),
            (SpriteKey::Projectile(ProjectileKind::Bottle), rect(36.0, 84.0, colors::BOTTLE)),
            (SpriteKey::Projectile(ProjectileKind::Snowball), round(16.0, colors::SNOWBALL)),
            (SpriteKey::Projectile(ProjectileKind::Juice), rect(10.0, 20.0, colors::JUICE)),
            (SpriteKey::PowerUp(PowerUpKind::Health), round(24.0, palette::GREEN)),
            (SpriteKey::PowerUp(PowerUpKind::TripleShot), round(24.0, palette::GOLD)),
            (SpriteKey::PowerUp(PowerUpKind::Spread), round(24.0, palette::NEON_PURPLE)),
            (SpriteKey::PowerUp(PowerUpKind::RapidFire), round(24.0, palette::NEON_PINK)),
            (SpriteKey::PowerUp(PowerUpKind::Shield), round(24.0, palette::NEON_BLUE)),
        ]);
        Self { sprites }
    }
}

impl SpriteSheet {
    /// Sprite for `key`, or the placeholder
    pub fn get(&self, key: SpriteKey) -> Sprite {
        match self.sprites.get(&key) {
            Some(sprite) if sprite.is_usable() => *sprite,
            Some(_) => {
                log::debug!("Degenerate sprite for {:?}, using placeholder", key);
                Sprite::PLACEHOLDER
            }
            None => Sprite::PLACEHOLDER,
        }
    }

    pub fn insert(&mut self, key: SpriteKey, sprite: Sprite) {
        self.sprites.insert(key, sprite);
    }

    pub fn remove(&mut self, key: SpriteKey) -> Option<Sprite> {
        self.sprites.remove(&key)
    }
}

/// Collects logical-space shapes and maps them to physical pixels
struct Frame<'a> {
    viewport: &'a Viewport,
    shake: Vec2,
    commands: Vec<DrawCommand>,
}

impl Frame<'_> {
    fn push(&mut self, layer: RenderLayer, shape: Shape, color: [f32; 4]) {
        self.commands.push(DrawCommand { layer, shape, color });
    }

    fn rect(&mut self, layer: RenderLayer, min: Vec2, size: Vec2, color: [f32; 4]) {
        let shape = Shape::Rect {
            min: self.viewport.to_physical(min + self.shake),
            size: size * self.viewport.scale(),
        };
        self.push(layer, shape, color);
    }

    fn circle(&mut self, layer: RenderLayer, center: Vec2, radius: f32, color: [f32; 4]) {
        let shape = Shape::Circle {
            center: self.viewport.to_physical(center + self.shake),
            radius: self.viewport.scale_value(radius),
        };
        self.push(layer, shape, color);
    }

    fn ring(&mut self, layer: RenderLayer, center: Vec2, inner: f32, outer: f32, color: [f32; 4]) {
        let shape = Shape::Ring {
            center: self.viewport.to_physical(center + self.shake),
            inner: self.viewport.scale_value(inner),
            outer: self.viewport.scale_value(outer),
        };
        self.push(layer, shape, color);
    }

    fn segment(&mut self, layer: RenderLayer, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        let shape = Shape::Segment {
            from: self.viewport.to_physical(from + self.shake),
            to: self.viewport.to_physical(to + self.shake),
            width: self.viewport.scale_value(width),
        };
        self.push(layer, shape, color);
    }
}

/// Build this frame's draw list, back to front
pub fn build_frame(
    state: &GameState,
    viewport: &Viewport,
    sprites: &SpriteSheet,
    settings: &Settings,
) -> Vec<DrawCommand> {
    let shake = if settings.effective_screen_shake() {
        state.effects.shake.offset()
    } else {
        Vec2::ZERO
    };
    let mut frame = Frame {
        viewport,
        shake: Vec2::ZERO,
        commands: Vec::new(),
    };
    let canvas = Aabb::new(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT));

    // Background is the fixed canvas
    frame.rect(
        RenderLayer::Background,
        Vec2::ZERO,
        canvas.size(),
        state.level.theme.background,
    );
    frame.shake = shake;

    for entity in state.registry.draw_order() {
        draw_entity(&mut frame, entity, sprites, &canvas);
    }

    for p in state.effects.particles.iter() {
        frame.circle(
            RenderLayer::Particle,
            p.pos,
            p.size,
            crate::fade(p.color, p.life_fraction()),
        );
    }

    draw_overlays(&mut frame, state);

    let mut commands = frame.commands;
    // Stable: equal layers keep emission order
    commands.sort_by_key(|c| c.layer);

    for bar in viewport.letterbox_bars() {
        commands.push(DrawCommand {
            layer: RenderLayer::Effects,
            shape: Shape::Rect {
                min: bar.min,
                size: bar.size,
            },
            color: palette::LETTERBOX,
        });
    }
    commands
}

fn draw_entity(frame: &mut Frame<'_>, entity: &Entity, sprites: &SpriteSheet, canvas: &Aabb) {
    let sprite = sprites.get(SpriteKey::of(&entity.kind));
    if !Aabb::from_center(entity.pos, sprite.size).overlaps(canvas) {
        return;
    }
    let layer = entity.layer();
    let mut color = sprite.color;

    match &entity.kind {
        EntityKind::Player(p) => {
            if p.is_frozen() {
                color = colors::PLAYER_FROZEN;
            }
            if p.buffs.is_active(BuffKind::Shield) {
                let r = sprite.size.max_element() * 0.7;
                frame.ring(RenderLayer::Effects, entity.pos, r - 4.0, r, colors::SHIELD);
            }
        }
        EntityKind::Projectile(p) => {
            if let Some(trail) = &p.trail {
                for s in trail.segments() {
                    let tint = crate::fade(color, s.alpha * 0.6);
                    frame.segment(layer, s.from, s.to, sprite.size.x * 0.6, tint);
                }
            }
        }
        _ => {}
    }

    if sprite.round {
        frame.circle(layer, entity.pos, sprite.size.x / 2.0, color);
    } else {
        frame.rect(layer, entity.pos - sprite.size / 2.0, sprite.size, color);
    }
}

fn draw_overlays(frame: &mut Frame<'_>, state: &GameState) {
    let Some(e) = state.boss_entity() else {
        return;
    };
    let EntityKind::Boss(boss) = &e.kind else {
        return;
    };

    let beam_color = match boss.phase {
        BossPhase::LaserCharge => Some(colors::BEAM_TELEGRAPH),
        BossPhase::LaserFire => Some(colors::BEAM),
        _ => None,
    };
    let beam = beam_rect(e.pos, e.size, boss.beam_width);
    if let (Some(color), Some(rect)) = (beam_color, beam) {
        frame.rect(RenderLayer::Effects, rect.min, rect.size(), color);
        if boss.phase == BossPhase::LaserFire {
            let core = Vec2::new(rect.size().x / 3.0, rect.size().y);
            let min = Vec2::new(rect.center().x - core.x / 2.0, rect.min.y);
            frame.rect(RenderLayer::Effects, min, core, palette::WHITE);
        }
    }

    // Boss health bar (not shaken)
    let shake = std::mem::replace(&mut frame.shake, Vec2::ZERO);
    let bar_size = Vec2::new(400.0, 20.0);
    let bar_min = Vec2::new(LOGICAL_WIDTH / 2.0 - bar_size.x / 2.0, 50.0);
    frame.rect(RenderLayer::Effects, bar_min, bar_size, colors::HEALTH_BAR_BACK);
    let fill = Vec2::new(bar_size.x * boss.vitals.fraction(), bar_size.y);
    frame.rect(RenderLayer::Effects, bar_min, fill, palette::RED);
    frame.shake = shake;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{Difficulty, ProgressionStore};
    use crate::sim::level::LevelConfig;
    use crate::sim::state::{Faction, Projectile};

    fn state() -> GameState {
        GameState::new(
            5,
            LevelConfig::new(1, Difficulty::Easy),
            &ProgressionStore::in_memory(),
            &Settings::default(),
        )
    }

    fn entity_rects(commands: &[DrawCommand], layer: RenderLayer) -> Vec<(Vec2, Vec2)> {
        commands
            .iter()
            .filter(|c| c.layer == layer)
            .filter_map(|c| match c.shape {
                Shape::Rect { min, size } => Some((min, size)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_missing_sprite_draws_placeholder() {
        let state = state();
        let mut sheet = SpriteSheet::default();
        sheet.remove(SpriteKey::Player);
        let commands = build_frame(&state, &Viewport::default(), &sheet, &Settings::default());

        let player = entity_rects(&commands, RenderLayer::Player);
        assert_eq!(player.len(), 1);
        assert_eq!(player[0].1, Vec2::splat(PLACEHOLDER_SIZE));
        let color = commands
            .iter()
            .find(|c| c.layer == RenderLayer::Player)
            .map(|c| c.color);
        assert_eq!(color, Some(palette::WHITE));
    }

    #[test]
    fn test_degenerate_sprite_draws_placeholder() {
        let mut sheet = SpriteSheet::default();
        sheet.insert(
            SpriteKey::Boss,
            Sprite {
                size: Vec2::new(0.0, f32::NAN),
                color: palette::RED,
                round: false,
            },
        );
        assert_eq!(sheet.get(SpriteKey::Boss), Sprite::PLACEHOLDER);
    }

    #[test]
    fn test_commands_sorted_with_bars_last() {
        let mut state = state();
        let enemy = state.spawn_enemy(EnemyKind::Basic);
        if let Some(e) = state.registry.get_mut(enemy) {
            e.pos = Vec2::new(500.0, 500.0);
        }
        state.spawn_projectile(
            Projectile::new(ProjectileKind::Bullet, Faction::Player, 10.0),
            Vec2::new(600.0, 600.0),
            Vec2::ZERO,
        );

        let mut viewport = Viewport::default();
        viewport.set_resolution(2560.0, 1080.0).unwrap();
        let commands = build_frame(&state, &viewport, &SpriteSheet::default(), &Settings::default());

        let (body, bars) = commands.split_at(commands.len() - 2);
        assert!(body.windows(2).all(|w| w[0].layer <= w[1].layer));
        assert_eq!(body[0].layer, RenderLayer::Background);
        assert!(bars.iter().all(|b| b.color == palette::LETTERBOX));
        assert!(!entity_rects(body, RenderLayer::Enemy).is_empty());
        assert!(!entity_rects(body, RenderLayer::Projectile).is_empty());
    }

    #[test]
    fn test_offscreen_entities_skipped() {
        let mut state = state();
        // Fresh spawns wait above the canvas
        state.spawn_enemy(EnemyKind::Basic);
        let commands = build_frame(&state, &Viewport::default(), &SpriteSheet::default(), &Settings::default());
        assert!(entity_rects(&commands, RenderLayer::Enemy).is_empty());
    }

    #[test]
    fn test_reduced_motion_ignores_shake() {
        let mut state = state();
        state.effects.shake.add_trauma(1.0);
        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(1);
        state.effects.shake.update(0.01, &mut rng);
        assert!(state.effects.shake.offset() != Vec2::ZERO);

        let calm = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let sheet = SpriteSheet::default();
        let still = build_frame(&state, &Viewport::default(), &sheet, &calm);
        let shaken = build_frame(&state, &Viewport::default(), &sheet, &Settings::default());

        let player_at = |cmds: &[DrawCommand]| entity_rects(cmds, RenderLayer::Player)[0].0;
        let expected = state.player_entity().map(|p| p.pos - Vec2::splat(40.0)).unwrap_or_default();
        assert_eq!(player_at(&still), expected);
        assert_ne!(player_at(&shaken), expected);
        // Background never shakes
        assert_eq!(entity_rects(&shaken, RenderLayer::Background)[0].0, Vec2::ZERO);
    }

    #[test]
    fn test_particles_fade_with_life() {
        let mut state = state();
        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(1);
        let burst = crate::sim::effects::Burst::new(1).life(10.0, 10.0);
        state.effects.particles.emit(&mut rng, Vec2::new(300.0, 300.0), palette::GOLD, burst);
        for _ in 0..5 {
            state.effects.particles.update();
        }
        let commands = build_frame(&state, &Viewport::default(), &SpriteSheet::default(), &Settings::default());
        let alpha = commands
            .iter()
            .find(|c| c.layer == RenderLayer::Particle)
            .map(|c| c.color[3]);
        assert!(alpha.is_some_and(|a| (a - 0.5).abs() < 1e-5));
    }

    #[test]
    fn test_beam_overlay_while_charging() {
        let mut state = state();
        let boss = state.spawn_boss();
        if let Some(e) = state.registry.get_mut(boss) {
            e.pos = Vec2::new(960.0, 150.0);
            if let EntityKind::Boss(b) = &mut e.kind {
                b.phase = BossPhase::LaserCharge;
                b.beam_width = 10.0;
            }
        }
        let commands = build_frame(&state, &Viewport::default(), &SpriteSheet::default(), &Settings::default());
        let telegraph = commands
            .iter()
            .find(|c| c.color == colors::BEAM_TELEGRAPH)
            .map(|c| c.shape);
        match telegraph {
            Some(Shape::Rect { min, size }) => {
                assert!((size.x - 10.0).abs() < 1e-4);
                assert_eq!(min.y, 225.0);
                assert_eq!(min.y + size.y, LOGICAL_HEIGHT);
            }
            other => panic!("expected beam telegraph, got {other:?}"),
        }
    }
}
