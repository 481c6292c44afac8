//! Entity registry
//!
//! Entities live in one `Vec` kept in spawn order. Ids increase
//! monotonically, so the vector is always sorted by id and lookups are a
//! binary search. Removal is deferred: `mark_dead` flags an entity and
//! `sweep` drops flagged entities once per frame, so indices taken during a
//! frame stay valid until the sweep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Entity, EntityKind, Role};

/// Opaque entity handle; stale handles simply fail to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a live entity sized by its kind
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let size = kind.size();
        self.entities.push(Entity {
            id,
            pos,
            vel,
            size,
            alive: true,
            kind,
        });
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Live entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id)
            .map(|i| &self.entities[i])
            .filter(|e| e.alive)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let i = self.index_of(id)?;
        let entity = &mut self.entities[i];
        entity.alive.then_some(entity)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Flag for removal at the next sweep; false if already dead or unknown
    pub fn mark_dead(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(e) => {
                e.alive = false;
                true
            }
            None => false,
        }
    }

    /// Visit live members of a role in spawn order
    pub fn for_each(&self, role: Role, mut f: impl FnMut(&Entity)) {
        self.entities
            .iter()
            .filter(|e| e.alive && e.role() == role)
            .for_each(|e| f(e));
    }

    pub fn for_each_mut(&mut self, role: Role, mut f: impl FnMut(&mut Entity)) {
        self.entities
            .iter_mut()
            .filter(|e| e.alive && e.role() == role)
            .for_each(|e| f(e));
    }

    /// Live members of a role
    pub fn count(&self, role: Role) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.role() == role)
            .count()
    }

    /// Ids of the live members of a role, in spawn order
    pub fn ids(&self, role: Role) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.alive && e.role() == role)
            .map(|e| e.id)
            .collect()
    }

    /// Mark every live member of a role dead; returns how many
    pub fn clear_role(&mut self, role: Role) -> usize {
        let mut killed = 0;
        self.for_each_mut(role, |e| {
            e.alive = false;
            killed += 1;
        });
        killed
    }

    /// Advance every live entity by its velocity
    pub fn integrate(&mut self, dt: f32) {
        for e in self.entities.iter_mut().filter(|e| e.alive) {
            e.pos += e.vel * dt;
        }
    }

    /// Drop dead entities; returns how many were removed
    pub fn sweep(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.alive);
        before - self.entities.len()
    }

    /// Live entities back to front; ties keep spawn order
    pub fn draw_order(&self) -> Vec<&Entity> {
        let mut order: Vec<&Entity> = self.entities.iter().filter(|e| e.alive).collect();
        order.sort_by_key(|e| e.layer());
        order
    }

    /// All stored entities, including ones awaiting the sweep
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Storage indices of a role's live members; valid until the next sweep
    pub(crate) fn indices(&self, role: Role) -> Vec<usize> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive && e.role() == role)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn at(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> &mut Entity {
        &mut self.entities[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, EnemyKind, Faction, PowerUp, PowerUpKind, Projectile, ProjectileKind, RenderLayer};

    fn enemy() -> EntityKind {
        EntityKind::Enemy(Enemy::new(EnemyKind::Basic))
    }

    fn bullet() -> EntityKind {
        EntityKind::Projectile(Projectile::new(ProjectileKind::Bullet, Faction::Player, 10.0))
    }

    #[test]
    fn test_ids_are_unique_and_resolve() {
        let mut reg = Registry::new();
        let a = reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);
        let b = reg.spawn(bullet(), Vec2::ONE, Vec2::ZERO);
        assert_ne!(a, b);
        assert_eq!(reg.get(a).map(|e| e.role()), Some(Role::Enemy));
        assert_eq!(reg.get(b).map(|e| e.role()), Some(Role::PlayerProjectile));
        assert_eq!(reg.get(b).map(|e| e.size), Some(Vec2::new(20.0, 48.0)));
    }

    #[test]
    fn test_dead_entities_vanish_and_stale_ids_fail() {
        let mut reg = Registry::new();
        let a = reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);
        let b = reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);

        assert!(reg.mark_dead(a));
        assert!(!reg.mark_dead(a));
        // Flagged entities are invisible before the sweep too
        assert!(reg.get(a).is_none());
        assert_eq!(reg.count(Role::Enemy), 1);

        assert_eq!(reg.sweep(), 1);
        assert!(!reg.is_alive(a));
        assert!(reg.is_alive(b));

        // New ids never reuse old ones
        let c = reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);
        assert!(c > b);
        assert!(reg.get(a).is_none());
    }

    #[test]
    fn test_for_each_visits_only_role() {
        let mut reg = Registry::new();
        reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);
        reg.spawn(bullet(), Vec2::ZERO, Vec2::ZERO);
        reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);

        let mut seen = 0;
        reg.for_each(Role::Enemy, |e| {
            assert_eq!(e.role(), Role::Enemy);
            seen += 1;
        });
        assert_eq!(seen, 2);
        assert_eq!(reg.clear_role(Role::Enemy), 2);
        assert_eq!(reg.count(Role::Enemy), 0);
        assert_eq!(reg.count(Role::PlayerProjectile), 1);
    }

    #[test]
    fn test_integrate_moves_live_only() {
        let mut reg = Registry::new();
        let a = reg.spawn(bullet(), Vec2::ZERO, Vec2::new(0.0, -100.0));
        let b = reg.spawn(bullet(), Vec2::ZERO, Vec2::new(0.0, -100.0));
        reg.mark_dead(b);
        reg.integrate(0.5);
        assert_eq!(reg.get(a).map(|e| e.pos), Some(Vec2::new(0.0, -50.0)));
        assert_eq!(reg.at(1).pos, Vec2::ZERO);
    }

    #[test]
    fn test_draw_order_by_layer_then_spawn() {
        let mut reg = Registry::new();
        let shot = reg.spawn(bullet(), Vec2::ZERO, Vec2::ZERO);
        let e1 = reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);
        let pickup = reg.spawn(
            EntityKind::PowerUp(PowerUp { kind: PowerUpKind::Shield }),
            Vec2::ZERO,
            Vec2::ZERO,
        );
        let e2 = reg.spawn(enemy(), Vec2::ZERO, Vec2::ZERO);

        let order: Vec<EntityId> = reg.draw_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![e1, e2, shot, pickup]);
        let layers: Vec<RenderLayer> = reg.draw_order().iter().map(|e| e.layer()).collect();
        assert!(layers.windows(2).all(|w| w[0] <= w[1]));
    }
}
