//! Snapshot of interactables keyed by stable id

use bevy::prelude::*;
use std::collections::HashMap;

use super::{Interactable, InteractableId};

/// Stable id -> capability handle, captured once per echo spawn.
///
/// Handles go stale when an object is despawned or respawned later;
/// [`InteractableRegistry::resolve_live`] re-resolves them by id on use.
#[derive(Debug, Clone, Default)]
pub struct InteractableRegistry {
    by_id: HashMap<InteractableId, Entity>,
}

impl InteractableRegistry {
    /// Build a registry from the interactables currently in the world.
    /// The first entity wins when two share an id.
    pub fn snapshot<'a>(interactables: impl IntoIterator<Item = (Entity, &'a Interactable)>) -> Self {
        let mut by_id = HashMap::new();
        for (entity, interactable) in interactables {
            if let Some(existing) = by_id.get(&interactable.id) {
                warn!(
                    "Duplicate interactable id '{}' on {:?} (keeping {:?})",
                    interactable.id, entity, existing
                );
                continue;
            }
            by_id.insert(interactable.id.clone(), entity);
        }
        Self { by_id }
    }

    pub fn resolve(&self, id: &InteractableId) -> Option<Entity> {
        self.by_id.get(id).copied()
    }

    /// Resolve `id` to a live entity that carries it right now.
    ///
    /// The cached handle is tried first. If that entity is gone or now carries
    /// another id, the live interactables are searched by id and the cache is
    /// refreshed, so a respawned object keeps receiving replays. None only when
    /// nothing alive carries `id`.
    pub fn resolve_live(
        &mut self,
        id: &InteractableId,
        live: &Query<(Entity, &Interactable)>,
    ) -> Option<Entity> {
        if let Some(entity) = self.resolve(id)
            && let Ok((_, current)) = live.get(entity)
            && current.id == *id
        {
            return Some(entity);
        }

        let (entity, _) = live.iter().find(|(_, current)| current.id == *id)?;
        debug!("Interactable '{}' re-resolved to {:?}", id, entity);
        self.by_id.insert(id.clone(), entity);
        Some(entity)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;

    #[test]
    fn test_snapshot_keys_by_stable_id() {
        let mut world = World::new();
        let a = world.spawn(Interactable::new("lever_a")).id();
        let b = world.spawn(Interactable::new("lever_b")).id();

        let mut query = world.query::<(Entity, &Interactable)>();
        let registry = InteractableRegistry::snapshot(query.iter(&world));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve(&"lever_a".into()), Some(a));
        assert_eq!(registry.resolve(&"lever_b".into()), Some(b));
        assert_eq!(registry.resolve(&"missing".into()), None);
    }

    #[test]
    fn test_duplicate_ids_keep_one_entry() {
        let mut world = World::new();
        world.spawn(Interactable::new("dup"));
        world.spawn(Interactable::new("dup"));

        let mut query = world.query::<(Entity, &Interactable)>();
        let registry = InteractableRegistry::snapshot(query.iter(&world));

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve(&"dup".into()).is_some());
    }

    #[test]
    fn test_respawned_object_resolves_in_new_snapshot() {
        let mut world = World::new();
        let first = world.spawn(Interactable::new("gate_lever")).id();
        let mut query = world.query::<(Entity, &Interactable)>();
        let before = InteractableRegistry::snapshot(query.iter(&world));

        world.despawn(first);
        let second = world.spawn(Interactable::new("gate_lever")).id();
        let after = InteractableRegistry::snapshot(query.iter(&world));

        assert_eq!(before.resolve(&"gate_lever".into()), Some(first));
        assert_eq!(after.resolve(&"gate_lever".into()), Some(second));
    }

    fn resolve_in(world: &mut World, registry: &mut InteractableRegistry, id: &str) -> Option<Entity> {
        let mut state = SystemState::<Query<(Entity, &Interactable)>>::new(world);
        let live = state.get(world);
        registry.resolve_live(&id.into(), &live)
    }

    #[test]
    fn test_resolve_live_follows_respawned_object() {
        let mut world = World::new();
        let first = world.spawn(Interactable::new("lever_a")).id();
        let mut query = world.query::<(Entity, &Interactable)>();
        let mut registry = InteractableRegistry::snapshot(query.iter(&world));

        assert_eq!(resolve_in(&mut world, &mut registry, "lever_a"), Some(first));

        world.despawn(first);
        let second = world.spawn(Interactable::new("lever_a")).id();

        assert_eq!(resolve_in(&mut world, &mut registry, "lever_a"), Some(second));
        assert_eq!(registry.resolve(&"lever_a".into()), Some(second));
    }

    #[test]
    fn test_resolve_live_misses_when_id_is_gone() {
        let mut world = World::new();
        let lever = world.spawn(Interactable::new("lever_a")).id();
        let mut query = world.query::<(Entity, &Interactable)>();
        let mut registry = InteractableRegistry::snapshot(query.iter(&world));

        world.entity_mut(lever).insert(Interactable::new("lever_b"));
        assert_eq!(resolve_in(&mut world, &mut registry, "lever_a"), None);

        world.despawn(lever);
        assert_eq!(resolve_in(&mut world, &mut registry, "lever_a"), None);
    }
}
