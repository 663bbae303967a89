//! # ECS World
//!
//! The Entity/Query Index: the set of live entities, each a bag of
//! components, plus predicate lookup over them.
//!
//! Entity slots and component storages are pre-allocated at creation time.
//! Slots are recycled through a free list and every reuse bumps the slot's
//! generation, so an id retained after `destroy` can never alias the new
//! occupant.

use std::sync::Arc;

use super::attribute::{AttributeKey, AttributeStore, AttributeValue, NamedValue, VariantId};
use super::change::ChangeTracker;
use super::component::Component;
use super::entity::{Entity, EntityId};
use super::query::{EntityRef, Query};
use super::registry::ComponentRegistry;
use super::storage::ComponentStorage;
use crate::error::{EcsError, EcsResult};

/// The ECS World - container for all scene entities.
///
/// # Capacity
///
/// The world has a fixed capacity set at creation.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(ComponentRegistry::with_builtin_components()?);
/// let mut world = World::new(Arc::clone(&registry), 1024);
///
/// let panel = world.create_entity([registry.store_for(&Panel::new(MAIN_PANEL_ID))?])?;
/// ```
pub struct World {
    /// Frozen schema registry shared with the rest of the application.
    registry: Arc<ComponentRegistry>,
    /// All entity slots (pre-allocated).
    entities: Box<[Entity]>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Maximum capacity.
    capacity: usize,
    /// One storage per registered variant, indexed by variant id.
    storages: Vec<Option<ComponentStorage>>,
    /// Entities whose components changed since the last clear.
    changes: ChangeTracker,
}

impl World {
    /// Creates a new world with the specified entity capacity.
    ///
    /// Every variant registered in `registry` gets a storage; the registry
    /// is read-only from here on.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(registry: Arc<ComponentRegistry>, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );
        let max_index = capacity as u32;

        let entities = (0..capacity)
            .map(|_| Entity::dead())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        // Pre-allocate free list with all indices available, lowest on top
        let free_indices: Vec<u32> = (0..max_index).rev().collect();

        let mut storages: Vec<Option<ComponentStorage>> = Vec::new();
        for schema in registry.schemas() {
            let variant = schema.variant();
            if storages.len() <= variant.index() {
                storages.resize_with(variant.index() + 1, || None);
            }
            storages[variant.index()] = Some(ComponentStorage::new(variant, capacity));
        }

        Self {
            registry,
            entities,
            free_indices,
            alive_count: 0,
            capacity,
            storages,
            changes: ChangeTracker::new(capacity),
        }
    }

    /// The registry this world validates components against.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Returns the maximum capacity of this world.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        self.entities
            .get(id.index() as usize)
            .is_some_and(|entity| entity.alive && entity.id.generation() == id.generation())
    }

    fn storage(&self, variant: VariantId) -> EcsResult<&ComponentStorage> {
        self.storages
            .get(variant.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| EcsError::UnknownVariant(variant.to_string()))
    }

    fn storage_mut(&mut self, variant: VariantId) -> EcsResult<&mut ComponentStorage> {
        self.storages
            .get_mut(variant.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| EcsError::UnknownVariant(variant.to_string()))
    }

    fn variant_name(&self, variant: VariantId) -> String {
        self.registry
            .schema_for(variant)
            .map_or_else(|_| variant.to_string(), |schema| schema.name().to_owned())
    }

    /// Fails with `UnknownVariant` unless `store` was built from the schema
    /// registered for its variant.
    fn check_store(&self, store: &AttributeStore) -> EcsResult<()> {
        let variant = store.variant();
        self.storage(variant)?;
        let registered = self.registry.schema_for(variant)?;
        if Arc::ptr_eq(store.schema(), registered) {
            Ok(())
        } else {
            Err(EcsError::UnknownVariant(format!(
                "{} (store built from an unregistered schema)",
                store.schema().name()
            )))
        }
    }

    /// Fails with `StaleReference` unless `id` names a live entity.
    fn ensure_alive(&self, id: EntityId) -> EcsResult<usize> {
        if self.is_alive(id) {
            Ok(id.index() as usize)
        } else {
            Err(EcsError::StaleReference(id))
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Creates an entity carrying `components`.
    ///
    /// Every store is validated before the entity is spawned, so a rejected
    /// call leaves the world untouched. If two stores share a variant the
    /// later one wins (one instance per variant).
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownVariant`] if a store's variant is not registered,
    ///   or the store was not built from the registered schema.
    /// - [`EcsError::CapacityExceeded`] if every slot is taken.
    pub fn create_entity<I>(&mut self, components: I) -> EcsResult<EntityId>
    where
        I: IntoIterator<Item = AttributeStore>,
    {
        let components: Vec<AttributeStore> = components.into_iter().collect();
        for store in &components {
            self.check_store(store)?;
        }

        let Some(index) = self.free_indices.pop() else {
            return Err(EcsError::CapacityExceeded(self.capacity));
        };

        let idx = index as usize;
        let entity = &mut self.entities[idx];

        // Increment generation to invalidate old references
        let generation = if entity.id.is_null() {
            0
        } else {
            entity.id.generation().wrapping_add(1)
        };
        let id = EntityId::new(index, generation);
        *entity = Entity::new(id);
        self.alive_count += 1;

        for store in components {
            self.put(idx, store)?;
        }
        Ok(id)
    }

    /// Creates an entity with no components.
    ///
    /// # Errors
    ///
    /// [`EcsError::CapacityExceeded`].
    pub fn spawn(&mut self) -> EcsResult<EntityId> {
        self.create_entity(std::iter::empty())
    }

    /// Destroys an entity and every component it carries.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleReference`] if the id is null, dead, or recycled.
    pub fn destroy(&mut self, id: EntityId) -> EcsResult<()> {
        let idx = self.ensure_alive(id)?;

        let entity = &mut self.entities[idx];
        entity.alive = false;
        entity.component_mask = 0;
        self.alive_count -= 1;
        self.free_indices.push(id.index());

        for storage in self.storages.iter_mut().flatten() {
            storage.take(idx);
        }
        self.changes.unmark(idx);
        Ok(())
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn put(&mut self, idx: usize, store: AttributeStore) -> EcsResult<Option<AttributeStore>> {
        let variant = store.variant();
        let previous = self
            .storage_mut(variant)?
            .set(idx, store)
            .map_err(|_| EcsError::CapacityExceeded(self.capacity))?;
        self.entities[idx].add_component(variant.raw());
        self.changes.mark(idx);
        Ok(previous)
    }

    /// Attaches a component store, replacing any instance of the same variant.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleReference`], or [`EcsError::UnknownVariant`] if the
    /// store was not built from the registered schema.
    pub fn insert_store(
        &mut self,
        id: EntityId,
        store: AttributeStore,
    ) -> EcsResult<Option<AttributeStore>> {
        let idx = self.ensure_alive(id)?;
        self.check_store(&store)?;
        self.put(idx, store)
    }

    /// Attaches a typed component, replacing any instance of the same variant.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleReference`] or [`EcsError::UnknownVariant`].
    pub fn insert<C: Component>(&mut self, id: EntityId, component: &C) -> EcsResult<()> {
        let idx = self.ensure_alive(id)?;
        let store = self.registry.store_for(component)?;
        self.put(idx, store).map(|_| ())
    }

    /// Writes a typed component in place, keeping its store (and revision).
    /// Attaches it if absent.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleReference`] or [`EcsError::UnknownVariant`].
    pub fn set_component<C: Component>(&mut self, id: EntityId, component: &C) -> EcsResult<()> {
        let idx = self.ensure_alive(id)?;
        match self.storage_mut(C::VARIANT)?.get_mut(idx) {
            Some(store) => {
                component.write_to(store)?;
                self.changes.mark(idx);
                Ok(())
            }
            None => self.insert(id, component),
        }
    }

    /// Detaches a variant. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleReference`] or [`EcsError::UnknownVariant`].
    pub fn remove_component(&mut self, id: EntityId, variant: VariantId) -> EcsResult<bool> {
        let idx = self.ensure_alive(id)?;
        let removed = self.storage_mut(variant)?.take(idx).is_some();
        if removed {
            self.entities[idx].remove_component(variant.raw());
            self.changes.mark(idx);
        }
        Ok(removed)
    }

    /// Whether a live entity carries the variant.
    #[must_use]
    pub fn has_variant(&self, id: EntityId, variant: VariantId) -> bool {
        self.is_alive(id) && self.entities[id.index() as usize].has_component(variant.raw())
    }

    /// Whether a live entity carries component `C`.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.has_variant(id, C::VARIANT)
    }

    pub(crate) fn component_mask(&self, id: EntityId) -> u64 {
        if self.is_alive(id) {
            self.entities[id.index() as usize].component_mask
        } else {
            0
        }
    }

    /// Raw store of a variant on an entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotFound`] if the entity is dead or the id stale.
    /// - [`EcsError::ComponentNotFound`] if the component is absent.
    pub fn store(&self, id: EntityId, variant: VariantId) -> EcsResult<&AttributeStore> {
        if !self.is_alive(id) {
            return Err(EcsError::EntityNotFound(id));
        }
        self.storage(variant)?
            .get(id.index() as usize)
            .ok_or_else(|| EcsError::ComponentNotFound {
                entity: id,
                component: self.variant_name(variant),
            })
    }

    /// Typed component value.
    ///
    /// # Errors
    ///
    /// Same as [`World::store`].
    pub fn get_component<C: Component>(&self, id: EntityId) -> EcsResult<C> {
        C::from_store(self.store(id, C::VARIANT)?)
    }

    /// One attribute value.
    ///
    /// # Errors
    ///
    /// Same as [`World::store`], plus [`EcsError::UnknownKey`].
    pub fn get_attribute(&self, id: EntityId, key: AttributeKey) -> EcsResult<&AttributeValue> {
        self.store(id, key.variant())?.get(key)
    }

    /// Writes one attribute and marks the entity changed.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleReference`] if the entity was destroyed.
    /// - [`EcsError::ComponentNotFound`] if the component is absent.
    /// - [`EcsError::UnknownKey`] / [`EcsError::TypeMismatch`] from the store.
    pub fn set_attribute(
        &mut self,
        id: EntityId,
        key: AttributeKey,
        value: AttributeValue,
    ) -> EcsResult<()> {
        let idx = self.ensure_alive(id)?;
        let component = self.variant_name(key.variant());
        let store = self
            .storage_mut(key.variant())?
            .get_mut(idx)
            .ok_or(EcsError::ComponentNotFound { entity: id, component })?;
        store.set(key, value)?;
        self.changes.mark(idx);
        Ok(())
    }

    /// Snapshot of a component's named values (cached for cacheable variants).
    ///
    /// # Errors
    ///
    /// Same as [`World::store`].
    pub fn snapshot(
        &mut self,
        id: EntityId,
        variant: VariantId,
    ) -> EcsResult<Arc<[NamedValue]>> {
        if !self.is_alive(id) {
            return Err(EcsError::EntityNotFound(id));
        }
        let component = self.variant_name(variant);
        self.storage_mut(variant)?
            .get_mut(id.index() as usize)
            .map(AttributeStore::snapshot)
            .ok_or(EcsError::ComponentNotFound { entity: id, component })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Iterates over all alive entity ids in ascending order.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().filter(|e| e.alive).map(|e| e.id)
    }

    /// View of a live entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<EntityRef<'_>> {
        self.is_alive(id).then(|| EntityRef::new(self, id))
    }

    /// Ids of every live entity matching `predicate`, snapshotted now.
    pub fn query<F>(&self, mut predicate: F) -> Query
    where
        F: FnMut(EntityRef<'_>) -> bool,
    {
        let ids = self
            .iter_alive()
            .filter(|&id| predicate(EntityRef::new(self, id)))
            .collect();
        Query::new(ids)
    }

    /// Ids of every live entity carrying component `C`.
    pub fn query_with<C: Component>(&self) -> Query {
        self.query(|e| e.has::<C>())
    }

    /// Lowest-id live entity matching `predicate`.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`] if nothing matches.
    pub fn find_first_where<F>(&self, mut predicate: F) -> EcsResult<EntityId>
    where
        F: FnMut(EntityRef<'_>) -> bool,
    {
        self.iter_alive()
            .find(|&id| predicate(EntityRef::new(self, id)))
            .ok_or_else(|| EcsError::NotFound("no entity matches the predicate".to_owned()))
    }

    // =========================================================================
    // Change tracking
    // =========================================================================

    /// Live entities whose components changed since the last clear.
    pub fn changed(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.changes
            .iter()
            .map(|idx| self.entities[idx])
            .filter(|e| e.alive)
            .map(|e| e.id)
    }

    /// Forgets all recorded changes.
    ///
    /// Only the slots recorded as changed are visited; every store write
    /// goes through a path that marks its entity.
    pub fn clear_changes(&mut self) {
        for idx in self.changes.iter() {
            for storage in self.storages.iter_mut().flatten() {
                if let Some(store) = storage.get_mut(idx) {
                    store.clear_dirty();
                }
            }
        }
        self.changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{HandSide, Panel, Transform, WristAttached};
    use crate::ecs::query::QueryFilter;
    use crate::ecs::schema::ComponentSchema;
    use museo_shared::{Pose, Vec3};

    fn world(capacity: usize) -> World {
        let registry = Arc::new(ComponentRegistry::with_builtin_components().unwrap());
        World::new(registry, capacity)
    }

    fn panel(world: &World, id: i32) -> AttributeStore {
        world.registry().store_for(&Panel::new(id)).unwrap()
    }

    #[test]
    fn test_world_creation() {
        let world = world(1000);
        assert_eq!(world.capacity(), 1000);
        assert_eq!(world.alive_count(), 0);
    }

    #[test]
    fn test_spawn_destroy_recycles_with_new_generation() {
        let mut world = world(100);

        let id1 = world.spawn().unwrap();
        assert!(world.is_alive(id1));
        let id2 = world.spawn().unwrap();
        assert_eq!(world.alive_count(), 2);
        assert_ne!(id1, id2);

        world.destroy(id1).unwrap();
        assert!(!world.is_alive(id1));
        assert_eq!(world.alive_count(), 1);

        // Spawn again - should reuse the slot
        let id3 = world.spawn().unwrap();
        assert_eq!(id3.index(), id1.index());
        assert_ne!(id3.generation(), id1.generation());
        assert!(!world.is_alive(id1));
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut world = world(2);
        world.spawn().unwrap();
        world.spawn().unwrap();
        assert_eq!(world.spawn(), Err(EcsError::CapacityExceeded(2)));
    }

    #[test]
    fn test_create_entity_with_components() {
        let mut world = world(10);
        let attached = WristAttached {
            position: Vec3::new(0.0, 0.0, 0.6),
            side: HandSide::Right,
            ..WristAttached::default()
        };
        let store = world.registry().store_for(&attached).unwrap();
        let id = world.create_entity([store, panel(&world, 2)]).unwrap();

        assert_eq!(world.get_component::<WristAttached>(id).unwrap(), attached);
        assert_eq!(world.get_component::<Panel>(id).unwrap(), Panel::new(2));
        assert!(world.has::<Panel>(id));
        assert!(!world.has::<Transform>(id));
    }

    #[test]
    fn test_one_instance_per_variant() {
        let mut world = world(10);
        let id = world
            .create_entity([panel(&world, 1), panel(&world, 9)])
            .unwrap();
        assert_eq!(world.get_component::<Panel>(id).unwrap(), Panel::new(9));
        assert_eq!(world.query_with::<Panel>().len(), 1);
    }

    #[test]
    fn test_destroyed_entity_reads_as_not_found() {
        let mut world = world(10);
        let id = world.create_entity([panel(&world, 1)]).unwrap();
        world.destroy(id).unwrap();

        assert_eq!(
            world.get_component::<Panel>(id),
            Err(EcsError::EntityNotFound(id))
        );
        assert_eq!(world.query_with::<Panel>().count(), 0);

        // recycled slot must not leak the new occupant through the old id
        let reborn = world.create_entity([panel(&world, 5)]).unwrap();
        assert_eq!(reborn.index(), id.index());
        assert!(world.get_component::<Panel>(id).unwrap_err().is_not_found());
        assert_eq!(world.get_component::<Panel>(reborn).unwrap(), Panel::new(5));
    }

    #[test]
    fn test_mutation_through_stale_id() {
        let mut world = world(10);
        let id = world.create_entity([panel(&world, 1)]).unwrap();
        world.destroy(id).unwrap();

        assert_eq!(world.destroy(id), Err(EcsError::StaleReference(id)));
        assert_eq!(
            world.set_attribute(id, Panel::PANEL_ID, AttributeValue::Int(3)),
            Err(EcsError::StaleReference(id))
        );
        assert_eq!(
            world.insert(id, &Panel::new(2)),
            Err(EcsError::StaleReference(id))
        );
    }

    #[test]
    fn test_missing_component() {
        let mut world = world(10);
        let id = world.spawn().unwrap();
        assert!(matches!(
            world.get_component::<Panel>(id),
            Err(EcsError::ComponentNotFound { .. })
        ));
        assert!(matches!(
            world.set_attribute(id, Panel::PANEL_ID, AttributeValue::Int(1)),
            Err(EcsError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_set_attribute_visible_and_tracked() {
        let mut world = world(10);
        let id = world.create_entity([panel(&world, 1)]).unwrap();
        world.clear_changes();
        assert_eq!(world.changed().count(), 0);

        world
            .set_attribute(id, Panel::PANEL_ID, AttributeValue::Int(4))
            .unwrap();
        assert_eq!(world.get_attribute(id, Panel::PANEL_ID).unwrap(), &AttributeValue::Int(4));
        assert_eq!(world.changed().collect::<Vec<_>>(), vec![id]);
        assert!(world.store(id, Panel::VARIANT).unwrap().is_dirty());

        assert!(matches!(
            world.set_attribute(id, Panel::PANEL_ID, AttributeValue::Bool(true)),
            Err(EcsError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_set_component_in_place() {
        let mut world = world(10);
        let id = world.spawn().unwrap();
        let pose = Pose::from_translation(Vec3::new(0.0, 1.6, 0.6));
        world.set_component(id, &Transform::new(pose)).unwrap();
        world
            .set_component(id, &Transform::new(Pose::IDENTITY))
            .unwrap();
        assert_eq!(world.get_component::<Transform>(id).unwrap().pose, Pose::IDENTITY);
        // second write lands in the same store
        assert_eq!(world.store(id, Transform::VARIANT).unwrap().revision(), 4);
    }

    #[test]
    fn test_remove_component() {
        let mut world = world(10);
        let id = world.create_entity([panel(&world, 1)]).unwrap();
        assert!(world.remove_component(id, Panel::VARIANT).unwrap());
        assert!(!world.remove_component(id, Panel::VARIANT).unwrap());
        assert!(!world.has::<Panel>(id));
    }

    #[test]
    fn test_find_first_where_picks_lowest_id() {
        let mut world = world(10);
        let ids: Vec<EntityId> = (0..6).map(|_| world.spawn().unwrap()).collect();
        let e1 = ids[5];
        let e2 = ids[2];
        assert_eq!(e1.index(), 5);
        assert_eq!(e2.index(), 2);

        // E1 gets its component first; insertion order must not matter
        world.insert(e1, &Panel::new(1)).unwrap();
        world.insert(e2, &Panel::new(1)).unwrap();

        let filter = QueryFilter::new()
            .has::<Panel>()
            .attr_eq(Panel::PANEL_ID, AttributeValue::Int(1));
        for _ in 0..5 {
            assert_eq!(world.find_first_where(|e| filter.matches(&e)).unwrap(), e2);
        }
    }

    #[test]
    fn test_find_first_where_not_found() {
        let world = world(10);
        let err = world.find_first_where(|e| e.has::<Panel>()).unwrap_err();
        assert!(matches!(err, EcsError::NotFound(_)));
    }

    #[test]
    fn test_query_is_a_snapshot() {
        let mut world = world(10);
        let a = world.create_entity([panel(&world, 1)]).unwrap();
        let b = world.create_entity([panel(&world, 1)]).unwrap();

        let query = world.query_with::<Panel>();
        world.destroy(a).unwrap();
        world.create_entity([panel(&world, 1)]).unwrap();

        // snapshot still yields exactly what matched at call time
        let ids: Vec<EntityId> = query.collect();
        assert_eq!(ids, vec![a, b]);
        // and the destroyed one now reads as absent
        assert!(world.get_component::<Panel>(a).unwrap_err().is_not_found());
    }

    #[test]
    fn test_snapshot_cached_until_write() {
        let mut world = world(10);
        let id = world.create_entity([panel(&world, 1)]).unwrap();
        let first = world.snapshot(id, Panel::VARIANT).unwrap();
        let second = world.snapshot(id, Panel::VARIANT).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        world
            .set_attribute(id, Panel::PANEL_ID, AttributeValue::Int(2))
            .unwrap();
        let third = world.snapshot(id, Panel::VARIANT).unwrap();
        assert_eq!(third[0].1, AttributeValue::Int(2));
    }

    #[test]
    fn test_store_from_unregistered_schema_rejected() {
        let mut world = world(10);
        let foreign = Arc::new(
            ComponentSchema::builder(WristAttached::VARIANT, "WristAttached")
                .boolean("only", true)
                .build(),
        )
        .default_store();

        let err = world.create_entity([foreign.clone()]).unwrap_err();
        assert!(matches!(err, EcsError::UnknownVariant(_)));
        assert_eq!(world.alive_count(), 0);

        let id = world.spawn().unwrap();
        let err = world.insert_store(id, foreign).unwrap_err();
        assert!(matches!(err, EcsError::UnknownVariant(_)));
        assert!(!world.has::<WristAttached>(id));

        // a store from the registry is still accepted
        let own = world.registry().default_store(WristAttached::VARIANT).unwrap();
        world.insert_store(id, own).unwrap();
        assert!(world.get_component::<WristAttached>(id).is_ok());
    }

    #[test]
    fn test_clear_changes_resets_dirty_stores() {
        let mut world = world(200);
        let ids: Vec<EntityId> = (0..150)
            .map(|n| world.create_entity([panel(&world, n)]).unwrap())
            .collect();
        world.clear_changes();

        world
            .set_attribute(ids[130], Panel::PANEL_ID, AttributeValue::Int(7))
            .unwrap();
        assert!(world.store(ids[130], Panel::VARIANT).unwrap().is_dirty());
        assert_eq!(world.changed().collect::<Vec<_>>(), vec![ids[130]]);

        world.clear_changes();
        assert_eq!(world.changed().count(), 0);
        assert!(ids
            .iter()
            .all(|&id| !world.store(id, Panel::VARIANT).unwrap().is_dirty()));
    }
}
