//! # Component Storage
//!
//! Pre-allocated, dense storage for one component variant.
//!
//! The storage uses a dense array strategy:
//! - All slots are allocated when the world is created
//! - Access is O(1) via entity index
//! - An empty slot means "entity does not carry this component"

use super::attribute::{AttributeStore, VariantId};

/// Dense storage for a single component variant.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage = ComponentStorage::new(Panel::VARIANT, 1024);
/// storage.set(0, registry.store_for(&Panel::new(1))?);
/// ```
#[derive(Debug)]
pub struct ComponentStorage {
    /// Variant stored here.
    variant: VariantId,
    /// One slot per entity index.
    data: Box<[Option<AttributeStore>]>,
}

impl ComponentStorage {
    /// Creates storage with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(variant: VariantId, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let data = (0..capacity)
            .map(|_| None)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self { variant, data }
    }

    /// The variant stored here.
    #[inline]
    #[must_use]
    pub const fn variant(&self) -> VariantId {
        self.variant
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Gets a component by entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AttributeStore> {
        self.data.get(index).and_then(Option::as_ref)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut AttributeStore> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    /// Stores a component, returning the one it replaced.
    ///
    /// Returns `Err(store)` if the index is out of bounds.
    #[inline]
    pub fn set(
        &mut self,
        index: usize,
        store: AttributeStore,
    ) -> Result<Option<AttributeStore>, AttributeStore> {
        match self.data.get_mut(index) {
            Some(slot) => Ok(slot.replace(store)),
            None => Err(store),
        }
    }

    /// Removes a component slot's contents.
    #[inline]
    pub fn take(&mut self, index: usize) -> Option<AttributeStore> {
        self.data.get_mut(index).and_then(Option::take)
    }

    /// Iterates over occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AttributeStore)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|store| (i, store)))
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ecs::component::{Component, Panel};

    fn panel_store(id: i32) -> AttributeStore {
        let schema = Arc::new(Panel::schema());
        let mut store = schema.default_store();
        Panel::new(id).write_to(&mut store).unwrap();
        store
    }

    #[test]
    fn test_storage_creation() {
        let storage = ComponentStorage::new(Panel::VARIANT, 1000);
        assert_eq!(storage.capacity(), 1000);
        assert_eq!(storage.variant(), Panel::VARIANT);
        assert_eq!(storage.iter().count(), 0);
    }

    #[test]
    fn test_storage_get_set() {
        let mut storage = ComponentStorage::new(Panel::VARIANT, 100);
        assert!(storage.set(50, panel_store(3)).unwrap().is_none());

        let retrieved = storage.get(50).unwrap();
        assert_eq!(Panel::from_store(retrieved).unwrap(), Panel::new(3));

        let replaced = storage.set(50, panel_store(4)).unwrap().unwrap();
        assert_eq!(Panel::from_store(&replaced).unwrap(), Panel::new(3));
    }

    #[test]
    fn test_storage_bounds() {
        let mut storage = ComponentStorage::new(Panel::VARIANT, 100);
        assert!(storage.get(100).is_none());
        assert!(storage.set(100, panel_store(1)).is_err());
    }

    #[test]
    fn test_storage_take_and_clear() {
        let mut storage = ComponentStorage::new(Panel::VARIANT, 10);
        storage.set(1, panel_store(1)).unwrap();
        storage.set(2, panel_store(2)).unwrap();
        assert!(storage.take(1).is_some());
        assert!(storage.get(1).is_none());
        storage.clear();
        assert_eq!(storage.iter().count(), 0);
    }
}
