//! # Queries
//!
//! Predicate-based entity lookup. A [`Query`] is a snapshot: the matching ids
//! are collected when the query is issued, in ascending id order, so later
//! mutation of the world never changes what an outstanding query yields.
//! An id yielded by a query may still be destroyed afterwards; reads through
//! it then report `NotFound`.

use super::attribute::{AttributeKey, AttributeStore, AttributeValue, VariantId};
use super::component::Component;
use super::entity::EntityId;
use super::world::World;

/// Read-only view of one live entity, handed to query predicates.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    id: EntityId,
}

impl<'w> EntityRef<'w> {
    pub(crate) const fn new(world: &'w World, id: EntityId) -> Self {
        Self { world, id }
    }

    /// The entity id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity carries component `C`.
    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.has_variant(C::VARIANT)
    }

    /// Whether the entity carries the variant.
    #[must_use]
    pub fn has_variant(&self, variant: VariantId) -> bool {
        self.world.has_variant(self.id, variant)
    }

    /// Typed component value.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<C> {
        self.world.get_component::<C>(self.id).ok()
    }

    /// Raw store of a variant.
    #[must_use]
    pub fn store(&self, variant: VariantId) -> Option<&'w AttributeStore> {
        self.world.store(self.id, variant).ok()
    }

    /// One attribute value.
    #[must_use]
    pub fn attribute(&self, key: AttributeKey) -> Option<&'w AttributeValue> {
        self.store(key.variant())?.get(key).ok()
    }
}

/// Snapshot of matching entity ids, in ascending order.
#[derive(Debug)]
pub struct Query {
    ids: std::vec::IntoIter<EntityId>,
}

impl Query {
    pub(crate) fn new(ids: Vec<EntityId>) -> Self {
        Self {
            ids: ids.into_iter(),
        }
    }
}

impl Iterator for Query {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        self.ids.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Query {}

/// Declarative predicate: required components plus attribute equalities.
///
/// ```rust,ignore
/// let main_panel = QueryFilter::new()
///     .has::<Panel>()
///     .attr_eq(Panel::PANEL_ID, AttributeValue::Int(MAIN_PANEL_ID));
/// let id = world.find_first_where(|e| main_panel.matches(&e))?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryFilter {
    required: u64,
    equals: Vec<(AttributeKey, AttributeValue)>,
}

impl QueryFilter {
    /// Filter matching every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires component `C`.
    #[must_use]
    pub fn has<C: Component>(self) -> Self {
        self.has_variant(C::VARIANT)
    }

    /// Requires a variant.
    #[must_use]
    pub fn has_variant(mut self, variant: VariantId) -> Self {
        self.required |= 1 << variant.raw();
        self
    }

    /// Requires an attribute to equal `value` (implies the component).
    #[must_use]
    pub fn attr_eq(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.required |= 1 << key.variant().raw();
        self.equals.push((key, value));
        self
    }

    /// Whether the entity satisfies every condition.
    #[must_use]
    pub fn matches(&self, entity: &EntityRef<'_>) -> bool {
        let mask = entity.world.component_mask(entity.id);
        if mask & self.required != self.required {
            return false;
        }
        self.equals
            .iter()
            .all(|(key, value)| entity.attribute(*key) == Some(value))
    }
}
