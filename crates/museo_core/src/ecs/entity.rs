//! # Entity Management
//!
//! Entities are opaque identifiers consisting of:
//! - An index into the entity arena and component storages
//! - A generation counter for safe slot reuse

use std::cmp::Ordering;
use std::fmt;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component storages
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// Ids order by index first, so among live entities "lowest id" is the one
/// in the lowest slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into component storages (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index()
            .cmp(&other.index())
            .then(self.generation().cmp(&other.generation()))
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Entity slot with its components' presence flags.
///
/// It tracks which component variants are attached via a bitmask.
#[derive(Clone, Copy, Debug)]
pub struct Entity {
    /// The unique identifier for this entity.
    pub id: EntityId,
    /// Bitmask of attached component variants (up to 64 variants).
    pub component_mask: u64,
    /// Whether this entity slot is currently alive.
    pub alive: bool,
}

impl Entity {
    /// Creates a new entity.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            component_mask: 0,
            alive: true,
        }
    }

    /// Creates a dead/empty entity slot.
    #[inline]
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            id: EntityId::NULL,
            component_mask: 0,
            alive: false,
        }
    }

    /// Checks if this entity has a specific component variant.
    ///
    /// # Arguments
    ///
    /// * `variant` - The component variant id (0-63)
    #[inline]
    #[must_use]
    pub const fn has_component(self, variant: u8) -> bool {
        (self.component_mask & (1 << variant)) != 0
    }

    /// Adds a component flag to this entity.
    #[inline]
    pub fn add_component(&mut self, variant: u8) {
        self.component_mask |= 1 << variant;
    }

    /// Removes a component flag from this entity.
    #[inline]
    pub fn remove_component(&mut self, variant: u8) {
        self.component_mask &= !(1 << variant);
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::dead()
    }
}
