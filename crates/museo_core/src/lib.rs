//! # Museo Core
//!
//! Data-driven Entity Component System for the museum scene:
//! - Components are bags of typed attributes described by a schema
//! - Schemas are registered once at startup and read for the program lifetime
//! - Entity IDs are indices with generation counters, so a destroyed entity
//!   can never be read through an id retained elsewhere
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use museo_core::{ComponentRegistry, World, WristAttached};
//!
//! let registry = Arc::new(ComponentRegistry::with_builtin_components()?);
//! let mut world = World::new(Arc::clone(&registry), 1024);
//! let menu = world.create_entity([registry.store_for(&WristAttached::default())?])?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;

pub use ecs::{
    AttributeDef, AttributeKey, AttributePrimitive, AttributeStore, AttributeType,
    AttributeValue, ChangeIter, ChangeTracker, Component, ComponentRegistry, ComponentSchema,
    ComponentStorage, Entity, EntityId, EntityRef, EnumDescriptor, HandSide, Mesh,
    NamedValue, Panel, Query, QueryFilter, ReflectEnum, Scale, SchemaBuilder, Transform,
    TransformParent, VariantId, Visible, World, WristAttached,
};
pub use error::{EcsError, EcsResult};
