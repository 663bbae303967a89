//! # Entity Component System
//!
//! A schema-driven ECS for scene objects.
//!
//! ## Design Philosophy
//!
//! - Component data lives in attribute stores validated against a schema
//! - Schemas are registered once and shared read-only afterwards
//! - Entity slots are pre-allocated; ids carry a generation counter
//! - Queries snapshot their results at call time

mod attribute;
mod change;
mod component;
mod entity;
mod query;
mod registry;
mod schema;
mod storage;
mod world;

pub use attribute::{
    AttributeKey, AttributePrimitive, AttributeStore, AttributeType, AttributeValue, NamedValue,
    VariantId,
};
pub use change::{ChangeIter, ChangeTracker};
pub use component::{
    Component, HandSide, Mesh, Panel, Scale, Transform, TransformParent, Visible, WristAttached,
};
pub use entity::{Entity, EntityId};
pub use query::{EntityRef, Query, QueryFilter};
pub use registry::ComponentRegistry;
pub use schema::{AttributeDef, ComponentSchema, EnumDescriptor, ReflectEnum, SchemaBuilder};
pub use storage::ComponentStorage;
pub use world::World;
