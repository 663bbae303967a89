//! # Core Error Types
//!
//! All errors that can occur while registering schemas, reading or writing
//! attributes, and looking up entities. Every variant is recoverable by the
//! caller.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the component system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A schema for this component variant was already registered.
    #[error("component variant {name} (#{id}) is already registered")]
    DuplicateVariant {
        /// Name of the variant.
        name: String,
        /// Numeric variant id.
        id: u8,
    },

    /// The component variant is not registered.
    #[error("unknown component variant: {0}")]
    UnknownVariant(String),

    /// The attribute key or name does not exist in the component schema.
    #[error("unknown attribute {key} on component {component}")]
    UnknownKey {
        /// Component the lookup was made against.
        component: String,
        /// Attribute name or key that failed to resolve.
        key: String,
    },

    /// Two attributes of one schema share a name.
    #[error("attribute {name} declared twice on component {component}")]
    DuplicateAttribute {
        /// Component being registered.
        component: String,
        /// The repeated attribute name.
        name: String,
    },

    /// The value does not match the attribute's declared primitive type.
    #[error("type mismatch on {attribute}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Qualified attribute name (`Component.attribute`).
        attribute: String,
        /// The declared type.
        expected: String,
        /// What was supplied.
        found: String,
    },

    /// No live entity has this id.
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// The entity is alive but does not carry the component.
    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        /// The entity that was inspected.
        entity: EntityId,
        /// The missing component.
        component: String,
    },

    /// A query or named lookup matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A mutation was attempted through an id whose entity was destroyed.
    #[error("stale reference to destroyed entity {0}")]
    StaleReference(EntityId),

    /// Every pre-allocated entity slot is in use.
    #[error("entity capacity of {0} exhausted")]
    CapacityExceeded(usize),
}

impl EcsError {
    /// Whether this error is one of the lookup-miss variants.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntityNotFound(_) | Self::ComponentNotFound { .. } | Self::NotFound(_)
        )
    }
}

/// Result type for component system operations.
pub type EcsResult<T> = Result<T, EcsError>;
