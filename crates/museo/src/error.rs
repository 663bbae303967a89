//! # Scene Error Types
//!
//! All errors that can occur above the component model: configuration,
//! catalog and scene files, and the transform hierarchy.

use std::path::PathBuf;

use museo_core::{EcsError, EntityId};
use thiserror::Error;

/// Errors that can occur while loading or running the museum scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Error reported by the component model.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// A config, catalog or scene file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A TOML document is malformed or does not match the expected shape.
    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A config value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scene document is well-formed TOML but not a valid scene.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// No exhibit with this id in the catalog.
    #[error("exhibit not found: {0}")]
    ExhibitNotFound(u32),

    /// A parent chain is longer than the configured limit (or cyclic).
    #[error("transform hierarchy of {entity} exceeds depth {limit}")]
    HierarchyTooDeep {
        /// Entity whose world pose was requested.
        entity: EntityId,
        /// Configured depth limit.
        limit: usize,
    },
}

impl SceneError {
    /// Whether the error means "the requested thing is absent".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Ecs(err) => err.is_not_found(),
            Self::ExhibitNotFound(_) => true,
            _ => false,
        }
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
