//! # MUSEO
//!
//! Scene orchestration for the VR museum, on top of the component model
//! in `museo_core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              MUSEO SCENE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │   UI threads    │     │     Museum      │     │  Scene runtime  │    │
//! │  │                 │────>│   (tick loop)   │────>│   (renderer)    │    │
//! │  │  UiDispatcher   │     │                 │     │  TransformSink  │    │
//! │  └─────────────────┘     │  • Attachments  │     └─────────────────┘    │
//! │                          │  • Hierarchy    │              │             │
//! │                          │  • Exhibits     │<─────────────┘             │
//! │                          └─────────────────┘  ReferenceFrameProvider    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `attachment`: Spatial Attachment Resolver (continuous and one-shot)
//! - `hierarchy`: Parent-relative transforms
//! - `scene`: TOML scene loader
//! - `exhibits`: Exhibit catalog
//! - `events`: UI action queue
//! - `museum`: Tick orchestration

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod attachment;
pub mod config;
pub mod error;
pub mod events;
pub mod exhibits;
pub mod hierarchy;
pub mod museum;
pub mod scene;

// Re-export the component model
pub use museo_core as core;
pub use museo_shared as shared;

// Re-export commonly used types
pub use attachment::{
    recenter, resolve_attachment, AttachmentResolver, ReferenceFrameProvider, ReferenceSource,
    TransformSink, UpdateStats,
};
pub use config::MuseumConfig;
pub use error::{SceneError, SceneResult};
pub use events::{UiAction, UiActionQueue, UiDispatcher};
pub use exhibits::{Category, Exhibit, ExhibitCatalog};
pub use hierarchy::HierarchyStats;
pub use museum::{Museum, TickStats, DEFAULT_SCENE};
pub use scene::{load_scene, SceneLoadReport, SkippedComponent};
