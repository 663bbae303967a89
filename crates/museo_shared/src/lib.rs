//! # Museo Shared
//!
//! Common types used by the scene core and by the host application.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on the ECS or on any I/O crate.
//! If you need entities, put them in `museo_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    MAIN_PANEL_HEIGHT, MAIN_PANEL_ID, MAIN_PANEL_WIDTH, MODEL_OFFSET, MODEL_SCALE,
    RECENTER_DISTANCE, RECENTER_OFFSET_DEGREES, WRIST_BUTTON_SIZE, WRIST_MENU_PANEL_ID,
};
pub use math::{Pose, Quaternion, Vec3};
