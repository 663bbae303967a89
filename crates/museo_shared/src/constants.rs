//! # Museum Constants
//!
//! Values shared by the panels, the recenter operation and the model
//! placement. Runtime overrides live in the host's `MuseumConfig`.

use crate::math::Vec3;

// =============================================================================
// PANELS
// =============================================================================

/// Registration id of the main exhibit panel.
pub const MAIN_PANEL_ID: i32 = 1;

/// Registration id of the wrist quick-access menu panel.
pub const WRIST_MENU_PANEL_ID: i32 = 2;

/// Main panel width in meters.
pub const MAIN_PANEL_WIDTH: f32 = 1.2;

/// Main panel height in meters.
pub const MAIN_PANEL_HEIGHT: f32 = 0.9;

/// Side length of the square wrist button in meters.
pub const WRIST_BUTTON_SIZE: f32 = 0.08;

// =============================================================================
// RECENTER
// =============================================================================

/// Distance in front of the viewer at which the main panel is placed.
pub const RECENTER_DISTANCE: f32 = 0.6;

/// Rotation offset (pitch, yaw, roll in degrees) applied on top of the
/// viewer orientation when the main panel is recentered.
pub const RECENTER_OFFSET_DEGREES: Vec3 = Vec3::new(1.0, 1.0, 0.0);

// =============================================================================
// EXHIBIT MODELS
// =============================================================================

/// Offset of a spawned exhibit model relative to the main panel.
pub const MODEL_OFFSET: Vec3 = Vec3::new(2.0, -0.5, 0.0);

/// Scale of a spawned exhibit model.
pub const MODEL_SCALE: Vec3 = Vec3::new(3.5, 1.0, 1.0);
