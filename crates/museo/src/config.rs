//! # Museum Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document (or no file at all) yields the stock museum layout.
//!
//! ```toml
//! entity_capacity = 1024
//! reference_source = "hand"
//! recenter_distance = 0.8
//! model_scale = [3.5, 1.0, 1.0]
//! ```

use std::fs;
use std::path::Path;

use museo_shared::Vec3;
use serde::Deserialize;

use crate::attachment::ReferenceSource;
use crate::error::{SceneError, SceneResult};

/// Runtime settings of the museum scene.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MuseumConfig {
    /// Number of entity slots pre-allocated in the world.
    pub entity_capacity: usize,
    /// Maximum UI actions in flight between two ticks.
    pub action_capacity: usize,
    /// Tracked frame wrist attachments follow.
    pub reference_source: ReferenceSource,
    /// Distance of the recentered main panel from the viewer, in meters.
    pub recenter_distance: f32,
    /// Rotation applied on top of the viewer orientation on recenter, in degrees.
    pub recenter_offset_degrees: Vec3,
    /// Registration id of the main panel.
    pub main_panel_id: i32,
    /// Offset of exhibit models relative to the main panel.
    pub model_offset: Vec3,
    /// Scale of exhibit models.
    pub model_scale: Vec3,
    /// Longest parent chain the transform hierarchy will follow.
    pub max_hierarchy_depth: usize,
}

impl Default for MuseumConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 1024,
            action_capacity: 64,
            reference_source: ReferenceSource::Head,
            recenter_distance: museo_shared::RECENTER_DISTANCE,
            recenter_offset_degrees: museo_shared::RECENTER_OFFSET_DEGREES,
            main_panel_id: museo_shared::MAIN_PANEL_ID,
            model_offset: museo_shared::MODEL_OFFSET,
            model_scale: museo_shared::MODEL_SCALE,
            max_hierarchy_depth: 16,
        }
    }
}

impl MuseumConfig {
    /// Parses and validates a config document.
    ///
    /// # Errors
    ///
    /// [`SceneError::Toml`] for malformed TOML or unknown keys,
    /// [`SceneError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> SceneResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// [`SceneError::Io`] if the file cannot be read, otherwise as
    /// [`MuseumConfig::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SceneResult<()> {
        if self.entity_capacity == 0 || u32::try_from(self.entity_capacity).is_err() {
            return Err(SceneError::InvalidConfig(format!(
                "entity_capacity must be in 1..=u32::MAX, got {}",
                self.entity_capacity
            )));
        }
        if self.action_capacity == 0 {
            return Err(SceneError::InvalidConfig(
                "action_capacity must be greater than zero".to_owned(),
            ));
        }
        if !self.recenter_distance.is_finite() || self.recenter_distance < 0.0 {
            return Err(SceneError::InvalidConfig(format!(
                "recenter_distance must be a non-negative number of meters, got {}",
                self.recenter_distance
            )));
        }
        let vectors = [
            ("recenter_offset_degrees", self.recenter_offset_degrees),
            ("model_offset", self.model_offset),
            ("model_scale", self.model_scale),
        ];
        for (name, v) in vectors {
            if !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()) {
                return Err(SceneError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        if self.max_hierarchy_depth == 0 {
            return Err(SceneError::InvalidConfig(
                "max_hierarchy_depth must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
