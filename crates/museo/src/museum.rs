//! # Museum Scene Loop
//!
//! Per-tick orchestration of the museum scene:
//! ```text
//! Tick N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. UI ACTIONS                                                       │
//! │    └─ Drain the action queue, apply in submission order             │
//! │                                                                     │
//! │ 2. ATTACHMENTS                                                      │
//! │    └─ Fresh world pose for every WristAttached entity               │
//! │                                                                     │
//! │ 3. HIERARCHY                                                        │
//! │    └─ Publish world poses of parented entities (exhibit models)     │
//! │                                                                     │
//! │ 4. END TICK                                                         │
//! │    └─ Count and clear change flags                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Attachments run before the hierarchy so children of an attached entity
//! follow it within the same tick.

use std::sync::Arc;

use museo_core::{
    AttributeValue, ComponentRegistry, EcsError, EntityId, Mesh, Panel, QueryFilter, Scale,
    Transform, TransformParent, Visible, World,
};
use museo_shared::{Pose, Quaternion};
use tracing::{debug, info, warn};

use crate::attachment::{AttachmentResolver, ReferenceFrameProvider, TransformSink, UpdateStats};
use crate::config::MuseumConfig;
use crate::error::SceneResult;
use crate::events::{UiAction, UiActionQueue, UiDispatcher};
use crate::exhibits::ExhibitCatalog;
use crate::hierarchy::{self, HierarchyStats};
use crate::scene::{self, SceneLoadReport};

/// Starting layout: the hidden main panel and the wrist button that summons it.
pub const DEFAULT_SCENE: &str = r#"
[[entity]]
name = "main_panel"
Panel = { panelId = 1 }
Transform = { position = [0.0, 1.6, -1.0] }
Visible = { isVisible = false }

[[entity]]
name = "wrist_menu"
Panel = { panelId = 2 }
WristAttached = { position = [0.0, 0.05, 0.0], rotation = [-90.0, 0.0, 0.0], side = "LEFT" }
"#;

/// Tick statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Tick number.
    pub tick: u64,
    /// UI actions applied.
    pub actions_applied: u32,
    /// UI actions that failed (logged).
    pub actions_failed: u32,
    /// Attachment update summary.
    pub attachment: UpdateStats,
    /// Hierarchy propagation summary.
    pub hierarchy: HierarchyStats,
    /// Entities whose components changed this tick.
    pub changed_entities: usize,
}

/// The museum scene: world, resolver, catalog and UI queue.
///
/// Owned by the scene thread. Other threads talk to it through a
/// [`UiDispatcher`].
pub struct Museum {
    config: MuseumConfig,
    world: World,
    resolver: AttachmentResolver,
    catalog: ExhibitCatalog,
    actions: UiActionQueue,
    dispatcher: UiDispatcher,
    current_model: Option<EntityId>,
    tick_count: u64,
}

impl Museum {
    /// Creates an empty museum.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the config fails validation.
    pub fn new(config: MuseumConfig, catalog: ExhibitCatalog) -> SceneResult<Self> {
        config.validate()?;
        let registry = Arc::new(ComponentRegistry::with_builtin_components()?);
        let world = World::new(registry, config.entity_capacity);
        let resolver = AttachmentResolver::from_config(&config);
        let (dispatcher, actions) = UiActionQueue::new(config.action_capacity);

        info!(
            capacity = config.entity_capacity,
            source = ?config.reference_source,
            exhibits = catalog.len(),
            "museum created"
        );

        Ok(Self {
            config,
            world,
            resolver,
            catalog,
            actions,
            dispatcher,
            current_model: None,
            tick_count: 0,
        })
    }

    /// Loads [`DEFAULT_SCENE`].
    ///
    /// # Errors
    ///
    /// As [`Museum::load_scene`].
    pub fn spawn_default_layout(&mut self) -> SceneResult<SceneLoadReport> {
        self.load_scene(DEFAULT_SCENE)
    }

    /// Creates the entities of a scene document.
    ///
    /// # Errors
    ///
    /// See [`scene::load_scene`].
    pub fn load_scene(&mut self, content: &str) -> SceneResult<SceneLoadReport> {
        scene::load_scene(&mut self.world, content)
    }

    /// A new handle for posting UI actions from any thread.
    #[must_use]
    pub fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }

    /// The loaded config.
    #[must_use]
    pub const fn config(&self) -> &MuseumConfig {
        &self.config
    }

    /// The scene's world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the scene's world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The exhibit catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ExhibitCatalog {
        &self.catalog
    }

    /// Model entity currently shown next to the main panel.
    #[must_use]
    pub const fn current_model(&self) -> Option<EntityId> {
        self.current_model
    }

    /// Returns the current tick count.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn main_panel(&self) -> SceneResult<EntityId> {
        let panel_id = self.config.main_panel_id;
        let filter = QueryFilter::new()
            .has::<Panel>()
            .attr_eq(Panel::PANEL_ID, AttributeValue::Int(panel_id));
        self.world
            .find_first_where(|e| filter.matches(&e))
            .map_err(|_| EcsError::NotFound(format!("panel {panel_id}")).into())
    }

    /// Removes the shown model. Returns whether one was removed.
    pub fn hide_model(&mut self) -> bool {
        let Some(model) = self.current_model.take() else {
            return false;
        };
        match self.world.destroy(model) {
            Ok(()) => true,
            Err(err) => {
                debug!(entity = %model, error = %err, "model already gone");
                false
            }
        }
    }

    /// Replaces the shown model with `path`, parented to the main panel.
    ///
    /// The previous model is removed first, even if the new one cannot be
    /// placed.
    ///
    /// # Errors
    ///
    /// `NotFound` if the main panel does not exist (nothing is spawned).
    pub fn show_model(&mut self, path: &str) -> SceneResult<EntityId> {
        self.hide_model();

        let panel = match self.main_panel() {
            Ok(panel) => panel,
            Err(err) => {
                warn!(path, "cannot show model: main panel not found");
                return Err(err);
            }
        };

        let registry = Arc::clone(self.world.registry());
        let offset = Pose::new(self.config.model_offset, Quaternion::IDENTITY);
        let model = self.world.create_entity([
            registry.store_for(&Mesh::new(path))?,
            registry.store_for(&TransformParent::new(panel))?,
            registry.store_for(&Transform::new(offset))?,
            registry.store_for(&Scale::new(self.config.model_scale))?,
            registry.store_for(&Visible::new(true))?,
        ])?;
        self.current_model = Some(model);

        info!(entity = %model, panel = %panel, path, "model spawned");
        Ok(model)
    }

    /// Shows an exhibit: spawns its model if it has one, otherwise clears
    /// the shown model. Returns the model entity, if any.
    ///
    /// # Errors
    ///
    /// `ExhibitNotFound`, or as [`Museum::show_model`].
    pub fn show_exhibit(&mut self, id: u32) -> SceneResult<Option<EntityId>> {
        let exhibit = self.catalog.require(id)?;
        match exhibit.model_path.clone().filter(|p| !p.is_empty()) {
            Some(path) => self.show_model(&path).map(Some),
            None => {
                debug!(exhibit = id, "exhibit has no model");
                self.hide_model();
                Ok(None)
            }
        }
    }

    /// Brings the main panel in front of the viewer.
    ///
    /// # Errors
    ///
    /// `NotFound` if the main panel does not exist.
    pub fn recenter<F, S>(
        &mut self,
        frames: &F,
        sink: &mut S,
    ) -> SceneResult<Option<(EntityId, Pose)>>
    where
        F: ReferenceFrameProvider + ?Sized,
        S: TransformSink + ?Sized,
    {
        self.resolver
            .recenter_main_panel(&mut self.world, frames, sink, self.config.main_panel_id)
    }

    fn apply_action<F, S>(&mut self, action: UiAction, frames: &F, sink: &mut S) -> SceneResult<()>
    where
        F: ReferenceFrameProvider + ?Sized,
        S: TransformSink + ?Sized,
    {
        match action {
            UiAction::RecenterMainPanel => self.recenter(frames, sink).map(|_| ()),
            UiAction::ShowExhibit(id) => self.show_exhibit(id).map(|_| ()),
            UiAction::ShowModel(path) => self.show_model(&path).map(|_| ()),
            UiAction::HideModel => {
                self.hide_model();
                Ok(())
            }
        }
    }

    /// Runs one scene tick.
    pub fn tick<F, S>(&mut self, frames: &F, sink: &mut S) -> TickStats
    where
        F: ReferenceFrameProvider + ?Sized,
        S: TransformSink + ?Sized,
    {
        let mut stats = TickStats {
            tick: self.tick_count,
            ..TickStats::default()
        };

        for action in self.actions.drain() {
            match self.apply_action(action.clone(), frames, sink) {
                Ok(()) => stats.actions_applied += 1,
                Err(err) => {
                    warn!(?action, error = %err, "UI action failed");
                    stats.actions_failed += 1;
                }
            }
        }

        stats.attachment = self.resolver.update(&mut self.world, frames, sink);
        stats.hierarchy = hierarchy::propagate(&self.world, sink, self.config.max_hierarchy_depth);

        stats.changed_entities = self.world.changed().count();
        self.world.clear_changes();

        self.tick_count += 1;
        stats
    }
}
