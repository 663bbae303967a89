//! # Spatial Attachment Resolver
//!
//! Places entities relative to a tracked reference frame supplied by the
//! scene runtime.
//!
//! Two modes share the same pose composition:
//!
//! - **Continuous** ([`AttachmentResolver::update`]): every tick, each entity
//!   with a [`WristAttached`] component gets a fresh world pose derived from
//!   the current reference pose. Nothing is integrated across ticks, so
//!   running the update twice with the same inputs writes the same pose.
//! - **One-shot** ([`AttachmentResolver::recenter_main_panel`]): the main
//!   panel is placed once, a fixed distance along the viewer's forward axis.
//!
//! Conventions: +Z is forward, +Y is up, rotations are in degrees
//! `(pitch, yaw, roll)`.

use museo_core::{
    AttributeValue, EcsError, EntityId, HandSide, Panel, QueryFilter, Transform, Visible, World,
    WristAttached,
};
use museo_shared::{Pose, Quaternion, Vec3};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::MuseumConfig;
use crate::error::SceneResult;

/// Tracked poses provided by the scene runtime.
///
/// `None` means tracking is currently lost for that frame.
pub trait ReferenceFrameProvider {
    /// World pose of the viewer's head.
    fn head_pose(&self) -> Option<Pose>;

    /// World pose of one hand.
    fn hand_pose(&self, side: HandSide) -> Option<Pose>;
}

/// Receives the world poses computed for entities.
pub trait TransformSink {
    /// Publishes an entity's new world pose.
    fn apply_transform(&mut self, entity: EntityId, pose: Pose);
}

impl TransformSink for Vec<(EntityId, Pose)> {
    fn apply_transform(&mut self, entity: EntityId, pose: Pose) {
        self.push((entity, pose));
    }
}

/// Which tracked frame attachments follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    /// Follow the head (menus that follow the gaze).
    #[default]
    Head,
    /// Follow the hand named by each attachment's `side`.
    Hand,
}

/// World pose of an attachment given the reference pose.
///
/// The offset is expressed in the reference frame's local space. With
/// `face_user` set, the `rotation` field is ignored and the entity's +Z
/// axis points from the entity toward the reference origin; if the two
/// coincide the reference orientation is used.
#[must_use]
pub fn resolve_attachment(reference: Pose, attachment: &WristAttached) -> Pose {
    if attachment.face_user {
        let t = reference.transform_point(attachment.position);
        let q = Quaternion::look_rotation(reference.t - t, Vec3::Y).unwrap_or(reference.q);
        Pose::new(t, q)
    } else {
        let local = Pose::new(
            attachment.position,
            Quaternion::from_euler_degrees(attachment.rotation),
        );
        reference.compose(local)
    }
}

/// Pose `distance` meters in front of `reference`, rotated by `offset`.
#[must_use]
pub fn recenter(reference: Pose, distance: f32, offset: Quaternion) -> Pose {
    let forward = reference.q * Vec3::new(0.0, 0.0, distance);
    Pose::new(reference.t + forward, (reference.q * offset).normalize())
}

/// Outcome of one continuous update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Entities carrying an attachment when the tick started.
    pub attached: usize,
    /// Poses written.
    pub updated: usize,
    /// Entities held at their last pose because tracking was lost.
    pub tracking_lost: usize,
    /// Computed poses dropped because the entity died before apply.
    pub discarded: usize,
    /// Attachments whose stored values could not be read.
    pub malformed: usize,
}

/// Computes and applies attachment poses.
#[derive(Clone, Debug)]
pub struct AttachmentResolver {
    source: ReferenceSource,
    recenter_distance: f32,
    recenter_offset: Quaternion,
}

impl AttachmentResolver {
    /// Creates a resolver with the default recenter distance and offset.
    #[must_use]
    pub fn new(source: ReferenceSource) -> Self {
        Self {
            source,
            recenter_distance: museo_shared::RECENTER_DISTANCE,
            recenter_offset: Quaternion::from_euler_degrees(museo_shared::RECENTER_OFFSET_DEGREES),
        }
    }

    /// Creates a resolver from the loaded config.
    #[must_use]
    pub fn from_config(config: &MuseumConfig) -> Self {
        Self {
            source: config.reference_source,
            recenter_distance: config.recenter_distance,
            recenter_offset: Quaternion::from_euler_degrees(config.recenter_offset_degrees),
        }
    }

    /// The tracked frame attachments follow.
    #[must_use]
    pub const fn source(&self) -> ReferenceSource {
        self.source
    }

    /// Computes the world pose of every attached entity without writing it.
    ///
    /// Entities whose reference frame is not tracked are left out; they
    /// keep whatever pose they had.
    pub fn compute<F>(&self, world: &World, frames: &F) -> (Vec<(EntityId, Pose)>, UpdateStats)
    where
        F: ReferenceFrameProvider + ?Sized,
    {
        let mut stats = UpdateStats::default();
        // one lookup per frame source and tick
        let head = frames.head_pose();
        let mut hands: [Option<Option<Pose>>; 2] = [None, None];

        let ids: Vec<EntityId> = world.query_with::<WristAttached>().collect();
        stats.attached = ids.len();

        let mut poses = Vec::with_capacity(ids.len());
        for id in ids {
            let attachment = match world.get_component::<WristAttached>(id) {
                Ok(attachment) => attachment,
                Err(err) => {
                    warn!(entity = %id, error = %err, "unreadable attachment, skipped");
                    stats.malformed += 1;
                    continue;
                }
            };
            let reference = match self.source {
                ReferenceSource::Head => head,
                ReferenceSource::Hand => {
                    let slot = match attachment.side {
                        HandSide::Left => 0,
                        HandSide::Right => 1,
                    };
                    *hands[slot].get_or_insert_with(|| frames.hand_pose(attachment.side))
                }
            };
            match reference {
                Some(reference) => poses.push((id, resolve_attachment(reference, &attachment))),
                None => {
                    debug!(entity = %id, side = ?attachment.side, "tracking lost, holding last pose");
                    stats.tracking_lost += 1;
                }
            }
        }
        (poses, stats)
    }

    /// Writes computed poses into `Transform` and publishes them to `sink`.
    ///
    /// Poses for entities that are no longer alive are discarded.
    pub fn apply<S>(
        &self,
        world: &mut World,
        poses: Vec<(EntityId, Pose)>,
        sink: &mut S,
        stats: &mut UpdateStats,
    ) where
        S: TransformSink + ?Sized,
    {
        for (id, pose) in poses {
            match world.set_component(id, &Transform::new(pose)) {
                Ok(()) => {
                    sink.apply_transform(id, pose);
                    stats.updated += 1;
                }
                Err(EcsError::StaleReference(_)) => {
                    debug!(entity = %id, "entity destroyed before its pose was applied");
                    stats.discarded += 1;
                }
                Err(err) => {
                    warn!(entity = %id, error = %err, "failed to write attachment pose");
                    stats.discarded += 1;
                }
            }
        }
    }

    /// Continuous mode: recomputes and writes every attachment pose.
    pub fn update<F, S>(&self, world: &mut World, frames: &F, sink: &mut S) -> UpdateStats
    where
        F: ReferenceFrameProvider + ?Sized,
        S: TransformSink + ?Sized,
    {
        let (poses, mut stats) = self.compute(world, frames);
        self.apply(world, poses, sink, &mut stats);
        stats
    }

    /// One-shot pose in front of the head.
    ///
    /// Returns `None` while head tracking is lost.
    #[must_use]
    pub fn recenter_pose<F>(&self, frames: &F) -> Option<Pose>
    where
        F: ReferenceFrameProvider + ?Sized,
    {
        frames
            .head_pose()
            .map(|head| recenter(head, self.recenter_distance, self.recenter_offset))
    }

    /// Moves the panel registered as `panel_id` in front of the viewer and
    /// makes it visible.
    ///
    /// Returns the panel and its new pose, or `None` if head tracking is
    /// lost (nothing is written).
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`] if no panel has this id; nothing is written.
    pub fn recenter_main_panel<F, S>(
        &self,
        world: &mut World,
        frames: &F,
        sink: &mut S,
        panel_id: i32,
    ) -> SceneResult<Option<(EntityId, Pose)>>
    where
        F: ReferenceFrameProvider + ?Sized,
        S: TransformSink + ?Sized,
    {
        let filter = QueryFilter::new()
            .has::<Panel>()
            .attr_eq(Panel::PANEL_ID, AttributeValue::Int(panel_id));
        let panel = world.find_first_where(|e| filter.matches(&e)).map_err(|_| {
            warn!(panel_id, "recenter requested but no panel has this id");
            EcsError::NotFound(format!("panel {panel_id}"))
        })?;

        let Some(pose) = self.recenter_pose(frames) else {
            warn!(panel_id, "head tracking lost, recenter skipped");
            return Ok(None);
        };

        world.set_component(panel, &Transform::new(pose))?;
        world.set_component(panel, &Visible::new(true))?;
        sink.apply_transform(panel, pose);
        info!(
            panel = %panel,
            x = pose.t.x,
            y = pose.t.y,
            z = pose.t.z,
            "main panel recentered"
        );
        Ok(Some((panel, pose)))
    }
}

impl Default for AttachmentResolver {
    fn default() -> Self {
        Self::new(ReferenceSource::Head)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use museo_core::{Component, ComponentRegistry, ComponentSchema};

    const EPS: f32 = 1e-4;

    #[derive(Default)]
    struct Frames {
        head: Option<Pose>,
        left: Option<Pose>,
        right: Option<Pose>,
    }

    impl ReferenceFrameProvider for Frames {
        fn head_pose(&self) -> Option<Pose> {
            self.head
        }

        fn hand_pose(&self, side: HandSide) -> Option<Pose> {
            match side {
                HandSide::Left => self.left,
                HandSide::Right => self.right,
            }
        }
    }

    fn world() -> World {
        World::new(Arc::new(ComponentRegistry::with_builtin_components().unwrap()), 64)
    }

    fn attached(position: Vec3) -> WristAttached {
        WristAttached {
            position,
            ..WristAttached::default()
        }
    }

    #[test]
    fn test_offset_in_reference_space() {
        let reference = Pose::from_translation(Vec3::new(0.0, 1.6, 0.0));
        let pose = resolve_attachment(reference, &attached(Vec3::new(0.0, 0.0, 0.6)));
        assert!(pose.t.approx_eq(Vec3::new(0.0, 1.6, 0.6), EPS));
        assert!(pose.q.approx_eq(Quaternion::IDENTITY, EPS));

        // offset follows the reference orientation
        let turned = Pose::new(Vec3::ZERO, Quaternion::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0)));
        let pose = resolve_attachment(turned, &attached(Vec3::new(0.0, 0.0, 1.0)));
        assert!(pose.t.approx_eq(Vec3::new(1.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn test_rotation_offset_composes() {
        let reference = Pose::new(Vec3::ZERO, Quaternion::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0)));
        let attachment = WristAttached {
            rotation: Vec3::new(0.0, 90.0, 0.0),
            ..WristAttached::default()
        };
        let pose = resolve_attachment(reference, &attachment);
        let expected = Quaternion::from_euler_degrees(Vec3::new(0.0, 180.0, 0.0));
        assert!(pose.q.approx_eq(expected, EPS));
    }

    #[test]
    fn test_face_user_points_at_reference() {
        let reference = Pose::from_translation(Vec3::new(0.0, 1.6, 0.0));
        let attachment = WristAttached {
            position: Vec3::new(0.3, 0.0, 0.5),
            rotation: Vec3::new(45.0, 10.0, 0.0),
            face_user: true,
            ..WristAttached::default()
        };
        let pose = resolve_attachment(reference, &attachment);
        assert!(pose.t.approx_eq(Vec3::new(0.3, 1.6, 0.5), EPS));

        let toward = (reference.t - pose.t).try_normalize().unwrap();
        assert!(pose.q.forward().approx_eq(toward, EPS));
    }

    #[test]
    fn test_face_user_degenerate_uses_reference_orientation() {
        let q = Quaternion::from_euler_degrees(Vec3::new(0.0, 30.0, 0.0));
        let reference = Pose::new(Vec3::new(1.0, 1.0, 1.0), q);
        let attachment = WristAttached {
            face_user: true,
            ..WristAttached::default()
        };
        let pose = resolve_attachment(reference, &attachment);
        assert!(pose.q.approx_eq(q, EPS));
        assert!(pose.t.approx_eq(reference.t, EPS));
    }

    #[test]
    fn test_recenter_pose() {
        let head = Pose::from_translation(Vec3::new(0.0, 1.6, 0.0));
        let pose = recenter(head, 0.6, Quaternion::IDENTITY);
        assert!(pose.t.approx_eq(Vec3::new(0.0, 1.6, 0.6), EPS));

        let offset = Quaternion::from_euler_degrees(Vec3::new(1.0, 1.0, 0.0));
        let pose = recenter(head, 0.6, offset);
        assert!(pose.q.approx_eq(offset, EPS));
    }

    #[test]
    fn test_update_writes_transform_and_sink() {
        let mut world = world();
        let id = world.spawn().unwrap();
        world.insert(id, &attached(Vec3::new(0.0, 0.0, 0.6))).unwrap();
        let frames = Frames {
            head: Some(Pose::IDENTITY),
            ..Frames::default()
        };

        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let stats = AttachmentResolver::default().update(&mut world, &frames, &mut sink);

        assert_eq!(stats.attached, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(sink.len(), 1);
        let transform = world.get_component::<Transform>(id).unwrap();
        assert!(transform.pose.t.approx_eq(Vec3::new(0.0, 0.0, 0.6), EPS));
        assert_eq!(sink[0], (id, transform.pose));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut world = world();
        let id = world.spawn().unwrap();
        world.insert(id, &attached(Vec3::new(0.1, 0.2, 0.6))).unwrap();
        let frames = Frames {
            head: Some(Pose::new(
                Vec3::new(0.5, 1.7, -0.2),
                Quaternion::from_euler_degrees(Vec3::new(10.0, 40.0, 5.0)),
            )),
            ..Frames::default()
        };
        let resolver = AttachmentResolver::default();
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();

        resolver.update(&mut world, &frames, &mut sink);
        let first = world.get_component::<Transform>(id).unwrap().pose;
        for _ in 0..100 {
            resolver.update(&mut world, &frames, &mut sink);
        }
        assert_eq!(world.get_component::<Transform>(id).unwrap().pose, first);
    }

    #[test]
    fn test_tracking_lost_holds_last_pose() {
        let mut world = world();
        let id = world.spawn().unwrap();
        world.insert(id, &attached(Vec3::new(0.0, 0.0, 0.6))).unwrap();
        let resolver = AttachmentResolver::default();
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();

        let tracked = Frames {
            head: Some(Pose::from_translation(Vec3::new(0.0, 1.6, 0.0))),
            ..Frames::default()
        };
        resolver.update(&mut world, &tracked, &mut sink);
        let held = world.get_component::<Transform>(id).unwrap().pose;

        let stats = resolver.update(&mut world, &Frames::default(), &mut sink);
        assert_eq!(stats.tracking_lost, 1);
        assert_eq!(stats.updated, 0);
        assert_eq!(world.get_component::<Transform>(id).unwrap().pose, held);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_hand_source_uses_attachment_side() {
        let mut world = world();
        let left = world.spawn().unwrap();
        world.insert(left, &attached(Vec3::ZERO)).unwrap();
        let right = world.spawn().unwrap();
        let right_attachment = WristAttached {
            side: HandSide::Right,
            ..WristAttached::default()
        };
        world.insert(right, &right_attachment).unwrap();

        let frames = Frames {
            left: Some(Pose::from_translation(Vec3::new(-0.2, 1.0, 0.3))),
            right: None,
            ..Frames::default()
        };
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let resolver = AttachmentResolver::new(ReferenceSource::Hand);
        let stats = resolver.update(&mut world, &frames, &mut sink);

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.tracking_lost, 1);
        assert_eq!(sink[0].0, left);
        assert!(sink[0].1.t.approx_eq(Vec3::new(-0.2, 1.0, 0.3), EPS));
        assert!(!world.has::<Transform>(right));
    }

    #[test]
    fn test_pose_for_destroyed_entity_discarded() {
        let mut world = world();
        let id = world.spawn().unwrap();
        world.insert(id, &attached(Vec3::ZERO)).unwrap();
        let frames = Frames {
            head: Some(Pose::IDENTITY),
            ..Frames::default()
        };
        let resolver = AttachmentResolver::default();

        let (poses, mut stats) = resolver.compute(&world, &frames);
        world.destroy(id).unwrap();
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        resolver.apply(&mut world, poses, &mut sink, &mut stats);

        assert_eq!(stats.discarded, 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_recenter_main_panel() {
        let mut world = world();
        let other = world.spawn().unwrap();
        world.insert(other, &Panel::new(2)).unwrap();
        let panel = world.spawn().unwrap();
        world.insert(panel, &Panel::new(1)).unwrap();
        world.insert(panel, &Visible::new(false)).unwrap();

        let frames = Frames {
            head: Some(Pose::from_translation(Vec3::new(0.0, 1.6, 0.0))),
            ..Frames::default()
        };
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let (id, pose) = AttachmentResolver::default()
            .recenter_main_panel(&mut world, &frames, &mut sink, 1)
            .unwrap()
            .unwrap();

        assert_eq!(id, panel);
        assert!(pose.t.approx_eq(Vec3::new(0.0, 1.6, 0.6), EPS));
        assert!(world.get_component::<Visible>(panel).unwrap().visible);
        assert!(!world.has::<Transform>(other));
    }

    #[test]
    fn test_recenter_missing_panel_is_not_found() {
        let mut world = world();
        let frames = Frames {
            head: Some(Pose::IDENTITY),
            ..Frames::default()
        };
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let err = AttachmentResolver::default()
            .recenter_main_panel(&mut world, &frames, &mut sink, 1)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unreadable_attachment_is_counted() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                ComponentSchema::builder(WristAttached::VARIANT, "WristAttached")
                    .boolean("only", true)
                    .build(),
            )
            .unwrap();
        registry.register_component::<Transform>().unwrap();
        let registry = Arc::new(registry);
        let mut world = World::new(Arc::clone(&registry), 8);
        let id = world
            .create_entity([registry.default_store(WristAttached::VARIANT).unwrap()])
            .unwrap();

        let frames = Frames {
            head: Some(Pose::IDENTITY),
            ..Frames::default()
        };
        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let stats = AttachmentResolver::default().update(&mut world, &frames, &mut sink);

        assert_eq!(stats.attached, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.updated, 0);
        assert!(sink.is_empty());
        assert!(!world.has::<Transform>(id));
    }
}
