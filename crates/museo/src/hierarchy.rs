//! # Transform Hierarchy
//!
//! An entity with a [`TransformParent`] stores its [`Transform`] in the
//! parent's local space. Its world pose is the composition of every
//! ancestor's pose with its own, resolved on demand each tick.

use museo_core::{EcsError, EntityId, Transform, TransformParent, World, WristAttached};
use museo_shared::Pose;
use tracing::warn;

use crate::attachment::TransformSink;
use crate::error::{SceneError, SceneResult};

/// Outcome of one propagation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    /// Child entities whose world pose was published.
    pub resolved: usize,
    /// Child entities skipped because their chain is broken or too deep.
    pub failed: usize,
}

/// World pose of `entity`, following its parent chain.
///
/// An entity without `TransformParent` (or with a null parent) is a root;
/// its `Transform` is already a world pose. So is a wrist-attached entity's,
/// since the attachment resolver writes world poses: the walk stops there.
/// A parent without a `Transform` contributes the identity.
///
/// # Errors
///
/// - [`EcsError::StaleReference`] if an ancestor has been destroyed.
/// - [`SceneError::HierarchyTooDeep`] if the chain exceeds `max_depth`
///   links, which also catches cycles.
/// - `NotFound` if `entity` is dead or has no `Transform`.
pub fn world_pose(world: &World, entity: EntityId, max_depth: usize) -> SceneResult<Pose> {
    let mut pose = world.get_component::<Transform>(entity)?.pose;
    if world.has::<WristAttached>(entity) {
        return Ok(pose);
    }
    let mut current = entity;

    for _ in 0..max_depth {
        if !world.has::<TransformParent>(current) {
            return Ok(pose);
        }
        let parent = world.get_component::<TransformParent>(current)?.parent;
        if parent.is_null() {
            return Ok(pose);
        }
        if !world.is_alive(parent) {
            return Err(EcsError::StaleReference(parent).into());
        }
        let parent_local = world
            .get_component::<Transform>(parent)
            .map_or(Pose::IDENTITY, |t| t.pose);
        pose = parent_local.compose(pose);
        if world.has::<WristAttached>(parent) {
            return Ok(pose);
        }
        current = parent;
    }

    if world.has::<TransformParent>(current)
        && !world.get_component::<TransformParent>(current)?.parent.is_null()
    {
        return Err(SceneError::HierarchyTooDeep {
            entity,
            limit: max_depth,
        });
    }
    Ok(pose)
}

/// Publishes the world pose of every parented entity to `sink`.
///
/// Wrist-attached entities are skipped: the attachment resolver owns their
/// world pose. Broken chains are logged and counted; the pass continues.
pub fn propagate<S>(world: &World, sink: &mut S, max_depth: usize) -> HierarchyStats
where
    S: TransformSink + ?Sized,
{
    let mut stats = HierarchyStats::default();
    let children = world.query(|e| {
        e.has::<TransformParent>() && e.has::<Transform>() && !e.has::<WristAttached>()
    });

    for id in children {
        match world_pose(world, id, max_depth) {
            Ok(pose) => {
                sink.apply_transform(id, pose);
                stats.resolved += 1;
            }
            Err(err) => {
                warn!(entity = %id, error = %err, "cannot resolve world pose");
                stats.failed += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use museo_core::ComponentRegistry;
    use museo_shared::{Quaternion, Vec3};

    const EPS: f32 = 1e-4;

    fn world() -> World {
        World::new(Arc::new(ComponentRegistry::with_builtin_components().unwrap()), 32)
    }

    fn spawn_at(world: &mut World, pose: Pose, parent: Option<EntityId>) -> EntityId {
        let id = world.spawn().unwrap();
        world.insert(id, &Transform::new(pose)).unwrap();
        if let Some(parent) = parent {
            world.insert(id, &TransformParent::new(parent)).unwrap();
        }
        id
    }

    #[test]
    fn test_root_pose_is_world_pose() {
        let mut world = world();
        let pose = Pose::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let root = spawn_at(&mut world, pose, None);
        assert_eq!(world_pose(&world, root, 8).unwrap(), pose);
    }

    #[test]
    fn test_chain_composes() {
        let mut world = world();
        let yaw = Quaternion::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let root = spawn_at(&mut world, Pose::new(Vec3::new(0.0, 1.0, 0.0), yaw), None);
        let mid = spawn_at(&mut world, Pose::from_translation(Vec3::new(0.0, 0.0, 1.0)), Some(root));
        let leaf = spawn_at(&mut world, Pose::from_translation(Vec3::new(0.0, 0.0, 1.0)), Some(mid));

        let pose = world_pose(&world, leaf, 8).unwrap();
        assert!(pose.t.approx_eq(Vec3::new(2.0, 1.0, 0.0), EPS));
        assert!(pose.q.approx_eq(yaw, EPS));
    }

    #[test]
    fn test_destroyed_parent_is_stale() {
        let mut world = world();
        let parent = spawn_at(&mut world, Pose::IDENTITY, None);
        let child = spawn_at(&mut world, Pose::IDENTITY, Some(parent));
        world.destroy(parent).unwrap();

        let err = world_pose(&world, child, 8).unwrap_err();
        assert!(matches!(err, SceneError::Ecs(EcsError::StaleReference(id)) if id == parent));

        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let stats = propagate(&world, &mut sink, 8);
        assert_eq!(stats.failed, 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_cycle_hits_depth_limit() {
        let mut world = world();
        let a = spawn_at(&mut world, Pose::IDENTITY, None);
        let b = spawn_at(&mut world, Pose::IDENTITY, Some(a));
        world.insert(a, &TransformParent::new(b)).unwrap();

        let err = world_pose(&world, a, 4).unwrap_err();
        assert!(matches!(err, SceneError::HierarchyTooDeep { limit: 4, .. }));
    }

    #[test]
    fn test_chain_exactly_at_limit() {
        let mut world = world();
        let root = spawn_at(&mut world, Pose::IDENTITY, None);
        let child = spawn_at(&mut world, Pose::IDENTITY, Some(root));
        assert!(world_pose(&world, child, 1).is_ok());
    }

    #[test]
    fn test_attached_ancestor_ends_the_chain() {
        let mut world = world();
        let root = spawn_at(&mut world, Pose::from_translation(Vec3::new(0.0, 1.0, 0.0)), None);
        let menu = spawn_at(
            &mut world,
            Pose::from_translation(Vec3::new(5.0, 0.0, 0.0)),
            Some(root),
        );
        world.insert(menu, &WristAttached::default()).unwrap();
        let button = spawn_at(
            &mut world,
            Pose::from_translation(Vec3::new(0.0, 0.0, 1.0)),
            Some(menu),
        );

        let pose = world_pose(&world, button, 8).unwrap();
        assert!(pose.t.approx_eq(Vec3::new(5.0, 0.0, 1.0), EPS));
        let pose = world_pose(&world, menu, 8).unwrap();
        assert!(pose.t.approx_eq(Vec3::new(5.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn test_propagate_skips_attached_entities() {
        let mut world = world();
        let root = spawn_at(&mut world, Pose::IDENTITY, None);
        let child = spawn_at(&mut world, Pose::from_translation(Vec3::X), Some(root));
        let attached = spawn_at(&mut world, Pose::IDENTITY, Some(root));
        world.insert(attached, &WristAttached::default()).unwrap();

        let mut sink: Vec<(EntityId, Pose)> = Vec::new();
        let stats = propagate(&world, &mut sink, 8);
        assert_eq!(stats.resolved, 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].0, child);
        assert!(sink[0].1.t.approx_eq(Vec3::X, EPS));
    }
}
