//! # Component System
//!
//! Components are typed views over an [`AttributeStore`]. Each variant
//! declares its schema and its attribute keys as constants, so in-process
//! code never resolves attributes by string; only scene files go through
//! the registry's name lookup.

use museo_shared::{Pose, Quaternion, Vec3};

use super::attribute::{AttributeKey, AttributeStore, VariantId};
use super::entity::EntityId;
use super::schema::{ComponentSchema, EnumDescriptor, ReflectEnum};
use crate::error::EcsResult;

/// A component variant with a registered schema.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, PartialEq)]
/// struct Highlight { on: bool }
///
/// impl Component for Highlight {
///     const VARIANT: VariantId = VariantId::new(20);
///     const NAME: &'static str = "Highlight";
///     fn schema() -> ComponentSchema {
///         ComponentSchema::builder(Self::VARIANT, Self::NAME).boolean("on", false).build()
///     }
///     fn from_store(store: &AttributeStore) -> EcsResult<Self> {
///         Ok(Self { on: store.read(AttributeKey::new(Self::VARIANT, 0))? })
///     }
///     fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
///         store.write(AttributeKey::new(Self::VARIANT, 0), self.on)
///     }
/// }
/// ```
pub trait Component: Clone + Sized + Send + Sync + 'static {
    /// Unique identifier for this component variant (0-63).
    ///
    /// This ID is used for the component bitmask in entities.
    const VARIANT: VariantId;

    /// Name used by scene files and diagnostics.
    const NAME: &'static str;

    /// Builds the schema registered for this variant.
    fn schema() -> ComponentSchema;

    /// Decodes the component from its store.
    ///
    /// # Errors
    ///
    /// Fails if the store belongs to another schema.
    fn from_store(store: &AttributeStore) -> EcsResult<Self>;

    /// Writes every field into `store`.
    ///
    /// # Errors
    ///
    /// Fails if the store belongs to another schema.
    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()>;
}

// =============================================================================
// HAND SIDE
// =============================================================================

static HAND_SIDE: EnumDescriptor = EnumDescriptor {
    name: "HandSide",
    variants: &[("LEFT", 0), ("RIGHT", 1)],
};

/// Which hand a wrist attachment follows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HandSide {
    /// Left hand.
    #[default]
    Left,
    /// Right hand.
    Right,
}

impl ReflectEnum for HandSide {
    const DESCRIPTOR: &'static EnumDescriptor = &HAND_SIDE;

    fn to_raw(self) -> i32 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

// =============================================================================
// WRIST ATTACHED
// =============================================================================

/// Positions and orients the entity relative to a tracked reference frame
/// (the user's hand or head).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WristAttached {
    /// Offset in the reference frame's local space, in meters.
    pub position: Vec3,
    /// Euler offset in degrees `(pitch, yaw, roll)`. Ignored when `face_user` is set.
    pub rotation: Vec3,
    /// Hand to follow when the reference source is a hand.
    pub side: HandSide,
    /// Orient the entity so its +Z axis points at the reference origin.
    pub face_user: bool,
}

impl WristAttached {
    /// `position` attribute.
    pub const POSITION: AttributeKey = AttributeKey::new(Self::VARIANT, 0);
    /// `rotation` attribute.
    pub const ROTATION: AttributeKey = AttributeKey::new(Self::VARIANT, 1);
    /// `side` attribute.
    pub const SIDE: AttributeKey = AttributeKey::new(Self::VARIANT, 2);
    /// `faceUser` attribute.
    pub const FACE_USER: AttributeKey = AttributeKey::new(Self::VARIANT, 3);
}

impl Component for WristAttached {
    const VARIANT: VariantId = VariantId::new(0);
    const NAME: &'static str = "WristAttached";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .vec3("position", Vec3::ZERO)
            .vec3("rotation", Vec3::ZERO)
            .enumeration("side", HandSide::Left)
            .boolean("faceUser", false)
            .cacheable(true)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self {
            position: store.read(Self::POSITION)?,
            rotation: store.read(Self::ROTATION)?,
            side: store.read_enum(Self::SIDE)?,
            face_user: store.read(Self::FACE_USER)?,
        })
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::POSITION, self.position)?;
        store.write(Self::ROTATION, self.rotation)?;
        store.write_enum(Self::SIDE, self.side)?;
        store.write(Self::FACE_USER, self.face_user)
    }
}

// =============================================================================
// PANEL
// =============================================================================

/// Marks the entity as a UI panel with a registration id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Panel {
    /// Panel registration id.
    pub panel_id: i32,
}

impl Panel {
    /// `panelId` attribute.
    pub const PANEL_ID: AttributeKey = AttributeKey::new(Self::VARIANT, 0);

    /// Creates a panel component.
    #[must_use]
    pub const fn new(panel_id: i32) -> Self {
        Self { panel_id }
    }
}

impl Component for Panel {
    const VARIANT: VariantId = VariantId::new(1);
    const NAME: &'static str = "Panel";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .int("panelId", 0)
            .cacheable(true)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self {
            panel_id: store.read(Self::PANEL_ID)?,
        })
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::PANEL_ID, self.panel_id)
    }
}

// =============================================================================
// TRANSFORM
// =============================================================================

/// Pose of the entity, in world space or relative to its [`TransformParent`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// The pose.
    pub pose: Pose,
}

impl Transform {
    /// `position` attribute.
    pub const POSITION: AttributeKey = AttributeKey::new(Self::VARIANT, 0);
    /// `rotation` attribute.
    pub const ROTATION: AttributeKey = AttributeKey::new(Self::VARIANT, 1);

    /// Creates a transform component.
    #[must_use]
    pub const fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl Component for Transform {
    const VARIANT: VariantId = VariantId::new(2);
    const NAME: &'static str = "Transform";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .vec3("position", Vec3::ZERO)
            .quat("rotation", Quaternion::IDENTITY)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self::new(Pose::new(
            store.read(Self::POSITION)?,
            store.read(Self::ROTATION)?,
        )))
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::POSITION, self.pose.t)?;
        store.write(Self::ROTATION, self.pose.q)
    }
}

// =============================================================================
// TRANSFORM PARENT
// =============================================================================

/// Makes the entity's [`Transform`] relative to another entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformParent {
    /// The parent entity.
    pub parent: EntityId,
}

impl TransformParent {
    /// `parent` attribute.
    pub const PARENT: AttributeKey = AttributeKey::new(Self::VARIANT, 0);

    /// Creates a parent link.
    #[must_use]
    pub const fn new(parent: EntityId) -> Self {
        Self { parent }
    }
}

impl Component for TransformParent {
    const VARIANT: VariantId = VariantId::new(3);
    const NAME: &'static str = "TransformParent";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .entity("parent", EntityId::NULL)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self::new(store.read(Self::PARENT)?))
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::PARENT, self.parent)
    }
}

// =============================================================================
// SCALE / MESH / VISIBLE
// =============================================================================

/// Non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    /// Per-axis scale factors.
    pub scale: Vec3,
}

impl Scale {
    /// `scale` attribute.
    pub const SCALE: AttributeKey = AttributeKey::new(Self::VARIANT, 0);

    /// Creates a scale component.
    #[must_use]
    pub const fn new(scale: Vec3) -> Self {
        Self { scale }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new(Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Component for Scale {
    const VARIANT: VariantId = VariantId::new(4);
    const NAME: &'static str = "Scale";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .vec3("scale", Vec3::new(1.0, 1.0, 1.0))
            .cacheable(true)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self::new(store.read(Self::SCALE)?))
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::SCALE, self.scale)
    }
}

/// A renderable model, referenced by URI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mesh {
    /// Asset URI, e.g. `apk:///models/TyrannosaurusRex.glb`.
    pub uri: String,
}

impl Mesh {
    /// `mesh` attribute.
    pub const URI: AttributeKey = AttributeKey::new(Self::VARIANT, 0);

    /// Creates a mesh component.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl Component for Mesh {
    const VARIANT: VariantId = VariantId::new(5);
    const NAME: &'static str = "Mesh";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .text("mesh", "")
            .cacheable(true)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self::new(store.read::<String>(Self::URI)?))
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::URI, self.uri.clone())
    }
}

/// Visibility flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visible {
    /// Whether the entity is drawn.
    pub visible: bool,
}

impl Visible {
    /// `isVisible` attribute.
    pub const VISIBLE: AttributeKey = AttributeKey::new(Self::VARIANT, 0);

    /// Creates a visibility component.
    #[must_use]
    pub const fn new(visible: bool) -> Self {
        Self { visible }
    }
}

impl Default for Visible {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Component for Visible {
    const VARIANT: VariantId = VariantId::new(6);
    const NAME: &'static str = "Visible";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::VARIANT, Self::NAME)
            .boolean("isVisible", true)
            .build()
    }

    fn from_store(store: &AttributeStore) -> EcsResult<Self> {
        Ok(Self::new(store.read(Self::VISIBLE)?))
    }

    fn write_to(&self, store: &mut AttributeStore) -> EcsResult<()> {
        store.write(Self::VISIBLE, self.visible)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ecs::attribute::AttributeValue;

    fn roundtrip<C: Component + PartialEq + std::fmt::Debug>(component: &C) {
        let schema = Arc::new(C::schema());
        let mut store = schema.default_store();
        component.write_to(&mut store).unwrap();
        assert_eq!(&C::from_store(&store).unwrap(), component);
    }

    #[test]
    fn test_wrist_attached_defaults() {
        let schema = Arc::new(WristAttached::schema());
        let store = schema.default_store();
        assert_eq!(WristAttached::from_store(&store).unwrap(), WristAttached::default());
        assert!(schema.is_cacheable());
    }

    #[test]
    fn test_key_constants_match_schema_names() {
        let schema = WristAttached::schema();
        for (key, name) in [
            (WristAttached::POSITION, "position"),
            (WristAttached::ROTATION, "rotation"),
            (WristAttached::SIDE, "side"),
            (WristAttached::FACE_USER, "faceUser"),
        ] {
            assert_eq!(schema.attribute_named(name).unwrap().key, key);
        }
        assert_eq!(Transform::schema().attribute_named("rotation").unwrap().key, Transform::ROTATION);
        assert_eq!(Mesh::schema().attribute_named("mesh").unwrap().key, Mesh::URI);
    }

    #[test]
    fn test_components_survive_store() {
        roundtrip(&WristAttached {
            position: Vec3::new(0.0, 0.1, 0.6),
            rotation: Vec3::new(-90.0, 0.0, 0.0),
            side: HandSide::Right,
            face_user: true,
        });
        roundtrip(&Panel::new(7));
        roundtrip(&Transform::new(Pose::from_translation(Vec3::new(1.0, 2.0, 3.0))));
        roundtrip(&TransformParent::new(EntityId::new(4, 2)));
        roundtrip(&Mesh::new("apk:///models/TyrannosaurusRex.glb"));
        roundtrip(&Visible::new(false));
    }

    #[test]
    fn test_hand_side_reflection() {
        assert_eq!(HandSide::DESCRIPTOR.value_of("RIGHT"), Some(HandSide::Right.to_raw()));
        assert_eq!(HandSide::from_raw(3), None);

        let schema = Arc::new(WristAttached::schema());
        let mut store = schema.default_store();
        store.set(WristAttached::SIDE, AttributeValue::Enum(1)).unwrap();
        assert_eq!(store.read_enum::<HandSide>(WristAttached::SIDE).unwrap(), HandSide::Right);
    }

    #[test]
    fn test_scale_and_visible_defaults() {
        let schema = Arc::new(Scale::schema());
        assert_eq!(Scale::from_store(&schema.default_store()).unwrap(), Scale::default());
        let schema = Arc::new(Visible::schema());
        assert!(Visible::from_store(&schema.default_store()).unwrap().visible);
    }
}
