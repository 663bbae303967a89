//! # Component Schemas
//!
//! A schema describes one component variant: its ordered attributes, their
//! primitive types and defaults, and which attributes are closed enums.
//! Schemas are built once, registered, and never mutated afterwards.

use std::sync::Arc;

use museo_shared::{Quaternion, Vec3};

use super::attribute::{AttributeKey, AttributeStore, AttributeType, AttributeValue, VariantId};
use super::entity::EntityId;

/// Reflection data for a closed enum stored as an integer attribute.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Enum type name, e.g. `HandSide`.
    pub name: &'static str,
    /// `(name, value)` pairs of the closed set.
    pub variants: &'static [(&'static str, i32)],
}

impl EnumDescriptor {
    /// Whether `value` belongs to the set.
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.variants.iter().any(|&(_, v)| v == value)
    }

    /// Resolves a variant name (case-insensitive) to its value.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.variants
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, v)| v)
    }

    /// Name of the variant holding `value`.
    #[must_use]
    pub fn name_of(&self, value: i32) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|&&(_, v)| v == value)
            .map(|&(n, _)| n)
    }
}

/// Rust enums that round-trip through an enum attribute.
pub trait ReflectEnum: Copy + Sized + 'static {
    /// The closed set this enum maps to.
    const DESCRIPTOR: &'static EnumDescriptor;

    /// Raw integer stored in the attribute.
    fn to_raw(self) -> i32;

    /// Inverse of [`ReflectEnum::to_raw`].
    fn from_raw(raw: i32) -> Option<Self>;
}

/// One attribute of a schema.
#[derive(Clone, Debug)]
pub struct AttributeDef {
    /// Stable key.
    pub key: AttributeKey,
    /// Human-readable name used by scene files.
    pub name: &'static str,
    /// Declared primitive type.
    pub ty: AttributeType,
    /// Value of a freshly created instance.
    pub default: AttributeValue,
}

/// Process-wide description of a component variant.
#[derive(Debug)]
pub struct ComponentSchema {
    variant: VariantId,
    name: &'static str,
    attributes: Vec<AttributeDef>,
    cacheable: bool,
}

impl ComponentSchema {
    /// Starts a schema for `variant`.
    #[must_use]
    pub fn builder(variant: VariantId, name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                variant,
                name,
                attributes: Vec::new(),
                cacheable: false,
            },
        }
    }

    /// The variant this schema describes.
    #[inline]
    #[must_use]
    pub const fn variant(&self) -> VariantId {
        self.variant
    }

    /// Component name, e.g. `WristAttached`.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether stores of this variant memoise their snapshots.
    #[inline]
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Attribute definition behind `key`, if the key belongs to this schema.
    #[must_use]
    pub fn attribute(&self, key: AttributeKey) -> Option<&AttributeDef> {
        if key.variant() != self.variant {
            return None;
        }
        self.attributes.get(usize::from(key.slot()))
    }

    /// Attribute definition with this name.
    #[must_use]
    pub fn attribute_named(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|def| def.name == name)
    }

    /// Produces a default-valued instance of this component.
    #[must_use]
    pub fn default_store(self: &Arc<Self>) -> AttributeStore {
        AttributeStore::new(Arc::clone(self))
    }

    /// First attribute name declared twice, if any.
    pub(crate) fn duplicate_name(&self) -> Option<&'static str> {
        self.attributes.iter().enumerate().find_map(|(i, def)| {
            self.attributes[..i]
                .iter()
                .any(|prev| prev.name == def.name)
                .then_some(def.name)
        })
    }
}

/// Builder assigning attribute slots in declaration order.
///
/// Slot `n` of the schema is the `n`-th attribute added, so components can
/// declare their [`AttributeKey`] constants up front.
pub struct SchemaBuilder {
    schema: ComponentSchema,
}

impl SchemaBuilder {
    fn push(mut self, name: &'static str, ty: AttributeType, default: AttributeValue) -> Self {
        let slot = u16::try_from(self.schema.attributes.len()).unwrap_or(u16::MAX);
        self.schema.attributes.push(AttributeDef {
            key: AttributeKey::new(self.schema.variant, slot),
            name,
            ty,
            default,
        });
        self
    }

    /// Adds a 3-component float vector attribute.
    #[must_use]
    pub fn vec3(self, name: &'static str, default: Vec3) -> Self {
        self.push(name, AttributeType::Vec3, AttributeValue::Vec3(default))
    }

    /// Adds a rotation attribute.
    #[must_use]
    pub fn quat(self, name: &'static str, default: Quaternion) -> Self {
        self.push(name, AttributeType::Quat, AttributeValue::Quat(default))
    }

    /// Adds a boolean attribute.
    #[must_use]
    pub fn boolean(self, name: &'static str, default: bool) -> Self {
        self.push(name, AttributeType::Bool, AttributeValue::Bool(default))
    }

    /// Adds an integer attribute.
    #[must_use]
    pub fn int(self, name: &'static str, default: i32) -> Self {
        self.push(name, AttributeType::Int, AttributeValue::Int(default))
    }

    /// Adds a closed-enum attribute reflected from `E`.
    #[must_use]
    pub fn enumeration<E: ReflectEnum>(self, name: &'static str, default: E) -> Self {
        self.push(
            name,
            AttributeType::Enum(E::DESCRIPTOR),
            AttributeValue::Enum(default.to_raw()),
        )
    }

    /// Adds a text attribute.
    #[must_use]
    pub fn text(self, name: &'static str, default: &str) -> Self {
        self.push(name, AttributeType::Text, AttributeValue::Text(default.to_owned()))
    }

    /// Adds an entity-reference attribute.
    #[must_use]
    pub fn entity(self, name: &'static str, default: EntityId) -> Self {
        self.push(name, AttributeType::Entity, AttributeValue::Entity(default))
    }

    /// Marks instances of this component as cacheable.
    #[must_use]
    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.schema.cacheable = cacheable;
        self
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> ComponentSchema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SIDES: EnumDescriptor = EnumDescriptor {
        name: "Side",
        variants: &[("LEFT", 0), ("RIGHT", 1)],
    };

    #[test]
    fn test_enum_descriptor_lookup() {
        assert!(SIDES.contains(1));
        assert!(!SIDES.contains(2));
        assert_eq!(SIDES.value_of("right"), Some(1));
        assert_eq!(SIDES.name_of(0), Some("LEFT"));
        assert_eq!(SIDES.value_of("UP"), None);
    }

    #[test]
    fn test_builder_assigns_slots_in_order() {
        let variant = VariantId::new(9);
        let schema = ComponentSchema::builder(variant, "Probe")
            .vec3("offset", Vec3::ZERO)
            .boolean("enabled", true)
            .int("count", 3)
            .build();

        assert_eq!(schema.attributes().len(), 3);
        assert_eq!(schema.attribute_named("enabled").unwrap().key, AttributeKey::new(variant, 1));
        assert_eq!(
            schema.attribute(AttributeKey::new(variant, 2)).unwrap().default,
            AttributeValue::Int(3)
        );
        assert!(schema.attribute(AttributeKey::new(VariantId::new(8), 0)).is_none());
        assert!(schema.duplicate_name().is_none());
    }

    #[test]
    fn test_duplicate_name_detected() {
        let schema = ComponentSchema::builder(VariantId::new(9), "Probe")
            .boolean("flag", true)
            .boolean("flag", false)
            .build();
        assert_eq!(schema.duplicate_name(), Some("flag"));
    }
}
