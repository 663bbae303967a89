//! # Attribute Store
//!
//! Typed key/value storage for one component instance.
//!
//! Every write is checked against the component's schema: unknown keys and
//! values of the wrong primitive type are rejected, so the current value of
//! an attribute always matches its declared type. A successful write bumps
//! the store's revision and marks it dirty.
//!
//! Cacheable stores memoise their [`AttributeStore::snapshot`]: reading an
//! unchanged store twice hands back the same shared snapshot.

use std::fmt;
use std::sync::Arc;

use museo_shared::{Quaternion, Vec3};

use super::entity::EntityId;
use super::schema::{ComponentSchema, EnumDescriptor, ReflectEnum};
use crate::error::{EcsError, EcsResult};

/// Identifier of a component variant (0-63, one bit of the entity mask).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VariantId(u8);

impl VariantId {
    /// Number of distinct variants an entity mask can hold.
    pub const MAX: u8 = 64;

    /// Creates a variant id.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a const) if `id >= 64`.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(id < Self::MAX, "variant id must fit the 64-bit component mask");
        Self(id)
    }

    /// Raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Raw id as an index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier of one attribute: its variant plus its slot in the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeKey {
    variant: VariantId,
    slot: u16,
}

impl AttributeKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(variant: VariantId, slot: u16) -> Self {
        Self { variant, slot }
    }

    /// The component variant the key belongs to.
    #[inline]
    #[must_use]
    pub const fn variant(self) -> VariantId {
        self.variant
    }

    /// Position of the attribute in its schema.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u16 {
        self.slot
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.variant, self.slot)
    }
}

/// Declared primitive type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
    /// 3-component float vector.
    Vec3,
    /// Unit quaternion.
    Quat,
    /// Boolean.
    Bool,
    /// 32-bit integer.
    Int,
    /// Closed set of named integers.
    Enum(&'static EnumDescriptor),
    /// UTF-8 text.
    Text,
    /// Reference to another entity.
    Entity,
}

impl AttributeType {
    /// Whether `value` is a legal current value for this type.
    #[must_use]
    pub fn accepts(self, value: &AttributeValue) -> bool {
        match (self, value) {
            (Self::Enum(descriptor), AttributeValue::Enum(raw)) => descriptor.contains(*raw),
            (Self::Vec3, AttributeValue::Vec3(_))
            | (Self::Quat, AttributeValue::Quat(_))
            | (Self::Bool, AttributeValue::Bool(_))
            | (Self::Int, AttributeValue::Int(_))
            | (Self::Text, AttributeValue::Text(_))
            | (Self::Entity, AttributeValue::Entity(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vec3 => write!(f, "vec3"),
            Self::Quat => write!(f, "quat"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Enum(descriptor) => write!(f, "enum {}", descriptor.name),
            Self::Text => write!(f, "text"),
            Self::Entity => write!(f, "entity"),
        }
    }
}

/// Current value of an attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// 3-component float vector.
    Vec3(Vec3),
    /// Rotation.
    Quat(Quaternion),
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i32),
    /// Raw enum value; validated against the attribute's descriptor on write.
    Enum(i32),
    /// Text.
    Text(String),
    /// Entity reference.
    Entity(EntityId),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vec3(v) => write!(f, "vec3({}, {}, {})", v.x, v.y, v.z),
            Self::Quat(q) => write!(f, "quat({}, {}, {}, {})", q.x, q.y, q.z, q.w),
            Self::Bool(b) => write!(f, "bool({b})"),
            Self::Int(i) => write!(f, "int({i})"),
            Self::Enum(raw) => write!(f, "enum({raw})"),
            Self::Text(s) => write!(f, "text({s:?})"),
            Self::Entity(id) => write!(f, "entity({id})"),
        }
    }
}

/// Rust types that map onto one attribute primitive.
pub trait AttributePrimitive: Sized {
    /// Extracts the value if the variant matches.
    fn from_value(value: &AttributeValue) -> Option<Self>;

    /// Wraps the value.
    fn into_value(self) -> AttributeValue;
}

macro_rules! impl_primitive {
    ($ty:ty, $variant:ident) => {
        impl AttributePrimitive for $ty {
            fn from_value(value: &AttributeValue) -> Option<Self> {
                match value {
                    AttributeValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> AttributeValue {
                AttributeValue::$variant(self)
            }
        }
    };
}

impl_primitive!(Vec3, Vec3);
impl_primitive!(Quaternion, Quat);
impl_primitive!(bool, Bool);
impl_primitive!(i32, Int);
impl_primitive!(String, Text);
impl_primitive!(EntityId, Entity);

/// One `(name, value)` pair of a snapshot.
pub type NamedValue = (&'static str, AttributeValue);

/// Live attribute values of one component instance.
#[derive(Clone, Debug)]
pub struct AttributeStore {
    schema: Arc<ComponentSchema>,
    values: Vec<AttributeValue>,
    revision: u64,
    dirty: bool,
    cache: Option<(u64, Arc<[NamedValue]>)>,
}

impl AttributeStore {
    /// Creates a store holding the schema's default values.
    #[must_use]
    pub fn new(schema: Arc<ComponentSchema>) -> Self {
        let values = schema
            .attributes()
            .iter()
            .map(|def| def.default.clone())
            .collect();
        Self {
            schema,
            values,
            revision: 0,
            dirty: false,
            cache: None,
        }
    }

    /// The schema this store is validated against.
    #[must_use]
    pub fn schema(&self) -> &Arc<ComponentSchema> {
        &self.schema
    }

    /// The component variant.
    #[inline]
    #[must_use]
    pub fn variant(&self) -> VariantId {
        self.schema.variant()
    }

    /// Number of successful writes since creation.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a write happened since the last [`AttributeStore::clear_dirty`].
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn slot(&self, key: AttributeKey) -> EcsResult<usize> {
        self.schema
            .attribute(key)
            .map(|_| usize::from(key.slot()))
            .ok_or_else(|| EcsError::UnknownKey {
                component: self.schema.name().to_owned(),
                key: key.to_string(),
            })
    }

    /// Current value of an attribute.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownKey`] if the key is not part of this schema.
    pub fn get(&self, key: AttributeKey) -> EcsResult<&AttributeValue> {
        let slot = self.slot(key)?;
        Ok(&self.values[slot])
    }

    /// Current value of the attribute with this name.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownKey`] if the schema has no such attribute.
    pub fn get_by_name(&self, name: &str) -> EcsResult<&AttributeValue> {
        let def = self
            .schema
            .attribute_named(name)
            .ok_or_else(|| EcsError::UnknownKey {
                component: self.schema.name().to_owned(),
                key: name.to_owned(),
            })?;
        self.get(def.key)
    }

    /// Writes an attribute.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownKey`] if the key is not part of this schema.
    /// - [`EcsError::TypeMismatch`] if the value's primitive type differs from
    ///   the declared one, or an enum value lies outside its closed set.
    pub fn set(&mut self, key: AttributeKey, value: AttributeValue) -> EcsResult<()> {
        let slot = self.slot(key)?;
        let def = &self.schema.attributes()[slot];
        if !def.ty.accepts(&value) {
            return Err(EcsError::TypeMismatch {
                attribute: format!("{}.{}", self.schema.name(), def.name),
                expected: def.ty.to_string(),
                found: value.to_string(),
            });
        }
        self.values[slot] = value;
        self.revision += 1;
        self.dirty = true;
        Ok(())
    }

    /// Typed read.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownKey`] or [`EcsError::TypeMismatch`] when `T` is not
    /// the attribute's primitive.
    pub fn read<T: AttributePrimitive>(&self, key: AttributeKey) -> EcsResult<T> {
        let value = self.get(key)?;
        T::from_value(value).ok_or_else(|| self.mismatch(key, std::any::type_name::<T>()))
    }

    /// Typed read of an enum attribute.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownKey`] or [`EcsError::TypeMismatch`].
    pub fn read_enum<E: ReflectEnum>(&self, key: AttributeKey) -> EcsResult<E> {
        match self.get(key)? {
            AttributeValue::Enum(raw) => {
                E::from_raw(*raw).ok_or_else(|| self.mismatch(key, E::DESCRIPTOR.name))
            }
            _ => Err(self.mismatch(key, E::DESCRIPTOR.name)),
        }
    }

    /// Typed write.
    ///
    /// # Errors
    ///
    /// Same as [`AttributeStore::set`].
    pub fn write<T: AttributePrimitive>(&mut self, key: AttributeKey, value: T) -> EcsResult<()> {
        self.set(key, value.into_value())
    }

    /// Typed write of an enum attribute.
    ///
    /// # Errors
    ///
    /// Same as [`AttributeStore::set`].
    pub fn write_enum<E: ReflectEnum>(&mut self, key: AttributeKey, value: E) -> EcsResult<()> {
        self.set(key, AttributeValue::Enum(value.to_raw()))
    }

    fn mismatch(&self, key: AttributeKey, wanted: &str) -> EcsError {
        let name = self.schema.attribute(key).map_or("?", |def| def.name);
        EcsError::TypeMismatch {
            attribute: format!("{}.{}", self.schema.name(), name),
            expected: wanted.to_owned(),
            found: self
                .get(key)
                .map_or_else(|_| "nothing".to_owned(), ToString::to_string),
        }
    }

    /// Named values in schema order.
    ///
    /// Cacheable stores return the same shared snapshot until the next write.
    pub fn snapshot(&mut self) -> Arc<[NamedValue]> {
        if let Some((revision, cached)) = &self.cache {
            if *revision == self.revision {
                return Arc::clone(cached);
            }
        }
        let snapshot: Arc<[NamedValue]> = self
            .schema
            .attributes()
            .iter()
            .zip(&self.values)
            .map(|(def, value)| (def.name, value.clone()))
            .collect();
        if self.schema.is_cacheable() {
            self.cache = Some((self.revision, Arc::clone(&snapshot)));
        }
        snapshot
    }
}
