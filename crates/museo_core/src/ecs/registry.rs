//! # Component Registry
//!
//! Maps each component variant to its schema.
//!
//! ## Lifecycle
//!
//! 1. **Init**: create the registry and `register` every variant.
//! 2. **Freeze**: wrap it in an `Arc` and hand it to the [`World`](super::World).
//!    From then on it is read-only for the rest of the program.
//! 3. **Teardown**: dropped with the last `Arc`.
//!
//! There is exactly one registry per running application, owned explicitly
//! and passed by reference; there is no global instance.

use std::collections::HashMap;
use std::sync::Arc;

use super::attribute::{AttributeKey, AttributeStore, VariantId};
use super::component::{
    Component, Mesh, Panel, Scale, Transform, TransformParent, Visible, WristAttached,
};
use super::schema::{ComponentSchema, EnumDescriptor};
use crate::error::{EcsError, EcsResult};

/// Registry of component schemas.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Schemas indexed by variant id.
    schemas: Vec<Option<Arc<ComponentSchema>>>,
    /// Variant name to id, for scene files.
    names: HashMap<&'static str, VariantId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in museum component.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in set; the `Result` mirrors `register`.
    pub fn with_builtin_components() -> EcsResult<Self> {
        let mut registry = Self::new();
        registry.register_component::<WristAttached>()?;
        registry.register_component::<Panel>()?;
        registry.register_component::<Transform>()?;
        registry.register_component::<TransformParent>()?;
        registry.register_component::<Scale>()?;
        registry.register_component::<Mesh>()?;
        registry.register_component::<Visible>()?;
        Ok(registry)
    }

    /// Registers a schema.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateVariant`] if the variant id or name is taken;
    ///   the first schema stays registered.
    /// - [`EcsError::DuplicateAttribute`] if two attributes share a name.
    pub fn register(&mut self, schema: ComponentSchema) -> EcsResult<()> {
        let variant = schema.variant();
        let taken = self.lookup(variant).is_some() || self.names.contains_key(schema.name());
        if taken {
            return Err(EcsError::DuplicateVariant {
                name: schema.name().to_owned(),
                id: variant.raw(),
            });
        }
        if let Some(name) = schema.duplicate_name() {
            return Err(EcsError::DuplicateAttribute {
                component: schema.name().to_owned(),
                name: name.to_owned(),
            });
        }

        if self.schemas.len() <= variant.index() {
            self.schemas.resize(variant.index() + 1, None);
        }
        self.names.insert(schema.name(), variant);
        self.schemas[variant.index()] = Some(Arc::new(schema));
        Ok(())
    }

    /// Registers the schema of a typed component.
    ///
    /// # Errors
    ///
    /// Same as [`ComponentRegistry::register`].
    pub fn register_component<C: Component>(&mut self) -> EcsResult<()> {
        self.register(C::schema())
    }

    fn lookup(&self, variant: VariantId) -> Option<&Arc<ComponentSchema>> {
        self.schemas.get(variant.index()).and_then(Option::as_ref)
    }

    /// Schema of a variant.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownVariant`] if nothing is registered under `variant`.
    pub fn schema_for(&self, variant: VariantId) -> EcsResult<&Arc<ComponentSchema>> {
        self.lookup(variant)
            .ok_or_else(|| EcsError::UnknownVariant(variant.to_string()))
    }

    /// Variant registered under a component name.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownVariant`] if no schema has this name.
    pub fn variant_by_name(&self, name: &str) -> EcsResult<VariantId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| EcsError::UnknownVariant(name.to_owned()))
    }

    /// Resolves a human-readable attribute name to its stable key.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownVariant`] or [`EcsError::UnknownKey`].
    pub fn key_for_name(&self, variant: VariantId, name: &str) -> EcsResult<AttributeKey> {
        let schema = self.schema_for(variant)?;
        schema
            .attribute_named(name)
            .map(|def| def.key)
            .ok_or_else(|| EcsError::UnknownKey {
                component: schema.name().to_owned(),
                key: name.to_owned(),
            })
    }

    /// Enum reflection for an attribute, if it is an enum attribute.
    #[must_use]
    pub fn enum_type_for(&self, key: AttributeKey) -> Option<&'static EnumDescriptor> {
        let def = self.lookup(key.variant())?.attribute(key)?;
        match def.ty {
            super::attribute::AttributeType::Enum(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Default-valued instance of a variant.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownVariant`].
    pub fn default_store(&self, variant: VariantId) -> EcsResult<AttributeStore> {
        Ok(self.schema_for(variant)?.default_store())
    }

    /// Store holding a typed component's values.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownVariant`] if `C` was never registered.
    pub fn store_for<C: Component>(&self, component: &C) -> EcsResult<AttributeStore> {
        let mut store = self.default_store(C::VARIANT)?;
        component.write_to(&mut store)?;
        store.clear_dirty();
        Ok(store)
    }

    /// Registered schemas in variant order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<ComponentSchema>> {
        self.schemas.iter().flatten()
    }

    /// Number of registered variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
