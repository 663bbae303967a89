//! # Scene Loader
//!
//! Builds entities from a TOML scene description.
//!
//! ```toml
//! [[entity]]
//! name = "main_panel"
//! Panel = { panelId = 1 }
//! Transform = { position = [0.0, 1.6, -1.0] }
//! Visible = { isVisible = false }
//!
//! [[entity]]
//! name = "wrist_menu"
//! Panel = { panelId = 2 }
//! WristAttached = { position = [0.0, 0.05, 0.0], rotation = [-90.0, 0.0, 0.0], side = "LEFT" }
//!
//! [[entity]]
//! TransformParent = { parent = "main_panel" }
//! Mesh = { mesh = "apk:///models/TyrannosaurusRex.glb" }
//! ```
//!
//! Every key of an entity table other than `name` names a component; its
//! keys are attribute names, converted by the attribute's declared type:
//!
//! | Type     | TOML                                                  |
//! |----------|-------------------------------------------------------|
//! | `vec3`   | array of 3 numbers                                    |
//! | `quat`   | array of 4 numbers `[x, y, z, w]`, or 3 Euler degrees |
//! | `bool`   | boolean                                               |
//! | `int`    | integer                                               |
//! | enum     | variant name (any case) or integer                    |
//! | `text`   | string                                                |
//! | `entity` | `name` of another entity in the same document         |
//!
//! A component that cannot be built is skipped, logged, and recorded in the
//! [`SceneLoadReport`]; the rest of the scene still loads. A document that is
//! not valid TOML, or not shaped like a scene, fails as a whole before any
//! entity is created.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use museo_core::{
    AttributeStore, AttributeType, AttributeValue, ComponentRegistry, EcsError, EntityId, World,
};
use museo_shared::{Quaternion, Vec3};
use toml::{Table, Value};
use tracing::{info, warn};

use crate::error::{SceneError, SceneResult};

/// A component the loader had to leave out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedComponent {
    /// Entity the component belonged to.
    pub entity: EntityId,
    /// Component name as written in the document.
    pub component: String,
    /// Why it was skipped.
    pub reason: String,
}

impl fmt::Display for SkippedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.component, self.entity, self.reason)
    }
}

/// Result of a scene load.
#[derive(Clone, Debug, Default)]
pub struct SceneLoadReport {
    /// Every entity created, in document order.
    pub spawned: Vec<EntityId>,
    /// Components that were skipped.
    pub skipped: Vec<SkippedComponent>,
    names: HashMap<String, EntityId>,
}

impl SceneLoadReport {
    /// Entity created for a `name`.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Whether every component loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

struct EntityDecl<'a> {
    name: Option<&'a str>,
    components: Vec<(&'a str, &'a Table)>,
}

/// Parses `content` and creates its entities in `world`.
///
/// # Errors
///
/// - [`SceneError::Toml`] if `content` is not valid TOML.
/// - [`SceneError::InvalidScene`] if it is not shaped like a scene
///   (no entity array, non-table components, duplicate names).
/// - `CapacityExceeded` if the world has fewer free slots than the scene
///   has entities; nothing is created.
pub fn load_scene(world: &mut World, content: &str) -> SceneResult<SceneLoadReport> {
    let document: Table = toml::from_str(content)?;
    let decls = parse_document(&document)?;
    if world.capacity() - world.alive_count() < decls.len() {
        return Err(EcsError::CapacityExceeded(world.capacity()).into());
    }

    let mut report = SceneLoadReport::default();
    // first pass: ids, so `entity` attributes can name later entities
    for decl in &decls {
        let id = world.spawn()?;
        report.spawned.push(id);
        if let Some(name) = decl.name {
            report.names.insert(name.to_owned(), id);
        }
    }

    let registry = Arc::clone(world.registry());
    for (decl, &id) in decls.iter().zip(&report.spawned) {
        for &(component, fields) in &decl.components {
            let built = build_component(&registry, &report.names, component, fields)
                .and_then(|store| world.insert_store(id, store).map_err(|e| e.to_string()));
            if let Err(reason) = built {
                warn!(entity = %id, component, %reason, "skipping scene component");
                report.skipped.push(SkippedComponent {
                    entity: id,
                    component: component.to_owned(),
                    reason,
                });
            }
        }
    }

    info!(
        entities = report.spawned.len(),
        skipped = report.skipped.len(),
        "scene loaded"
    );
    Ok(report)
}

fn parse_document(document: &Table) -> SceneResult<Vec<EntityDecl<'_>>> {
    if let Some(key) = document.keys().find(|k| k.as_str() != "entity") {
        return Err(SceneError::InvalidScene(format!("unexpected top-level key `{key}`")));
    }
    let entities = match document.get("entity") {
        None => return Ok(Vec::new()),
        Some(Value::Array(entities)) => entities,
        Some(other) => {
            return Err(SceneError::InvalidScene(format!(
                "`entity` must be an array of tables, found {}",
                other.type_str()
            )))
        }
    };

    let mut seen = HashMap::new();
    let mut decls = Vec::with_capacity(entities.len());
    for (n, entity) in entities.iter().enumerate() {
        let Value::Table(entity) = entity else {
            return Err(SceneError::InvalidScene(format!("entity #{n} is not a table")));
        };
        let mut decl = EntityDecl {
            name: None,
            components: Vec::new(),
        };
        for (key, value) in entity {
            match (key.as_str(), value) {
                ("name", Value::String(name)) => {
                    if seen.insert(name.as_str(), n).is_some() {
                        return Err(SceneError::InvalidScene(format!(
                            "duplicate entity name `{name}`"
                        )));
                    }
                    decl.name = Some(name.as_str());
                }
                ("name", other) => {
                    return Err(SceneError::InvalidScene(format!(
                        "entity #{n}: `name` must be a string, found {}",
                        other.type_str()
                    )))
                }
                (component, Value::Table(fields)) => decl.components.push((component, fields)),
                (component, other) => {
                    return Err(SceneError::InvalidScene(format!(
                        "entity #{n}: component `{component}` must be a table, found {}",
                        other.type_str()
                    )))
                }
            }
        }
        decls.push(decl);
    }
    Ok(decls)
}

fn build_component(
    registry: &ComponentRegistry,
    names: &HashMap<String, EntityId>,
    component: &str,
    fields: &Table,
) -> Result<AttributeStore, String> {
    let variant = registry
        .variant_by_name(component)
        .map_err(|e| e.to_string())?;
    let schema = registry.schema_for(variant).map_err(|e| e.to_string())?;
    let mut store = schema.default_store();

    for (field, value) in fields {
        let def = schema
            .attribute_named(field)
            .ok_or_else(|| format!("unknown attribute `{field}`"))?;
        let value = convert(def.ty, value, names)
            .ok_or_else(|| format!("`{field}` expects {}, found {value}", def.ty))?;
        store.set(def.key, value).map_err(|e| e.to_string())?;
    }
    store.clear_dirty();
    Ok(store)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number(value: &Value) -> Option<f32> {
    match value {
        Value::Float(f) => Some(*f as f32),
        Value::Integer(i) => Some(*i as f32),
        _ => None,
    }
}

fn numbers<const N: usize>(value: &Value) -> Option<[f32; N]> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Some(out)
}

fn convert(
    ty: AttributeType,
    value: &Value,
    names: &HashMap<String, EntityId>,
) -> Option<AttributeValue> {
    match ty {
        AttributeType::Vec3 => numbers::<3>(value).map(|v| AttributeValue::Vec3(Vec3::from_array(v))),
        AttributeType::Quat => {
            let q = match numbers::<4>(value) {
                Some(q) => Quaternion::from(q).normalize(),
                None => Quaternion::from_euler_degrees(Vec3::from_array(numbers::<3>(value)?)),
            };
            Some(AttributeValue::Quat(q))
        }
        AttributeType::Bool => value.as_bool().map(AttributeValue::Bool),
        AttributeType::Int => value
            .as_integer()
            .and_then(|i| i32::try_from(i).ok())
            .map(AttributeValue::Int),
        AttributeType::Enum(descriptor) => match value {
            Value::String(name) => descriptor.value_of(name).map(AttributeValue::Enum),
            Value::Integer(raw) => i32::try_from(*raw)
                .ok()
                .filter(|raw| descriptor.contains(*raw))
                .map(AttributeValue::Enum),
            _ => None,
        },
        AttributeType::Text => value.as_str().map(|s| AttributeValue::Text(s.to_owned())),
        AttributeType::Entity => value
            .as_str()
            .and_then(|name| names.get(name))
            .map(|&id| AttributeValue::Entity(id)),
    }
}
