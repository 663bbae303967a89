//! # Exhibit Catalog
//!
//! The museum's items, grouped by category for the main panel's list.
//! Items with a model path can be shown as a 3D model next to the panel.
//!
//! Catalog files are TOML:
//!
//! ```toml
//! [[exhibit]]
//! id = 3
//! name = "Tiranosaurio Rex"
//! description = "Esqueleto de dinosaurio en el museo de historia natural"
//! category = "Ciencia"
//! model_path = "apk:///models/TyrannosaurusRex.glb"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{SceneError, SceneResult};

/// Exhibit category. Serialized by its display key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    /// Paintings, sculpture.
    #[serde(rename = "Arte")]
    Art,
    /// Historical artifacts.
    #[serde(rename = "Historia")]
    History,
    /// Natural history and science.
    #[serde(rename = "Ciencia")]
    Science,
}

impl Category {
    /// Key shown as the group heading.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Art => "Arte",
            Self::History => "Historia",
            Self::Science => "Ciencia",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exhibit {
    /// Unique id.
    pub id: u32,
    /// Title.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Group it is listed under.
    pub category: Category,
    /// Image resource, if any.
    #[serde(default)]
    pub image: Option<String>,
    /// Model URI, if the exhibit can be shown in 3D.
    #[serde(default)]
    pub model_path: Option<String>,
}

impl Exhibit {
    /// Creates an exhibit with no image and no model.
    #[must_use]
    pub fn new(id: u32, name: &str, description: &str, category: Category) -> Self {
        Self {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            category,
            image: None,
            model_path: None,
        }
    }

    /// Adds a model URI.
    #[must_use]
    pub fn with_model(mut self, path: &str) -> Self {
        self.model_path = Some(path.to_owned());
        self
    }

    /// Whether a model can be shown.
    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    exhibit: Vec<Exhibit>,
}

/// Exhibits grouped by category, in the order categories were first seen.
#[derive(Clone, Debug, Default)]
pub struct ExhibitCatalog {
    groups: Vec<(Category, Vec<Exhibit>)>,
    index: HashMap<u32, (usize, usize)>,
}

impl ExhibitCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock collection.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        let records = [
            Exhibit::new(1, "Mona Lisa", "Famosa pintura de Leonardo da Vinci", Category::Art),
            Exhibit::new(2, "El Pensador", "Escultura de Auguste Rodin", Category::Art),
            Exhibit::new(
                3,
                "Tiranosaurio Rex",
                "Esqueleto de dinosaurio en el museo de historia natural",
                Category::Science,
            )
            .with_model("apk:///models/TyrannosaurusRex.glb"),
        ];
        for exhibit in records {
            catalog.push(exhibit);
        }
        catalog
    }

    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// [`SceneError::Toml`] if malformed, [`SceneError::InvalidScene`] on a
    /// duplicate id.
    pub fn from_toml_str(content: &str) -> SceneResult<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Self::new();
        for exhibit in file.exhibit {
            catalog.add(exhibit)?;
        }
        Ok(catalog)
    }

    /// Reads a catalog file.
    ///
    /// # Errors
    ///
    /// [`SceneError::Io`], otherwise as [`ExhibitCatalog::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Adds an exhibit to its category's group.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidScene`] if the id is already in the catalog.
    pub fn add(&mut self, exhibit: Exhibit) -> SceneResult<()> {
        if self.index.contains_key(&exhibit.id) {
            return Err(SceneError::InvalidScene(format!(
                "duplicate exhibit id {}",
                exhibit.id
            )));
        }
        self.push(exhibit);
        Ok(())
    }

    /// Appends without the duplicate check; callers guarantee a fresh id.
    fn push(&mut self, exhibit: Exhibit) {
        let group = match self.groups.iter().position(|(c, _)| *c == exhibit.category) {
            Some(group) => group,
            None => {
                self.groups.push((exhibit.category, Vec::new()));
                self.groups.len() - 1
            }
        };
        let items = &mut self.groups[group].1;
        self.index.insert(exhibit.id, (group, items.len()));
        items.push(exhibit);
    }

    /// Exhibits grouped by category.
    pub fn grouped(&self) -> impl Iterator<Item = (Category, &[Exhibit])> {
        self.groups.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    /// Looks up an exhibit.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Exhibit> {
        let &(group, slot) = self.index.get(&id)?;
        self.groups.get(group)?.1.get(slot)
    }

    /// Looks up an exhibit.
    ///
    /// # Errors
    ///
    /// [`SceneError::ExhibitNotFound`].
    pub fn require(&self, id: u32) -> SceneResult<&Exhibit> {
        self.get(id).ok_or(SceneError::ExhibitNotFound(id))
    }

    /// Number of exhibits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
