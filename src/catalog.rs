//! Field catalog
//!
//! Maps canonical field names to [`ConfigField`]s. The catalog is loaded
//! once per run, mutated by the reconciler and persisted at the end.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GeneratorError, Result};
use crate::field::ConfigField;

/// The persisted mapping of field name to field description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    fields: BTreeMap<String, ConfigField>,
}

impl FieldCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from disk.
    ///
    /// A missing file yields an empty catalog; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No field catalog found, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(GeneratorError::io(path, e)),
        };

        let catalog: Self =
            serde_json::from_str(&content).map_err(|source| GeneratorError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), fields = catalog.len(), "Loaded field catalog");
        Ok(catalog)
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(self).map_err(GeneratorError::Serialize)?;
        content.push('\n');
        Ok(content)
    }

    pub fn get(&self, name: &str) -> Option<&ConfigField> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert or replace an entry, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, field: ConfigField) -> Option<ConfigField> {
        self.fields.insert(name.into(), field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entries in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigField> {
        self.fields.iter()
    }
}

impl FromIterator<(String, ConfigField)> for FieldCatalog {
    fn from_iter<I: IntoIterator<Item = (String, ConfigField)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
