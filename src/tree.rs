//! OpenAPI schema tree reader
//!
//! Wraps a parsed OpenAPI document with dot-path navigation. A lookup only
//! succeeds for values that are present and non-null, so callers can tell
//! an absent `description` apart from an empty one.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GeneratorError, Result};

/// Where services and their request schemas live in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayout {
    /// Dot path of the discriminator mapping enumerating services
    pub discriminator_mapping: String,
    /// Suffix appended to a service id to name its request schema
    pub request_schema_suffix: String,
}

impl Default for ServiceLayout {
    fn default() -> Self {
        Self {
            discriminator_mapping: "components.schemas.NewConnectorRequestV1.discriminator.mapping"
                .to_string(),
            request_schema_suffix: "_NewConnectorRequest".to_string(),
        }
    }
}

/// A parsed OpenAPI document
#[derive(Debug, Clone)]
pub struct SchemaTree {
    root: Value,
}

impl SchemaTree {
    /// Parse a JSON document. Malformed input is fatal.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(GeneratorError::SpecParse)
    }

    /// Read and parse a JSON document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> SchemaNode<'_> {
        SchemaNode { value: &self.root }
    }

    /// Look up a dot-separated path from the document root
    pub fn node(&self, path: &str) -> Option<SchemaNode<'_>> {
        self.root().get(path)
    }

    /// Service identifiers declared by the discriminator mapping, sorted
    pub fn services(&self, layout: &ServiceLayout) -> Result<Vec<String>> {
        let mapping = self.discriminator_mapping(layout)?;
        let services: BTreeSet<&str> = mapping.keys().copied().collect();
        debug!(count = services.len(), "Enumerated services");
        Ok(services.into_iter().map(String::from).collect())
    }

    /// Request schema node for one service.
    ///
    /// Follows the mapping's `#/...` pointer when there is one, otherwise
    /// falls back to `components.schemas.<service><suffix>`.
    pub fn service_schema(&self, service: &str, layout: &ServiceLayout) -> Option<SchemaNode<'_>> {
        let by_pointer = self
            .discriminator_mapping(layout)
            .ok()
            .and_then(|mapping| mapping.get(service).and_then(|node| node.as_str()))
            .and_then(|reference| reference.strip_prefix('#'))
            .and_then(|pointer| self.root.pointer(pointer))
            .and_then(SchemaNode::wrap);

        by_pointer.or_else(|| {
            let name = format!("{}{}", service, layout.request_schema_suffix);
            self.root()
                .get("components.schemas")
                .and_then(|schemas| schemas.get_segment(&name))
        })
    }

    /// The `properties.config.properties` children of a service's request schema.
    ///
    /// Services without config properties contribute nothing.
    pub fn config_fields(&self, service: &str, layout: &ServiceLayout) -> BTreeMap<&str, SchemaNode<'_>> {
        let fields = self
            .service_schema(service, layout)
            .and_then(|schema| schema.get("properties.config.properties"))
            .and_then(|props| props.children());

        match fields {
            Some(fields) => fields,
            None => {
                warn!(service, "No config properties declared for service");
                BTreeMap::new()
            }
        }
    }

    fn discriminator_mapping(&self, layout: &ServiceLayout) -> Result<BTreeMap<&str, SchemaNode<'_>>> {
        self.node(&layout.discriminator_mapping)
            .and_then(|node| node.children())
            .ok_or_else(|| GeneratorError::MissingNode {
                path: layout.discriminator_mapping.clone(),
            })
    }
}

/// A non-null node inside a [`SchemaTree`]
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    value: &'a Value,
}

impl<'a> SchemaNode<'a> {
    fn wrap(value: &'a Value) -> Option<Self> {
        if value.is_null() {
            None
        } else {
            Some(Self { value })
        }
    }

    /// Navigate a dot-separated path
    pub fn get(&self, path: &str) -> Option<SchemaNode<'a>> {
        path.split('.')
            .try_fold(*self, |node, segment| node.get_segment(segment))
    }

    /// Navigate a single key, which may itself contain dots
    pub fn get_segment(&self, key: &str) -> Option<SchemaNode<'a>> {
        self.value.get(key).and_then(Self::wrap)
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    /// String leaf at a path
    pub fn str_at(&self, path: &str) -> Option<&'a str> {
        self.get(path).and_then(|node| node.as_str())
    }

    /// Named, non-null children of an object node
    pub fn children(&self) -> Option<BTreeMap<&'a str, SchemaNode<'a>>> {
        self.value.as_object().map(|object| {
            object
                .iter()
                .filter_map(|(key, value)| Self::wrap(value).map(|node| (key.as_str(), node)))
                .collect()
        })
    }
}
