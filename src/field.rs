//! Config field model
//!
//! A [`ConfigField`] is the unit the catalog stores and the reconciler
//! merges. Per-service data (descriptions, list element types) is kept as
//! service-keyed maps so several connectors can share one field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value type of a config field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldValueType {
    #[default]
    String,
    Integer,
    Boolean,
    StringList,
    ObjectList,
}

/// A single configuration field as persisted in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Description per service
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: BTreeMap<String, String>,

    /// Secret material (password-formatted values)
    #[serde(default, skip_serializing_if = "is_false")]
    pub sensitive: bool,

    #[serde(default = "default_true")]
    pub nullable: bool,

    pub field_value_type: FieldValueType,

    /// Element type per service, only for primitive lists
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub item_type: BTreeMap<String, FieldValueType>,

    /// Sub-fields, only for object lists
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub item_fields: BTreeMap<String, ConfigField>,

    /// Sub-field identifying an element of an object list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_key_field: Option<String>,

    /// Canonical name when this entry is a service-specific fork
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_field: Option<String>,
}

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Default for ConfigField {
    fn default() -> Self {
        Self {
            description: BTreeMap::new(),
            sensitive: false,
            nullable: true,
            field_value_type: FieldValueType::String,
            item_type: BTreeMap::new(),
            item_fields: BTreeMap::new(),
            item_key_field: None,
            api_field: None,
        }
    }
}

impl ConfigField {
    /// Create a nullable field of the given type
    pub fn new(field_value_type: FieldValueType) -> Self {
        Self {
            field_value_type,
            ..Self::default()
        }
    }

    /// Builder-style description for one service
    pub fn with_description(mut self, service: impl Into<String>, text: impl Into<String>) -> Self {
        self.description.insert(service.into(), text.into());
        self
    }

    /// Builder-style sub-field for object lists
    pub fn with_item_field(mut self, name: impl Into<String>, field: ConfigField) -> Self {
        self.item_fields.insert(name.into(), field);
        self
    }

    /// An object list that ended up without any sub-fields.
    ///
    /// Such fields carry no usable shape and are never admitted to the catalog.
    pub fn is_empty_object_list(&self) -> bool {
        self.field_value_type == FieldValueType::ObjectList && self.item_fields.is_empty()
    }

    /// Services that contributed to this field, sorted
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.description.keys().map(String::as_str)
    }
}
