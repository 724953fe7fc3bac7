//! Field extraction
//!
//! Converts the raw config property schemas of one service into
//! [`ConfigField`]s. Extraction is pure: the result depends only on the
//! schema nodes and the service id.

use std::collections::BTreeMap;

use tracing::warn;

use crate::field::{ConfigField, FieldValueType};
use crate::normalize::DescriptionNormalizer;
use crate::tree::SchemaNode;

/// Turns schema property nodes into config fields
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    normalizer: DescriptionNormalizer,
}

impl FieldExtractor {
    pub fn new(normalizer: DescriptionNormalizer) -> Self {
        Self { normalizer }
    }

    /// Extract every named property for `service`
    pub fn extract_fields(
        &self,
        properties: &BTreeMap<&str, SchemaNode<'_>>,
        service: &str,
    ) -> BTreeMap<String, ConfigField> {
        properties
            .iter()
            .map(|(name, node)| (name.to_string(), self.extract_field(name, *node, service)))
            .collect()
    }

    /// Extract a single property
    pub fn extract_field(&self, name: &str, node: SchemaNode<'_>, service: &str) -> ConfigField {
        let mut field = ConfigField::default();

        let description = node
            .str_at("description")
            .map(|text| self.normalizer.normalize(text))
            .unwrap_or_default();
        field.description.insert(service.to_string(), description);

        if node.str_at("format") == Some("password") {
            field.sensitive = true;
        }

        match node.str_at("type") {
            Some("integer") => {
                field.field_value_type = FieldValueType::Integer;
                field.nullable = false;
            }
            Some("boolean") => {
                field.field_value_type = FieldValueType::Boolean;
                field.nullable = false;
            }
            Some("string") => {
                if node.has("enum") {
                    field.nullable = false;
                }
            }
            Some("array") => self.resolve_array(name, node, service, &mut field),
            _ => {}
        }

        field
    }

    fn resolve_array(&self, name: &str, node: SchemaNode<'_>, service: &str, field: &mut ConfigField) {
        let Some(items) = node.get_segment("items") else {
            return;
        };

        match items.str_at("type") {
            Some("string") => {
                field.field_value_type = FieldValueType::StringList;
                field.item_type.insert(service.to_string(), FieldValueType::String);
            }
            // Integer elements still make a StringList; the element type carries the difference.
            Some("integer") => {
                field.field_value_type = FieldValueType::StringList;
                field.item_type.insert(service.to_string(), FieldValueType::Integer);
            }
            Some("object") => {
                let properties = items
                    .get("properties")
                    .and_then(|props| props.children())
                    .filter(|props| !props.is_empty());

                match properties {
                    Some(properties) => {
                        let item_fields = self.extract_fields(&properties, service);
                        field.field_value_type = FieldValueType::ObjectList;
                        field.item_key_field = select_item_key(name, &item_fields);
                        field.item_fields = item_fields;
                    }
                    None if items.has("enum") => {
                        field.field_value_type = FieldValueType::StringList;
                        field.nullable = false;
                        field.item_type.insert(service.to_string(), FieldValueType::String);
                    }
                    None => {
                        field.field_value_type = FieldValueType::ObjectList;
                    }
                }
            }
            _ => {}
        }
    }
}

/// Pick the sub-field that identifies elements of an object list.
///
/// A key is only needed when some sub-field is sensitive. With several
/// candidates they are all returned as `[a,b]` for manual resolution.
pub fn select_item_key(name: &str, item_fields: &BTreeMap<String, ConfigField>) -> Option<String> {
    if !item_fields.values().any(|field| field.sensitive) {
        return None;
    }

    let candidates: Vec<&str> = item_fields
        .iter()
        .filter(|(_, field)| !field.sensitive)
        .map(|(sub_name, _)| sub_name.as_str())
        .collect();

    match candidates.as_slice() {
        [] => {
            warn!(field = name, "No item key field candidate for object list with sensitive sub-fields");
            None
        }
        [key] => Some(key.to_string()),
        _ => {
            warn!(
                field = name,
                candidates = ?candidates,
                "Ambiguous item key field, manual resolution required"
            );
            Some(format!("[{}]", candidates.join(",")))
        }
    }
}
