//! Change log of fields introduced or merged during a run

use std::collections::BTreeMap;

use crate::field::ConfigField;

/// How change log lines are scoped and filtered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogFormat {
    /// Resource name prefixed to every field path
    pub resource_name: String,
    /// Field names that identify schema/table and are never reported
    pub reserved_fields: Vec<String>,
}

impl Default for ChangeLogFormat {
    fn default() -> Self {
        Self {
            resource_name: "fivetran_connector".to_string(),
            reserved_fields: vec![
                "schema".to_string(),
                "table".to_string(),
                "schema_prefix".to_string(),
            ],
        }
    }
}

/// Field paths (dotted for nested sub-fields) mapped to the field as it
/// stood after the change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    entries: BTreeMap<String, ConfigField>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change, replacing an earlier snapshot of the same path
    pub fn record(&mut self, path: impl Into<String>, field: ConfigField) {
        self.entries.insert(path.into(), field);
    }

    pub fn get(&self, path: &str) -> Option<&ConfigField> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// One line per reportable entry, in path order
    pub fn lines(&self, format: &ChangeLogFormat) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(path, _)| {
                let root = path.split('.').next().unwrap_or_default();
                !format.reserved_fields.iter().any(|reserved| reserved == root)
            })
            .map(|(path, field)| {
                let services: Vec<String> = field.services().map(|s| format!("`{}`", s)).collect();
                format!(
                    "- Added field `{}.config.{}` for services: {}.",
                    format.resource_name,
                    path,
                    services.join(", ")
                )
            })
            .collect()
    }

    /// Plain-text change log, newline terminated
    pub fn render(&self, format: &ChangeLogFormat) -> String {
        self.lines(format)
            .into_iter()
            .map(|line| line + "\n")
            .collect()
    }
}
