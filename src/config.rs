//! Configuration for the config field generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (fieldgen.toml)
//! - Environment variables (FIELDGEN__*)
//!
//! ## Example config file (fieldgen.toml):
//! ```toml
//! [paths]
//! catalog = "config-generator/fields.json"
//! spec = "config-generator/open-api-spec.json"
//! change_log = "config-generator/fields-changelog.txt"
//!
//! [openapi]
//! discriminator_mapping = "components.schemas.NewConnectorRequestV1.discriminator.mapping"
//! request_schema_suffix = "_NewConnectorRequest"
//! docs_root = "https://fivetran.com/docs/"
//!
//! [changelog]
//! resource_name = "fivetran_connector"
//! reserved_fields = ["schema", "table", "schema_prefix"]
//! ```

use config_crate::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::changelog::ChangeLogFormat;
use crate::normalize::{DescriptionNormalizer, DEFAULT_DOCS_ROOT};
use crate::tree::ServiceLayout;

/// Main configuration for the generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Input and output files
    #[serde(default)]
    pub paths: PathsConfig,

    /// Where to find services in the OpenAPI document
    #[serde(default)]
    pub openapi: OpenApiConfig,

    /// Change log rendering
    #[serde(default)]
    pub changelog: ChangeLogConfig,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Persisted field catalog read at the start of a run
    #[serde(default = "default_catalog_path")]
    pub catalog: PathBuf,

    /// OpenAPI specification
    #[serde(default = "default_spec_path")]
    pub spec: PathBuf,

    /// Where the updated catalog is written (defaults to `catalog`)
    #[serde(default)]
    pub output_catalog: Option<PathBuf>,

    /// Where the change log is written
    #[serde(default = "default_change_log_path")]
    pub change_log: PathBuf,
}

/// OpenAPI document layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiConfig {
    #[serde(default = "default_discriminator_mapping")]
    pub discriminator_mapping: String,

    #[serde(default = "default_request_schema_suffix")]
    pub request_schema_suffix: String,

    /// Absolute root for relative `/docs/` links in descriptions
    #[serde(default = "default_docs_root")]
    pub docs_root: String,
}

/// Change log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogConfig {
    #[serde(default = "default_resource_name")]
    pub resource_name: String,

    /// Fields never reported in the change log
    #[serde(default = "default_reserved_fields")]
    pub reserved_fields: Vec<String>,
}

// Default value functions
fn default_catalog_path() -> PathBuf {
    PathBuf::from("config-generator/fields.json")
}

fn default_spec_path() -> PathBuf {
    PathBuf::from("config-generator/open-api-spec.json")
}

fn default_change_log_path() -> PathBuf {
    PathBuf::from("config-generator/fields-changelog.txt")
}

fn default_discriminator_mapping() -> String {
    ServiceLayout::default().discriminator_mapping
}

fn default_request_schema_suffix() -> String {
    ServiceLayout::default().request_schema_suffix
}

fn default_docs_root() -> String {
    DEFAULT_DOCS_ROOT.to_string()
}

fn default_resource_name() -> String {
    ChangeLogFormat::default().resource_name
}

fn default_reserved_fields() -> Vec<String> {
    ChangeLogFormat::default().reserved_fields
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_path(),
            spec: default_spec_path(),
            output_catalog: None,
            change_log: default_change_log_path(),
        }
    }
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            discriminator_mapping: default_discriminator_mapping(),
            request_schema_suffix: default_request_schema_suffix(),
            docs_root: default_docs_root(),
        }
    }
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            resource_name: default_resource_name(),
            reserved_fields: default_reserved_fields(),
        }
    }
}

/// Command-line path overrides, applied on top of file and environment values
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub spec: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub output_catalog: Option<PathBuf>,
    pub change_log: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Load configuration, layering an explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_layered(config_path, None)
    }

    /// `env` replaces the process environment when given
    fn load_layered(
        config_path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["fieldgen.toml", ".fieldgen.toml", "config/fieldgen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("com", "fivetran", "fieldgen") {
            let xdg_config = config_dir.config_dir().join("fieldgen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (FIELDGEN__*)
        builder = builder.add_source(
            Environment::with_prefix("FIELDGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Apply command-line overrides; flags win over every other layer
    pub fn apply_overrides(&mut self, overrides: PathOverrides) {
        if let Some(spec) = overrides.spec {
            self.paths.spec = spec;
        }
        if let Some(catalog) = overrides.catalog {
            self.paths.catalog = catalog;
        }
        if let Some(output) = overrides.output_catalog {
            self.paths.output_catalog = Some(output);
        }
        if let Some(change_log) = overrides.change_log {
            self.paths.change_log = change_log;
        }
    }

    /// Where the reconciled catalog is written
    pub fn output_catalog(&self) -> &PathBuf {
        self.paths.output_catalog.as_ref().unwrap_or(&self.paths.catalog)
    }

    pub fn service_layout(&self) -> ServiceLayout {
        ServiceLayout {
            discriminator_mapping: self.openapi.discriminator_mapping.clone(),
            request_schema_suffix: self.openapi.request_schema_suffix.clone(),
        }
    }

    pub fn normalizer(&self) -> DescriptionNormalizer {
        DescriptionNormalizer::new(&self.openapi.docs_root)
    }

    pub fn change_log_format(&self) -> ChangeLogFormat {
        ChangeLogFormat {
            resource_name: self.changelog.resource_name.clone(),
            reserved_fields: self.changelog.reserved_fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.output_catalog(), &config.paths.catalog);
        assert_eq!(config.service_layout(), ServiceLayout::default());
        assert_eq!(config.change_log_format(), ChangeLogFormat::default());
    }

    #[test]
    fn test_serialize_config() {
        let config = GeneratorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[openapi]"));
        assert!(toml_str.contains("[changelog]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldgen.toml");
        std::fs::write(
            &path,
            "[paths]\noutput_catalog = \"out/fields.json\"\n\n[changelog]\nresource_name = \"acme_connector\"\n",
        )
        .unwrap();

        let config = GeneratorConfig::load_layered(path.to_str(), Some(Map::new())).unwrap();
        assert_eq!(config.output_catalog(), &PathBuf::from("out/fields.json"));
        assert_eq!(config.paths.catalog, default_catalog_path());
        assert_eq!(config.changelog.resource_name, "acme_connector");
        assert_eq!(config.changelog.reserved_fields.len(), 3);
    }

    fn write_config(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("fieldgen.toml");
        std::fs::write(
            &path,
            "[paths]\ncatalog = \"from-file/fields.json\"\nspec = \"from-file/spec.json\"\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());

        let env = Map::from([
            ("FIELDGEN__PATHS__CATALOG".to_string(), "from-env/fields.json".to_string()),
            ("OTHER__PATHS__SPEC".to_string(), "ignored.json".to_string()),
        ]);
        let config = GeneratorConfig::load_layered(path.to_str(), Some(env)).unwrap();

        assert_eq!(config.paths.catalog, PathBuf::from("from-env/fields.json"));
        assert_eq!(config.paths.spec, PathBuf::from("from-file/spec.json"));
        assert_eq!(config.paths.change_log, default_change_log_path());
    }

    #[test]
    fn test_flags_override_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());

        let env = Map::from([(
            "FIELDGEN__PATHS__CATALOG".to_string(),
            "from-env/fields.json".to_string(),
        )]);
        let mut config = GeneratorConfig::load_layered(path.to_str(), Some(env)).unwrap();
        config.apply_overrides(PathOverrides {
            catalog: Some(PathBuf::from("from-flag/fields.json")),
            output_catalog: Some(PathBuf::from("out/fields.json")),
            ..PathOverrides::default()
        });

        assert_eq!(config.paths.catalog, PathBuf::from("from-flag/fields.json"));
        assert_eq!(config.output_catalog(), &PathBuf::from("out/fields.json"));
        assert_eq!(config.paths.spec, PathBuf::from("from-file/spec.json"));
    }
}
