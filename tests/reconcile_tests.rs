//! End-to-end reconciliation tests
//!
//! Runs the extractor and reconciler over a small OpenAPI fixture with three
//! services and checks the resulting catalog and change log.

use std::fs;
use std::path::Path;

use connector_config_fields::{
    reconcile_spec, ChangeLogFormat, FieldCatalog, FieldExtractor, FieldValueType, Generator,
    GeneratorConfig, GeneratorError, SchemaTree, ServiceLayout,
};

const SPEC: &str = include_str!("fixtures/openapi.json");

fn spec() -> SchemaTree {
    SchemaTree::parse(SPEC).unwrap()
}

fn catalog_fixture(name: &str) -> FieldCatalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    FieldCatalog::load(path).unwrap()
}

fn run(catalog: &mut FieldCatalog) -> connector_config_fields::Result<connector_config_fields::ReconcileOutcome> {
    reconcile_spec(catalog, &spec(), &ServiceLayout::default(), &FieldExtractor::default())
        .map(|(_, outcome)| outcome)
}

// =============================================================================
// Fresh catalog
// =============================================================================

#[test]
fn test_services_processed_in_sorted_order() {
    let mut catalog = FieldCatalog::new();
    let (services, _) = reconcile_spec(
        &mut catalog,
        &spec(),
        &ServiceLayout::default(),
        &FieldExtractor::default(),
    )
    .unwrap();
    assert_eq!(services, vec!["svcA", "svcB", "svcC"]);
}

#[test]
fn test_fresh_catalog_contents() {
    let mut catalog = FieldCatalog::new();
    let outcome = run(&mut catalog).unwrap();

    assert!(outcome.updated);
    let names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["columns", "host", "ids", "mode", "password", "port", "schema", "tags"]
    );

    let host = catalog.get("host").unwrap();
    assert_eq!(host.field_value_type, FieldValueType::String);
    assert_eq!(
        host.description["svcA"],
        "Host of the database. See [setup](https://fivetran.com/docs/databases/svc-a)."
    );
    assert_eq!(host.description["svcB"], "Server hostname");

    let ids = catalog.get("ids").unwrap();
    assert_eq!(ids.field_value_type, FieldValueType::StringList);
    assert_eq!(ids.item_type["svcB"], FieldValueType::Integer);

    let mode = catalog.get("mode").unwrap();
    assert!(!mode.nullable);

    assert!(catalog.get("password").unwrap().sensitive);
    assert!(!catalog.get("port").unwrap().nullable);
}

#[test]
fn test_object_list_key_selection() {
    let mut catalog = FieldCatalog::new();
    run(&mut catalog).unwrap();

    let tags = catalog.get("tags").unwrap();
    assert_eq!(tags.field_value_type, FieldValueType::ObjectList);
    assert_eq!(tags.item_key_field.as_deref(), Some("key"));

    let columns = catalog.get("columns").unwrap();
    assert_eq!(columns.field_value_type, FieldValueType::ObjectList);
    assert!(columns.item_key_field.is_none());
}

#[test]
fn test_empty_object_list_never_reaches_catalog() {
    let mut catalog = FieldCatalog::new();
    let outcome = run(&mut catalog).unwrap();

    assert!(!catalog.contains("extras"));
    assert!(!outcome.change_log.contains("extras"));
}

#[test]
fn test_change_log_rendering() {
    let mut catalog = FieldCatalog::new();
    let outcome = run(&mut catalog).unwrap();

    let lines = outcome.change_log.lines(&ChangeLogFormat::default());
    assert_eq!(
        lines,
        vec![
            "- Added field `fivetran_connector.config.columns` for services: `svcB`.",
            "- Added field `fivetran_connector.config.host` for services: `svcA`, `svcB`.",
            "- Added field `fivetran_connector.config.ids` for services: `svcB`.",
            "- Added field `fivetran_connector.config.mode` for services: `svcC`.",
            "- Added field `fivetran_connector.config.password` for services: `svcC`.",
            "- Added field `fivetran_connector.config.port` for services: `svcA`.",
            "- Added field `fivetran_connector.config.tags` for services: `svcA`.",
        ]
    );
    // reserved field is tracked but not reported
    assert!(outcome.change_log.contains("schema"));
}

#[test]
fn test_second_run_is_idempotent() {
    let mut catalog = FieldCatalog::new();
    run(&mut catalog).unwrap();

    let persisted = catalog.to_json_pretty().unwrap();
    let mut reloaded: FieldCatalog = serde_json::from_str(&persisted).unwrap();
    let outcome = run(&mut reloaded).unwrap();

    assert!(!outcome.updated);
    assert!(outcome.change_log.is_empty());
    assert_eq!(reloaded, catalog);
}

// =============================================================================
// Existing catalog
// =============================================================================

#[test]
fn test_type_conflict_forks_service_entry() {
    let mut catalog = catalog_fixture("catalog_with_mode.json");
    let original = catalog.get("mode").cloned().unwrap();

    let outcome = run(&mut catalog).unwrap();

    assert_eq!(catalog.get("mode"), Some(&original));
    let fork = catalog.get("mode_svcC").unwrap();
    assert_eq!(fork.field_value_type, FieldValueType::String);
    assert_eq!(fork.api_field.as_deref(), Some("mode"));
    assert_eq!(fork.description["svcC"], "Sync mode");
    assert!(outcome.change_log.contains("mode_svcC"));
    assert!(!outcome.change_log.contains("mode"));

    let rerun = run(&mut catalog).unwrap();
    assert!(!rerun.updated);
}

#[test]
fn test_conflicting_fork_aborts_run() {
    let mut catalog = catalog_fixture("catalog_conflicting_fork.json");
    let err = run(&mut catalog).unwrap_err();
    assert!(matches!(
        err,
        GeneratorError::IrreconcilableField { ref field, ref service, .. }
            if field == "mode" && service == "svcC"
    ));
}

#[test]
fn test_new_sub_field_merges_into_object_list() {
    let mut catalog: FieldCatalog = serde_json::from_str(
        r#"{
            "tags": {
                "description": { "svcA": "" },
                "nullable": true,
                "field_value_type": "ObjectList",
                "item_fields": {
                    "key": {
                        "description": { "svcA": "Tag key" },
                        "nullable": true,
                        "field_value_type": "String"
                    }
                },
                "item_key_field": "key"
            }
        }"#,
    )
    .unwrap();

    let outcome = run(&mut catalog).unwrap();

    let tags = catalog.get("tags").unwrap();
    assert!(tags.item_fields["secret"].sensitive);
    assert!(outcome.change_log.contains("tags.secret"));
    assert!(!outcome.change_log.contains("tags"));
    assert!(!outcome.change_log.contains("tags.key"));
}

// =============================================================================
// Generator
// =============================================================================

fn generator_config(dir: &Path) -> GeneratorConfig {
    let spec_path = dir.join("open-api-spec.json");
    fs::write(&spec_path, SPEC).unwrap();

    let mut config = GeneratorConfig::default();
    config.paths.spec = spec_path;
    config.paths.catalog = dir.join("fields.json");
    config.paths.change_log = dir.join("fields-changelog.txt");
    config
}

#[test]
fn test_generator_writes_only_on_change() {
    let dir = tempfile::tempdir().unwrap();
    let config = generator_config(dir.path());
    let change_log = config.paths.change_log.clone();
    let catalog_path = config.paths.catalog.clone();

    let first = Generator::new(config.clone()).run().unwrap();
    assert!(first.written);
    assert_eq!(first.catalog_size, 8);
    assert!(fs::read_to_string(&change_log)
        .unwrap()
        .contains("`fivetran_connector.config.host` for services: `svcA`, `svcB`."));

    fs::remove_file(&change_log).unwrap();
    let second = Generator::new(config).run().unwrap();
    assert!(!second.outcome.updated);
    assert!(!second.written);
    assert!(!change_log.exists());
    assert_eq!(FieldCatalog::load(&catalog_path).unwrap().len(), 8);
}

#[test]
fn test_check_mode_never_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config = generator_config(dir.path());
    let catalog_path = config.paths.catalog.clone();

    let summary = Generator::new(config).check_only(true).run().unwrap();
    assert!(summary.outcome.updated);
    assert!(!summary.written);
    assert!(!catalog_path.exists());
}

#[test]
fn test_malformed_spec_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = generator_config(dir.path());
    fs::write(&config.paths.spec, "{ \"components\": ").unwrap();

    let err = Generator::new(config.clone()).run().unwrap_err();
    assert!(matches!(err, GeneratorError::SpecParse(_)));
    assert!(!config.paths.catalog.exists());
    assert!(!config.paths.change_log.exists());
}

#[test]
fn test_separate_output_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = generator_config(dir.path());
    let output = dir.path().join("generated").join("fields.json");
    config.paths.output_catalog = Some(output.clone());

    Generator::new(config.clone()).run().unwrap();
    assert!(output.exists());
    assert!(!config.paths.catalog.exists());
}
