//! Connector Config Fields
//!
//! Keeps the hand-maintained config field catalog in step with the
//! connector OpenAPI specification. The catalog drives a separate schema
//! generator, so every field of every connector service must be described
//! there with a single, consistent shape.
//!
//! ## Flow
//!
//! ```text
//! open-api-spec.json ──► SchemaTree ──► FieldExtractor (per service)
//!                                              │
//!                 fields.json ──► FieldCatalog ◄┤ Reconciler
//!                                              │
//!                                              ▼
//!                             ReportWriter (fields.json + change log)
//! ```
//!
//! Fields with the same name merge across services, keeping one description
//! per service. Fields whose shape conflicts with the catalog are forked
//! into `<name>_<service>` entries that remember their canonical name.

pub mod catalog;
pub mod changelog;
pub mod config;
pub mod error;
pub mod extract;
pub mod field;
pub mod generator;
pub mod normalize;
pub mod reconcile;
pub mod report;
pub mod tree;

pub use catalog::FieldCatalog;
pub use changelog::{ChangeLog, ChangeLogFormat};
pub use config::{GeneratorConfig, PathOverrides};
pub use error::{GeneratorError, Result};
pub use extract::FieldExtractor;
pub use field::{ConfigField, FieldValueType};
pub use generator::{reconcile_spec, Generator, RunSummary};
pub use normalize::DescriptionNormalizer;
pub use reconcile::{able_to_merge, merge_fields, reconcile, ReconcileOutcome, Reconciler};
pub use report::ReportWriter;
pub use tree::{SchemaNode, SchemaTree, ServiceLayout};
