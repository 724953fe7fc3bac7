//! End-to-end generator run
//!
//! Load catalog → parse spec → extract and reconcile each service in sorted
//! order → persist only if something changed. Any fatal error aborts the run
//! before a single file is written.

use tracing::info;

use crate::catalog::FieldCatalog;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::extract::FieldExtractor;
use crate::reconcile::{ReconcileOutcome, Reconciler};
use crate::report::ReportWriter;
use crate::tree::{SchemaTree, ServiceLayout};

/// What a run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Services processed, in processing order
    pub services: Vec<String>,
    pub outcome: ReconcileOutcome,
    /// Number of catalog entries after reconciliation
    pub catalog_size: usize,
    /// Whether output files were written
    pub written: bool,
}

impl RunSummary {
    /// Process exit status: 1 when a check-only run finds the catalog out
    /// of date, 0 otherwise
    pub fn exit_code(&self, check_only: bool) -> i32 {
        if check_only && self.outcome.updated {
            1
        } else {
            0
        }
    }
}

/// Reconcile every service declared in `tree` into `catalog`.
///
/// Returns the processed services alongside the outcome.
pub fn reconcile_spec(
    catalog: &mut FieldCatalog,
    tree: &SchemaTree,
    layout: &ServiceLayout,
    extractor: &FieldExtractor,
) -> Result<(Vec<String>, ReconcileOutcome)> {
    let services = tree.services(layout)?;
    info!(count = services.len(), "Reconciling services");

    let mut reconciler = Reconciler::new(catalog);
    for service in &services {
        let properties = tree.config_fields(service, layout);
        let fields = extractor.extract_fields(&properties, service);
        reconciler.reconcile_service(service, fields)?;
    }

    Ok((services, reconciler.finish()))
}

/// Runs the generator with a given configuration
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    check_only: bool,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            check_only: false,
        }
    }

    /// Reconcile without writing anything
    pub fn check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    pub fn run(&self) -> Result<RunSummary> {
        let paths = &self.config.paths;

        let mut catalog = FieldCatalog::load(&paths.catalog)?;
        info!(path = %paths.catalog.display(), fields = catalog.len(), "Loaded field catalog");

        let tree = SchemaTree::from_file(&paths.spec)?;
        let extractor = FieldExtractor::new(self.config.normalizer());
        let (services, outcome) =
            reconcile_spec(&mut catalog, &tree, &self.config.service_layout(), &extractor)?;

        let written = outcome.updated && !self.check_only;
        if written {
            ReportWriter::new(
                self.config.output_catalog(),
                &paths.change_log,
                self.config.change_log_format(),
            )
            .write(&catalog, &outcome.change_log)?;
        } else if !outcome.updated {
            info!("No changes detected");
        }

        Ok(RunSummary {
            services,
            catalog_size: catalog.len(),
            outcome,
            written,
        })
    }
}
