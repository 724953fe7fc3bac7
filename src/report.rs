//! Persists the reconciled catalog and its change log

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalog::FieldCatalog;
use crate::changelog::{ChangeLog, ChangeLogFormat};
use crate::error::{GeneratorError, Result};

/// Writes run results to disk
#[derive(Debug, Clone)]
pub struct ReportWriter {
    catalog_path: PathBuf,
    change_log_path: PathBuf,
    format: ChangeLogFormat,
}

impl ReportWriter {
    pub fn new(
        catalog_path: impl Into<PathBuf>,
        change_log_path: impl Into<PathBuf>,
        format: ChangeLogFormat,
    ) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            change_log_path: change_log_path.into(),
            format,
        }
    }

    /// Write the catalog and the change log.
    ///
    /// Both documents are staged next to their targets and only renamed into
    /// place once both staged files exist. The change log is moved first, so
    /// an updated catalog never lands without its change log.
    pub fn write(&self, catalog: &FieldCatalog, change_log: &ChangeLog) -> Result<()> {
        let catalog_json = catalog.to_json_pretty()?;
        let change_log_text = change_log.render(&self.format);

        let staged_log = stage(&self.change_log_path, &change_log_text)?;
        let staged_catalog = match stage(&self.catalog_path, &catalog_json) {
            Ok(staged) => staged,
            Err(e) => {
                let _ = fs::remove_file(&staged_log);
                return Err(e);
            }
        };

        if let Err(e) = commit(&staged_log, &self.change_log_path) {
            let _ = fs::remove_file(&staged_catalog);
            return Err(e);
        }
        commit(&staged_catalog, &self.catalog_path)?;

        info!(
            catalog = %self.catalog_path.display(),
            change_log = %self.change_log_path.display(),
            fields = catalog.len(),
            changes = change_log.len(),
            "Wrote reconciled catalog"
        );
        Ok(())
    }
}

/// Hidden sibling of `path` used while staging
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn stage(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
    }
    let staged = staging_path(path);
    fs::write(&staged, content).map_err(|e| GeneratorError::io(&staged, e))?;
    Ok(staged)
}

fn commit(staged: &Path, path: &Path) -> Result<()> {
    fs::rename(staged, path).map_err(|e| {
        let _ = fs::remove_file(staged);
        GeneratorError::io(path, e)
    })
}
