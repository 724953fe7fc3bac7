//! Error types for the config field generator

use std::path::PathBuf;

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Generator errors
///
/// Every variant is fatal to a run: nothing is persisted once one of these
/// has been raised.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed field catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed OpenAPI spec: {0}")]
    SpecParse(#[source] serde_json::Error),

    #[error("OpenAPI spec has no object at {path}")]
    MissingNode { path: String },

    #[error(
        "Field '{field}' of service '{service}' conflicts with the catalog entry \
         and with its forked entry '{fork}'; manual resolution required"
    )]
    IrreconcilableField {
        field: String,
        service: String,
        fork: String,
    },

    #[error("Failed to serialize field catalog: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl GeneratorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
