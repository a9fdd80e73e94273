//! Store error types.

use std::path::PathBuf;

/// Errors from reading transit network data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The data source could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data source contained invalid JSON
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
