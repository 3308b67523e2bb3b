//! Error types for luma-store.

use std::path::PathBuf;

/// Result type for luma-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in luma-store.
///
/// Read-side corruption is deliberately not represented here: a missing or
/// unparseable container fails closed to an empty default. Write failures do
/// surface, because the mutating caller is actively waiting on them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create the data directory.
    #[error("Failed to create data directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the container (or its migration backup) to disk.
    #[error("Failed to persist journal container to {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
