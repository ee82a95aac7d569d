//! Unified error types for airgrid-core.

use std::path::PathBuf;

/// Errors from cache storage operations.
///
/// Attachment downloads never produce these; only the response cache
/// escalates filesystem failures to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cache directory could not be created.
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cache entry file could not be written.
    #[error("failed to write cache entry {path}: {source}")]
    WriteEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cache directory could not be cleared during invalidation.
    #[error("failed to clear cache directory {path}: {source}")]
    ClearDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cache entry could not be serialized.
    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}
