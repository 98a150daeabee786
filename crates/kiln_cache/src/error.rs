//! Error types for manifest and artifact operations.

use std::path::PathBuf;

/// Errors that can occur while reading sources or writing build state.
///
/// Reading the manifest is fail-safe (a missing or corrupt manifest loads as
/// empty), so these errors come from writes, removals and source reads.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source file cannot be compiled into a module.
    #[error("invalid source file {path}: {reason}")]
    InvalidSource {
        /// The offending source path.
        path: PathBuf,
        /// Why the file was rejected.
        reason: String,
    },

    /// A serialization error occurred while writing the manifest.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}
