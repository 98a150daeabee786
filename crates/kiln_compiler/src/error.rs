//! Fatal errors raised by the compiler adapter.

use std::path::PathBuf;

/// Failures that abort the whole build.
///
/// Ordinary compile errors are not represented here: they become
/// [`Diagnostic`](kiln_diagnostics::Diagnostic)s on a failed unit and never
/// stop the remaining files from compiling.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The option set is invalid for the file being compiled.
    #[error("invalid compiler options while compiling {file}: {reason}")]
    Configuration {
        /// The file whose compilation applied the bad option.
        file: PathBuf,
        /// What was wrong with the options.
        reason: String,
    },

    /// The toolchain could not be run or crashed.
    #[error("compiler toolchain failed on {file}: {reason}")]
    Toolchain {
        /// The file being compiled.
        file: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The compile worker pool could not be created.
    #[error("failed to start compile workers: {0}")]
    WorkerPool(String),
}
