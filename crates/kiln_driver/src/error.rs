//! Errors raised by a build, a clean or a diagnostics query.

use std::path::PathBuf;

use kiln_common::ModuleName;
use kiln_diagnostics::Diagnostic;

/// Errors that abort a driver operation.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The project configuration is invalid.
    #[error(transparent)]
    Config(#[from] kiln_config::ConfigError),

    /// Reading sources or writing build state failed.
    #[error(transparent)]
    Cache(#[from] kiln_cache::CacheError),

    /// The options or the toolchain failed; see [`kiln_compiler::CompileError`].
    #[error(transparent)]
    Compile(#[from] kiln_compiler::CompileError),

    /// Two sources define the same module.
    #[error("module `{module}` is defined by both {first} and {second}")]
    DuplicateModule {
        /// The module name both sources derive.
        module: ModuleName,
        /// The source found first in scan order.
        first: PathBuf,
        /// The conflicting source.
        second: PathBuf,
    },

    /// A freshly placed artifact could not be loaded.
    #[error("failed to load module `{module}` from {path}: {source}")]
    ModuleLoad {
        /// The module being installed.
        module: ModuleName,
        /// The artifact that was being loaded.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// At least one source failed to compile.
    ///
    /// Raised instead of returning an `error` outcome unless the build was
    /// asked to return errors. Carries the same diagnostics the outcome would.
    #[error("compilation failed: {} error(s) in {} diagnostic(s)",
        .diagnostics.iter().filter(|d| d.is_error()).count(),
        .diagnostics.len())]
    CompileFailed {
        /// Every diagnostic of the failed build, in report order.
        diagnostics: Vec<Diagnostic>,
    },
}
