//! Build outcomes and progress reporting.

use std::fmt;
use std::path::Path;

use kiln_diagnostics::Diagnostic;

use crate::error::BuildError;

/// Overall result of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Something was compiled or removed, and nothing failed.
    Ok,
    /// Nothing needed doing.
    Noop,
    /// At least one file failed to produce an artifact.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Noop => write!(f, "noop"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// What a build returns: its status and the diagnostics in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Overall status.
    pub status: Status,
    /// Diagnostics, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Console sink for human-facing progress lines.
pub trait Shell: Send + Sync {
    /// Prints a status line such as `Compiled src/net.kl`.
    fn status(&self, verb: &str, message: &str);
}

/// Writes status lines to stderr with a right-aligned verb.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrShell;

impl Shell for StderrShell {
    fn status(&self, verb: &str, message: &str) {
        eprintln!("{verb:>12} {message}");
    }
}

/// Emits per-file notifications and turns an outcome into the build result.
pub struct Reporter<'a> {
    shell: &'a dyn Shell,
    root: &'a Path,
    verbose: bool,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter. Paths are printed relative to `root`.
    pub fn new(shell: &'a dyn Shell, root: &'a Path, verbose: bool) -> Self {
        Self {
            shell,
            root,
            verbose,
        }
    }

    /// Notifies that `source` was compiled. Silent unless verbose.
    pub fn compiled(&self, source: &Path) {
        if self.verbose {
            let shown = source.strip_prefix(self.root).unwrap_or(source);
            self.shell.status("Compiled", &shown.display().to_string());
        }
    }

    /// Returns the outcome, or raises it as [`BuildError::CompileFailed`]
    /// when the build failed and errors are not to be returned.
    pub fn finish(
        &self,
        outcome: BuildOutcome,
        return_errors: bool,
    ) -> Result<BuildOutcome, BuildError> {
        if outcome.status == Status::Error && !return_errors {
            return Err(BuildError::CompileFailed {
                diagnostics: outcome.diagnostics,
            });
        }
        Ok(outcome)
    }
}
