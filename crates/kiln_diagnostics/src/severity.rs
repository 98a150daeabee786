//! Diagnostic severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How bad a diagnostic is. Only errors fail a file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A potential issue that doesn't prevent the file from compiling.
    Warning,
    /// A problem that prevented the file from producing an artifact.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    /// The lowercase tag used in rendered output and the manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
