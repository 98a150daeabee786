//! Structured diagnostic messages with a fixed, comparable shape.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A 1-based source position as reported by the toolchain.
///
/// When the toolchain reports only a line, the column is
/// [`Position::NO_COLUMN`] for every diagnostic of the run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number (0 when the toolchain reported no location).
    pub line: u32,
    /// 1-based column number, or [`Position::NO_COLUMN`].
    pub column: u32,
}

impl Position {
    /// Column used when the toolchain reports a line without a column.
    pub const NO_COLUMN: u32 = 0;

    /// Position for messages that carry no location at all.
    pub const NONE: Position = Position {
        line: 0,
        column: Self::NO_COLUMN,
    };

    /// Creates a position from a line and column.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Creates a position for a line-only report.
    pub fn line(line: u32) -> Self {
        Self {
            line,
            column: Self::NO_COLUMN,
        }
    }

    /// Returns `true` if the column was reported.
    pub fn has_column(&self) -> bool {
        self.column != Self::NO_COLUMN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_column() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}", self.line)
        }
    }
}

/// A compiler-reported message normalized into the driver's uniform shape.
///
/// Diagnostics are immutable once produced and compare equal only when every
/// field matches, which is what lets a no-op build return the exact
/// diagnostics of the build that produced them.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The toolchain pass that produced the message (e.g. `"klc_parse"`).
    pub compiler_name: String,
    /// The file the message refers to.
    pub file: PathBuf,
    /// The source file that was being compiled.
    pub source: PathBuf,
    /// The human-readable message text.
    pub message: String,
    /// Where in `file` the message points.
    pub position: Position,
    /// Whether this is an error or a warning.
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates an error diagnostic for `source` pointing into the same file.
    pub fn error(
        compiler_name: impl Into<String>,
        source: impl Into<PathBuf>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        let source = source.into();
        Self {
            compiler_name: compiler_name.into(),
            file: source.clone(),
            source,
            message: message.into(),
            position,
            severity: Severity::Error,
        }
    }

    /// Creates a warning diagnostic for `source` pointing into the same file.
    pub fn warning(
        compiler_name: impl Into<String>,
        source: impl Into<PathBuf>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(compiler_name, source, message, position)
        }
    }

    /// Points the diagnostic at a different file than the one being compiled
    /// (e.g. an included header).
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    /// Returns `true` if this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}
