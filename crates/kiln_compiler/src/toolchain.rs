//! The seam to the external compiler and its native output shape.

use std::path::PathBuf;

use kiln_common::ModuleName;

use crate::options::ResolvedOptions;

/// One compilation request: a single source file.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Absolute source path.
    pub source: PathBuf,
    /// Module the source defines.
    pub module: ModuleName,
    /// Validated options for this file.
    pub options: ResolvedOptions,
}

/// Where a toolchain message points, as the toolchain reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLocation {
    /// No location given.
    None,
    /// A line only.
    Line(u32),
    /// A line and a column.
    LineColumn(u32, u32),
}

/// Whether a toolchain message is an error or a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Prevents the file from producing an artifact.
    Error,
    /// Informational; the file still compiles.
    Warning,
}

/// A message in the toolchain's own shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Error or warning.
    pub kind: MessageKind,
    /// The pass that produced it; empty means the toolchain itself.
    pub pass: String,
    /// File the message refers to, if different from the source.
    pub file: Option<PathBuf>,
    /// Reported location.
    pub location: RawLocation,
    /// Message text.
    pub text: String,
}

impl RawMessage {
    /// Creates an error message with the given location.
    pub fn error(location: RawLocation, text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            pass: String::new(),
            file: None,
            location,
            text: text.into(),
        }
    }

    /// Creates a warning message with the given location.
    pub fn warning(location: RawLocation, text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            ..Self::error(location, text)
        }
    }

    /// Sets the producing pass.
    pub fn from_pass(mut self, pass: impl Into<String>) -> Self {
        self.pass = pass.into();
        self
    }

    /// Sets the file the message refers to.
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// What the toolchain produced for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainOutput {
    /// An object was produced; messages are usually warnings.
    Compiled {
        /// The compiled artifact bytes.
        object: Vec<u8>,
        /// Messages in toolchain order.
        messages: Vec<RawMessage>,
    },
    /// No object was produced.
    Failed {
        /// Messages in toolchain order.
        messages: Vec<RawMessage>,
    },
}

/// Failures that are not compile errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainFailure {
    /// The toolchain refused the option set.
    RejectedOptions(String),
    /// The toolchain could not be run or crashed.
    Crashed(String),
}

/// An external compiler.
///
/// Implementations must be callable from several worker threads at once;
/// each call compiles one independent file.
pub trait Toolchain: Send + Sync {
    /// Name used as `compiler_name` for messages that carry no pass.
    fn name(&self) -> &str;

    /// Compiles one file.
    fn compile(&self, request: &CompileRequest) -> Result<ToolchainOutput, ToolchainFailure>;
}
