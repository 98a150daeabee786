//! Running the toolchain over a work list and normalizing its output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_cache::SourceFile;
use kiln_diagnostics::{Diagnostic, Position, Severity};
use rayon::prelude::*;

use crate::error::CompileError;
use crate::options::CompileOptions;
use crate::toolchain::{
    CompileRequest, MessageKind, RawLocation, RawMessage, Toolchain, ToolchainFailure,
    ToolchainOutput,
};

/// How `file` and `source` paths appear in diagnostics.
///
/// A single switch for the whole build, never decided per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// Absolute paths.
    Absolute,
    /// Basenames only.
    Deterministic,
}

impl PathMode {
    fn apply(self, path: &Path) -> PathBuf {
        match self {
            PathMode::Absolute => path.to_path_buf(),
            PathMode::Deterministic => path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
        }
    }
}

/// A file that produced an artifact.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// The compiled source.
    pub source: SourceFile,
    /// Artifact bytes, not yet placed in the output directory.
    pub object: Vec<u8>,
    /// Warnings, in toolchain order.
    pub diagnostics: Vec<Diagnostic>,
}

/// A file that failed to produce an artifact.
#[derive(Debug, Clone)]
pub struct FailedUnit {
    /// The source that failed.
    pub source: SourceFile,
    /// Errors and warnings, in toolchain order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of compiling one file.
pub type UnitResult = Result<CompiledUnit, FailedUnit>;

/// Drives a [`Toolchain`] over the files that need compiling.
pub struct CompilerAdapter {
    toolchain: Arc<dyn Toolchain>,
    options: CompileOptions,
    path_mode: PathMode,
    jobs: usize,
}

impl CompilerAdapter {
    /// Creates an adapter. `jobs == 0` uses one worker per CPU.
    pub fn new(toolchain: Arc<dyn Toolchain>, options: CompileOptions, jobs: usize) -> Self {
        let path_mode = if options.deterministic() {
            PathMode::Deterministic
        } else {
            PathMode::Absolute
        };
        Self {
            toolchain,
            options,
            path_mode,
            jobs,
        }
    }

    /// The option set this adapter compiles with.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles every file, in parallel, and returns one result per file in
    /// the order of `files`.
    ///
    /// A compile failure in one file never stops the others. A configuration
    /// error or toolchain crash is fatal and aborts the run: malformed options
    /// are reported against the first file before any toolchain call.
    pub fn compile_all(&self, files: &[SourceFile]) -> Result<Vec<UnitResult>, CompileError> {
        if let Some(first) = files.first() {
            self.options.resolve_for(&first.path)?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| CompileError::WorkerPool(e.to_string()))?;

        pool.install(|| {
            files
                .par_iter()
                .map(|file| self.compile_one(file))
                .collect()
        })
    }

    /// Compiles a single file.
    pub fn compile_one(&self, file: &SourceFile) -> Result<UnitResult, CompileError> {
        let options = self.options.resolve_for(&file.path)?;
        let warnings_as_errors = options.warnings_as_errors();
        let request = CompileRequest {
            source: file.path.clone(),
            module: file.module.clone(),
            options,
        };

        tracing::debug!(source = %file.path.display(), "invoking {}", self.toolchain.name());

        let output = self.toolchain.compile(&request).map_err(|failure| match failure {
            ToolchainFailure::RejectedOptions(reason) => CompileError::Configuration {
                file: file.path.clone(),
                reason,
            },
            ToolchainFailure::Crashed(reason) => CompileError::Toolchain {
                file: file.path.clone(),
                reason,
            },
        })?;

        let unit = match output {
            ToolchainOutput::Compiled { object, messages } => {
                let diagnostics = self.normalize(&file.path, &messages);
                let has_errors = diagnostics.iter().any(Diagnostic::is_error);
                let has_warnings = diagnostics
                    .iter()
                    .any(|d| d.severity == Severity::Warning);
                if has_errors || (warnings_as_errors && has_warnings) {
                    Err(FailedUnit {
                        source: file.clone(),
                        diagnostics,
                    })
                } else {
                    Ok(CompiledUnit {
                        source: file.clone(),
                        object,
                        diagnostics,
                    })
                }
            }
            ToolchainOutput::Failed { messages } => {
                let mut diagnostics = self.normalize(&file.path, &messages);
                if diagnostics.is_empty() {
                    diagnostics.push(self.unexplained_failure(&file.path));
                }
                Err(FailedUnit {
                    source: file.clone(),
                    diagnostics,
                })
            }
        };

        Ok(unit)
    }

    /// Converts native messages into diagnostics for `source`.
    fn normalize(&self, source: &Path, messages: &[RawMessage]) -> Vec<Diagnostic> {
        messages
            .iter()
            .map(|msg| {
                let compiler_name = if msg.pass.is_empty() {
                    self.toolchain.name().to_string()
                } else {
                    msg.pass.clone()
                };
                let position = match msg.location {
                    RawLocation::None => Position::NONE,
                    RawLocation::Line(line) => Position::line(line),
                    RawLocation::LineColumn(line, column) => Position::new(line, column),
                };
                let severity = match msg.kind {
                    MessageKind::Error => Severity::Error,
                    MessageKind::Warning => Severity::Warning,
                };
                let file = match msg.file.as_deref() {
                    Some(file) => resolve_against(source, file),
                    None => source.to_path_buf(),
                };
                Diagnostic {
                    compiler_name,
                    file: self.path_mode.apply(&file),
                    source: self.path_mode.apply(source),
                    message: msg.text.clone(),
                    position,
                    severity,
                }
            })
            .collect()
    }

    fn unexplained_failure(&self, source: &Path) -> Diagnostic {
        Diagnostic::error(
            self.toolchain.name(),
            self.path_mode.apply(source),
            "compilation failed without reporting an error",
            Position::NONE,
        )
    }
}

/// Joins a relative message path onto the directory of `source`.
fn resolve_against(source: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match source.parent() {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    }
}
