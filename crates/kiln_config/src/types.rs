//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `kiln.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Compilation settings (source directories, output directory, options).
    #[serde(default)]
    pub compile: CompileConfig,
    /// The external compiler toolchain to drive.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

/// Core project metadata required in every `kiln.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: Option<String>,
}

/// Settings that control which files are compiled and how.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Directories scanned for sources, relative to the project root.
    pub source_dirs: Vec<String>,
    /// Directory receiving compiled artifacts and the build manifest.
    pub output_dir: String,
    /// Extra options passed to the toolchain (`name` or `name=value`).
    pub options: Vec<String>,
    /// Report diagnostic paths as basenames instead of absolute paths.
    pub deterministic: bool,
    /// Extension of source files, without the leading dot.
    pub source_ext: String,
    /// Extension of compiled artifacts, without the leading dot.
    pub artifact_ext: String,
    /// Number of parallel compile workers; `0` uses one per CPU.
    pub jobs: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec!["src".to_string()],
            output_dir: "_build/kiln".to_string(),
            options: Vec::new(),
            deterministic: false,
            source_ext: "kl".to_string(),
            artifact_ext: "klo".to_string(),
            jobs: 0,
        }
    }
}

/// How to invoke the external compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Program name or path of the compiler executable.
    pub program: String,
    /// Fixed arguments placed before the per-file arguments.
    pub args: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "klc".to_string(),
            args: Vec::new(),
        }
    }
}
