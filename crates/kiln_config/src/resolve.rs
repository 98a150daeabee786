//! Project resolution: turning a parsed configuration into absolute build settings.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, ToolchainConfig};
use std::path::{Path, PathBuf};

/// A fully resolved project with every path made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    /// The project name.
    pub name: String,
    /// Absolute project root (the directory holding `kiln.toml`).
    pub root: PathBuf,
    /// Absolute source directories, in configured order.
    pub source_dirs: Vec<PathBuf>,
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// Extra toolchain options as written in the configuration.
    pub options: Vec<String>,
    /// Whether diagnostic paths are reported as basenames.
    pub deterministic: bool,
    /// Source file extension.
    pub source_ext: String,
    /// Artifact file extension.
    pub artifact_ext: String,
    /// Number of parallel compile workers (`0` = one per CPU).
    pub jobs: usize,
    /// The external compiler invocation.
    pub toolchain: ToolchainConfig,
}

/// Resolves a configuration against its project root.
///
/// Relative `source_dirs` and `output_dir` are joined onto `root`; a relative
/// `root` is first joined onto the current working directory.
pub fn resolve_project(
    config: &ProjectConfig,
    root: &Path,
) -> Result<ResolvedProject, ConfigError> {
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()?.join(root)
    };

    let source_dirs: Vec<PathBuf> = config
        .compile
        .source_dirs
        .iter()
        .map(|dir| root.join(dir))
        .collect();
    let output_dir = root.join(&config.compile.output_dir);

    if let Some(dir) = source_dirs.iter().find(|dir| output_dir.starts_with(dir)) {
        return Err(ConfigError::OutputInSources {
            output_dir,
            source_dir: dir.clone(),
        });
    }

    Ok(ResolvedProject {
        name: config.project.name.clone(),
        root,
        source_dirs,
        output_dir,
        options: config.compile.options.clone(),
        deterministic: config.compile.deterministic,
        source_ext: config.compile.source_ext.clone(),
        artifact_ext: config.compile.artifact_ext.clone(),
        jobs: config.compile.jobs,
        toolchain: config.toolchain.clone(),
    })
}
