//! Shared helpers for CLI commands: locating and loading the project, and
//! printing diagnostics.

use std::path::{Path, PathBuf};

use kiln_config::{ProjectConfig, ResolvedProject, CONFIG_FILE};
use kiln_diagnostics::{Diagnostic, DiagnosticRenderer, JsonRenderer, TerminalRenderer};

use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the directory containing `kiln.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Loads the configuration selected by the global args, with its project root.
///
/// `--config` may name the file itself or the directory holding it. Without
/// it, the nearest `kiln.toml` above the current directory is used.
pub fn load_config(
    global: &GlobalArgs,
) -> Result<(ProjectConfig, PathBuf), Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let path = PathBuf::from(config_path);
            if path.is_file() {
                let root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok((kiln_config::load_config_from_path(&path)?, root))
            } else {
                Ok((kiln_config::load_config(&path)?, path))
            }
        }
        None => {
            let root = find_project_root(&std::env::current_dir()?)?;
            Ok((kiln_config::load_config(&root)?, root))
        }
    }
}

/// Loads and resolves the project selected by the global args.
pub fn load_project(global: &GlobalArgs) -> Result<ResolvedProject, Box<dyn std::error::Error>> {
    let (config, root) = load_config(global)?;
    Ok(kiln_config::resolve_project(&config, &root)?)
}

/// Renders diagnostics in the given format.
pub fn render_diagnostics(diagnostics: &[Diagnostic], format: ReportFormat, color: bool) -> String {
    match format {
        ReportFormat::Text => TerminalRenderer::new(color).render_all(diagnostics),
        ReportFormat::Json => JsonRenderer.render_all(diagnostics),
    }
}

/// Counts `(errors, warnings)`.
pub fn count_by_severity(diagnostics: &[Diagnostic]) -> (usize, usize) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    (errors, diagnostics.len() - errors)
}
