//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates the `kiln.toml` configuration of a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_from_path(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_from_path(config_path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are usable.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::invalid("project.name", "must not be empty"));
    }
    let compile = &config.compile;
    if compile.source_dirs.is_empty() {
        return Err(ConfigError::invalid(
            "compile.source_dirs",
            "must name at least one directory",
        ));
    }
    if compile.output_dir.is_empty() {
        return Err(ConfigError::invalid("compile.output_dir", "must not be empty"));
    }
    for (field, ext) in [
        ("compile.source_ext", &compile.source_ext),
        ("compile.artifact_ext", &compile.artifact_ext),
    ] {
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                field,
                format!("must be a bare extension, got '{ext}'"),
            ));
        }
    }
    if compile.source_ext == compile.artifact_ext {
        return Err(ConfigError::invalid(
            "compile.artifact_ext",
            "must differ from compile.source_ext",
        ));
    }
    if config.toolchain.program.is_empty() {
        return Err(ConfigError::invalid("toolchain.program", "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "demo"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.compile.source_dirs, vec!["src"]);
        assert_eq!(config.compile.output_dir, "_build/kiln");
        assert_eq!(config.compile.source_ext, "kl");
        assert_eq!(config.compile.artifact_ext, "klo");
        assert!(!config.compile.deterministic);
        assert_eq!(config.toolchain.program, "klc");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "demo"
version = "1.2.0"

[compile]
source_dirs = ["src", "gen"]
output_dir = "out/ebin"
options = ["warnings_as_errors", "define=DEBUG"]
deterministic = true
jobs = 4

[toolchain]
program = "/opt/klc/bin/klc"
args = ["--quiet"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.version.as_deref(), Some("1.2.0"));
        assert_eq!(config.compile.source_dirs, vec!["src", "gen"]);
        assert_eq!(config.compile.options.len(), 2);
        assert!(config.compile.deterministic);
        assert_eq!(config.compile.jobs, 4);
        assert_eq!(config.toolchain.args, vec!["--quiet"]);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "project.name",
                ..
            }
        ));
    }

    #[test]
    fn empty_source_dirs_errors() {
        let toml = r#"
[project]
name = "demo"

[compile]
source_dirs = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "compile.source_dirs",
                ..
            }
        ));
    }

    #[test]
    fn dotted_extension_errors() {
        let toml = r#"
[project]
name = "demo"

[compile]
artifact_ext = ".klo"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("compile.artifact_ext"));
    }

    #[test]
    fn same_extensions_error() {
        let toml = r#"
[project]
name = "demo"

[compile]
source_ext = "kl"
artifact_ext = "kl"
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"x\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "x");
    }

    #[test]
    fn read_error_names_config_path() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/dir/kiln.toml"))
            }
            other => panic!("expected Read error, got {other:?}"),
        }
    }
}
