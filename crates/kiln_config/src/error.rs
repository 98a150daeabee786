//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `kiln.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse kiln.toml: {0}")]
    Parse(String),

    /// A field is missing or holds an unusable value.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Dotted name of the field, e.g. `compile.source_ext`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The output directory would be scanned as sources.
    #[error("output directory {output_dir} is inside source directory {source_dir}")]
    OutputInSources {
        /// The resolved output directory.
        output_dir: PathBuf,
        /// The source directory containing it.
        source_dir: PathBuf,
    },

    /// The working directory needed to resolve a relative root is unavailable.
    #[error("cannot resolve project root: {0}")]
    CurrentDir(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_names_field() {
        let err = ConfigError::invalid("project.name", "must not be empty");
        assert_eq!(err.to_string(), "invalid `project.name`: must not be empty");
    }

    #[test]
    fn read_names_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/p/kiln.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert_eq!(err.to_string(), "failed to read /p/kiln.toml: file not found");
    }

    #[test]
    fn output_in_sources_names_both() {
        let err = ConfigError::OutputInSources {
            output_dir: PathBuf::from("/p/src/out"),
            source_dir: PathBuf::from("/p/src"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/p/src/out"));
        assert!(msg.ends_with("/p/src"));
    }
}
