//! Compiler option handling.
//!
//! Options are written in the configuration as `name` or `name=value`. The
//! effective option set always carries `debug_info` unless the user overrides
//! it, and any change to that set invalidates every previous compile.

use std::fmt;
use std::path::Path;

use crate::error::CompileError;

/// Implicit option that makes the toolchain emit debug information.
pub const DEBUG_INFO: &str = "debug_info";

/// Disables the implicit [`DEBUG_INFO`] option.
pub const NO_DEBUG_INFO: &str = "no_debug_info";

/// Fails a file whose compile produced warnings.
pub const WARNINGS_AS_ERRORS: &str = "warnings_as_errors";

/// Reports diagnostic paths as basenames.
pub const DETERMINISTIC: &str = "deterministic";

/// A single validated option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOption {
    /// Option name, `[a-z][a-z0-9_]*`.
    pub name: String,
    /// Optional value.
    pub value: Option<String>,
}

impl CompileOption {
    /// Parses `name` or `name=value`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (raw, None),
        };

        let mut chars = name.chars();
        let name_ok = chars.next().is_some_and(|c| c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !name_ok {
            return Err(format!("malformed option '{raw}': invalid option name"));
        }
        if let Some(value) = value {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(format!("malformed option '{raw}': invalid value"));
            }
        }

        Ok(Self {
            name: name.to_string(),
            value: value.map(str::to_string),
        })
    }
}

impl fmt::Display for CompileOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// The option set a build runs with, as configured.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    raw: Vec<String>,
    deterministic: bool,
}

impl CompileOptions {
    /// Creates the option set from configured options and the global
    /// deterministic-paths switch.
    pub fn new(raw: &[String], deterministic: bool) -> Self {
        let raw: Vec<String> = raw.iter().map(|o| o.trim().to_string()).collect();
        let deterministic = deterministic || raw.iter().any(|o| o == DETERMINISTIC);
        Self { raw, deterministic }
    }

    /// Returns `true` if diagnostics use basename-only paths.
    pub fn deterministic(&self) -> bool {
        self.deterministic
    }

    /// Canonical form of the effective option set, recorded in the manifest.
    ///
    /// Sorted and deduplicated, including the implicit `debug_info`.
    pub fn effective(&self) -> Vec<String> {
        let mut effective = self.raw.clone();
        if !self.overrides_debug_info() {
            effective.push(DEBUG_INFO.to_string());
        }
        if self.deterministic && !effective.iter().any(|o| o == DETERMINISTIC) {
            effective.push(DETERMINISTIC.to_string());
        }
        effective.sort();
        effective.dedup();
        effective
    }

    fn overrides_debug_info(&self) -> bool {
        self.raw.iter().any(|o| {
            o == NO_DEBUG_INFO || o == DEBUG_INFO || o.starts_with(&format!("{DEBUG_INFO}="))
        })
    }

    /// Validates the options for compiling `file`.
    ///
    /// A malformed option is a configuration error naming `file`.
    pub fn resolve_for(&self, file: &Path) -> Result<ResolvedOptions, CompileError> {
        let mut options = Vec::with_capacity(self.raw.len() + 1);
        for raw in &self.raw {
            let option = CompileOption::parse(raw).map_err(|reason| CompileError::Configuration {
                file: file.to_path_buf(),
                reason,
            })?;
            options.push(option);
        }
        if !self.overrides_debug_info() {
            options.push(CompileOption {
                name: DEBUG_INFO.to_string(),
                value: None,
            });
        }
        Ok(ResolvedOptions { options })
    }
}

/// Options validated for one file, in the order they are passed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// The validated options.
    pub options: Vec<CompileOption>,
}

impl ResolvedOptions {
    /// Returns `true` if an option with this name is present.
    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    /// Returns `true` if warnings fail the file.
    pub fn warnings_as_errors(&self) -> bool {
        self.has(WARNINGS_AS_ERRORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(raw: &[&str]) -> CompileOptions {
        let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        CompileOptions::new(&raw, false)
    }

    #[test]
    fn parse_flag_and_value() {
        assert_eq!(
            CompileOption::parse("warnings_as_errors").unwrap(),
            CompileOption {
                name: "warnings_as_errors".to_string(),
                value: None
            }
        );
        let define = CompileOption::parse("define=DEBUG").unwrap();
        assert_eq!(define.value.as_deref(), Some("DEBUG"));
        assert_eq!(define.to_string(), "define=DEBUG");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(CompileOption::parse("").is_err());
        assert!(CompileOption::parse("Bad").is_err());
        assert!(CompileOption::parse("9lives").is_err());
        assert!(CompileOption::parse("define=").is_err());
        assert!(CompileOption::parse("define=a b").is_err());
        assert!(CompileOption::parse("{d, 'FOO'}").is_err());
    }

    #[test]
    fn debug_info_is_implicit() {
        let effective = opts(&[]).effective();
        assert_eq!(effective, vec!["debug_info"]);

        let resolved = opts(&[]).resolve_for(Path::new("a.kl")).unwrap();
        assert!(resolved.has(DEBUG_INFO));
    }

    #[test]
    fn debug_info_can_be_overridden() {
        let resolved = opts(&["no_debug_info"]).resolve_for(Path::new("a.kl")).unwrap();
        assert!(!resolved.has(DEBUG_INFO));
        assert_eq!(opts(&["no_debug_info"]).effective(), vec!["no_debug_info"]);

        let explicit = opts(&["debug_info=full"]).effective();
        assert_eq!(explicit, vec!["debug_info=full"]);
    }

    #[test]
    fn effective_is_order_insensitive() {
        let a = opts(&["warnings_as_errors", "define=X"]).effective();
        let b = opts(&["define=X", "warnings_as_errors"]).effective();
        assert_eq!(a, b);
    }

    #[test]
    fn adding_an_option_changes_effective_set() {
        assert_ne!(opts(&[]).effective(), opts(&["warnings_as_errors"]).effective());
    }

    #[test]
    fn malformed_option_names_file() {
        let err = opts(&["Not An Option"])
            .resolve_for(Path::new("/p/src/net.kl"))
            .unwrap_err();
        match err {
            CompileError::Configuration { file, reason } => {
                assert_eq!(file, Path::new("/p/src/net.kl"));
                assert!(reason.contains("Not An Option"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn deterministic_from_switch_or_option() {
        assert!(CompileOptions::new(&[], true).deterministic());
        assert!(opts(&["deterministic"]).deterministic());
        assert!(!opts(&[]).deterministic());
        assert!(CompileOptions::new(&[], true)
            .effective()
            .contains(&"deterministic".to_string()));
    }

    #[test]
    fn warnings_as_errors_flag() {
        let resolved = opts(&["warnings_as_errors"])
            .resolve_for(Path::new("a.kl"))
            .unwrap();
        assert!(resolved.warnings_as_errors());
    }
}
