//! Module names derived from source file stems.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The name of a compiled module.
///
/// Every source file defines exactly one module named after its file stem,
/// and the module's artifact is named deterministically from it. Names must
/// be non-empty and contain only ASCII alphanumerics, `_` or `-`, so they can
/// be used as file names on every platform.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleName(String);

/// A file stem that cannot be used as a module name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid module name '{0}'")]
pub struct InvalidModuleName(pub String);

impl ModuleName {
    /// Validates and wraps a module name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidModuleName> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(name))
        } else {
            Err(InvalidModuleName(name))
        }
    }

    /// Derives the module name from a source path's file stem.
    pub fn from_source(path: &Path) -> Result<Self, InvalidModuleName> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| InvalidModuleName(path.display().to_string()))?;
        Self::new(stem)
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModuleName {
    type Error = InvalidModuleName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleName> for String {
    fn from(name: ModuleName) -> Self {
        name.0
    }
}
