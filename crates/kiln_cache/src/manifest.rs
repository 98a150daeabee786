//! The persisted build manifest.
//!
//! The manifest is stored as `.kiln-manifest.json` in the output directory. It
//! records, for every source that has been compiled at least once, the
//! fingerprint of its last successful compile, the artifact it produced and
//! the diagnostics reported for it, together with the option set the build
//! ran with.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kiln_common::{ContentHash, ModuleName};
use kiln_diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};

use crate::artifact::{remove_if_exists, write_durably};
use crate::error::CacheError;

/// Name of the manifest file within the output directory.
pub const MANIFEST_FILE: &str = ".kiln-manifest.json";

/// Top-level manifest tracking every compiled source.
///
/// Entries are keyed by absolute source path in a `BTreeMap`, so "manifest
/// order" is path order and is stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Kiln version that produced this manifest. Invalidate on version change.
    pub kiln_version: String,

    /// Effective toolchain options the entries were compiled with.
    pub options: Vec<String>,

    /// Per-source state, keyed by absolute source path.
    pub entries: BTreeMap<PathBuf, ManifestEntry>,

    /// Diagnostics returned by the build that wrote this manifest, in the
    /// order they were returned. A no-op build hands these back unchanged.
    #[serde(default)]
    pub reported: Vec<Diagnostic>,
}

/// Recorded state for a single source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Module defined by the source.
    pub module: ModuleName,

    /// Fingerprint at the last successful compile, or `None` when the most
    /// recent attempt failed (such entries are always stale).
    pub fingerprint: Option<ContentHash>,

    /// Artifact produced by the last successful compile, if any.
    pub artifact: Option<PathBuf>,

    /// Diagnostics reported by the most recent compile of this source.
    pub diagnostics: Vec<Diagnostic>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new(kiln_version: &str, options: Vec<String>) -> Self {
        Self {
            kiln_version: kiln_version.to_string(),
            options,
            entries: BTreeMap::new(),
            reported: Vec::new(),
        }
    }

    /// Returns `true` if this manifest was produced by a compatible Kiln version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.kiln_version == current_version
    }

    /// Returns `true` if the entries were compiled with a different option set.
    pub fn options_changed(&self, options: &[String]) -> bool {
        self.options != options
    }

    /// All cached diagnostics in manifest order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .values()
            .flat_map(|entry| entry.diagnostics.iter().cloned())
            .collect()
    }
}

/// Loads and persists the manifest of one output directory.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    /// Output directory holding the manifest.
    output_dir: PathBuf,

    /// Kiln version string for compatibility checks.
    kiln_version: String,
}

impl ManifestStore {
    /// Creates a store for the manifest of `output_dir`.
    pub fn new(output_dir: &Path, kiln_version: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            kiln_version: kiln_version.to_string(),
        }
    }

    /// Path of the manifest file.
    pub fn path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE)
    }

    /// Returns `true` if a manifest file exists on disk.
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Loads the manifest, or an empty one if none exists yet.
    ///
    /// This is fail-safe: a corrupt manifest or one written by another Kiln
    /// version loads as empty, which triggers a full rebuild.
    pub fn load(&self) -> Manifest {
        let path = self.path();
        let empty = || Manifest::new(&self.kiln_version, Vec::new());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return empty(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable manifest, rebuilding");
                return empty();
            }
        };

        match serde_json::from_str::<Manifest>(&content) {
            Ok(manifest) if manifest.is_compatible(&self.kiln_version) => manifest,
            Ok(manifest) => {
                tracing::info!(
                    found = %manifest.kiln_version,
                    current = %self.kiln_version,
                    "manifest from another version, rebuilding"
                );
                empty()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt manifest, rebuilding");
                empty()
            }
        }
    }

    /// Atomically replaces the persisted manifest.
    ///
    /// Creates the output directory if it doesn't exist.
    pub fn save(&self, manifest: &Manifest) -> Result<(), CacheError> {
        let json =
            serde_json::to_string_pretty(manifest).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        write_durably(&self.path(), json.as_bytes())
    }

    /// Deletes the persisted manifest. Returns `false` if there was none.
    pub fn remove(&self) -> Result<bool, CacheError> {
        remove_if_exists(&self.path())
    }
}
