//! Compiled artifact placement in the output directory.
//!
//! Each module has at most one artifact, stored at
//! `<output_dir>/<module>.<ext>`. Artifacts are written to a temporary file,
//! synced and then renamed into place, so a reader never observes a partial
//! artifact and the manifest is only updated after the rename succeeded.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use kiln_common::ModuleName;

use crate::error::CacheError;

/// Writes `data` to `path` durably: temp file, fsync, rename.
pub(crate) fn write_durably(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{file_name}.tmp"));

    let mut file = File::create(&tmp).map_err(|e| CacheError::io(&tmp, e))?;
    file.write_all(data).map_err(|e| CacheError::io(&tmp, e))?;
    file.sync_all().map_err(|e| CacheError::io(&tmp, e))?;
    drop(file);

    std::fs::rename(&tmp, path).map_err(|e| CacheError::io(path, e))
}

/// Removes a file, reporting whether it existed.
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool, CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io(path, e)),
    }
}

/// Store for per-module artifacts in the output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Directory that receives artifacts.
    output_dir: PathBuf,

    /// Artifact file extension (without the dot).
    ext: String,
}

impl ArtifactStore {
    /// Creates an artifact store rooted at the given output directory.
    pub fn new(output_dir: &Path, ext: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            ext: ext.to_string(),
        }
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the deterministic artifact path for a module.
    pub fn artifact_path(&self, module: &ModuleName) -> PathBuf {
        self.output_dir.join(format!("{module}.{}", self.ext))
    }

    /// Durably places a module's compiled artifact, replacing any previous one.
    pub fn place(&self, module: &ModuleName, data: &[u8]) -> Result<PathBuf, CacheError> {
        let path = self.artifact_path(module);
        write_durably(&path, data)?;
        Ok(path)
    }

    /// Removes an artifact. Returns `false` if it was already gone.
    pub fn remove(&self, path: &Path) -> Result<bool, CacheError> {
        remove_if_exists(path)
    }

    /// Removes artifacts whose module is not in `live`.
    ///
    /// Catches orphans the manifest no longer knows about, e.g. after the
    /// manifest was lost or the option set changed. Only files carrying the
    /// artifact extension are considered. Returns the removed paths.
    pub fn gc(&self, live: &BTreeSet<ModuleName>) -> Result<Vec<PathBuf>, CacheError> {
        let dir = &self.output_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        let entries = std::fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.ext.as_str()) {
                continue;
            }
            let is_live = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|stem| ModuleName::new(stem).ok())
                .is_some_and(|module| live.contains(&module));
            if !is_live && remove_if_exists(&path)? {
                removed.push(path);
            }
        }

        removed.sort();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(&dir.path().join("out"), "klo");
        (dir, store)
    }

    fn module(name: &str) -> ModuleName {
        ModuleName::new(name).unwrap()
    }

    #[test]
    fn artifact_path_format() {
        let (_dir, store) = make_store();
        let path = store.artifact_path(&module("net"));
        assert!(path.ends_with("out/net.klo"));
    }

    #[test]
    fn place_creates_directory_and_writes() {
        let (_dir, store) = make_store();
        let path = store.place(&module("net"), b"object v1").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"object v1");
    }

    #[test]
    fn place_replaces_previous_artifact() {
        let (_dir, store) = make_store();
        store.place(&module("net"), b"object v1").unwrap();
        let path = store.place(&module("net"), b"object v2").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"object v2");
    }

    #[test]
    fn place_leaves_no_temp_file() {
        let (_dir, store) = make_store();
        store.place(&module("net"), b"data").unwrap();
        let names: Vec<_> = std::fs::read_dir(store.output_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["net.klo"]);
    }

    #[test]
    fn remove_reports_existence() {
        let (_dir, store) = make_store();
        let path = store.place(&module("net"), b"data").unwrap();
        assert!(store.remove(&path).unwrap());
        assert!(!store.remove(&path).unwrap());
    }

    #[test]
    fn gc_removes_unknown_artifacts() {
        let (_dir, store) = make_store();
        store.place(&module("keep"), b"a").unwrap();
        let stale = store.place(&module("orphan"), b"b").unwrap();
        std::fs::write(store.output_dir().join("notes.txt"), "not an artifact").unwrap();

        let live: BTreeSet<_> = [module("keep")].into_iter().collect();
        let removed = store.gc(&live).unwrap();
        assert_eq!(removed, vec![stale]);
        assert!(store.artifact_path(&module("keep")).exists());
        assert!(store.output_dir().join("notes.txt").exists());
    }

    #[test]
    fn gc_nonexistent_dir_returns_empty() {
        let (_dir, store) = make_store();
        assert!(store.gc(&BTreeSet::new()).unwrap().is_empty());
    }
}
