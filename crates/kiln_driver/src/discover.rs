//! Source discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kiln_cache::{CacheError, SourceFile};
use kiln_common::ModuleName;

use crate::error::BuildError;

/// Finds every source with extension `ext` under `source_dirs`.
///
/// Each directory is walked recursively and sorted by path; directories
/// contribute in configured order. Missing directories contribute nothing.
/// Every file is fingerprinted, and two files deriving the same module name
/// are rejected.
pub fn discover_sources(source_dirs: &[PathBuf], ext: &str) -> Result<Vec<SourceFile>, BuildError> {
    let mut sources = Vec::new();
    let mut owners: BTreeMap<ModuleName, PathBuf> = BTreeMap::new();

    for dir in source_dirs {
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "source directory does not exist");
            continue;
        }

        let mut paths = Vec::new();
        walk_dir(dir, ext, &mut paths)?;
        paths.sort();

        for path in paths {
            let source = SourceFile::read(&path)?;
            if let Some(first) = owners.get(&source.module) {
                return Err(BuildError::DuplicateModule {
                    module: source.module,
                    first: first.clone(),
                    second: path,
                });
            }
            owners.insert(source.module.clone(), path);
            sources.push(source);
        }
    }

    Ok(sources)
}

fn walk_dir(dir: &Path, ext: &str, out: &mut Vec<PathBuf>) -> Result<(), CacheError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CacheError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, ext, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
    Ok(())
}
