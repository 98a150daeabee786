//! Staleness analysis.
//!
//! Compares the current source tree against the manifest to decide which
//! sources must be compiled, which recorded artifacts must be removed, and
//! which entries are unchanged and can contribute cached diagnostics.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_common::{ContentHash, ModuleName};

use crate::error::CacheError;
use crate::manifest::{Manifest, ManifestEntry};

/// A source file discovered in this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the source.
    pub path: PathBuf,
    /// Module the source defines (its file stem).
    pub module: ModuleName,
    /// Fingerprint of the current contents.
    pub fingerprint: ContentHash,
}

impl SourceFile {
    /// Reads a source file, fingerprinting its contents and deriving its module.
    pub fn read(path: &Path) -> Result<Self, CacheError> {
        let module = ModuleName::from_source(path).map_err(|e| CacheError::InvalidSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let fingerprint = ContentHash::of_file(path).map_err(|e| CacheError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            module,
            fingerprint,
        })
    }
}

/// The work a build has to do.
#[derive(Debug, Clone, Default)]
pub struct WorkPlan {
    /// Sources to compile, in file-scan order.
    pub to_compile: Vec<SourceFile>,

    /// Entries whose source no longer exists, in manifest order.
    pub to_remove: Vec<(PathBuf, ManifestEntry)>,

    /// Sources whose entry is up to date, in manifest order.
    pub unchanged: Vec<PathBuf>,
}

impl WorkPlan {
    /// Returns `true` if nothing needs compiling or removing.
    pub fn is_noop(&self) -> bool {
        self.to_compile.is_empty() && self.to_remove.is_empty()
    }
}

/// Decides what a build must do.
pub struct StalenessAnalyzer;

impl StalenessAnalyzer {
    /// Classifies every source and manifest entry.
    ///
    /// A source is compiled when it has no entry, its fingerprint differs
    /// from the recorded one (or the last attempt failed), `force` is set,
    /// or `options_changed` is set. Entries without a live source are
    /// scheduled for removal.
    pub fn analyze(
        sources: &[SourceFile],
        manifest: &Manifest,
        force: bool,
        options_changed: bool,
    ) -> WorkPlan {
        let mut to_compile = Vec::new();
        let mut up_to_date = BTreeSet::new();

        for source in sources {
            let fresh = manifest
                .entries
                .get(&source.path)
                .is_some_and(|entry| entry.fingerprint == Some(source.fingerprint));
            if fresh && !force && !options_changed {
                up_to_date.insert(source.path.as_path());
            } else {
                to_compile.push(source.clone());
            }
        }

        let live: BTreeSet<&Path> = sources.iter().map(|s| s.path.as_path()).collect();
        let mut to_remove = Vec::new();
        let mut unchanged = Vec::new();

        for (path, entry) in &manifest.entries {
            if !live.contains(path.as_path()) {
                to_remove.push((path.clone(), entry.clone()));
            } else if up_to_date.contains(path.as_path()) {
                unchanged.push(path.clone());
            }
        }

        WorkPlan {
            to_compile,
            to_remove,
            unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &str, content: &[u8]) -> SourceFile {
        let path = PathBuf::from(path);
        SourceFile {
            module: ModuleName::from_source(&path).unwrap(),
            path,
            fingerprint: ContentHash::from_bytes(content),
        }
    }

    fn record(manifest: &mut Manifest, src: &SourceFile, fingerprint: Option<ContentHash>) {
        manifest.entries.insert(
            src.path.clone(),
            ManifestEntry {
                module: src.module.clone(),
                fingerprint,
                artifact: Some(PathBuf::from(format!("/out/{}.klo", src.module))),
                diagnostics: Vec::new(),
            },
        );
    }

    #[test]
    fn read_fingerprints_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.kl");
        std::fs::write(&path, "module net").unwrap();

        let src = SourceFile::read(&path).unwrap();
        assert_eq!(src.module.as_str(), "net");
        assert_eq!(src.fingerprint, ContentHash::from_bytes(b"module net"));
    }

    #[test]
    fn read_rejects_bad_module_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad name.kl");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            SourceFile::read(&path),
            Err(CacheError::InvalidSource { .. })
        ));
    }

    #[test]
    fn read_nonexistent_errors() {
        assert!(SourceFile::read(Path::new("/nonexistent/a.kl")).is_err());
    }

    #[test]
    fn all_new_sources_compile() {
        let manifest = Manifest::new("0.1.0", Vec::new());
        let sources = vec![source("/src/a.kl", b"a"), source("/src/b.kl", b"b")];

        let plan = StalenessAnalyzer::analyze(&sources, &manifest, false, false);
        assert_eq!(plan.to_compile, sources);
        assert!(plan.to_remove.is_empty());
        assert!(plan.unchanged.is_empty());
        assert!(!plan.is_noop());
    }

    #[test]
    fn matching_fingerprints_are_unchanged() {
        let a = source("/src/a.kl", b"a");
        let mut manifest = Manifest::new("0.1.0", Vec::new());
        record(&mut manifest, &a, Some(a.fingerprint));

        let plan = StalenessAnalyzer::analyze(&[a.clone()], &manifest, false, false);
        assert!(plan.is_noop());
        assert_eq!(plan.unchanged, vec![a.path]);
    }

    #[test]
    fn modified_source_compiles() {
        let a = source("/src/a.kl", b"new");
        let mut manifest = Manifest::new("0.1.0", Vec::new());
        record(&mut manifest, &a, Some(ContentHash::from_bytes(b"old")));

        let plan = StalenessAnalyzer::analyze(&[a.clone()], &manifest, false, false);
        assert_eq!(plan.to_compile, vec![a]);
        assert!(plan.unchanged.is_empty());
    }

    #[test]
    fn failed_entry_is_always_stale() {
        let a = source("/src/a.kl", b"a");
        let mut manifest = Manifest::new("0.1.0", Vec::new());
        record(&mut manifest, &a, None);

        let plan = StalenessAnalyzer::analyze(&[a.clone()], &manifest, false, false);
        assert_eq!(plan.to_compile, vec![a]);
    }

    #[test]
    fn force_recompiles_everything() {
        let a = source("/src/a.kl", b"a");
        let mut manifest = Manifest::new("0.1.0", Vec::new());
        record(&mut manifest, &a, Some(a.fingerprint));

        let plan = StalenessAnalyzer::analyze(&[a.clone()], &manifest, true, false);
        assert_eq!(plan.to_compile, vec![a]);
        assert!(plan.unchanged.is_empty());
    }

    #[test]
    fn options_change_recompiles_everything() {
        let a = source("/src/a.kl", b"a");
        let b = source("/src/b.kl", b"b");
        let mut manifest = Manifest::new("0.1.0", Vec::new());
        record(&mut manifest, &a, Some(a.fingerprint));
        record(&mut manifest, &b, Some(b.fingerprint));

        let plan = StalenessAnalyzer::analyze(&[a, b], &manifest, false, true);
        assert_eq!(plan.to_compile.len(), 2);
    }

    #[test]
    fn deleted_source_is_removed() {
        let a = source("/src/a.kl", b"a");
        let gone = source("/src/gone.kl", b"gone");
        let mut manifest = Manifest::new("0.1.0", Vec::new());
        record(&mut manifest, &a, Some(a.fingerprint));
        record(&mut manifest, &gone, Some(gone.fingerprint));

        let plan = StalenessAnalyzer::analyze(&[a], &manifest, false, false);
        assert_eq!(plan.to_remove.len(), 1);
        assert_eq!(plan.to_remove[0].0, PathBuf::from("/src/gone.kl"));
        assert!(plan.to_compile.is_empty());
        assert!(!plan.is_noop());
    }

    #[test]
    fn to_compile_keeps_scan_order() {
        let manifest = Manifest::new("0.1.0", Vec::new());
        let sources = vec![source("/src/z.kl", b"z"), source("/gen/a.kl", b"a")];
        let plan = StalenessAnalyzer::analyze(&sources, &manifest, false, false);
        let names: Vec<_> = plan.to_compile.iter().map(|s| s.module.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
