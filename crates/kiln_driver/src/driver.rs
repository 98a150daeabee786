//! The incremental build, clean and diagnostics operations.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use kiln_cache::{ArtifactStore, ManifestEntry, ManifestStore, StalenessAnalyzer};
use kiln_common::ModuleName;
use kiln_compiler::{CommandToolchain, CompileOptions, CompilerAdapter, Toolchain};
use kiln_config::ResolvedProject;
use kiln_diagnostics::Diagnostic;

use crate::aggregate::DiagnosticsAggregator;
use crate::discover::discover_sources;
use crate::error::BuildError;
use crate::modules::{ModuleTable, PurgeCoordinator};
use crate::report::{BuildOutcome, Reporter, Shell, Status, StderrShell};

/// Version recorded in manifests; a manifest from another version is
/// discarded.
pub const KILN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Switches for a single build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Recompile every source regardless of staleness.
    pub force: bool,
    /// Print one line per file actually compiled.
    pub verbose: bool,
    /// Return an `error` outcome instead of raising
    /// [`BuildError::CompileFailed`].
    pub return_errors: bool,
    /// Include cached diagnostics of unchanged files.
    pub all_warnings: bool,
}

/// Runs incremental builds of one project.
pub struct Driver {
    project: ResolvedProject,
    adapter: CompilerAdapter,
    manifests: ManifestStore,
    artifacts: ArtifactStore,
    shell: Arc<dyn Shell>,
}

impl Driver {
    /// Creates a driver compiling with `toolchain`.
    pub fn new(project: ResolvedProject, toolchain: Arc<dyn Toolchain>) -> Self {
        let options = CompileOptions::new(&project.options, project.deterministic);
        let adapter = CompilerAdapter::new(toolchain, options, project.jobs);
        let manifests = ManifestStore::new(&project.output_dir, KILN_VERSION);
        let artifacts = ArtifactStore::new(&project.output_dir, &project.artifact_ext);
        Self {
            project,
            adapter,
            manifests,
            artifacts,
            shell: Arc::new(StderrShell),
        }
    }

    /// Creates a driver running the toolchain program from the configuration.
    pub fn from_project(project: ResolvedProject) -> Self {
        let toolchain = CommandToolchain::new(&project.toolchain.program, &project.toolchain.args);
        Self::new(project, Arc::new(toolchain))
    }

    /// Sends progress lines to `shell` instead of stderr.
    pub fn with_shell(mut self, shell: Arc<dyn Shell>) -> Self {
        self.shell = shell;
        self
    }

    /// The project this driver builds.
    pub fn project(&self) -> &ResolvedProject {
        &self.project
    }

    /// Runs one incremental build.
    ///
    /// Compiles every stale source, installs the new artifacts into
    /// `modules`, removes the artifacts of deleted sources and rewrites the
    /// manifest. A build with nothing to do returns [`Status::Noop`] with the
    /// diagnostics the previous build returned, without touching the
    /// toolchain. It still removes orphaned artifacts, and reports
    /// [`Status::Ok`] if it found any.
    ///
    /// Configuration errors and toolchain crashes abort before anything is
    /// written. Compile failures never stop the other files; the manifest is
    /// saved for everything that succeeded before the failure is reported.
    pub fn build(
        &self,
        options: &BuildOptions,
        modules: &mut dyn ModuleTable,
    ) -> Result<BuildOutcome, BuildError> {
        let reporter = Reporter::new(self.shell.as_ref(), &self.project.root, options.verbose);

        let sources = discover_sources(&self.project.source_dirs, &self.project.source_ext)?;
        let manifest = self.manifests.load();
        let effective = self.adapter.options().effective();
        let options_changed = manifest.options_changed(&effective);

        let plan =
            StalenessAnalyzer::analyze(&sources, &manifest, options.force, options_changed);

        let live: BTreeSet<ModuleName> = sources.iter().map(|s| s.module.clone()).collect();

        if plan.is_noop() {
            let orphans = self.artifacts.gc(&live)?;
            for orphan in &orphans {
                tracing::debug!(artifact = %orphan.display(), "removed orphaned artifact");
            }
            tracing::debug!(sources = sources.len(), "nothing to compile");

            let mut diagnostics = manifest.reported.clone();
            if options.all_warnings {
                let mut seen: HashSet<Diagnostic> = diagnostics.iter().cloned().collect();
                let cached = sources
                    .iter()
                    .filter_map(|source| manifest.entries.get(&source.path))
                    .flat_map(|entry| entry.diagnostics.iter())
                    .filter(|d| seen.insert((*d).clone()))
                    .cloned()
                    .collect::<Vec<_>>();
                diagnostics.extend(cached);
            }
            let status = if orphans.is_empty() {
                Status::Noop
            } else {
                Status::Ok
            };
            return Ok(BuildOutcome {
                status,
                diagnostics,
            });
        }

        if options_changed && !manifest.entries.is_empty() {
            tracing::info!("compiler options changed, recompiling everything");
        }
        tracing::info!(
            compile = plan.to_compile.len(),
            remove = plan.to_remove.len(),
            "building {}",
            self.project.name
        );

        let results = self.adapter.compile_all(&plan.to_compile)?;

        // Single writer from here on: every per-file result is in.
        let mut next = manifest.clone();
        next.options = effective;
        let mut purge = PurgeCoordinator::new(modules);
        let mut aggregator = DiagnosticsAggregator::new(options.all_warnings);

        for (path, entry) in &plan.to_remove {
            if let Some(artifact) = &entry.artifact {
                self.artifacts.remove(artifact)?;
            }
            purge.purge(&entry.module);
            next.entries.remove(path);
            aggregator.removed();
            tracing::debug!(source = %path.display(), "source removed");
        }

        for result in results {
            match result {
                Ok(unit) => {
                    let source = unit.source;
                    let artifact = self.artifacts.place(&source.module, &unit.object)?;
                    purge.install(&source.module, &artifact)?;
                    reporter.compiled(&source.path);
                    aggregator.compiled(&unit.diagnostics);
                    next.entries.insert(
                        source.path,
                        ManifestEntry {
                            module: source.module,
                            fingerprint: Some(source.fingerprint),
                            artifact: Some(artifact),
                            diagnostics: unit.diagnostics,
                        },
                    );
                }
                Err(failed) => {
                    let source = failed.source;
                    tracing::debug!(source = %source.path.display(), "compile failed");
                    aggregator.failed(&failed.diagnostics);
                    let artifact = manifest
                        .entries
                        .get(&source.path)
                        .and_then(|entry| entry.artifact.clone());
                    next.entries.insert(
                        source.path,
                        ManifestEntry {
                            module: source.module,
                            fingerprint: None,
                            artifact,
                            diagnostics: failed.diagnostics,
                        },
                    );
                }
            }
        }

        for orphan in self.artifacts.gc(&live)? {
            tracing::debug!(artifact = %orphan.display(), "removed orphaned artifact");
            aggregator.removed();
        }

        for path in &plan.unchanged {
            if let Some(entry) = next.entries.get(path) {
                aggregator.cached(&entry.diagnostics);
            }
        }

        let outcome = aggregator.finish();
        next.reported = outcome.diagnostics.clone();
        self.manifests.save(&next)?;

        tracing::info!(
            status = %outcome.status,
            diagnostics = outcome.diagnostics.len(),
            "build finished"
        );
        reporter.finish(outcome, options.return_errors)
    }

    /// Removes every recorded artifact and the manifest, and purges the
    /// corresponding modules from `modules`.
    ///
    /// Returns `true` if anything was removed. Without a manifest this does
    /// nothing.
    pub fn clean(&self, modules: &mut dyn ModuleTable) -> Result<bool, BuildError> {
        if !self.manifests.exists() {
            return Ok(false);
        }

        let manifest = self.manifests.load();
        let mut purge = PurgeCoordinator::new(modules);
        let mut removed = false;

        for entry in manifest.entries.values() {
            if let Some(artifact) = &entry.artifact {
                removed |= self.artifacts.remove(artifact)?;
            }
            purge.purge(&entry.module);
        }
        removed |= !self.artifacts.gc(&BTreeSet::new())?.is_empty();
        removed |= self.manifests.remove()?;

        tracing::info!(removed, "cleaned {}", self.project.output_dir.display());
        Ok(removed)
    }

    /// Diagnostics recorded by the most recent build, in manifest order.
    ///
    /// Never compiles anything.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.manifests.load().diagnostics()
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifests.path()
    }
}
