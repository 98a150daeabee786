//! The loaded-module table and the purge/load coordinator.
//!
//! Code that runs after a build must observe the freshly compiled artifact,
//! never a stale in-memory definition. The table of loaded modules is an
//! explicit capability passed into each driver operation; the
//! [`PurgeCoordinator`] is the only thing that mutates it during a build.

use std::collections::BTreeMap;
use std::path::Path;

use kiln_common::ModuleName;

use crate::error::BuildError;

/// The set of modules currently loaded by the host.
pub trait ModuleTable {
    /// Returns `true` if a definition of `module` is loaded.
    fn is_loaded(&self, module: &ModuleName) -> bool;

    /// Drops the loaded definition of `module`. Returns `false` if none was
    /// loaded.
    fn unload(&mut self, module: &ModuleName) -> bool;

    /// Loads `module` from the artifact at `artifact`.
    fn load(&mut self, module: &ModuleName, artifact: &Path) -> std::io::Result<()>;
}

/// An in-process module table holding the artifact bytes each module was
/// loaded from.
#[derive(Debug, Default, Clone)]
pub struct LoadedModules {
    modules: BTreeMap<ModuleName, Vec<u8>>,
}

impl LoadedModules {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded definition of `module`, if any.
    pub fn get(&self, module: &ModuleName) -> Option<&[u8]> {
        self.modules.get(module).map(Vec::as_slice)
    }

    /// Names of every loaded module, sorted.
    pub fn names(&self) -> impl Iterator<Item = &ModuleName> {
        self.modules.keys()
    }

    /// Number of loaded modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleTable for LoadedModules {
    fn is_loaded(&self, module: &ModuleName) -> bool {
        self.modules.contains_key(module)
    }

    fn unload(&mut self, module: &ModuleName) -> bool {
        self.modules.remove(module).is_some()
    }

    fn load(&mut self, module: &ModuleName, artifact: &Path) -> std::io::Result<()> {
        let bytes = std::fs::read(artifact)?;
        self.modules.insert(module.clone(), bytes);
        Ok(())
    }
}

/// Installs new artifacts into a [`ModuleTable`], purging old definitions.
pub struct PurgeCoordinator<'a> {
    table: &'a mut dyn ModuleTable,
}

impl<'a> PurgeCoordinator<'a> {
    /// Wraps the table this build installs into.
    pub fn new(table: &'a mut dyn ModuleTable) -> Self {
        Self { table }
    }

    /// Unloads `module` if it is loaded, then loads it from `artifact`.
    ///
    /// Returns `true` if a previous definition was purged.
    pub fn install(&mut self, module: &ModuleName, artifact: &Path) -> Result<bool, BuildError> {
        let purged = self.purge(module);
        self.table
            .load(module, artifact)
            .map_err(|source| BuildError::ModuleLoad {
                module: module.clone(),
                path: artifact.to_path_buf(),
                source,
            })?;
        Ok(purged)
    }

    /// Unloads `module` if it is loaded. Returns `true` if it was.
    pub fn purge(&mut self, module: &ModuleName) -> bool {
        if !self.table.is_loaded(module) {
            return false;
        }
        tracing::debug!(module = %module, "purging loaded module");
        self.table.unload(module)
    }
}
