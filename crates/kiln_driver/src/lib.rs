//! The Kiln build driver.
//!
//! Ties the manifest, the staleness analyzer and the compiler adapter into
//! one incremental build. A build discovers the sources, decides what is
//! stale, compiles it, installs the new artifacts into the loaded-module
//! table (purging the previous definitions first), removes artifacts of
//! deleted sources, merges fresh and cached diagnostics, and rewrites the
//! manifest before reporting a [`BuildOutcome`].

#![warn(missing_docs)]

pub mod aggregate;
pub mod discover;
pub mod driver;
pub mod error;
pub mod modules;
pub mod report;

pub use aggregate::DiagnosticsAggregator;
pub use discover::discover_sources;
pub use driver::{BuildOptions, Driver, KILN_VERSION};
pub use error::BuildError;
pub use modules::{LoadedModules, ModuleTable, PurgeCoordinator};
pub use report::{BuildOutcome, Reporter, Shell, Status, StderrShell};
