//! Incremental compilation bookkeeping.
//!
//! This crate owns the persisted build manifest, decides which sources are
//! stale relative to it, and places and removes compiled artifacts in the
//! output directory. Writes are durable before the manifest refers to them,
//! so an interrupted build never leaves the manifest ahead of the disk.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod manifest;
pub mod stale;

pub use artifact::ArtifactStore;
pub use error::CacheError;
pub use manifest::{Manifest, ManifestEntry, ManifestStore, MANIFEST_FILE};
pub use stale::{SourceFile, StalenessAnalyzer, WorkPlan};
