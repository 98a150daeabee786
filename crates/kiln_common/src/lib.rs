//! Shared foundational types used across the Kiln compilation driver.
//!
//! Provides content fingerprints for staleness detection and validated module
//! names derived from source file names.

#![warn(missing_docs)]

pub mod hash;
pub mod module_name;

pub use hash::ContentHash;
pub use module_name::{InvalidModuleName, ModuleName};
