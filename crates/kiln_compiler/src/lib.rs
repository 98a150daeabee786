//! The compiler adapter: drives an external toolchain over a work list.
//!
//! The toolchain is reached through the [`Toolchain`] trait and reports in its
//! own native shape ([`ToolchainOutput`]). [`CompilerAdapter`] resolves the
//! option set for each file, runs every file of the work list (in parallel,
//! never stopping at the first failure), and normalizes the native output
//! into [`kiln_diagnostics::Diagnostic`]s before anything leaves this crate.

#![warn(missing_docs)]

pub mod adapter;
pub mod command;
pub mod error;
pub mod options;
pub mod toolchain;

pub use adapter::{CompiledUnit, CompilerAdapter, FailedUnit, PathMode, UnitResult};
pub use command::CommandToolchain;
pub use error::CompileError;
pub use options::{CompileOption, CompileOptions, ResolvedOptions};
pub use toolchain::{
    CompileRequest, MessageKind, RawLocation, RawMessage, Toolchain, ToolchainFailure,
    ToolchainOutput,
};
