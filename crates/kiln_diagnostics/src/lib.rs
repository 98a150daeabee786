//! The uniform diagnostic shape reported by the Kiln compilation driver.
//!
//! Every message produced by the external toolchain is normalized into a
//! [`Diagnostic`] with a fixed set of fields, so that diagnostics can be
//! compared structurally, cached in the build manifest, and rendered by
//! [`DiagnosticRenderer`] implementations for the terminal or as JSON.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod renderer;
pub mod severity;

pub use diagnostic::{Diagnostic, Position};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
