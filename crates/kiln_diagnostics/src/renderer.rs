//! Diagnostic rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a sequence of diagnostics, preserving their order.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags.iter().map(|d| self.render(d)).collect()
    }
}

/// Renders diagnostics in a compact terminal format.
///
/// Produces output like:
/// ```text
/// warning: variable 'x' is unused
///   --> src/net.kl:4:3 (klc_lint)
/// ```
/// When the diagnostic points into a different file than the source being
/// compiled, a `compiling` line names the source as well.
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        let code = match severity {
            Severity::Warning => "33",
            Severity::Error => "31",
        };
        format!("\x1b[1;{code}m{severity}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.header(diag.severity), diag.message);

        if diag.position.line > 0 {
            out.push_str(&format!(
                "  --> {}:{} ({})\n",
                diag.file.display(),
                diag.position,
                diag.compiler_name
            ));
        } else {
            out.push_str(&format!(
                "  --> {} ({})\n",
                diag.file.display(),
                diag.compiler_name
            ));
        }

        if diag.file != diag.source {
            out.push_str(&format!("   = compiling: {}\n", diag.source.display()));
        }

        out
    }
}

/// Renders each diagnostic as one line of JSON.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        // Serializing a struct of strings and integers cannot fail.
        let mut line = serde_json::to_string(diag).unwrap_or_default();
        line.push('\n');
        line
    }
}
