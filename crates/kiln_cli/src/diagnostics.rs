//! `kiln diagnostics`: prints what the last build reported, without building.

use kiln_driver::Driver;

use crate::pipeline::{load_project, render_diagnostics};
use crate::{DiagnosticsArgs, GlobalArgs, ReportFormat};

/// Runs the `kiln diagnostics` command.
pub fn run(args: &DiagnosticsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let diagnostics = Driver::from_project(project).diagnostics();

    let color = global.color && args.format == ReportFormat::Text;
    print!("{}", render_diagnostics(&diagnostics, args.format, color));

    if !global.quiet && args.format == ReportFormat::Text && diagnostics.is_empty() {
        eprintln!("no diagnostics recorded");
    }
    Ok(0)
}
