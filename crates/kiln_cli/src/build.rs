//! `kiln build`: one incremental build of the current project.

use kiln_diagnostics::Diagnostic;
use kiln_driver::{BuildError, BuildOptions, BuildOutcome, Driver, LoadedModules, Status};

use crate::pipeline::{count_by_severity, load_project, render_diagnostics};
use crate::{BuildArgs, GlobalArgs, ReportFormat};

/// Runs the `kiln build` command.
///
/// Returns exit code 0 for an `ok` or `noop` build and 1 when a file failed.
/// Without `--return-errors` a failed build is raised after its diagnostics
/// are printed.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!("{:>12} {} ({})", "Building", project.name, project.root.display());
    }

    let options = BuildOptions {
        force: args.force,
        verbose: args.verbose && !global.quiet,
        return_errors: args.return_errors,
        all_warnings: args.all_warnings,
    };

    // A fresh process has nothing loaded; the table only sees this build.
    let mut modules = LoadedModules::new();
    let driver = Driver::from_project(project);

    match driver.build(&options, &mut modules) {
        Ok(outcome) => {
            report(&outcome, args, global);
            Ok(exit_code(outcome.status))
        }
        Err(BuildError::CompileFailed { diagnostics }) => {
            let outcome = BuildOutcome {
                status: Status::Error,
                diagnostics,
            };
            report(&outcome, args, global);
            Err(BuildError::CompileFailed {
                diagnostics: outcome.diagnostics,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Prints the diagnostics and a summary line for `outcome`.
///
/// A no-op build replays its cached diagnostics only with `--all-warnings`.
fn report(outcome: &BuildOutcome, args: &BuildArgs, global: &GlobalArgs) {
    if args.format == ReportFormat::Json {
        println!("{}", outcome_json(outcome));
        return;
    }

    if outcome.status != Status::Noop || args.all_warnings {
        eprint!(
            "{}",
            render_diagnostics(&outcome.diagnostics, ReportFormat::Text, global.color)
        );
    }

    if !global.quiet {
        eprintln!("{:>12} {}", "Finished", summary(outcome.status, &outcome.diagnostics));
    }
}

fn summary(status: Status, diagnostics: &[Diagnostic]) -> String {
    let (errors, warnings) = count_by_severity(diagnostics);
    match status {
        Status::Noop => "nothing to compile".to_string(),
        Status::Ok => format!("{warnings} warning(s)"),
        Status::Error => format!("with {errors} error(s), {warnings} warning(s)"),
    }
}

fn outcome_json(outcome: &BuildOutcome) -> serde_json::Value {
    serde_json::json!({
        "status": outcome.status.to_string(),
        "diagnostics": outcome.diagnostics,
    })
}

fn exit_code(status: Status) -> i32 {
    match status {
        Status::Ok | Status::Noop => 0,
        Status::Error => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_diagnostics::Position;

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(Status::Ok), 0);
        assert_eq!(exit_code(Status::Noop), 0);
        assert_eq!(exit_code(Status::Error), 1);
    }

    #[test]
    fn summary_lines() {
        let diags = vec![
            Diagnostic::warning("klc", "/p/a.kl", "unused", Position::line(1)),
            Diagnostic::error("klc", "/p/b.kl", "bad", Position::line(2)),
        ];
        assert_eq!(summary(Status::Noop, &[]), "nothing to compile");
        assert_eq!(summary(Status::Ok, &diags[..1]), "1 warning(s)");
        assert_eq!(
            summary(Status::Error, &diags),
            "with 1 error(s), 1 warning(s)"
        );
    }

    #[test]
    fn json_outcome_shape() {
        let outcome = BuildOutcome {
            status: Status::Ok,
            diagnostics: vec![Diagnostic::warning(
                "klc",
                "/p/a.kl",
                "unused",
                Position::new(4, 3),
            )],
        };
        let json = outcome_json(&outcome);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["diagnostics"][0]["message"], "unused");
        assert_eq!(json["diagnostics"][0]["severity"], "warning");
    }
}
