//! Kiln CLI: the command-line front end of the incremental compilation driver.
//!
//! Provides `kiln build` for incremental builds, `kiln clean` for removing
//! build output, and `kiln diagnostics` for printing the diagnostics recorded
//! by the last build.

#![warn(missing_docs)]

mod build;
mod clean;
mod diagnostics;
mod pipeline;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Kiln: an incremental compilation driver.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln incremental compilation driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Default log filter when `RUST_LOG` is unset (e.g. `info`, `kiln_driver=debug`).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `kiln.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every stale source of the project.
    Build(BuildArgs),
    /// Remove all build output recorded in the manifest.
    Clean,
    /// Print the diagnostics recorded by the last build.
    Diagnostics(DiagnosticsArgs),
}

/// Arguments for the `kiln build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Recompile every source, stale or not.
    #[arg(long)]
    pub force: bool,

    /// Print a line for every file actually compiled.
    #[arg(short, long)]
    pub verbose: bool,

    /// Report compile errors as a failed result instead of aborting.
    #[arg(long)]
    pub return_errors: bool,

    /// Include cached warnings of unchanged files.
    #[arg(long)]
    pub all_warnings: bool,

    /// Output format for the build result.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `kiln diagnostics` subcommand.
#[derive(Parser, Debug)]
pub struct DiagnosticsArgs {
    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.quiet);
    tracing::debug!(command = ?cli.command, "starting kiln");

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Clean => clean::run(&global),
        Command::Diagnostics(ref args) => diagnostics::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides `level`.
fn init_tracing(level: &str, quiet: bool) {
    let default = if quiet { "error" } else { level };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["kiln", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(!args.force);
                assert!(!args.verbose);
                assert!(!args.return_errors);
                assert!(!args.all_warnings);
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_flags() {
        let cli = Cli::parse_from([
            "kiln",
            "build",
            "--force",
            "--verbose",
            "--return-errors",
            "--all-warnings",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(args.force);
                assert!(args.verbose);
                assert!(args.return_errors);
                assert!(args.all_warnings);
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_verbose_short() {
        let cli = Cli::parse_from(["kiln", "build", "-v"]);
        match cli.command {
            Command::Build(ref args) => assert!(args.verbose),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_clean() {
        let cli = Cli::parse_from(["kiln", "clean"]);
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn parse_diagnostics_json() {
        let cli = Cli::parse_from(["kiln", "diagnostics", "--format", "json"]);
        match cli.command {
            Command::Diagnostics(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Diagnostics command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "kiln",
            "--quiet",
            "--color",
            "never",
            "--log-level",
            "debug",
            "build",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kiln", "clean", "--config", "/p/kiln.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/p/kiln.toml"));
    }

    #[test]
    fn log_level_defaults_to_warn() {
        let cli = Cli::parse_from(["kiln", "build"]);
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["kiln", "build", "--fast"]).is_err());
    }
}
