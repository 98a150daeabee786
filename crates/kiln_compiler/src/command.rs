//! A [`Toolchain`] backed by an external compiler executable.
//!
//! The executable is invoked once per file as
//! `<program> <args..> -o <object> -D<option>.. <source>` and reports through
//! its exit status:
//!
//! | status | meaning |
//! |---|---|
//! | 0 | compiled; the object was written to `-o` |
//! | 1 | compile errors |
//! | 64 | the option set was rejected |
//! | other | crash |
//!
//! Messages are read from stderr, one per line, as
//! `path:line[:column]: [warning: |error: ]text`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::toolchain::{
    CompileRequest, MessageKind, RawLocation, RawMessage, Toolchain, ToolchainFailure,
    ToolchainOutput,
};

/// Exit status for a rejected option set (`EX_USAGE`).
const EXIT_BAD_OPTIONS: i32 = 64;

/// Runs an external compiler program.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    program: String,
    args: Vec<String>,
    name: String,
    scratch_dir: PathBuf,
}

impl CommandToolchain {
    /// Creates a toolchain running `program` with fixed leading `args`.
    pub fn new(program: &str, args: &[String]) -> Self {
        let name = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program)
            .to_string();
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            name,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Writes temporary objects into `dir` instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: &Path) -> Self {
        self.scratch_dir = dir.to_path_buf();
        self
    }

    fn object_path(&self, request: &CompileRequest) -> PathBuf {
        self.scratch_dir
            .join(format!("kiln-{}-{}.obj", std::process::id(), request.module))
    }
}

impl Toolchain for CommandToolchain {
    fn name(&self) -> &str {
        &self.name
    }

    fn compile(&self, request: &CompileRequest) -> Result<ToolchainOutput, ToolchainFailure> {
        let object_path = self.object_path(request);

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg("-o").arg(&object_path);
        for option in &request.options.options {
            command.arg(format!("-D{option}"));
        }
        command.arg(&request.source);

        let output = command.output().map_err(|e| {
            ToolchainFailure::Crashed(format!("failed to run {}: {e}", self.program))
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        let result = match output.status.code() {
            Some(0) => std::fs::read(&object_path)
                .map(|object| ToolchainOutput::Compiled {
                    object,
                    messages: parse_messages(&stderr, &request.source),
                })
                .map_err(|e| {
                    ToolchainFailure::Crashed(format!(
                        "{} reported success but {} is unreadable: {e}",
                        self.program,
                        object_path.display()
                    ))
                }),
            Some(1) => Ok(ToolchainOutput::Failed {
                messages: parse_messages(&stderr, &request.source),
            }),
            Some(EXIT_BAD_OPTIONS) => Err(ToolchainFailure::RejectedOptions(
                stderr.trim().to_string(),
            )),
            Some(code) => Err(ToolchainFailure::Crashed(format!(
                "{} exited with status {code}: {}",
                self.program,
                stderr.trim()
            ))),
            None => Err(ToolchainFailure::Crashed(format!(
                "{} was terminated by a signal",
                self.program
            ))),
        };

        // The scratch object never outlives the call, whatever the status.
        let _ = std::fs::remove_file(&object_path);
        result
    }
}

/// Parses every non-empty stderr line into a message.
pub fn parse_messages(stderr: &str, source: &Path) -> Vec<RawMessage> {
    stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_message_line(line, source))
        .collect()
}

/// Parses one `path:line[:column]: [warning: |error: ]text` line.
///
/// Lines without a location become location-less messages. Messages without
/// a `warning:` prefix are errors.
pub fn parse_message_line(line: &str, source: &Path) -> RawMessage {
    let (file, location, rest) = match line.split_once(": ") {
        Some((head, rest)) => match split_location(head) {
            Some((file, location)) => (Some(file), location, rest),
            None => (None, RawLocation::None, line),
        },
        None => (None, RawLocation::None, line),
    };

    let (kind, text) = if let Some(text) = rest.strip_prefix("warning: ") {
        (MessageKind::Warning, text)
    } else if let Some(text) = rest.strip_prefix("error: ") {
        (MessageKind::Error, text)
    } else {
        (MessageKind::Error, rest)
    };

    let mut message = RawMessage {
        kind,
        pass: String::new(),
        file: None,
        location,
        text: text.trim().to_string(),
    };
    if let Some(file) = file {
        let file = PathBuf::from(file);
        if file != source {
            message.file = Some(file);
        }
    }
    message
}

/// Splits `path:line:column` or `path:line` into its parts.
fn split_location(head: &str) -> Option<(&str, RawLocation)> {
    let mut parts = head.rsplitn(3, ':');
    let last = parts.next()?;
    let middle = parts.next()?;
    if let (Some(path), Ok(line), Ok(column)) =
        (parts.next(), middle.parse::<u32>(), last.parse::<u32>())
    {
        if !path.is_empty() {
            return Some((path, RawLocation::LineColumn(line, column)));
        }
    }

    let (path, line) = head.rsplit_once(':')?;
    let line = line.parse::<u32>().ok()?;
    if path.is_empty() {
        return None;
    }
    Some((path, RawLocation::Line(line)))
}
