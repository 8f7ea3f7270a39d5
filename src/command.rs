use crate::env::Environment;
use crate::error::ShellError;
use crate::registry::Registry;
use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Outcome of one atomic unit of execution: a builtin call, or one external
/// invocation for one operand.
///
/// A result either failed or succeeded, never both. The constructors are the
/// only way to build one, which keeps `error` and meaningful output apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    output: String,
    has_output: bool,
    error: Option<ShellError>,
}

impl CommandResult {
    /// Successful execution that produced `output` (possibly empty).
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            has_output: true,
            error: None,
        }
    }

    /// Successful execution with nothing to print, e.g. `cd`.
    pub fn silent() -> Self {
        Self {
            output: String::new(),
            has_output: false,
            error: None,
        }
    }

    pub fn failure(error: ShellError) -> Self {
        Self {
            output: String::new(),
            has_output: false,
            error: Some(error),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn has_output(&self) -> bool {
        self.has_output
    }

    pub fn error(&self) -> Option<&ShellError> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<ShellError> for CommandResult {
    fn from(error: ShellError) -> Self {
        Self::failure(error)
    }
}

/// What the dispatcher hands back for one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Ordered per-invocation results, ready for aggregation.
    Finished(Vec<CommandResult>),
    /// The read loop should stop and the process exit with this status.
    /// Aggregation is skipped entirely.
    Terminate(ExitCode),
}

impl Outcome {
    pub fn single(result: CommandResult) -> Self {
        Outcome::Finished(vec![result])
    }
}

/// Entry point of a builtin, monomorphised per builtin type by the registry.
pub type BuiltinHandler = fn(&[String], &mut Environment, &Registry) -> Outcome;

/// A command name resolved to something runnable.
#[derive(Clone)]
pub enum Command {
    Builtin(BuiltinHandler),
    External(PathBuf),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Builtin(_) => f.write_str("Builtin"),
            Command::External(path) => f.debug_tuple("External").field(path).finish(),
        }
    }
}
