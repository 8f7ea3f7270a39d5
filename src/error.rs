//! Error kinds reported by builtins, external launches and redirection.

use std::path::PathBuf;

/// A failure captured inside a [`CommandResult`](crate::command::CommandResult).
///
/// None of these abort the interpreter: they are rendered with `Display`
/// and routed to the error stream (or the `2>` target) by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    /// Name is neither a builtin nor an executable on the search path.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// Builtin invoked without a required argument.
    #[error("{0}: missing operand")]
    MissingOperand(&'static str),

    /// `cd` target does not exist or is not a directory.
    #[error("cd: {0}: No such file or directory")]
    PathNotFound(String),

    #[error("home directory could not be found")]
    HomeDirectoryUnavailable,

    #[error("current directory could not be found")]
    WorkingDirectoryUnavailable,

    /// A per-operand read target does not exist.
    #[error("{command}: {path}: No such file or directory")]
    FileNotFound { command: &'static str, path: String },

    #[error("{command}: {path}: {reason}")]
    FileUnreadable {
        command: &'static str,
        path: String,
        reason: String,
    },

    /// Spawn failure or non-zero exit. Carries the captured diagnostic.
    #[error("{0}")]
    ExternalLaunchFailure(String),

    #[error("{}: cannot create redirection target: {reason}", .path.display())]
    RedirectionTargetUnwritable { path: PathBuf, reason: String },

    /// `type` was asked about a name that resolves nowhere.
    #[error("{0}: not found")]
    NotFound(String),

    /// Builtin argument parser rejected the arguments; holds its usage text.
    #[error("{0}")]
    InvalidArguments(String),
}
