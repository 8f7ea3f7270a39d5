//! A small interactive command interpreter.
//!
//! One input line goes through four stages: the [`lexer`] resolves quotes and
//! backslash escapes into argument tokens, [`redirect`] pulls `>`, `1>` and
//! `2>` targets out of the arguments, the [`Interpreter`] dispatches the
//! command to a builtin from the [`Registry`] or to an external program found
//! on `PATH`, and [`output`] merges the per-invocation results into one
//! stdout and one stderr payload written to the console or to files.
//!
//! Builtins implement [`builtin::BuiltinCommand`] and parse their arguments
//! with [`argh`]. Failures are values ([`error::ShellError`] inside a
//! [`command::CommandResult`]); only `exit` ends the session.

pub mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod lexer;
pub mod output;
pub mod redirect;
pub mod registry;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Control, Interpreter};
pub use registry::Registry;

#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
