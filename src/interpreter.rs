use crate::command::{Command, CommandResult, ExitCode, Outcome};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::run_external;
use crate::lexer;
use crate::output::Aggregate;
use crate::redirect;
use crate::registry::Registry;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use std::path::Path;

/// What the read loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit(ExitCode),
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`] and an immutable [`Registry`] that is
/// consulted to resolve command names. See [`Default`] for the configuration
/// used by the binary.
///
/// Example
/// ```
/// use minishell::{Control, Interpreter};
/// let mut sh = Interpreter::default();
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let control = sh.run_line("echo 'hello   world'", &mut out, &mut err).unwrap();
/// assert_eq!(control, Control::Continue);
/// assert_eq!(out, b"hello   world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    registry: Registry,
}

impl Interpreter {
    pub fn new(env: Environment, registry: Registry) -> Self {
        Self { env, registry }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs `name` with already resolved arguments (no redirection operators).
    ///
    /// Builtins decide for themselves how many results they produce. External
    /// per-operand utilities are spawned once per argument; every other
    /// external command is spawned once with the whole vector.
    pub fn dispatch(&mut self, name: &str, args: &[String]) -> Outcome {
        match self.registry.resolve(name, &self.env) {
            Some(Command::Builtin(handler)) => {
                log::debug!("builtin {name} {args:?}");
                handler(args, &mut self.env, &self.registry)
            }
            Some(Command::External(path)) => Outcome::Finished(self.spawn(&path, name, args)),
            None => Outcome::single(CommandResult::failure(ShellError::CommandNotFound(
                name.to_string(),
            ))),
        }
    }

    fn spawn(&self, path: &Path, name: &str, args: &[String]) -> Vec<CommandResult> {
        let per_operand = path
            .file_name()
            .and_then(|base| base.to_str())
            .is_some_and(|base| self.registry.is_per_operand(base));
        if per_operand && !args.is_empty() {
            log::debug!("external {} once per operand: {:?}", path.display(), args);
            args.iter()
                .map(|arg| run_external(path, name, std::slice::from_ref(arg), &self.env.vars))
                .collect()
        } else {
            log::debug!("external {} {:?}", path.display(), args);
            vec![run_external(path, name, args, &self.env.vars)]
        }
    }

    /// Tokenizes, resolves redirections, dispatches and writes the aggregated
    /// payloads for one input line.
    ///
    /// Command failures are reported on `err` (or the `2>` target) and never
    /// surface as `Err`; only failures to write to `out`/`err` do.
    pub fn run_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<Control> {
        let mut tokens = lexer::split_into_tokens(line).into_iter();
        let Some(name) = tokens.next() else {
            return Ok(Control::Continue);
        };
        let (args, descriptor) = redirect::split_redirections(tokens.collect());

        match self.dispatch(&name, &args) {
            Outcome::Terminate(code) => {
                log::debug!("exit requested with status {code}");
                Ok(Control::Exit(code))
            }
            Outcome::Finished(results) => {
                Aggregate::collect(&results).emit(&descriptor, out, err)?;
                Ok(Control::Continue)
            }
        }
    }

    /// Read-Eval-Print Loop over the terminal until `exit` or end of input.
    ///
    /// Returns the status the process should exit with. Ctrl-C drops the
    /// current line and prompts again.
    pub fn repl(&mut self, prompt: &str) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new().context("failed to initialise line editor")?;

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let control =
                        self.run_line(&line, &mut io::stdout().lock(), &mut io::stderr().lock())?;
                    if let Control::Exit(code) = control {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(0),
                Err(err) => return Err(err).context("failed to read input line"),
            }
        }
    }
}

impl Default for Interpreter {
    /// Process environment plus [`Registry::default`].
    fn default() -> Self {
        Self::new(Environment::new(), Registry::default())
    }
}
