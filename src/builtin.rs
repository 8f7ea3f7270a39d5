use crate::command::{CommandResult, ExitCode, Outcome};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::find_command_path;
use crate::registry::Registry;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process. They never see redirection
/// operators and never write to a stream themselves: everything they have to
/// say goes into the returned [`Outcome`].
pub trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Every argument is an operand, even one starting with `-`.
    ///
    /// Set for builtins whose operands are paths or numbers. Option parsing,
    /// `--help` included, is then off.
    const OPERANDS_ONLY: bool = false;

    /// Executes the command against the interpreter's environment.
    ///
    /// `registry` is the configuration the command was found in, for builtins
    /// that need to reason about other commands (`type`).
    fn execute(self, env: &mut Environment, registry: &Registry) -> Outcome;
}

/// Parses `args` for `T` and runs it.
///
/// An [`EarlyExit`] from the parser (`--help`, unknown flag) is not fatal: help
/// text becomes ordinary output, a usage error becomes an
/// [`ShellError::InvalidArguments`] result.
pub(crate) fn invoke<T: BuiltinCommand>(
    args: &[String],
    env: &mut Environment,
    registry: &Registry,
) -> Outcome {
    let mut argv: Vec<&str> = Vec::with_capacity(args.len() + 1);
    if T::OPERANDS_ONLY {
        argv.push("--");
    }
    argv.extend(args.iter().map(String::as_str));
    match T::from_args(&[T::name()], &argv) {
        Ok(cmd) => cmd.execute(env, registry),
        Err(EarlyExit { output, status }) => Outcome::single(match status {
            Ok(()) => CommandResult::success(output),
            Err(()) => CommandResult::failure(ShellError::InvalidArguments(output)),
        }),
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {
    #[argh(positional, greedy)]
    /// ignored
    pub ignored: Vec<String>,
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, _env: &mut Environment, _registry: &Registry) -> Outcome {
        Outcome::single(match env::current_dir() {
            Ok(dir) => CommandResult::success(format!("{}\n", dir.display())),
            Err(_) => CommandResult::failure(ShellError::WorkingDirectoryUnavailable),
        })
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute, relative to the current directory, or starting with `~`.
    pub target: Option<String>,
}

impl Cd {
    fn resolve_target(target: &str, env: &Environment) -> Result<PathBuf, ShellError> {
        let rest = match target.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return Ok(PathBuf::from(target)),
        };
        let home = env.home_dir().ok_or(ShellError::HomeDirectoryUnavailable)?;
        Ok(home.join(rest.trim_start_matches('/')))
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    const OPERANDS_ONLY: bool = true;

    fn execute(self, env: &mut Environment, _registry: &Registry) -> Outcome {
        let Some(target) = self.target else {
            return Outcome::single(ShellError::MissingOperand("cd").into());
        };
        let new_dir = match Cd::resolve_target(&target, env) {
            Ok(dir) => dir,
            Err(e) => return Outcome::single(e.into()),
        };

        let not_found = || ShellError::PathNotFound(new_dir.display().to_string());
        let result = fs::canonicalize(&new_dir)
            .ok()
            .filter(|dir| dir.is_dir())
            .ok_or_else(not_found)
            .and_then(|dir| env::set_current_dir(&dir).map_err(|_| not_found()));

        Outcome::single(match result {
            Ok(()) => {
                log::debug!("cd: now in {}", new_dir.display());
                CommandResult::silent()
            }
            Err(e) => CommandResult::failure(e),
        })
    }
}

#[derive(FromArgs)]
/// Exit the shell with the given status (0 when omitted, 1 when not a number).
pub struct Exit {
    #[argh(positional, greedy)]
    /// exit status; only the first value is used
    pub args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    const OPERANDS_ONLY: bool = true;

    fn execute(self, _env: &mut Environment, _registry: &Registry) -> Outcome {
        let code = match self.args.first() {
            None => 0,
            Some(arg) => arg.parse::<ExitCode>().unwrap_or(1),
        };
        Outcome::Terminate(code)
    }
}

/// Write the arguments to standard output, separated by spaces.
///
/// Every argument is printed as-is, including ones that look like flags, so
/// this one implements `FromArgs` by hand instead of deriving it.
pub struct Echo {
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Echo {
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, _env: &mut Environment, _registry: &Registry) -> Outcome {
        Outcome::single(CommandResult::success(format!("{}\n", self.args.join(" "))))
    }
}

#[derive(FromArgs)]
/// Tell how each name would be interpreted if used as a command.
pub struct Type {
    #[argh(positional, greedy)]
    /// command names to look up
    pub names: Vec<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    const OPERANDS_ONLY: bool = true;

    fn execute(self, env: &mut Environment, registry: &Registry) -> Outcome {
        if self.names.is_empty() {
            return Outcome::single(ShellError::MissingOperand("type").into());
        }
        let search_path = env.search_path();
        let results = self
            .names
            .into_iter()
            .map(|name| {
                if registry.is_builtin(&name) {
                    CommandResult::success(format!("{name} is a shell builtin\n"))
                } else if let Some(path) = find_command_path(&search_path, Path::new(&name)) {
                    CommandResult::success(format!("{name} is {}\n", path.display()))
                } else {
                    CommandResult::failure(ShellError::NotFound(name))
                }
            })
            .collect();
        Outcome::Finished(results)
    }
}

#[derive(FromArgs)]
/// print file(s) to stdout
pub struct Cat {
    #[argh(positional, greedy)]
    /// files to print, each one independently
    pub files: Vec<String>,
}

impl Cat {
    fn read_one(fname: String) -> CommandResult {
        match fs::read(&fname) {
            Ok(bytes) => {
                let mut content = String::from_utf8_lossy(&bytes).into_owned();
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                CommandResult::success(content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                CommandResult::failure(ShellError::FileNotFound {
                    command: "cat",
                    path: fname,
                })
            }
            Err(e) => CommandResult::failure(ShellError::FileUnreadable {
                command: "cat",
                path: fname,
                reason: e.to_string(),
            }),
        }
    }
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    const OPERANDS_ONLY: bool = true;

    fn execute(self, _env: &mut Environment, _registry: &Registry) -> Outcome {
        if self.files.is_empty() {
            return Outcome::single(ShellError::MissingOperand("cat").into());
        }
        Outcome::Finished(self.files.into_iter().map(Cat::read_one).collect())
    }
}
