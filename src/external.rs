use crate::command::CommandResult;
use crate::error::ShellError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`, `./foo`): resolved
///   against the current directory, no PATH search.
/// - Single path component (no separators): search each directory in `search_paths`
///   (PATH, split with the platform separator) and return the first executable match.
/// - Empty path: returns `None`.
pub fn find_command_path(search_paths: &OsStr, path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return find_by_path(path);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, None) => None,
        // Single component -> search in PATH
        (Some(std::path::Component::Normal(x)), None) => find_in_path(search_paths, x),
        // Multiple components -> relative to the current dir
        _ => find_by_path(path),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let path = dir.join(cmd);
        log::trace!("probing {}", path.display());
        if let Some(path) = find_by_path(&path) {
            return Some(path);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<PathBuf> {
    if is_executable(path) {
        Some(path.to_path_buf())
    } else {
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Runs the program at `program` to completion and captures what it printed.
///
/// `name` is what the user typed; on Unix it becomes `argv[0]`. The child
/// inherits the process working directory, gets `vars` as its environment
/// and the null device as stdin.
pub fn run_external<'a>(
    program: &Path,
    name: &str,
    args: &[String],
    vars: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> CommandResult {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env_clear()
        .envs(vars)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    set_arg0(&mut cmd, name);

    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            return CommandResult::failure(ShellError::ExternalLaunchFailure(format!(
                "{name}: {e}"
            )));
        }
    };

    if output.status.success() {
        return CommandResult::success(String::from_utf8_lossy(&output.stdout));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let diagnostic = if stderr.trim().is_empty() {
        format!("{name}: {}", describe_status(output.status))
    } else {
        stderr.into_owned()
    };
    log::debug!("{} exited with {}", name, output.status);
    CommandResult::failure(ShellError::ExternalLaunchFailure(diagnostic))
}

#[cfg(unix)]
fn set_arg0(cmd: &mut Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut Command, _name: &str) {}

#[cfg(unix)]
fn describe_status(exit_status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match (exit_status.code(), exit_status.signal()) {
        (Some(code), _) => format!("exited with status {code}"),
        (None, Some(signal)) => format!("terminated by signal {signal}"),
        (None, None) => "terminated abnormally".to_string(),
    }
}

#[cfg(not(unix))]
fn describe_status(exit_status: ExitStatus) -> String {
    match exit_status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated abnormally".to_string(),
    }
}
