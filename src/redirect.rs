//! Separation of `>`, `1>` and `2>` redirections from command arguments.

use std::path::PathBuf;

const STDOUT_OPERATORS: &[&str] = &[">", "1>"];
const STDERR_OPERATORS: &[&str] = &["2>"];

/// Where a command's aggregated streams should go instead of the console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectionDescriptor {
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

impl RedirectionDescriptor {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none()
    }
}

/// Scans `args` (command name already removed) for redirection operators.
///
/// Returns how many leading arguments belong to the command, and the
/// descriptor. The scan runs from the last token to the first and every
/// recognised operator overwrites its stream's path, so when an operator is
/// repeated the leftmost occurrence wins. The command keeps only the tokens
/// before the leftmost operator. An operator in the last position has no
/// path and is left as a literal argument.
pub fn find_descriptor(args: &[String]) -> (usize, RedirectionDescriptor) {
    let mut descriptor = RedirectionDescriptor::default();
    let mut keep = args.len();

    for i in (0..args.len()).rev() {
        let Some(target) = args.get(i + 1) else {
            continue;
        };
        let op = args[i].as_str();
        if STDOUT_OPERATORS.contains(&op) {
            descriptor.stdout = Some(PathBuf::from(target));
        } else if STDERR_OPERATORS.contains(&op) {
            descriptor.stderr = Some(PathBuf::from(target));
        } else {
            continue;
        }
        keep = keep.min(i);
    }

    (keep, descriptor)
}

/// Convenience over [`find_descriptor`] that truncates `args` in place.
pub fn split_redirections(mut args: Vec<String>) -> (Vec<String>, RedirectionDescriptor) {
    let (keep, descriptor) = find_descriptor(&args);
    args.truncate(keep);
    if !descriptor.is_empty() {
        log::debug!("redirections: {:?}, args: {:?}", descriptor, args);
    }
    (args, descriptor)
}
