//! Merging per-invocation results into one stdout and one stderr payload,
//! and writing them to the console or to redirection targets.

use crate::command::CommandResult;
use crate::error::ShellError;
use crate::redirect::RedirectionDescriptor;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// The two payloads of one command line, trailing newline already trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub stdout: String,
    pub stderr: String,
}

impl Aggregate {
    /// Partitions `results` into successes with output and failures, and
    /// concatenates each side in order.
    ///
    /// Outputs are joined as-is, relying on their own trailing newlines.
    /// Each error message is newline-terminated before joining. Both payloads
    /// then lose exactly one trailing newline.
    pub fn collect(results: &[CommandResult]) -> Self {
        let mut stdout = String::new();
        let mut stderr = String::new();

        for result in results {
            match result.error() {
                Some(error) => push_line(&mut stderr, &error.to_string()),
                None if result.has_output() => stdout.push_str(result.output()),
                None => {}
            }
        }

        Self {
            stdout: trim_one_newline(stdout),
            stderr: trim_one_newline(stderr),
        }
    }

    /// Writes each non-empty payload to its redirection file (created or
    /// truncated, no newline added) or to `out`/`err` (one newline added).
    ///
    /// An unwritable stdout target is reported through the error payload; an
    /// unwritable stderr target is reported on `err`, followed by the payload.
    /// Only failures to write to `out`/`err` themselves are returned.
    pub fn emit(
        mut self,
        descriptor: &RedirectionDescriptor,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<()> {
        if !self.stdout.is_empty() {
            match &descriptor.stdout {
                Some(path) => {
                    if let Err(e) = write_target(path, &self.stdout) {
                        if !self.stderr.is_empty() {
                            self.stderr.push('\n');
                        }
                        self.stderr.push_str(&e.to_string());
                    }
                }
                None => {
                    writeln!(out, "{}", self.stdout).context("failed to write to standard output")?
                }
            }
        }

        if !self.stderr.is_empty() {
            match &descriptor.stderr {
                Some(path) => {
                    if let Err(e) = write_target(path, &self.stderr) {
                        writeln!(err, "{e}\n{}", self.stderr)
                            .context("failed to write to standard error")?;
                    }
                }
                None => {
                    writeln!(err, "{}", self.stderr).context("failed to write to standard error")?
                }
            }
        }

        out.flush().context("failed to flush standard output")?;
        err.flush().context("failed to flush standard error")?;
        Ok(())
    }
}

fn push_line(buf: &mut String, line: &str) {
    buf.push_str(line);
    if !line.ends_with('\n') {
        buf.push('\n');
    }
}

fn trim_one_newline(mut payload: String) -> String {
    if payload.ends_with('\n') {
        payload.pop();
    }
    payload
}

fn write_target(path: &Path, payload: &str) -> Result<(), ShellError> {
    fs::write(path, payload).map_err(|e| {
        log::warn!("cannot write redirection target {}: {}", path.display(), e);
        ShellError::RedirectionTargetUnwritable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })
}
