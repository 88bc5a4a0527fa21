//! Bounded invocation of external utilities.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render as a single line for diagnostics.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Diagnostic text for a failed command: stderr, else stdout, else the
    /// exit status.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with {}", self.status)
    }
}

/// Run a command to completion, abandoning it after `timeout`.
///
/// A non-zero exit is not an error here; callers inspect `status`. The child
/// is killed if the timeout elapses.
pub async fn run(tool: &ToolCommand, timeout: Duration) -> Result<CommandOutput> {
    let mut cmd = Command::new(&tool.program);
    cmd.args(&tool.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(Error::SourceUnavailable {
                tool: tool.program.clone(),
                reason: e.to_string(),
            })
        }
        Err(_) => {
            return Err(Error::Timeout {
                tool: tool.program.clone(),
                after: timeout,
            })
        }
    };

    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a listing command and return its stdout.
///
/// A non-zero exit keeps whatever was printed, since lsof exits 1 on any
/// warning while still listing sockets. A missing binary or a timeout
/// yields an empty string.
pub async fn capture_stdout(tool: &ToolCommand, timeout: Duration) -> String {
    match run(tool, timeout).await {
        Ok(output) if output.status.success() => output.stdout,
        Ok(output) => {
            debug!(
                command = %tool.display(),
                status = %output.status,
                "Listing command exited unsuccessfully"
            );
            output.stdout
        }
        Err(e) => {
            debug!(command = %tool.display(), error = %e, "Listing command unavailable");
            String::new()
        }
    }
}
