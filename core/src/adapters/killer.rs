//! Process termination adapters.
//!
//! Uses:
//! - `kill(2)` with SIGKILL on Unix
//! - `taskkill /F /PID <pid>` on Windows

use std::time::Duration;

use tracing::{debug, warn};

use crate::adapters::command::{self, ToolCommand};
use crate::config::EngineConfig;
use crate::domain::Platform;
use crate::error::{Error, Result};
use crate::ports::ProcessTerminator;

/// Unix terminator sending SIGKILL.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct SignalTerminator;

#[cfg(unix)]
impl SignalTerminator {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ProcessTerminator for SignalTerminator {
    async fn terminate(&self, pid: u32) -> Result<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // PID 0 and negative values address process groups
        let raw = i32::try_from(pid)
            .ok()
            .filter(|raw| *raw > 0)
            .ok_or_else(|| Error::TerminationFailed {
                pid,
                diagnostic: "not a valid process id".to_string(),
            })?;

        debug!(pid = pid, "Sending SIGKILL");

        kill(Pid::from_raw(raw), Signal::SIGKILL).map_err(|errno| {
            warn!(pid = pid, error = %errno, "Failed to send SIGKILL");
            Error::TerminationFailed {
                pid,
                diagnostic: errno.to_string(),
            }
        })
    }
}

/// Windows terminator running `taskkill /F /PID <pid>`.
#[derive(Debug)]
pub struct WindowsTerminator {
    program: String,
    timeout: Duration,
}

impl WindowsTerminator {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_program("taskkill", config.kill_timeout)
    }

    /// Use a different executable taking taskkill's arguments.
    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl ProcessTerminator for WindowsTerminator {
    async fn terminate(&self, pid: u32) -> Result<()> {
        let tool = ToolCommand::new(
            self.program.as_str(),
            ["/F".to_string(), "/PID".to_string(), pid.to_string()],
        );

        debug!(pid = pid, command = %tool.display(), "Executing taskkill");

        let diagnostic = match command::run(&tool, self.timeout).await {
            Ok(output) if output.status.success() => {
                debug!(pid = pid, "taskkill succeeded");
                return Ok(());
            }
            Ok(output) => output.diagnostic(),
            Err(e) => e.to_string(),
        };

        warn!(pid = pid, error = %diagnostic, "taskkill failed");
        Err(Error::TerminationFailed { pid, diagnostic })
    }
}

/// The terminator for the running platform.
#[derive(Debug)]
pub enum PlatformTerminator {
    #[cfg(unix)]
    Unix(SignalTerminator),
    Windows(WindowsTerminator),
    /// Every termination fails.
    Unsupported(Platform),
}

impl PlatformTerminator {
    /// Create the terminator matching `config.platform`.
    pub fn new(config: &EngineConfig) -> Self {
        match config.platform {
            #[cfg(unix)]
            Platform::Unix => PlatformTerminator::Unix(SignalTerminator::new()),
            Platform::Windows => PlatformTerminator::Windows(WindowsTerminator::new(config)),
            other => PlatformTerminator::Unsupported(other),
        }
    }
}

impl ProcessTerminator for PlatformTerminator {
    async fn terminate(&self, pid: u32) -> Result<()> {
        match self {
            #[cfg(unix)]
            PlatformTerminator::Unix(killer) => killer.terminate(pid).await,
            PlatformTerminator::Windows(killer) => killer.terminate(pid).await,
            PlatformTerminator::Unsupported(platform) => Err(Error::UnsupportedPlatform(format!(
                "cannot terminate processes on {}",
                platform.name()
            ))),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;

    #[tokio::test]
    async fn test_sigkill_terminates_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        SignalTerminator::new().terminate(pid).await.unwrap();

        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(9));
    }

    #[tokio::test]
    async fn test_sigkill_missing_process_fails() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        let err = SignalTerminator::new().terminate(pid).await.unwrap_err();
        match err {
            Error::TerminationFailed { pid: failed, diagnostic } => {
                assert_eq!(failed, pid);
                assert!(diagnostic.contains("ESRCH"), "{}", diagnostic);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_refuses_process_group_pids() {
        let killer = SignalTerminator::new();
        assert!(matches!(
            killer.terminate(0).await,
            Err(Error::TerminationFailed { pid: 0, .. })
        ));
        assert!(killer.terminate(u32::MAX).await.is_err());
    }

    #[tokio::test]
    async fn test_windows_terminator_reports_exit_failure() {
        let killer = WindowsTerminator::with_program("false", Duration::from_secs(5));
        let err = killer.terminate(1234).await.unwrap_err();
        assert!(matches!(err, Error::TerminationFailed { pid: 1234, .. }));
    }

    #[tokio::test]
    async fn test_windows_terminator_success() {
        let killer = WindowsTerminator::with_program("true", Duration::from_secs(5));
        assert!(killer.terminate(1234).await.is_ok());
    }

    #[tokio::test]
    async fn test_windows_terminator_missing_binary() {
        let killer =
            WindowsTerminator::with_program("/nonexistent/taskkill", Duration::from_secs(5));
        let err = killer.terminate(1234).await.unwrap_err();
        match err {
            Error::TerminationFailed { diagnostic, .. } => {
                assert!(diagnostic.contains("unavailable"), "{}", diagnostic)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_platform_fails() {
        let killer = PlatformTerminator::new(&EngineConfig::new(Platform::Unsupported));
        assert!(matches!(
            killer.terminate(1234).await,
            Err(Error::UnsupportedPlatform(_))
        ));
    }
}
