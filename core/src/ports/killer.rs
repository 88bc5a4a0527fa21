//! Process terminator port (interface).

use crate::error::Result;

/// Port for killing processes.
///
/// Implementations terminate forcefully (SIGKILL, `taskkill /F`). A failure
/// is reported as [`crate::Error::TerminationFailed`] carrying the
/// diagnostic of the underlying mechanism.
pub trait ProcessTerminator: Send + Sync {
    /// Forcefully terminate the process with the given PID.
    fn terminate(&self, pid: u32) -> impl std::future::Future<Output = Result<()>> + Send;
}
