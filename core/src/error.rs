//! Error types for the portmanager-core library.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for portmanager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port inventory and process management.
#[derive(Error, Debug)]
pub enum Error {
    /// A system utility could not be started.
    #[error("{tool} is unavailable: {reason}")]
    SourceUnavailable { tool: String, reason: String },

    /// A system utility did not finish within its time limit.
    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    /// Terminating a process failed. Carries the diagnostic of the
    /// underlying mechanism.
    #[error("Failed to kill process {pid}: {diagnostic}")]
    TerminationFailed { pid: u32, diagnostic: String },

    /// The port is listening but no owning process could be attributed.
    #[error("No owning process known for port {0}")]
    NoOwner(u16),

    /// A user-supplied port number was rejected.
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}
