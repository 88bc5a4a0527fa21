//! Operating-system family detection.

use serde::{Deserialize, Serialize};

/// Operating-system family, determining which tools are used to list
/// sockets and terminate processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Linux and macOS (`lsof`, `ss`, signals).
    Unix,
    /// Windows (`netstat`, `tasklist`, `taskkill`).
    Windows,
    /// Anything else. Inventories are empty and kills fail.
    Unsupported,
}

impl Platform {
    /// Detect the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(any(target_os = "linux", target_os = "macos")) {
            Platform::Unix
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Unsupported
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Unix => "unix",
            Platform::Windows => "windows",
            Platform::Unsupported => "unsupported",
        }
    }
}
