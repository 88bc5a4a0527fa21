//! Port source adapters.
//!
//! Platform-specific implementations of socket listing. The strategy is
//! chosen once from [`Platform`] when the source is built.

pub mod unix;
pub mod windows;

mod utils;

use crate::config::EngineConfig;
use crate::domain::{Platform, RawPort};
use crate::ports::PortSource;

pub use unix::UnixSource;
pub use windows::WindowsSource;

/// The port source for the running platform.
pub enum PlatformSource {
    Unix(UnixSource),
    Windows(WindowsSource),
    /// No known tooling. Always lists nothing.
    Unsupported,
}

impl PlatformSource {
    /// Create the source matching `config.platform`.
    pub fn new(config: &EngineConfig) -> Self {
        match config.platform {
            Platform::Unix => PlatformSource::Unix(UnixSource::new(config)),
            Platform::Windows => PlatformSource::Windows(WindowsSource::new(config)),
            Platform::Unsupported => PlatformSource::Unsupported,
        }
    }
}

impl PortSource for PlatformSource {
    async fn list_ports(&self) -> Vec<RawPort> {
        match self {
            PlatformSource::Unix(source) => source.list_ports().await,
            PlatformSource::Windows(source) => source.list_ports().await,
            PlatformSource::Unsupported => Vec::new(),
        }
    }
}
