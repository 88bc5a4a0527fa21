//! Engine configuration and the optional settings file.
//!
//! [`EngineConfig`] is built once at startup and passed by reference into
//! the adapters. The embedding shell may override its defaults from
//! `~/.portmanager/config.json`.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::Platform;
use crate::error::{Error, Result};

/// Time allowed for a port-listing utility.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for a termination command.
pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Time allowed for a loopback bind attempt.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Suggested range for `scan` when the caller gives no bounds.
pub const DEFAULT_SCAN_FROM: u16 = 3000;
pub const DEFAULT_SCAN_TO: u16 = 9999;

/// Immutable process-wide settings for the inventory engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub platform: Platform,
    pub command_timeout: Duration,
    pub kill_timeout: Duration,
    pub probe_timeout: Duration,
    pub scan_from: u16,
    pub scan_to: u16,
}

impl EngineConfig {
    /// Defaults for the given platform.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            kill_timeout: DEFAULT_KILL_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            scan_from: DEFAULT_SCAN_FROM,
            scan_to: DEFAULT_SCAN_TO,
        }
    }

    /// The default scan range.
    pub fn scan_range(&self) -> RangeInclusive<u16> {
        self.scan_from..=self.scan_to
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

/// Settings stored in JSON format. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    #[serde(default = "default_kill_timeout_ms")]
    pub kill_timeout_ms: u64,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_scan_from")]
    pub scan_from: u16,

    #[serde(default = "default_scan_to")]
    pub scan_to: u16,
}

fn default_command_timeout_ms() -> u64 {
    DEFAULT_COMMAND_TIMEOUT.as_millis() as u64
}

fn default_kill_timeout_ms() -> u64 {
    DEFAULT_KILL_TIMEOUT.as_millis() as u64
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT.as_millis() as u64
}

fn default_scan_from() -> u16 {
    DEFAULT_SCAN_FROM
}

fn default_scan_to() -> u16 {
    DEFAULT_SCAN_TO
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_timeout_ms: default_command_timeout_ms(),
            kill_timeout_ms: default_kill_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            scan_from: default_scan_from(),
            scan_to: default_scan_to(),
        }
    }
}

impl Settings {
    /// Freeze these settings into an engine configuration.
    pub fn to_engine_config(&self, platform: Platform) -> EngineConfig {
        EngineConfig {
            platform,
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            kill_timeout: Duration::from_millis(self.kill_timeout_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            scan_from: self.scan_from,
            scan_to: self.scan_to,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.command_timeout_ms == 0 || self.kill_timeout_ms == 0 || self.probe_timeout_ms == 0
        {
            return Err(Error::Config("timeouts must be greater than zero".to_string()));
        }
        if self.scan_from == 0 || self.scan_to == 0 {
            return Err(Error::Config("scan bounds must be 1-65535".to_string()));
        }
        Ok(())
    }
}

/// Configuration store for reading and writing [`Settings`].
///
/// Default location: `~/.portmanager/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portmanager").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load settings from disk.
    ///
    /// Returns default settings if the file doesn't exist.
    pub async fn load(&self) -> Result<Settings> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}
