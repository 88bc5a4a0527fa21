//! PortManager Core Library
//!
//! Cross-platform inventory of listening TCP ports with process reclamation.
//! Provides functionality to:
//! - List listening TCP ports and their owning processes
//! - Kill port owners individually or in bulk
//! - Count used and free ports in a range
//! - Probe whether a single port is bindable right now
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux / macOS: `lsof`, falling back to `ss`; SIGKILL
//! - Windows: `netstat` and `tasklist`; `taskkill /F`
//! - Anything else: empty inventories

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    parse_port_list, validate_port, BulkKillReport, Platform, PortRecord, PortState, RawPort,
    ScanSummary,
};

// Re-export other commonly used types
pub use adapters::probe::{is_free, is_free_within};
pub use application::{InventoryService, PlatformInventory};
pub use config::{ConfigStore, EngineConfig, Settings};
pub use error::{Error, Result};
pub use ports::{PortSource, ProcessTerminator};
