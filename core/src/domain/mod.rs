//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod platform;
mod port;

// Re-export all domain types
pub use platform::Platform;
pub use port::{
    normalize, parse_port_list, validate_port, BulkKillReport, PortRecord, PortState, RawPort,
    ScanSummary, MAX_PORT, MIN_PORT, UNKNOWN_PROCESS,
};
