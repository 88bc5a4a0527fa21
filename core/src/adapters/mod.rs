//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod command;
pub mod killer;
pub mod probe;
pub mod source;

// Re-export main types for convenience
pub use killer::PlatformTerminator;
pub use source::PlatformSource;
