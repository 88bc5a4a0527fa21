//! Application layer - Use case services.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod inventory_service;

pub use inventory_service::{InventoryService, PlatformInventory};
