//! Subcommand implementations.

pub mod check;
pub mod kill;
pub mod list;
pub mod scan;
