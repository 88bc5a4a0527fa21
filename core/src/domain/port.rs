//! Port inventory domain models.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest valid TCP port number.
pub const MIN_PORT: u16 = 1;

/// Highest valid TCP port number.
pub const MAX_PORT: u16 = u16::MAX;

/// Label used when neither a process name nor a PID is known.
pub const UNKNOWN_PROCESS: &str = "unknown";

// ============================================================================
// PortState
// ============================================================================

/// Observed state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortState {
    /// A process is listening on the port.
    #[default]
    Listen,
    /// Nothing is bound to the port. Only produced by probe-derived views.
    Free,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Listen => f.write_str("LISTEN"),
            PortState::Free => f.write_str("FREE"),
        }
    }
}

// ============================================================================
// RawPort
// ============================================================================

/// A `(port, pid, name)` tuple as parsed from a system utility, before
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPort {
    pub port: u16,
    pub pid: Option<u32>,
    /// Process name reported by the tool, if it reported one.
    pub process_name: Option<String>,
}

impl RawPort {
    pub fn new(port: u16, pid: Option<u32>, process_name: Option<String>) -> Self {
        Self {
            port,
            pid,
            process_name,
        }
    }
}

// ============================================================================
// PortRecord
// ============================================================================

/// One observed listening socket in an inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    /// The port number (1..=65535).
    pub port: u16,

    /// Process ID of the owner, when the source could attribute one.
    pub pid: Option<u32>,

    /// Name of the owning process, `PID:<pid>` or `"unknown"`; empty for a
    /// free port.
    pub process_name: String,

    pub state: PortState,
}

impl PortRecord {
    /// Create a listening record, synthesizing a name when none is known.
    pub fn listening(port: u16, pid: Option<u32>, process_name: Option<String>) -> Self {
        let process_name = match (process_name, pid) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Some(pid)) => format!("PID:{}", pid),
            _ => UNKNOWN_PROCESS.to_string(),
        };

        Self {
            port,
            pid,
            process_name,
            state: PortState::Listen,
        }
    }

    /// Create a record for a port the probe found bindable.
    pub fn free(port: u16) -> Self {
        Self {
            port,
            pid: None,
            process_name: String::new(),
            state: PortState::Free,
        }
    }

    /// Get the formatted port number for display (e.g., ":3000").
    pub fn display_port(&self) -> String {
        format!(":{}", self.port)
    }

    /// Check if this record matches a search query.
    ///
    /// Searches across process name, port number and PID.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_lowercase();
        self.process_name.to_lowercase().contains(&query_lower)
            || self.port.to_string().contains(&query_lower)
            || self
                .pid
                .map(|pid| pid.to_string().contains(&query_lower))
                .unwrap_or(false)
    }
}

impl From<RawPort> for PortRecord {
    fn from(raw: RawPort) -> Self {
        PortRecord::listening(raw.port, raw.pid, raw.process_name)
    }
}

impl fmt::Display for PortRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.state == PortState::Free {
            return write!(f, ":{} (free)", self.port);
        }
        match self.pid {
            Some(pid) => write!(
                f,
                ":{} (PID: {}, Process: {})",
                self.port, pid, self.process_name
            ),
            None => write!(f, ":{} (Process: {})", self.port, self.process_name),
        }
    }
}

/// Turn raw tuples into a snapshot.
///
/// Drops port 0, keeps the first tuple seen for each port and sorts the
/// result ascending by port. The sort is stable, so source order decides
/// which owner survives.
pub fn normalize(raw: impl IntoIterator<Item = RawPort>) -> Vec<PortRecord> {
    let mut seen: HashSet<u16> = HashSet::new();

    let mut records: Vec<PortRecord> = raw
        .into_iter()
        .filter(|r| r.port >= MIN_PORT)
        .filter(|r| seen.insert(r.port))
        .map(PortRecord::from)
        .collect();

    records.sort_by_key(|r| r.port);
    records
}

// ============================================================================
// Operation results
// ============================================================================

/// Used/free tally of a port range against one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub used: usize,
    pub free: usize,
}

/// Aggregate outcome of a bulk termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkKillReport {
    /// Ports whose owner was terminated.
    pub killed: usize,
    /// Ports whose owner could not be terminated.
    pub failed: usize,
    /// Requested ports that were not listening.
    pub skipped: usize,
}

// ============================================================================
// Input validation
// ============================================================================

/// Parse and validate a user-entered port number.
pub fn validate_port(value: &str) -> Result<u16> {
    let trimmed = value.trim();
    let n: u32 = trimmed
        .parse()
        .map_err(|_| Error::InvalidPort(format!("'{}' is not a number", trimmed)))?;

    if n < MIN_PORT as u32 || n > MAX_PORT as u32 {
        return Err(Error::InvalidPort(format!(
            "{} is outside {}-{}",
            n, MIN_PORT, MAX_PORT
        )));
    }

    Ok(n as u16)
}

/// Parse a comma-separated port list such as `"3000, 8080,5432"`.
///
/// Empty entries are ignored and duplicates are removed while keeping the
/// first-seen order. Any invalid entry rejects the whole list.
pub fn parse_port_list(input: &str) -> Result<Vec<u16>> {
    let mut seen = HashSet::new();
    let mut ports = Vec::new();

    for part in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let port = validate_port(part)?;
        if seen.insert(port) {
            ports.push(port);
        }
    }

    if ports.is_empty() {
        return Err(Error::InvalidPort("no ports given".to_string()));
    }

    Ok(ports)
}
