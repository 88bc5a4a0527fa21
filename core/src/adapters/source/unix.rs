//! Linux and macOS port source using lsof, with ss as a fallback.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::adapters::command::{self, ToolCommand};
use crate::config::EngineConfig;
use crate::domain::RawPort;
use crate::ports::PortSource;

use super::utils::{parse_pid, trailing_port};

/// Minimum column count of an lsof data line.
const LSOF_MIN_COLUMNS: usize = 9;

/// Index of the NAME (address:port) column in lsof output.
const LSOF_NAME_COLUMN: usize = 8;

/// Minimum column count of an ss data line.
const SS_MIN_COLUMNS: usize = 5;

/// Index of the local address column in ss output.
const SS_LOCAL_COLUMN: usize = 3;

static SS_PID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"pid=(\d+)").unwrap());
static SS_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\("([^"]+)""#).unwrap());

/// Unix port source.
pub struct UnixSource {
    lsof: ToolCommand,
    ss: ToolCommand,
    timeout: Duration,
}

impl UnixSource {
    /// Create a source using the system `lsof` and `ss`.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_tools(
            ToolCommand::new("lsof", ["-iTCP", "-sTCP:LISTEN", "-nP"]),
            ToolCommand::new("ss", ["-tlnp"]),
            config.command_timeout,
        )
    }

    /// Create a source with explicit commands.
    pub fn with_tools(lsof: ToolCommand, ss: ToolCommand, timeout: Duration) -> Self {
        Self { lsof, ss, timeout }
    }
}

impl PortSource for UnixSource {
    /// List listening ports.
    ///
    /// Executes: `lsof -iTCP -sTCP:LISTEN -nP`, then `ss -tlnp` only when
    /// lsof produced nothing usable.
    ///
    /// Flags explained:
    /// - -iTCP -sTCP:LISTEN: only listening TCP sockets
    /// - -n -P: numeric hosts and ports
    /// - ss -t -l -n -p: TCP, listening, numeric, with processes
    async fn list_ports(&self) -> Vec<RawPort> {
        let output = command::capture_stdout(&self.lsof, self.timeout).await;
        let mut ports = parse_lsof_output(&output);

        if ports.is_empty() {
            debug!("lsof reported no listening ports, falling back to ss");
            let output = command::capture_stdout(&self.ss, self.timeout).await;
            ports = parse_ss_output(&output);
        }

        ports.sort_by_key(|p| p.port);
        ports
    }
}

/// Parse one lsof line.
///
/// Expected format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
pub fn parse_lsof_line(line: &str) -> Option<RawPort> {
    let components: Vec<&str> = line.split_whitespace().collect();
    if components.len() < LSOF_MIN_COLUMNS {
        return None;
    }

    let port = trailing_port(components[LSOF_NAME_COLUMN])?;
    let pid = parse_pid(components[1]);
    let process_name = components[0]
        .replace("\\x20", " ") // Space
        .replace("\\x2f", "/"); // Slash

    Some(RawPort::new(port, pid, Some(process_name)))
}

/// Parse full lsof output, skipping the header and keeping the first
/// owner of each port.
pub fn parse_lsof_output(output: &str) -> Vec<RawPort> {
    let mut seen: HashSet<u16> = HashSet::new();

    output
        .lines()
        .skip(1)
        .filter_map(parse_lsof_line)
        .filter(|p| seen.insert(p.port))
        .collect()
}

/// Parse one ss line.
///
/// Expected format:
/// ```text
/// State  Recv-Q Send-Q Local Address:Port  Peer Address:Port Process
/// LISTEN 0      4096       127.0.0.1:631        0.0.0.0:*     users:(("cupsd",pid=812,fd=7))
/// ```
///
/// The process column is missing when the caller may not inspect the
/// owning process; such lines yield `pid = None` and no name.
pub fn parse_ss_line(line: &str) -> Option<RawPort> {
    let components: Vec<&str> = line.split_whitespace().collect();
    if components.len() < SS_MIN_COLUMNS {
        return None;
    }

    let port = trailing_port(components[SS_LOCAL_COLUMN])?;

    let process_field = components[SS_MIN_COLUMNS..].join(" ");
    let pid = SS_PID
        .captures(&process_field)
        .and_then(|caps| caps[1].parse().ok());
    let process_name = SS_NAME
        .captures(&process_field)
        .map(|caps| caps[1].to_string());

    Some(RawPort::new(port, pid, process_name))
}

/// Parse full ss output, skipping the header.
pub fn parse_ss_output(output: &str) -> Vec<RawPort> {
    output.lines().skip(1).filter_map(parse_ss_line).collect()
}
