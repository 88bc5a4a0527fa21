//! Windows port source using netstat and tasklist.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::adapters::command::{self, ToolCommand};
use crate::config::EngineConfig;
use crate::domain::RawPort;
use crate::ports::PortSource;

use super::utils::{parse_pid, trailing_port};

/// Index of the local address column in netstat output.
const NETSTAT_LOCAL_COLUMN: usize = 1;

static TASKLIST_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)","(\d+)""#).unwrap());

/// Windows port source.
pub struct WindowsSource {
    netstat: ToolCommand,
    tasklist: ToolCommand,
    timeout: Duration,
}

impl WindowsSource {
    /// Create a source using the system `netstat` and `tasklist`.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_tools(
            ToolCommand::new("netstat", ["-ano", "-p", "TCP"]),
            ToolCommand::new("tasklist", ["/fo", "csv", "/nh"]),
            config.command_timeout,
        )
    }

    /// Create a source with explicit commands.
    pub fn with_tools(netstat: ToolCommand, tasklist: ToolCommand, timeout: Duration) -> Self {
        Self {
            netstat,
            tasklist,
            timeout,
        }
    }
}

impl PortSource for WindowsSource {
    /// List listening ports.
    ///
    /// Executes `netstat -ano -p TCP` and `tasklist /fo csv /nh` concurrently.
    /// A failed tasklist only costs the process names.
    async fn list_ports(&self) -> Vec<RawPort> {
        let (netstat, tasklist) = tokio::join!(
            command::capture_stdout(&self.netstat, self.timeout),
            command::capture_stdout(&self.tasklist, self.timeout),
        );

        let names = parse_tasklist_output(&tasklist);
        let mut ports = attribute_names(parse_netstat_output(&netstat), &names);
        ports.sort_by_key(|p| p.port);
        ports
    }
}

/// Parse one netstat line, keeping only listening sockets.
///
/// Expected format:
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
///   TCP    [::]:445               [::]:0                 LISTENING       4
/// ```
pub fn parse_netstat_line(line: &str) -> Option<RawPort> {
    if !line.contains("LISTENING") {
        return None;
    }

    let components: Vec<&str> = line.split_whitespace().collect();
    let port = trailing_port(components.get(NETSTAT_LOCAL_COLUMN)?)?;
    let pid = components.last().and_then(|field| parse_pid(field));

    Some(RawPort::new(port, pid, None))
}

/// Parse full netstat output, keeping the first owner of each port.
pub fn parse_netstat_output(output: &str) -> Vec<RawPort> {
    let mut seen: HashSet<u16> = HashSet::new();

    output
        .lines()
        .filter_map(parse_netstat_line)
        .filter(|p| seen.insert(p.port))
        .collect()
}

/// Parse one `tasklist /fo csv /nh` line into `(pid, name)`.
///
/// Expected format:
/// ```text
/// "node.exe","5432","Console","1","45,000 K"
/// ```
pub fn parse_tasklist_line(line: &str) -> Option<(u32, String)> {
    let caps = TASKLIST_ENTRY.captures(line)?;
    let pid = caps[2].parse().ok()?;
    Some((pid, caps[1].to_string()))
}

/// Build the PID to process name table.
pub fn parse_tasklist_output(output: &str) -> HashMap<u32, String> {
    output.lines().filter_map(parse_tasklist_line).collect()
}

/// Fill in process names from the tasklist table. Unknown PIDs keep no
/// name and are labelled `PID:<pid>` during normalization.
pub fn attribute_names(ports: Vec<RawPort>, names: &HashMap<u32, String>) -> Vec<RawPort> {
    ports
        .into_iter()
        .map(|mut port| {
            port.process_name = port.pid.and_then(|pid| names.get(&pid).cloned());
            port
        })
        .collect()
}
