//! List command - show all listening ports.

use anyhow::Result;
use portmanager_core::{PlatformInventory, PortRecord};

pub async fn run(
    inventory: &PlatformInventory,
    port_filter: Option<u16>,
    name_filter: Option<String>,
    json: bool,
) -> Result<()> {
    let ports = filter(inventory.refresh().await, port_filter, name_filter.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("No listening ports found.");
        return Ok(());
    }

    // Table header
    println!("{:<7} {:<8} {:<8} PROCESS", "PORT", "PID", "STATE");
    println!("{}", "-".repeat(60));

    for port in &ports {
        let pid = port
            .pid
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<7} {:<8} {:<8} {}",
            port.display_port(),
            pid,
            port.state,
            truncate(&port.process_name, 40)
        );
    }

    println!("\nTotal: {} ports", ports.len());
    Ok(())
}

fn filter(mut ports: Vec<PortRecord>, port: Option<u16>, query: Option<&str>) -> Vec<PortRecord> {
    if let Some(p) = port {
        ports.retain(|record| record.port == p);
    }
    if let Some(query) = query {
        ports.retain(|record| record.matches_search(query));
    }
    ports
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
