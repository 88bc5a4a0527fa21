//! Example: List listening ports and tally the default scan range.

use portmanager_core::{EngineConfig, PlatformInventory};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning ports...\n");

    let config = EngineConfig::default();
    let (from, to) = (config.scan_from, config.scan_to);
    let inventory = PlatformInventory::for_platform(config);

    let ports = inventory.refresh().await;
    if ports.is_empty() {
        println!("No listening ports found.");
    } else {
        println!("{:<6} {:<8} {}", "PORT", "PID", "PROCESS");
        println!("{}", "-".repeat(40));

        for port in &ports {
            let pid = port.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            println!("{:<6} {:<8} {}", port.port, pid, port.process_name);
        }

        println!("\nTotal: {} ports", ports.len());
    }

    let summary = inventory.scan_range(from, to).await;
    println!(
        "Range {}-{}: {} used, {} free",
        from, to, summary.used, summary.free
    );
}
