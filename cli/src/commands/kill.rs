//! Kill commands - reclaim ports by terminating their owners.

use anyhow::{bail, Result};
use portmanager_core::{parse_port_list, PlatformInventory};
use serde_json::json;

/// Kill the owners of a comma-separated port list.
pub async fn run(inventory: &PlatformInventory, input: &str, json: bool) -> Result<()> {
    let ports = parse_port_list(input)?;

    if let [port] = ports.as_slice() {
        return run_single(inventory, *port, json).await;
    }

    let report = inventory.kill_many_report(ports.iter().copied()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Done: killed {} / failed {} / not listening {}",
            report.killed, report.failed, report.skipped
        );
    }

    if report.failed > 0 {
        bail!("{} of {} ports could not be reclaimed", report.failed, ports.len());
    }
    Ok(())
}

async fn run_single(inventory: &PlatformInventory, port: u16, json: bool) -> Result<()> {
    match inventory.kill_port(port).await? {
        Some(port) => {
            if json {
                println!("{}", json!({ "killed": port }));
            } else {
                println!("Killed process on port :{}", port);
            }
        }
        None => {
            if json {
                println!("{}", json!({ "killed": null, "port": port }));
            } else {
                println!("Nothing is listening on port :{}", port);
            }
        }
    }
    Ok(())
}

/// Kill a process by PID.
pub async fn run_pid(
    inventory: &PlatformInventory,
    pid: u32,
    port: Option<u16>,
    json: bool,
) -> Result<()> {
    match port {
        Some(port) => {
            inventory.kill_one(port, pid).await?;
        }
        None => inventory.kill_pid(pid).await?,
    }

    if json {
        println!("{}", json!({ "killed": pid }));
    } else {
        println!("Killed process {}", pid);
    }
    Ok(())
}
