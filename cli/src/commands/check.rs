//! Check command - probe whether a port is free.

use anyhow::Result;
use portmanager_core::{PlatformInventory, PortRecord, PortState};

pub async fn run(inventory: &PlatformInventory, port: u16, json: bool) -> Result<()> {
    let record = if inventory.is_free(port).await {
        PortRecord::free(port)
    } else {
        // The probe says busy; the inventory may or may not know the owner
        inventory
            .find_owner(port)
            .await
            .unwrap_or_else(|| PortRecord::listening(port, None, None))
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    match (record.state, record.pid) {
        (PortState::Free, _) => println!("Port :{} is free", port),
        (_, Some(pid)) => println!(
            "Port :{} is in use by {} (PID: {})",
            port, record.process_name, pid
        ),
        (_, None) => println!("Port :{} is in use", port),
    }
    Ok(())
}
