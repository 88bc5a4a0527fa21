//! Scan command - count used and free ports in a range.

use anyhow::Result;
use portmanager_core::PlatformInventory;
use serde_json::json;

pub async fn run(
    inventory: &PlatformInventory,
    from: Option<u16>,
    to: Option<u16>,
    json: bool,
) -> Result<()> {
    let from = from.unwrap_or(inventory.config().scan_from);
    let to = to.unwrap_or(inventory.config().scan_to);

    let summary = inventory.scan_range(from, to).await;

    if json {
        println!(
            "{}",
            json!({ "from": from, "to": to, "used": summary.used, "free": summary.free })
        );
    } else {
        println!(
            "Ports {}-{}: {} used, {} free",
            from, to, summary.used, summary.free
        );
    }
    Ok(())
}
