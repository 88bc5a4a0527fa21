//! Live port availability checks.
//!
//! Independent of the inventory: a port may show up as listening in a
//! snapshot yet be bindable now, or the other way around.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::debug;

use crate::config::DEFAULT_PROBE_TIMEOUT;

/// Check whether `port` can be bound on the loopback interface.
pub async fn is_free(port: u16) -> bool {
    is_free_within(port, DEFAULT_PROBE_TIMEOUT).await
}

/// Check whether `port` can be bound on the loopback interface, giving up
/// after `timeout`.
///
/// The transient listener is released before returning. Any bind error
/// (in use, permission denied) reports the port as taken. Port 0 is never
/// free: binding it would pick an ephemeral port instead.
pub async fn is_free_within(port: u16, timeout: Duration) -> bool {
    if port == 0 {
        return false;
    }

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    match tokio::time::timeout(timeout, TcpListener::bind(addr)).await {
        Ok(Ok(listener)) => {
            drop(listener);
            true
        }
        Ok(Err(e)) => {
            debug!(port = port, error = %e, "Port is not bindable");
            false
        }
        Err(_) => {
            debug!(port = port, "Bind attempt timed out");
            false
        }
    }
}
