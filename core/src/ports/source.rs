//! Port source port (interface).

use crate::domain::RawPort;

/// Port for listing listening TCP sockets.
///
/// Implementations shell out to platform utilities and parse their text
/// output. They never fail: a missing, broken or slow tool yields an empty
/// or partial list.
pub trait PortSource: Send + Sync {
    /// List raw `(port, pid, name)` tuples in source precedence order.
    fn list_ports(&self) -> impl std::future::Future<Output = Vec<RawPort>> + Send;
}
