//! Port inventory application service.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::adapters::{probe, PlatformSource, PlatformTerminator};
use crate::config::EngineConfig;
use crate::domain::{normalize, BulkKillReport, PortRecord, ScanSummary};
use crate::error::{Error, Result};
use crate::ports::{PortSource, ProcessTerminator};

/// Inventory service for the running platform.
pub type PlatformInventory = InventoryService<PlatformSource, PlatformTerminator>;

/// Application service for port inventory and reclamation.
///
/// Every query takes a fresh snapshot from the source; nothing is cached
/// between calls. Concurrent calls do not share state, but the processes
/// they kill are gone for everyone.
pub struct InventoryService<S: PortSource, K: ProcessTerminator> {
    source: S,
    terminator: K,
    config: EngineConfig,
}

impl InventoryService<PlatformSource, PlatformTerminator> {
    /// Create a service using the tools of `config.platform`.
    pub fn for_platform(config: EngineConfig) -> Self {
        let source = PlatformSource::new(&config);
        let terminator = PlatformTerminator::new(&config);
        Self::with_config(source, terminator, config)
    }
}

impl<S: PortSource, K: ProcessTerminator> InventoryService<S, K> {
    /// Create a service with the given source and terminator and default
    /// configuration.
    pub fn new(source: S, terminator: K) -> Self {
        Self::with_config(source, terminator, EngineConfig::default())
    }

    pub fn with_config(source: S, terminator: K, config: EngineConfig) -> Self {
        Self {
            source,
            terminator,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Take a snapshot of all listening ports, sorted by port.
    pub async fn refresh(&self) -> Vec<PortRecord> {
        normalize(self.source.list_ports().await)
    }

    /// Terminate `pid`, reported as the owner of `port`.
    ///
    /// Returns the port on success. Not retried.
    pub async fn kill_one(&self, port: u16, pid: u32) -> Result<u16> {
        self.terminator.terminate(pid).await?;
        debug!(port = port, pid = pid, "Killed port owner");
        Ok(port)
    }

    /// Terminate `pid` without attributing it to a port.
    pub async fn kill_pid(&self, pid: u32) -> Result<()> {
        self.terminator.terminate(pid).await?;
        debug!(pid = pid, "Killed process");
        Ok(())
    }

    /// Terminate the owner of `port` as found in a fresh snapshot.
    ///
    /// Returns `Ok(None)` when nothing listens on the port.
    pub async fn kill_port(&self, port: u16) -> Result<Option<u16>> {
        let Some(record) = self.find_owner(port).await else {
            return Ok(None);
        };
        let pid = record.pid.ok_or(Error::NoOwner(port))?;
        self.kill_one(port, pid).await.map(Some)
    }

    /// Terminate the owners of `ports`, returning how many were killed.
    ///
    /// See [`Self::kill_many_report`].
    pub async fn kill_many(&self, ports: impl IntoIterator<Item = u16>) -> usize {
        self.kill_many_report(ports).await.killed
    }

    /// Terminate the owners of `ports` and count the outcomes.
    ///
    /// Owners are resolved from a fresh snapshot, not from one the caller
    /// may hold. Ports that are not listening are skipped. A failure never
    /// stops the remaining targets. A process owning several requested
    /// ports is signalled once; `killed` counts successful terminations,
    /// not ports.
    pub async fn kill_many_report(&self, ports: impl IntoIterator<Item = u16>) -> BulkKillReport {
        let targets: BTreeSet<u16> = ports.into_iter().collect();
        let owners: HashMap<u16, Option<u32>> = self
            .refresh()
            .await
            .into_iter()
            .map(|r| (r.port, r.pid))
            .collect();

        let mut report = BulkKillReport::default();
        let mut signalled: HashSet<u32> = HashSet::new();

        for port in targets {
            let pid = match owners.get(&port) {
                None => {
                    report.skipped += 1;
                    continue;
                }
                Some(None) => {
                    debug!(port = port, "No owner to kill");
                    report.failed += 1;
                    continue;
                }
                Some(Some(pid)) => *pid,
            };

            if !signalled.insert(pid) {
                debug!(port = port, pid = pid, "Owner already signalled");
                continue;
            }

            match self.kill_one(port, pid).await {
                Ok(_) => report.killed += 1,
                Err(e) => {
                    debug!(port = port, pid = pid, error = %e, "Bulk kill target failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Count used and free ports in `from..=to` against a fresh snapshot.
    ///
    /// Membership only, no bind attempts. `from > to` counts nothing.
    pub async fn scan_range(&self, from: u16, to: u16) -> ScanSummary {
        let used_set: HashSet<u16> = self.refresh().await.iter().map(|r| r.port).collect();

        let mut summary = ScanSummary::default();
        for port in from..=to {
            if used_set.contains(&port) {
                summary.used += 1;
            } else {
                summary.free += 1;
            }
        }
        summary
    }

    /// Find the listening record for `port` in a fresh snapshot.
    pub async fn find_owner(&self, port: u16) -> Option<PortRecord> {
        self.refresh().await.into_iter().find(|r| r.port == port)
    }

    /// Check whether `port` is bindable right now, using the configured
    /// probe timeout.
    pub async fn is_free(&self, port: u16) -> bool {
        probe::is_free_within(port, self.config.probe_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::source::unix::parse_lsof_output;
    use crate::domain::{PortState, RawPort};
    use parking_lot::Mutex;
    use std::net::Ipv4Addr;

    /// Mock source for testing.
    struct MockSource {
        ports: Mutex<Vec<RawPort>>,
        calls: Mutex<usize>,
    }

    impl MockSource {
        fn new(ports: Vec<RawPort>) -> Self {
            Self {
                ports: Mutex::new(ports),
                calls: Mutex::new(0),
            }
        }

        fn from_lsof(output: &str) -> Self {
            Self::new(parse_lsof_output(output))
        }

        fn set_ports(&self, ports: Vec<RawPort>) {
            *self.ports.lock() = ports;
        }

        fn calls(&self) -> usize {
            *self.calls.lock()
        }
    }

    impl PortSource for MockSource {
        async fn list_ports(&self) -> Vec<RawPort> {
            *self.calls.lock() += 1;
            self.ports.lock().clone()
        }
    }

    /// Mock terminator: PIDs in `alive` can be killed once.
    struct MockTerminator {
        alive: Mutex<HashSet<u32>>,
        attempts: Mutex<Vec<u32>>,
    }

    impl MockTerminator {
        fn with_alive(pids: &[u32]) -> Self {
            Self {
                alive: Mutex::new(pids.iter().copied().collect()),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<u32> {
            self.attempts.lock().clone()
        }
    }

    impl ProcessTerminator for MockTerminator {
        async fn terminate(&self, pid: u32) -> Result<()> {
            self.attempts.lock().push(pid);
            if self.alive.lock().remove(&pid) {
                Ok(())
            } else {
                Err(Error::TerminationFailed {
                    pid,
                    diagnostic: "No such process".to_string(),
                })
            }
        }
    }

    fn raw(port: u16, pid: u32, name: &str) -> RawPort {
        RawPort::new(port, Some(pid), Some(name.to_string()))
    }

    fn service(
        ports: Vec<RawPort>,
        alive: &[u32],
    ) -> InventoryService<MockSource, MockTerminator> {
        InventoryService::new(MockSource::new(ports), MockTerminator::with_alive(alive))
    }

    #[tokio::test]
    async fn test_refresh_dedups_and_sorts() {
        let svc = service(
            vec![
                raw(8080, 100, "node"),
                raw(22, 1, "sshd"),
                raw(8080, 200, "java"),
                raw(0, 3, "bogus"),
            ],
            &[],
        );

        let snapshot = svc.refresh().await;
        let ports: Vec<u16> = snapshot.iter().map(|r| r.port).collect();
        assert_eq!(ports, vec![22, 8080]);
        assert_eq!(snapshot[1].pid, Some(100));
        assert!(snapshot.iter().all(|r| r.state == PortState::Listen));
    }

    #[tokio::test]
    async fn test_refresh_two_owners_of_8080_from_lsof_lines() {
        let output = "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME
node 100 dev 19u IPv4 0x1 0t0 TCP *:8080 (LISTEN)
java 200 dev 20u IPv6 0x2 0t0 TCP [::]:8080 (LISTEN)
";
        let svc = InventoryService::new(MockSource::from_lsof(output), MockTerminator::with_alive(&[]));

        let snapshot = svc.refresh().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].port, 8080);
        assert_eq!(snapshot[0].process_name, "node");
        assert_eq!(snapshot[0].pid, Some(100));
    }

    #[tokio::test]
    async fn test_refresh_empty_source() {
        let svc = service(Vec::new(), &[]);
        assert!(svc.refresh().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_is_a_fresh_snapshot() {
        let svc = service(vec![raw(3000, 1, "node")], &[]);
        let first = svc.refresh().await;

        svc.source.set_ports(vec![raw(4000, 2, "deno")]);
        let second = svc.refresh().await;

        assert_eq!(first[0].port, 3000);
        assert_eq!(second[0].port, 4000);
        assert_eq!(svc.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_kill_one() {
        let svc = service(Vec::new(), &[42]);

        assert_eq!(svc.kill_one(3000, 42).await.unwrap(), 3000);

        let err = svc.kill_one(3000, 42).await.unwrap_err();
        assert!(err.to_string().contains("No such process"));
        assert_eq!(svc.terminator.attempts(), vec![42, 42]);
    }

    #[tokio::test]
    async fn test_kill_pid() {
        let svc = service(Vec::new(), &[42]);

        svc.kill_pid(42).await.unwrap();
        assert!(matches!(
            svc.kill_pid(42).await,
            Err(Error::TerminationFailed { pid: 42, .. })
        ));
        assert_eq!(svc.terminator.attempts(), vec![42, 42]);
        assert_eq!(svc.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_kill_many_partial_failure() {
        // 3000's owner is alive, 4000's owner already exited
        let svc = service(vec![raw(3000, 10, "node"), raw(4000, 20, "ruby")], &[10]);

        assert_eq!(svc.kill_many([3000, 4000]).await, 1);
        assert_eq!(svc.terminator.attempts(), vec![10, 20]);
    }

    #[tokio::test]
    async fn test_kill_many_report_counts() {
        let svc = service(
            vec![
                raw(3000, 10, "node"),
                raw(4000, 20, "ruby"),
                RawPort::new(5000, None, None),
            ],
            &[10],
        );

        let report = svc.kill_many_report([3000, 4000, 5000, 6000]).await;
        assert_eq!(
            report,
            BulkKillReport {
                killed: 1,
                failed: 2,
                skipped: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_kill_many_uses_fresh_snapshot() {
        let svc = service(vec![raw(3000, 10, "node")], &[10, 11]);
        let stale = svc.refresh().await;
        assert_eq!(stale[0].pid, Some(10));

        // Restarted on the same port with a new PID
        svc.source.set_ports(vec![raw(3000, 11, "node")]);

        assert_eq!(svc.kill_many([3000]).await, 1);
        assert_eq!(svc.terminator.attempts(), vec![11]);
    }

    #[tokio::test]
    async fn test_kill_many_signals_shared_owner_once() {
        let svc = service(vec![raw(3000, 10, "node"), raw(3001, 10, "node")], &[10]);

        assert_eq!(svc.kill_many([3001, 3000, 3000]).await, 1);
        assert_eq!(svc.terminator.attempts(), vec![10]);
    }

    #[tokio::test]
    async fn test_kill_many_report_counts_terminations_not_ports() {
        let svc = service(
            vec![
                raw(3000, 10, "node"),
                raw(3001, 10, "node"),
                raw(4000, 20, "ruby"),
            ],
            &[10, 20],
        );

        let report = svc.kill_many_report([3000, 3001, 4000]).await;
        assert_eq!(
            report,
            BulkKillReport {
                killed: 2,
                failed: 0,
                skipped: 0,
            }
        );
        assert_eq!(svc.terminator.attempts(), vec![10, 20]);
    }

    #[tokio::test]
    async fn test_kill_many_skips_absent_ports() {
        let svc = service(vec![raw(3000, 10, "node")], &[10]);

        assert_eq!(svc.kill_many([7000, 8000]).await, 0);
        assert!(svc.terminator.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_kill_port() {
        let svc = service(
            vec![raw(3000, 10, "node"), RawPort::new(5000, None, None)],
            &[10],
        );

        assert_eq!(svc.kill_port(3000).await.unwrap(), Some(3000));
        assert_eq!(svc.kill_port(9999).await.unwrap(), None);
        assert!(matches!(svc.kill_port(5000).await, Err(Error::NoOwner(5000))));
    }

    #[tokio::test]
    async fn test_scan_range() {
        let svc = service(vec![raw(3000, 1, "node")], &[]);

        let summary = svc.scan_range(3000, 3002).await;
        assert_eq!(summary, ScanSummary { used: 1, free: 2 });
    }

    #[tokio::test]
    async fn test_scan_range_counts_every_port() {
        let svc = service(vec![raw(3000, 1, "node"), raw(4000, 2, "deno")], &[]);

        let summary = svc.scan_range(3000, 4002).await;
        assert_eq!(summary.used, 2);
        assert_eq!(summary.used + summary.free, 1003);
    }

    #[tokio::test]
    async fn test_scan_range_reversed_bounds() {
        let svc = service(vec![raw(4999, 1, "node"), raw(5000, 2, "deno")], &[]);

        let summary = svc.scan_range(5000, 4999).await;
        assert_eq!(summary, ScanSummary { used: 0, free: 0 });
    }

    #[tokio::test]
    async fn test_scan_range_full_span() {
        let svc = service(vec![raw(1, 1, "a"), raw(65535, 2, "b")], &[]);

        let summary = svc.scan_range(1, 65535).await;
        assert_eq!(summary.used, 2);
        assert_eq!(summary.free, 65533);
    }

    #[tokio::test]
    async fn test_find_owner() {
        let svc = service(vec![raw(5432, 77, "postgres")], &[]);

        let owner = svc.find_owner(5432).await.unwrap();
        assert_eq!(owner.process_name, "postgres");
        assert!(svc.find_owner(5433).await.is_none());
    }

    #[tokio::test]
    async fn test_probe_may_disagree_with_inventory() {
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let port = listener.local_addr().unwrap().port();

        // Inventory says nothing listens, the probe knows better
        let svc = service(Vec::new(), &[]);
        assert!(svc.find_owner(port).await.is_none());
        assert!(!svc.is_free(port).await);

        drop(listener);
        assert!(svc.is_free(port).await);
    }

    #[tokio::test]
    async fn test_platform_service_on_unsupported_platform() {
        let svc = PlatformInventory::for_platform(EngineConfig::new(
            crate::domain::Platform::Unsupported,
        ));

        assert!(svc.refresh().await.is_empty());
        assert_eq!(svc.scan_range(3000, 3009).await.free, 10);
        assert!(svc.kill_one(3000, 1234).await.is_err());
    }
}
