//! In-memory cluster shared by every handle opened against it
//!
//! A [`MemoryCluster`] stands in for a real deployment: controllers, shard
//! servers, quorums with an elected primary, databases and tables. Tests
//! drive its fault knobs to reach each status tier:
//! - `set_reachable(false)`: controllers unreachable (NO_CONNECTION)
//! - `set_master_available(false)`: no master elected (NO_MASTER)
//! - `fail_primary(q)`: quorum `q` loses its primary (PRIMARY_TIMEOUT)
//! - `set_latency_ms(n)`: requests exceeding the global timeout
//!
//! Request execution lives in [`execute`], which turns a list of routed
//! commands into one [`MemoryResult`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use sdbp_core::{Command, NodeId, QuorumId, StatusCode, TableId};
use tracing::{debug, info, warn};

use crate::handle::MemoryHandle;
use crate::result::{MemoryResult, Row};
use crate::state::ClusterState;

/// Counters observed by tests and benchmarks.
///
/// Purely observational; all counters use Relaxed ordering.
#[derive(Debug, Default)]
pub struct Stats {
    round_trips: AtomicU64,
    last_submission_len: AtomicUsize,
    live_results: AtomicUsize,
}

impl Stats {
    pub(crate) fn result_opened(&self) {
        self.live_results.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn result_closed(&self) {
        self.live_results.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn record_round_trip(&self, requests: usize) {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        self.last_submission_len.store(requests, Ordering::Relaxed);
    }

    /// Results handed to clients and not yet closed or dropped.
    pub fn live_results(&self) -> usize {
        self.live_results.load(Ordering::Relaxed)
    }

    /// Number of round trips to the cluster so far.
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::Relaxed)
    }

    /// Number of requests carried by the latest round trip.
    pub fn last_submission_len(&self) -> usize {
        self.last_submission_len.load(Ordering::Relaxed)
    }
}

pub(crate) struct Shared {
    pub state: RwLock<ClusterState>,
    pub stats: Arc<Stats>,
}

/// Handle-independent view of a simulated cluster.
///
/// Cloning is cheap; clones observe the same state.
#[derive(Clone)]
pub struct MemoryCluster {
    shared: Arc<Shared>,
}

impl MemoryCluster {
    /// Create a cluster answering on the given controller endpoints.
    pub fn new<I, S>(controllers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let controllers: Vec<String> = controllers.into_iter().map(Into::into).collect();
        info!(target: "sdbp::engine", ?controllers, "Memory cluster created");
        MemoryCluster {
            shared: Arc::new(Shared {
                state: RwLock::new(ClusterState::new(controllers)),
                stats: Arc::new(Stats::default()),
            }),
        }
    }

    /// Register a shard server. It must be activated before it is useful
    /// to operators, but quorums may reference it immediately.
    pub fn add_shard_server(&self, endpoint: impl Into<String>) -> NodeId {
        self.shared.state.write().add_shard_server(endpoint.into())
    }

    /// Open a new, unconnected handle.
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle::new(self.shared.clone())
    }

    /// Make the controllers (un)reachable.
    pub fn set_reachable(&self, reachable: bool) {
        self.shared.state.write().reachable = reachable;
    }

    /// Toggle master availability for schema commands.
    pub fn set_master_available(&self, available: bool) {
        self.shared.state.write().master_available = available;
    }

    /// Simulated latency of every data request.
    pub fn set_latency_ms(&self, latency_ms: u64) {
        self.shared.state.write().latency_ms = latency_ms;
    }

    /// Drop the primary of a quorum. Returns false for an unknown quorum.
    pub fn fail_primary(&self, quorum_id: QuorumId) -> bool {
        let mut state = self.shared.state.write();
        match state.quorums.get_mut(&quorum_id) {
            Some(quorum) => {
                warn!(target: "sdbp::engine", quorum_id, "Primary lost");
                quorum.primary = None;
                true
            }
            None => false,
        }
    }

    /// Elect the first member of a quorum as primary again.
    pub fn elect_primary(&self, quorum_id: QuorumId) -> bool {
        let mut state = self.shared.state.write();
        match state.quorums.get_mut(&quorum_id) {
            Some(quorum) => {
                quorum.primary = quorum.nodes.first().copied();
                quorum.primary.is_some()
            }
            None => false,
        }
    }

    /// Counters shared by every handle of this cluster.
    pub fn stats(&self) -> &Stats {
        &self.shared.stats
    }

    /// Number of round trips so far.
    pub fn round_trips(&self) -> u64 {
        self.shared.stats.round_trips()
    }

    /// Number of requests in the latest round trip.
    pub fn last_submission_len(&self) -> usize {
        self.shared.stats.last_submission_len()
    }

    /// Results handed out and still open.
    pub fn live_results(&self) -> usize {
        self.shared.stats.live_results()
    }

    /// Current value of a key, bypassing every client-side check.
    pub fn peek(&self, table_id: TableId, key: &str) -> Option<String> {
        self.shared
            .state
            .read()
            .tables
            .get(&table_id)
            .and_then(|t| t.data.get(key).cloned())
    }
}

impl std::fmt::Debug for MemoryCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("MemoryCluster")
            .field("controllers", &state.controllers)
            .field("quorums", &state.quorums.len())
            .field("databases", &state.databases.len())
            .field("tables", &state.tables.len())
            .finish()
    }
}

/// Session knobs that shape how a round trip is judged.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub global_timeout_ms: u64,
    pub master_timeout_ms: u64,
    pub bulk_loading: bool,
}

/// Run one schema command against the master.
pub(crate) fn execute_schema(shared: &Shared, limits: Limits, command: &Command) -> MemoryResult {
    let mut state = shared.state.write();
    shared.stats.record_round_trip(1);

    if !state.reachable {
        return unreachable(command);
    }
    if !state.master_available {
        let timeout = if limits.master_timeout_ms <= limits.global_timeout_ms {
            StatusCode::MasterTimeout
        } else {
            StatusCode::GlobalTimeout
        };
        debug!(target: "sdbp::engine", command = command.name(), ?timeout, "No master");
        return MemoryResult::completed(
            vec![Row::status(StatusCode::NoService)],
            StatusCode::Failure,
            StatusCode::NoMaster,
            timeout,
        );
    }

    let row = state.apply_schema(command);
    MemoryResult::completed(
        vec![row],
        StatusCode::Success,
        StatusCode::Success,
        StatusCode::Success,
    )
}

/// Run routed data commands as one round trip.
///
/// Every request gets its own rows; requests whose quorum cannot serve them
/// yield a NO_SERVICE row and make the transport status PARTIAL or FAILURE.
/// Returns the command status of each request next to the result, since a
/// list that matched nothing contributes no row to read it from.
pub(crate) fn execute(
    shared: &Shared,
    limits: Limits,
    requests: &[(TableId, Command)],
) -> (Vec<StatusCode>, MemoryResult) {
    let mut state = shared.state.write();
    shared.stats.record_round_trip(requests.len());

    if requests.is_empty() {
        let result = MemoryResult::completed(
            Vec::new(),
            StatusCode::Success,
            StatusCode::Success,
            StatusCode::Success,
        );
        return (Vec::new(), result);
    }
    if !state.reachable {
        return refuse_all(requests, StatusCode::NoConnection);
    }
    if state.latency_ms > limits.global_timeout_ms {
        debug!(
            target: "sdbp::engine",
            latency_ms = state.latency_ms,
            global_timeout_ms = limits.global_timeout_ms,
            "Round trip timed out"
        );
        return refuse_all(requests, StatusCode::Success);
    }

    let mut rows = Vec::with_capacity(requests.len());
    let mut statuses = Vec::with_capacity(requests.len());
    let mut connectivity = StatusCode::Success;
    let mut served = 0usize;
    for (table_id, command) in requests {
        let writable_without_primary = limits.bulk_loading && command.is_write();
        if state.tables.contains_key(table_id)
            && !state.has_primary(*table_id)
            && !writable_without_primary
        {
            connectivity = StatusCode::NoPrimary;
            rows.push(no_service_row(command));
            statuses.push(StatusCode::NoService);
            continue;
        }
        let (status, command_rows) = state.apply_data(*table_id, command);
        rows.extend(command_rows);
        statuses.push(status);
        served += 1;
    }

    let (transport, timeout) = if served == requests.len() {
        (StatusCode::Success, StatusCode::Success)
    } else if served == 0 {
        (StatusCode::Failure, StatusCode::PrimaryTimeout)
    } else {
        (StatusCode::Partial, StatusCode::PrimaryTimeout)
    };
    if transport != StatusCode::Success {
        warn!(
            target: "sdbp::engine",
            served,
            total = requests.len(),
            "Round trip not fully served"
        );
    }
    let result = MemoryResult::completed(rows, transport, connectivity, timeout);
    (statuses, result)
}

/// Every request refused before reaching a quorum.
fn refuse_all(
    requests: &[(TableId, Command)],
    connectivity: StatusCode,
) -> (Vec<StatusCode>, MemoryResult) {
    let rows = requests
        .iter()
        .map(|(_, cmd)| no_service_row(cmd))
        .collect();
    let result = MemoryResult::completed(
        rows,
        StatusCode::Failure,
        connectivity,
        StatusCode::GlobalTimeout,
    );
    (vec![StatusCode::NoService; requests.len()], result)
}

fn unreachable(command: &Command) -> MemoryResult {
    MemoryResult::completed(
        vec![no_service_row(command)],
        StatusCode::Failure,
        StatusCode::NoConnection,
        StatusCode::GlobalTimeout,
    )
}

fn no_service_row(command: &Command) -> Row {
    match command.key() {
        Some(key) => Row::keyed(key, StatusCode::NoService),
        None => Row::status(StatusCode::NoService),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdbp_core::ResultHandle;

    const LIMITS: Limits = Limits {
        global_timeout_ms: 1_000,
        master_timeout_ms: 500,
        bulk_loading: false,
    };

    fn cluster_with_table() -> (MemoryCluster, TableId) {
        let cluster = MemoryCluster::new(["c:1"]);
        let node = cluster.add_shard_server("s:1");
        let shared = &cluster.shared;
        execute_schema(shared, LIMITS, &Command::CreateQuorum { nodes: vec![node] });
        execute_schema(shared, LIMITS, &Command::CreateDatabase { name: "db".into() });
        let result = execute_schema(
            shared,
            LIMITS,
            &Command::CreateTable {
                database_id: 1,
                quorum_id: 1,
                name: "t".into(),
            },
        );
        let table = result.table_id();
        (cluster, table)
    }

    fn set(key: &str) -> Command {
        Command::Set {
            key: key.into(),
            value: "v".into(),
        }
    }

    #[test]
    fn one_round_trip_per_execute() {
        let (cluster, t) = cluster_with_table();
        let before = cluster.round_trips();
        let (_, result) = execute(&cluster.shared, LIMITS, &[(t, set("a")), (t, set("b"))]);
        assert_eq!(result.transport_status(), StatusCode::Success);
        assert_eq!(result.len(), 2);
        assert_eq!(cluster.round_trips(), before + 1);
        assert_eq!(cluster.last_submission_len(), 2);
    }

    #[test]
    fn empty_round_trip_succeeds() {
        let (cluster, _) = cluster_with_table();
        let (_, result) = execute(&cluster.shared, LIMITS, &[]);
        assert_eq!(result.transport_status(), StatusCode::Success);
        assert!(result.is_empty());
    }

    #[test]
    fn lost_primary_fails_reads_and_writes() {
        let (cluster, t) = cluster_with_table();
        assert!(cluster.fail_primary(1));
        let (_, result) = execute(&cluster.shared, LIMITS, &[(t, set("a"))]);
        assert_eq!(result.transport_status(), StatusCode::Failure);
        assert_eq!(result.timeout_status(), StatusCode::PrimaryTimeout);
        assert_eq!(result.command_status(), StatusCode::NoService);
        assert_eq!(result.connectivity_status(), StatusCode::NoPrimary);
        assert_eq!(cluster.peek(t, "a"), None);
    }

    #[test]
    fn empty_list_reports_its_own_status() {
        let (cluster, t) = cluster_with_table();
        let list = Command::ListKeys {
            prefix: "nope".into(),
            count: 0,
            offset: 0,
        };
        let (statuses, result) = execute(&cluster.shared, LIMITS, &[(t, set("a")), (t, list)]);
        assert_eq!(statuses, vec![StatusCode::Success, StatusCode::Success]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.connectivity_status(), StatusCode::Success);
    }

    #[test]
    fn bulk_writes_survive_lost_primary() {
        let (cluster, t) = cluster_with_table();
        cluster.fail_primary(1);
        let bulk = Limits {
            bulk_loading: true,
            ..LIMITS
        };
        let (_, result) = execute(
            &cluster.shared,
            bulk,
            &[(t, set("a")), (t, Command::Get { key: "a".into() })],
        );
        assert_eq!(result.transport_status(), StatusCode::Partial);
        assert_eq!(cluster.peek(t, "a").as_deref(), Some("v"));

        assert!(cluster.elect_primary(1));
        let (_, result) = execute(&cluster.shared, LIMITS, &[(t, Command::Get { key: "a".into() })]);
        assert_eq!(result.transport_status(), StatusCode::Success);
    }

    #[test]
    fn latency_over_global_timeout_times_out() {
        let (cluster, t) = cluster_with_table();
        cluster.set_latency_ms(5_000);
        let (_, result) = execute(&cluster.shared, LIMITS, &[(t, set("a"))]);
        assert_eq!(result.transport_status(), StatusCode::Failure);
        assert_eq!(result.timeout_status(), StatusCode::GlobalTimeout);
    }

    #[test]
    fn schema_without_master_reports_master_tier() {
        let (cluster, _) = cluster_with_table();
        cluster.set_master_available(false);
        let cmd = Command::CreateDatabase { name: "x".into() };

        let result = execute_schema(&cluster.shared, LIMITS, &cmd);
        assert_eq!(result.command_status(), StatusCode::NoService);
        assert_eq!(result.connectivity_status(), StatusCode::NoMaster);
        assert_eq!(result.timeout_status(), StatusCode::MasterTimeout);

        let slow_master = Limits {
            master_timeout_ms: 2_000,
            ..LIMITS
        };
        let result = execute_schema(&cluster.shared, slow_master, &cmd);
        assert_eq!(result.timeout_status(), StatusCode::GlobalTimeout);
    }

    #[test]
    fn unreachable_cluster_reports_no_connection() {
        let (cluster, t) = cluster_with_table();
        cluster.set_reachable(false);
        let (_, result) = execute(&cluster.shared, LIMITS, &[(t, set("a"))]);
        assert_eq!(result.connectivity_status(), StatusCode::NoConnection);
        assert_eq!(result.command_status(), StatusCode::NoService);
    }
}
