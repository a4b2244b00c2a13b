//! Per-connection engine handle
//!
//! Holds the session state a client connection owns: timeouts, the selected
//! database and table, the batch queue and the pending result.

use std::mem;
use std::sync::Arc;

use sdbp_core::{
    ClusterConfig, ClusterHandle, Command, DatabaseId, ResultHandle, StatusCode, TableId,
    DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_MASTER_TIMEOUT_MS,
};
use tracing::{debug, trace};

use crate::cluster::{execute, execute_schema, Limits, Shared};
use crate::result::MemoryResult;

/// [`ClusterHandle`] backed by a [`MemoryCluster`](crate::MemoryCluster).
pub struct MemoryHandle {
    shared: Arc<Shared>,
    connected: bool,
    global_timeout_ms: u64,
    master_timeout_ms: u64,
    batch_limit: u64,
    bulk_loading: bool,
    database_id: DatabaseId,
    table_id: TableId,
    batched: bool,
    queue: Vec<(TableId, Command)>,
    result: MemoryResult,
}

impl MemoryHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        MemoryHandle {
            shared,
            connected: false,
            global_timeout_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
            master_timeout_ms: DEFAULT_MASTER_TIMEOUT_MS,
            batch_limit: 0,
            bulk_loading: false,
            database_id: 0,
            table_id: 0,
            batched: false,
            queue: Vec::new(),
            result: MemoryResult::empty(StatusCode::Success, StatusCode::Success),
        }
    }

    /// Number of commands waiting in the open batch.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn limits(&self) -> Limits {
        Limits {
            global_timeout_ms: self.global_timeout_ms,
            master_timeout_ms: self.master_timeout_ms,
            bulk_loading: self.bulk_loading,
        }
    }

    fn reset_result(&mut self, transport: StatusCode, connectivity: StatusCode) {
        self.result = MemoryResult::empty(transport, connectivity);
    }

    fn reject(&mut self, status: StatusCode) -> StatusCode {
        let connectivity = if self.connected {
            StatusCode::Success
        } else {
            StatusCode::NoConnection
        };
        self.reset_result(StatusCode::Failure, connectivity);
        status
    }

    fn abort_batch(&mut self) {
        self.queue.clear();
        self.batched = false;
    }
}

impl ClusterHandle for MemoryHandle {
    fn init(&mut self, config: &ClusterConfig) -> StatusCode {
        self.connected = false;
        if config.is_empty() {
            return StatusCode::ApiError;
        }
        let state = self.shared.state.read();
        let known = config
            .nodes()
            .iter()
            .any(|node| state.controllers.iter().any(|c| c == node));
        if !state.reachable || !known {
            debug!(target: "sdbp::engine", nodes = ?config.nodes(), "No controller reachable");
            return StatusCode::NoConnection;
        }
        drop(state);
        self.connected = true;
        StatusCode::Success
    }

    fn shutdown(&mut self) {
        self.connected = false;
        self.abort_batch();
        self.database_id = 0;
        self.table_id = 0;
        self.reset_result(StatusCode::Success, StatusCode::Success);
    }

    fn set_global_timeout(&mut self, timeout_ms: u64) {
        self.global_timeout_ms = timeout_ms;
    }

    fn global_timeout(&self) -> u64 {
        self.global_timeout_ms
    }

    fn set_master_timeout(&mut self, timeout_ms: u64) {
        self.master_timeout_ms = timeout_ms;
    }

    fn master_timeout(&self) -> u64 {
        self.master_timeout_ms
    }

    fn set_batch_limit(&mut self, limit: u64) {
        self.batch_limit = limit;
    }

    fn batch_limit(&self) -> u64 {
        self.batch_limit
    }

    fn set_bulk_loading(&mut self) {
        self.bulk_loading = true;
    }

    fn is_bulk_loading(&self) -> bool {
        self.bulk_loading
    }

    fn database_id(&mut self, name: &str) -> DatabaseId {
        if !self.connected {
            return 0;
        }
        self.shared.state.read().database_id(name)
    }

    fn table_id(&mut self, database_id: DatabaseId, name: &str) -> TableId {
        if !self.connected {
            return 0;
        }
        self.shared.state.read().table_id(database_id, name)
    }

    fn use_database(&mut self, name: &str) -> StatusCode {
        if !self.connected {
            return StatusCode::NoConnection;
        }
        let id = self.shared.state.read().database_id(name);
        self.table_id = 0;
        if id == 0 {
            self.database_id = 0;
            return StatusCode::BadSchema;
        }
        self.database_id = id;
        StatusCode::Success
    }

    fn use_table(&mut self, name: &str) -> StatusCode {
        if !self.connected {
            return StatusCode::NoConnection;
        }
        if self.database_id == 0 {
            return StatusCode::BadSchema;
        }
        let id = self.shared.state.read().table_id(self.database_id, name);
        if id == 0 {
            self.table_id = 0;
            return StatusCode::BadSchema;
        }
        self.table_id = id;
        StatusCode::Success
    }

    fn current_database_id(&self) -> DatabaseId {
        self.database_id
    }

    fn current_table_id(&self) -> TableId {
        self.table_id
    }

    fn dispatch(&mut self, command: Command) -> StatusCode {
        if !self.connected {
            return self.reject(StatusCode::NoConnection);
        }

        if command.is_schema() {
            self.result = execute_schema(&self.shared, self.limits(), &command);
            return self.result.command_status();
        }

        if self.database_id == 0 || self.table_id == 0 {
            return self.reject(StatusCode::BadSchema);
        }

        if self.batched {
            if command.is_list() {
                trace!(target: "sdbp::engine", command = command.name(), "List command refused in batch");
                return StatusCode::ApiError;
            }
            if self.batch_limit > 0 && self.queue.len() as u64 >= self.batch_limit {
                debug!(
                    target: "sdbp::engine",
                    limit = self.batch_limit,
                    "Batch limit exceeded, batch aborted"
                );
                self.abort_batch();
                return self.reject(StatusCode::ApiError);
            }
            self.queue.push((self.table_id, command));
            return StatusCode::Success;
        }

        let request = [(self.table_id, command)];
        let (statuses, result) = execute(&self.shared, self.limits(), &request);
        self.result = result;
        match statuses.first() {
            Some(status) if self.result.transport_status() == StatusCode::Success => *status,
            _ => StatusCode::NoService,
        }
    }

    fn begin(&mut self) -> StatusCode {
        if !self.connected {
            return StatusCode::NoConnection;
        }
        if self.batched {
            trace!(target: "sdbp::engine", queued = self.queue.len(), "Batch already open");
            return StatusCode::ApiError;
        }
        self.batched = true;
        self.reset_result(StatusCode::Success, StatusCode::Success);
        StatusCode::Success
    }

    fn submit(&mut self) -> StatusCode {
        if !self.batched {
            return StatusCode::ApiError;
        }
        let queue = mem::take(&mut self.queue);
        self.batched = false;
        debug!(target: "sdbp::engine", requests = queue.len(), "Submitting batch");
        let (_, result) = execute(&self.shared, self.limits(), &queue);
        self.result = result;
        self.result.transport_status()
    }

    fn cancel(&mut self) -> StatusCode {
        self.abort_batch();
        self.reset_result(StatusCode::Success, StatusCode::Success);
        StatusCode::Success
    }

    fn is_batched(&self) -> bool {
        self.batched
    }

    fn take_result(&mut self) -> Box<dyn ResultHandle> {
        let result = mem::replace(
            &mut self.result,
            MemoryResult::empty(StatusCode::Success, StatusCode::Success),
        );
        Box::new(result.track(self.shared.stats.clone()))
    }
}

impl std::fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHandle")
            .field("connected", &self.connected)
            .field("database_id", &self.database_id)
            .field("table_id", &self.table_id)
            .field("batched", &self.batched)
            .field("queued", &self.queue.len())
            .finish()
    }
}
