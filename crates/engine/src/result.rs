//! Result of one dispatch or batch submission.
//!
//! Rows are flattened in request order: a single-key request contributes one
//! row, a list request one row per returned key, a count one row holding the
//! total.

use std::sync::Arc;

use sdbp_core::{DatabaseId, ResultHandle, StatusCode, TableId};

use crate::cluster::Stats;

/// One row of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Row {
    pub key: Option<String>,
    pub value: Option<String>,
    pub number: i64,
    pub database_id: DatabaseId,
    pub table_id: TableId,
    pub status: StatusCode,
}

impl Row {
    pub fn status(status: StatusCode) -> Self {
        Row {
            key: None,
            value: None,
            number: 0,
            database_id: 0,
            table_id: 0,
            status,
        }
    }

    pub fn keyed(key: &str, status: StatusCode) -> Self {
        Row {
            key: Some(key.to_string()),
            ..Row::status(status)
        }
    }

    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    pub fn with_number(mut self, number: i64) -> Self {
        self.number = number;
        self
    }

    pub fn with_ids(mut self, database_id: DatabaseId, table_id: TableId) -> Self {
        self.database_id = database_id;
        self.table_id = table_id;
        self
    }
}

/// In-memory [`ResultHandle`].
///
/// Once handed to a client the result is tracked in the cluster's live
/// result count until it is closed or dropped.
#[derive(Debug)]
pub struct MemoryResult {
    rows: Vec<Row>,
    pos: usize,
    transport: StatusCode,
    connectivity: StatusCode,
    timeout: StatusCode,
    tracker: Option<Arc<Stats>>,
}

impl MemoryResult {
    /// A result with no rows, as left behind by `begin`, `cancel` or a
    /// rejected command.
    pub(crate) fn empty(transport: StatusCode, connectivity: StatusCode) -> Self {
        MemoryResult {
            rows: Vec::new(),
            pos: 0,
            transport,
            connectivity,
            timeout: StatusCode::Success,
            tracker: None,
        }
    }

    pub(crate) fn completed(
        rows: Vec<Row>,
        transport: StatusCode,
        connectivity: StatusCode,
        timeout: StatusCode,
    ) -> Self {
        MemoryResult {
            rows,
            pos: 0,
            transport,
            connectivity,
            timeout,
            tracker: None,
        }
    }

    /// Start counting this result as live.
    pub(crate) fn track(mut self, stats: Arc<Stats>) -> Self {
        stats.result_opened();
        self.tracker = Some(stats);
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn current(&self) -> Option<&Row> {
        self.rows.get(self.pos)
    }
}

impl ResultHandle for MemoryResult {
    fn close(&mut self) {
        self.rows.clear();
        self.pos = 0;
        self.transport = StatusCode::Failure;
        if let Some(stats) = self.tracker.take() {
            stats.result_closed();
        }
    }

    fn begin(&mut self) {
        self.pos = 0;
    }

    fn is_end(&self) -> bool {
        self.pos >= self.rows.len()
    }

    fn next(&mut self) {
        if !self.is_end() {
            self.pos += 1;
        }
    }

    fn key(&self) -> Option<&str> {
        self.current().and_then(|row| row.key.as_deref())
    }

    fn value(&self) -> Option<&str> {
        self.current().and_then(|row| row.value.as_deref())
    }

    fn number(&self) -> i64 {
        self.current().map_or(0, |row| row.number)
    }

    fn database_id(&self) -> DatabaseId {
        self.current().map_or(0, |row| row.database_id)
    }

    fn table_id(&self) -> TableId {
        self.current().map_or(0, |row| row.table_id)
    }

    fn command_status(&self) -> StatusCode {
        self.current().map_or(StatusCode::ApiError, |row| row.status)
    }

    fn transport_status(&self) -> StatusCode {
        self.transport
    }

    fn connectivity_status(&self) -> StatusCode {
        self.connectivity
    }

    fn timeout_status(&self) -> StatusCode {
        self.timeout
    }
}

impl Drop for MemoryResult {
    fn drop(&mut self) {
        if let Some(stats) = self.tracker.take() {
            stats.result_closed();
        }
    }
}
