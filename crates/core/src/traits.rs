//! Engine boundary traits
//!
//! The client never talks to the cluster directly. It drives a
//! [`ClusterHandle`], which owns the transport and the consensus-aware
//! routing, and reads outcomes through [`ResultHandle`]s. Swapping the
//! engine (native library, in-memory simulator) does not touch the client.
//!
//! Both traits are object safe; the client stores them as boxed trait
//! objects and releases each exactly once.

use crate::command::Command;
use crate::status::StatusCode;
use crate::types::{ClusterConfig, DatabaseId, TableId};

/// Opaque handle to a cluster engine.
///
/// A handle serves one client connection. Calls block until the engine
/// reports completion or one of the tiered timeouts expires.
pub trait ClusterHandle: Send {
    /// Connect to the controllers listed in `config`.
    ///
    /// Returns `NO_CONNECTION` when none of them is reachable and
    /// `API_ERROR` when the list is empty. A failed call leaves the handle
    /// disconnected, even if an earlier call succeeded.
    fn init(&mut self, config: &ClusterConfig) -> StatusCode;

    /// Release every resource held by the handle. Called once, last.
    fn shutdown(&mut self);

    /// Set the global request timeout.
    fn set_global_timeout(&mut self, timeout_ms: u64);

    /// Current global request timeout.
    fn global_timeout(&self) -> u64;

    /// Set the master-election timeout.
    fn set_master_timeout(&mut self, timeout_ms: u64);

    /// Current master-election timeout.
    fn master_timeout(&self) -> u64;

    /// Maximum number of commands queued in one batch (0 = unlimited).
    fn set_batch_limit(&mut self, limit: u64);

    /// Current batch limit.
    fn batch_limit(&self) -> u64;

    /// Switch the handle to bulk-loading mode for the rest of its life.
    fn set_bulk_loading(&mut self);

    /// Whether bulk-loading mode is on.
    fn is_bulk_loading(&self) -> bool;

    /// Resolve a database name. Returns 0 when unknown.
    fn database_id(&mut self, name: &str) -> DatabaseId;

    /// Resolve a table name inside a database. Returns 0 when unknown.
    fn table_id(&mut self, database_id: DatabaseId, name: &str) -> TableId;

    /// Select the database for subsequent data commands.
    fn use_database(&mut self, name: &str) -> StatusCode;

    /// Select the table for subsequent data commands.
    fn use_table(&mut self, name: &str) -> StatusCode;

    /// Database in use, 0 when none.
    fn current_database_id(&self) -> DatabaseId;

    /// Table in use, 0 when none.
    fn current_table_id(&self) -> TableId;

    /// Send a command, or queue it when a batch is open.
    ///
    /// The outcome is left on the handle and retrieved with
    /// [`take_result`](Self::take_result).
    fn dispatch(&mut self, command: Command) -> StatusCode;

    /// Open a batch. Later data commands are queued until `submit`.
    ///
    /// Returns `API_ERROR` when a batch is already open; its queue is kept.
    fn begin(&mut self) -> StatusCode;

    /// Send every queued command as one unit. Returns the transport status.
    fn submit(&mut self) -> StatusCode;

    /// Drop the queued commands and close the batch.
    fn cancel(&mut self) -> StatusCode;

    /// Whether a batch is open.
    fn is_batched(&self) -> bool;

    /// Hand over the result of the last dispatch or submit.
    ///
    /// The handle starts a fresh, empty result afterwards.
    fn take_result(&mut self) -> Box<dyn ResultHandle>;
}

/// Opaque handle to the rows and statuses of one completed dispatch.
///
/// A fresh result is positioned on its first row.
pub trait ResultHandle: Send {
    /// Release the rows. Further reads behave as on an empty result.
    fn close(&mut self);

    /// Reposition on the first row.
    fn begin(&mut self);

    /// True when positioned past the last row.
    fn is_end(&self) -> bool;

    /// Advance one row. No-op at the end.
    fn next(&mut self);

    /// Key of the current row.
    fn key(&self) -> Option<&str>;

    /// Value of the current row.
    fn value(&self) -> Option<&str>;

    /// Numeric payload of the current row (sums, counts, ids).
    fn number(&self) -> i64;

    /// Database id of the current row.
    fn database_id(&self) -> DatabaseId;

    /// Table id of the current row.
    fn table_id(&self) -> TableId;

    /// Status of the command behind the current row. `API_ERROR` at the end.
    fn command_status(&self) -> StatusCode;

    /// Whether all, some or none of the requests were answered.
    fn transport_status(&self) -> StatusCode;

    /// Reachability of the controllers while the requests ran.
    fn connectivity_status(&self) -> StatusCode;

    /// Which timeout tier, if any, expired.
    fn timeout_status(&self) -> StatusCode;
}
