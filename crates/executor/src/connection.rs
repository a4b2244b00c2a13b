//! Client connection to a cluster.
//!
//! The [`Connection`] owns the engine handle and the last result cursor. It
//! selects the database/table context, runs schema and topology commands
//! against the master and drives the batch protocol:
//!
//! ```text
//!            begin()                submit() / cancel()
//!   Idle ─────────────────▶ Open ─────────────────────────▶ Idle
//!                            │ data commands are queued
//! ```
//!
//! Data commands live in [`crate::executor`].
//!
//! # Usage
//!
//! ```ignore
//! let mut conn = Connection::builder(cluster.handle())
//!     .global_timeout(5_000)
//!     .connect(&ClusterConfig::new(["10.0.0.1:7080"]))?;
//!
//! conn.use_database("app")?;
//! conn.use_table("users")?;
//! conn.set("user:1", "alice")?;
//! ```

use sdbp_core::{
    ClientConfig, ClusterConfig, ClusterHandle, Command, DatabaseId, Error, NodeId, QuorumId,
    Result, StatusCode, TableId,
};
use tracing::{debug, warn, Span};

use crate::cursor::ResultCursor;
use crate::executor::{raise_listed, SUBMIT_ERRORS};

/// Statuses `configure` raises on.
const CONFIGURE_ERRORS: &[(StatusCode, &str)] = &[
    (StatusCode::NoConnection, "no node in the cluster is reachable"),
    (StatusCode::ApiError, "the cluster configuration lists no nodes"),
];

/// A client session with one cluster.
///
/// One operation runs at a time; every method takes `&mut self`. Separate
/// connections may live on separate threads.
pub struct Connection {
    handle: Box<dyn ClusterHandle>,
    result: Option<ResultCursor>,
    span: Span,
}

/// Builder for [`Connection`].
///
/// Settings are applied to the handle before it connects.
pub struct ConnectionBuilder {
    handle: Box<dyn ClusterHandle>,
    span: Option<Span>,
    global_timeout_ms: Option<u64>,
    master_timeout_ms: Option<u64>,
    batch_limit: Option<u64>,
    bulk_loading: bool,
}

impl ConnectionBuilder {
    /// Span all of the connection's events are recorded in.
    ///
    /// Defaults to a `sdbp.connection` span at debug level.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Global request timeout in milliseconds.
    pub fn global_timeout(mut self, timeout_ms: u64) -> Self {
        self.global_timeout_ms = Some(timeout_ms);
        self
    }

    /// Master-election timeout in milliseconds.
    pub fn master_timeout(mut self, timeout_ms: u64) -> Self {
        self.master_timeout_ms = Some(timeout_ms);
        self
    }

    /// Maximum commands per batch, 0 for no limit.
    pub fn batch_limit(mut self, limit: u64) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    /// Start in bulk-loading mode.
    pub fn bulk_loading(mut self, enabled: bool) -> Self {
        self.bulk_loading = enabled;
        self
    }

    /// Apply the settings and connect to the cluster.
    pub fn connect(self, config: &ClusterConfig) -> Result<Connection> {
        let mut handle = self.handle;
        if let Some(ms) = self.global_timeout_ms {
            handle.set_global_timeout(ms);
        }
        if let Some(ms) = self.master_timeout_ms {
            handle.set_master_timeout(ms);
        }
        if let Some(limit) = self.batch_limit {
            handle.set_batch_limit(limit);
        }
        if self.bulk_loading {
            handle.set_bulk_loading();
        }

        let mut conn = Connection {
            handle,
            result: None,
            span: self
                .span
                .unwrap_or_else(|| tracing::debug_span!("sdbp.connection")),
        };
        conn.configure(config)?;
        Ok(conn)
    }
}

impl Connection {
    /// Start building a connection over `handle`.
    pub fn builder<H: ClusterHandle + 'static>(handle: H) -> ConnectionBuilder {
        ConnectionBuilder {
            handle: Box::new(handle),
            span: None,
            global_timeout_ms: None,
            master_timeout_ms: None,
            batch_limit: None,
            bulk_loading: false,
        }
    }

    /// Connect with default settings.
    pub fn new<H: ClusterHandle + 'static>(handle: H, config: &ClusterConfig) -> Result<Self> {
        Self::builder(handle).connect(config)
    }

    /// Connect with the nodes and session settings of a [`ClientConfig`].
    pub fn from_config<H: ClusterHandle + 'static>(handle: H, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Self::builder(handle)
            .global_timeout(config.global_timeout_ms)
            .master_timeout(config.master_timeout_ms)
            .batch_limit(config.batch_limit)
            .bulk_loading(config.bulk_loading)
            .connect(&config.cluster_config())
    }

    /// (Re)initialise the handle against `config`.
    ///
    /// Raises `NO_CONNECTION` when no node answers and `API_ERROR` when the
    /// node list is empty. After a failure the connection is disconnected
    /// until a later `configure` succeeds.
    pub fn configure(&mut self, config: &ClusterConfig) -> Result<()> {
        let status = self.handle.init(config);
        if status.is_failure() {
            warn!(parent: &self.span, nodes = ?config.nodes(), %status, "Cluster configuration failed");
            raise_listed(CONFIGURE_ERRORS, status)?;
            return Err(Error::status(status, "cluster configuration failed"));
        }
        debug!(parent: &self.span, nodes = config.len(), "Connected");
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Set the global timeout for subsequent commands.
    pub fn set_global_timeout(&mut self, timeout_ms: u64) {
        self.handle.set_global_timeout(timeout_ms);
    }

    /// Global timeout in milliseconds.
    pub fn global_timeout(&self) -> u64 {
        self.handle.global_timeout()
    }

    /// Set the master-election timeout for subsequent commands.
    pub fn set_master_timeout(&mut self, timeout_ms: u64) {
        self.handle.set_master_timeout(timeout_ms);
    }

    /// Master-election timeout in milliseconds.
    pub fn master_timeout(&self) -> u64 {
        self.handle.master_timeout()
    }

    /// Cap the number of commands per batch, 0 for no limit.
    pub fn set_batch_limit(&mut self, limit: u64) {
        self.handle.set_batch_limit(limit);
    }

    /// Commands allowed per batch.
    pub fn batch_limit(&self) -> u64 {
        self.handle.batch_limit()
    }

    /// Switch to bulk-loading mode. There is no way back.
    pub fn set_bulk_loading(&mut self) {
        debug!(parent: &self.span, "Bulk loading enabled");
        self.handle.set_bulk_loading();
    }

    /// Whether bulk-loading mode is on.
    pub fn is_bulk_loading(&self) -> bool {
        self.handle.is_bulk_loading()
    }

    /// Database in use, 0 when none.
    pub fn current_database_id(&self) -> DatabaseId {
        self.handle.current_database_id()
    }

    /// Table in use, 0 when none.
    pub fn current_table_id(&self) -> TableId {
        self.handle.current_table_id()
    }

    /// Cursor of the last command or submission.
    pub fn result(&self) -> Option<&ResultCursor> {
        self.result.as_ref()
    }

    /// Mutable cursor of the last command or submission.
    pub fn result_mut(&mut self) -> Option<&mut ResultCursor> {
        self.result.as_mut()
    }

    // =========================================================================
    // Topology and schema
    // =========================================================================

    /// Create a quorum over shard servers. Returns its id, `None` on failure.
    pub fn create_quorum(&mut self, nodes: &[NodeId]) -> Option<QuorumId> {
        let (status, cursor) = self.execute_schema(Command::CreateQuorum {
            nodes: nodes.to_vec(),
        });
        (!status.is_failure()).then(|| cursor.number() as QuorumId)
    }

    /// Delete an unused quorum.
    pub fn delete_quorum(&mut self, quorum_id: QuorumId) -> StatusCode {
        self.execute_schema(Command::DeleteQuorum { quorum_id }).0
    }

    /// Mark a shard server as active.
    pub fn activate_node(&mut self, node_id: NodeId) -> StatusCode {
        self.execute_schema(Command::ActivateNode { node_id }).0
    }

    /// Create a database. Returns its id, `None` on failure.
    pub fn create_database(&mut self, name: &str) -> Option<DatabaseId> {
        let (status, cursor) = self.execute_schema(Command::CreateDatabase { name: name.into() });
        (!status.is_failure()).then(|| cursor.database_id())
    }

    /// Rename a database.
    pub fn rename_database(&mut self, database_id: DatabaseId, name: &str) -> StatusCode {
        self.execute_schema(Command::RenameDatabase {
            database_id,
            name: name.into(),
        })
        .0
    }

    /// Delete a database and its tables.
    pub fn delete_database(&mut self, database_id: DatabaseId) -> StatusCode {
        self.execute_schema(Command::DeleteDatabase { database_id }).0
    }

    /// Create a table served by `quorum_id`. Returns its id, `None` on
    /// failure.
    pub fn create_table(
        &mut self,
        database_id: DatabaseId,
        quorum_id: QuorumId,
        name: &str,
    ) -> Option<TableId> {
        let (status, cursor) = self.execute_schema(Command::CreateTable {
            database_id,
            quorum_id,
            name: name.into(),
        });
        (!status.is_failure()).then(|| cursor.table_id())
    }

    /// Rename a table.
    pub fn rename_table(&mut self, table_id: TableId, name: &str) -> StatusCode {
        self.execute_schema(Command::RenameTable {
            table_id,
            name: name.into(),
        })
        .0
    }

    /// Delete a table.
    pub fn delete_table(&mut self, table_id: TableId) -> StatusCode {
        self.execute_schema(Command::DeleteTable { table_id }).0
    }

    /// Remove every key from a table.
    pub fn truncate_table(&mut self, table_id: TableId) -> StatusCode {
        self.execute_schema(Command::TruncateTable { table_id }).0
    }

    // =========================================================================
    // Context
    // =========================================================================

    /// Resolve a database name. Raises `BAD_SCHEMA` when unknown.
    pub fn get_database_id(&mut self, name: &str) -> Result<DatabaseId> {
        match self.handle.database_id(name) {
            0 => Err(Error::bad_schema(format!("no database with name '{}'", name))),
            id => Ok(id),
        }
    }

    /// Resolve a table name. Raises `BAD_SCHEMA` when unknown.
    pub fn get_table_id(&mut self, database_id: DatabaseId, name: &str) -> Result<TableId> {
        match self.handle.table_id(database_id, name) {
            0 => Err(Error::bad_schema(format!("no table with name '{}'", name))),
            id => Ok(id),
        }
    }

    /// Select the database for data commands. Clears the table in use.
    pub fn use_database(&mut self, name: &str) -> Result<()> {
        let status = self.handle.use_database(name);
        if status.is_failure() {
            return Err(context_error(status, "database", name));
        }
        debug!(parent: &self.span, database = name, id = self.current_database_id(), "Database in use");
        Ok(())
    }

    /// Select a table of the database in use.
    pub fn use_table(&mut self, name: &str) -> Result<()> {
        let status = self.handle.use_table(name);
        if status.is_failure() {
            return Err(context_error(status, "table", name));
        }
        debug!(parent: &self.span, table = name, id = self.current_table_id(), "Table in use");
        Ok(())
    }

    // =========================================================================
    // Batch protocol
    // =========================================================================

    /// Open a batch. Data commands are queued until [`submit`](Self::submit).
    ///
    /// Returns `API_ERROR` when a batch is already open; the commands queued
    /// so far stay queued.
    pub fn begin(&mut self) -> StatusCode {
        let status = self.handle.begin();
        if status.is_failure() {
            warn!(parent: &self.span, %status, "Batch not opened");
        } else {
            debug!(parent: &self.span, "Batch opened");
        }
        status
    }

    /// Send the queued commands in one round trip.
    ///
    /// The cursor then holds one or more rows per queued command. Raises on
    /// `PARTIAL` and `FAILURE`; the cursor still holds every row and its
    /// per-command status.
    pub fn submit(&mut self) -> Result<StatusCode> {
        let status = self.handle.submit();
        let timeout = self.replace_result().timeout_status();
        if let Err(e) = raise_listed(SUBMIT_ERRORS, status) {
            warn!(
                parent: &self.span,
                %status,
                %timeout,
                "Batch not fully served"
            );
            return Err(e);
        }
        debug!(parent: &self.span, %status, "Batch submitted");
        Ok(status)
    }

    /// Discard the queued commands and close the batch.
    pub fn cancel(&mut self) -> StatusCode {
        let status = self.handle.cancel();
        debug!(parent: &self.span, "Batch cancelled");
        status
    }

    /// Whether a batch is open.
    pub fn is_batched(&self) -> bool {
        self.handle.is_batched()
    }

    // =========================================================================
    // Internals shared with the executor
    // =========================================================================

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    pub(crate) fn handle_mut(&mut self) -> &mut dyn ClusterHandle {
        self.handle.as_mut()
    }

    /// Take the handle's pending result, closing the previous cursor.
    pub(crate) fn replace_result(&mut self) -> &mut ResultCursor {
        let cursor = ResultCursor::new(self.handle.take_result());
        self.result.insert(cursor)
    }

    fn execute_schema(&mut self, command: Command) -> (StatusCode, &ResultCursor) {
        let name = command.name();
        let status = self.handle.dispatch(command);
        if status.is_failure() {
            warn!(parent: &self.span, command = name, %status, "Schema command failed");
        } else {
            debug!(parent: &self.span, command = name, "Schema command applied");
        }
        let cursor: &ResultCursor = self.replace_result();
        (status, cursor)
    }
}

fn context_error(status: StatusCode, kind: &str, name: &str) -> Error {
    match status {
        StatusCode::BadSchema => Error::bad_schema(format!("no {} with name '{}'", kind, name)),
        other => Error::status(other, format!("cannot use {} '{}'", kind, name)),
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Results go back before the handle shuts down.
        if let Some(mut cursor) = self.result.take() {
            cursor.close();
        }
        self.handle.shutdown();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("database_id", &self.current_database_id())
            .field("table_id", &self.current_table_id())
            .field("batched", &self.is_batched())
            .field("result", &self.result)
            .finish()
    }
}
