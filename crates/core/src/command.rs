//! Command enum defining every request the client can send.
//!
//! Commands are the instruction set between the client and a cluster engine.
//! Data commands carry no table: the engine applies the table selected with
//! `use_table` at the moment the command is queued or sent.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be logged or replayed across language boundaries
//! - **Pure data**: No closures or executable code

use serde::{Deserialize, Serialize};

use crate::types::{DatabaseId, NodeId, QuorumId, TableId};

/// A single request to the cluster.
///
/// # Command Categories
///
/// | Category | Count | Routed to |
/// |----------|-------|-----------|
/// | Data | 9 | primary of the quorum owning the table |
/// | List | 3 | primary of the quorum owning the table |
/// | Schema | 10 | controller master |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Data (9) ====================
    /// Read a value. Fails with `FAILED` when the key is absent.
    Get { key: String },

    /// Write a value.
    Set { key: String, value: String },

    /// Write a value only if the key is absent; `FAILED` otherwise.
    SetIfNotExists { key: String, value: String },

    /// Write `value` only if the current value equals `test`.
    TestAndSet {
        key: String,
        test: String,
        value: String,
    },

    /// Write a value and return the previous one.
    GetAndSet { key: String, value: String },

    /// Add to a numeric value and return the sum.
    Add { key: String, number: i64 },

    /// Append to a value, creating it when absent.
    Append { key: String, value: String },

    /// Delete a key. Succeeds whether or not it existed.
    Delete { key: String },

    /// Delete a key and return its value. `FAILED` when absent.
    Remove { key: String },

    // ==================== List (3) ====================
    /// Keys starting with `prefix`, in key order.
    ListKeys {
        prefix: String,
        #[serde(default)]
        count: u32,
        #[serde(default)]
        offset: u32,
    },

    /// Key/value pairs starting with `prefix`, in key order.
    ListKeyValues {
        prefix: String,
        #[serde(default)]
        count: u32,
        #[serde(default)]
        offset: u32,
    },

    /// Number of keys starting with `prefix`.
    Count {
        prefix: String,
        #[serde(default)]
        count: u32,
        #[serde(default)]
        offset: u32,
    },

    // ==================== Schema (10) ====================
    /// Create a quorum from shard server nodes.
    CreateQuorum { nodes: Vec<NodeId> },

    /// Delete an empty quorum.
    DeleteQuorum { quorum_id: QuorumId },

    /// Activate a shard server node.
    ActivateNode { node_id: NodeId },

    /// Create a database.
    CreateDatabase { name: String },

    /// Rename a database.
    RenameDatabase {
        database_id: DatabaseId,
        name: String,
    },

    /// Delete a database and its tables.
    DeleteDatabase { database_id: DatabaseId },

    /// Create a table in a database, served by a quorum.
    CreateTable {
        database_id: DatabaseId,
        quorum_id: QuorumId,
        name: String,
    },

    /// Rename a table.
    RenameTable { table_id: TableId, name: String },

    /// Delete a table.
    DeleteTable { table_id: TableId },

    /// Remove every key from a table.
    TruncateTable { table_id: TableId },
}

impl Command {
    /// True for commands that operate on the table in use.
    pub fn is_data(&self) -> bool {
        !self.is_schema()
    }

    /// True for the multi-row list and count commands.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Command::ListKeys { .. } | Command::ListKeyValues { .. } | Command::Count { .. }
        )
    }

    /// True for commands served by the controller master.
    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            Command::CreateQuorum { .. }
                | Command::DeleteQuorum { .. }
                | Command::ActivateNode { .. }
                | Command::CreateDatabase { .. }
                | Command::RenameDatabase { .. }
                | Command::DeleteDatabase { .. }
                | Command::CreateTable { .. }
                | Command::RenameTable { .. }
                | Command::DeleteTable { .. }
                | Command::TruncateTable { .. }
        )
    }

    /// True for data commands that modify the table.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Set { .. }
                | Command::SetIfNotExists { .. }
                | Command::TestAndSet { .. }
                | Command::GetAndSet { .. }
                | Command::Add { .. }
                | Command::Append { .. }
                | Command::Delete { .. }
                | Command::Remove { .. }
        )
    }

    /// The key a single-key data command addresses.
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Get { key }
            | Command::Set { key, .. }
            | Command::SetIfNotExists { key, .. }
            | Command::TestAndSet { key, .. }
            | Command::GetAndSet { key, .. }
            | Command::Add { key, .. }
            | Command::Append { key, .. }
            | Command::Delete { key }
            | Command::Remove { key } => Some(key),
            _ => None,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "Get",
            Command::Set { .. } => "Set",
            Command::SetIfNotExists { .. } => "SetIfNotExists",
            Command::TestAndSet { .. } => "TestAndSet",
            Command::GetAndSet { .. } => "GetAndSet",
            Command::Add { .. } => "Add",
            Command::Append { .. } => "Append",
            Command::Delete { .. } => "Delete",
            Command::Remove { .. } => "Remove",
            Command::ListKeys { .. } => "ListKeys",
            Command::ListKeyValues { .. } => "ListKeyValues",
            Command::Count { .. } => "Count",
            Command::CreateQuorum { .. } => "CreateQuorum",
            Command::DeleteQuorum { .. } => "DeleteQuorum",
            Command::ActivateNode { .. } => "ActivateNode",
            Command::CreateDatabase { .. } => "CreateDatabase",
            Command::RenameDatabase { .. } => "RenameDatabase",
            Command::DeleteDatabase { .. } => "DeleteDatabase",
            Command::CreateTable { .. } => "CreateTable",
            Command::RenameTable { .. } => "RenameTable",
            Command::DeleteTable { .. } => "DeleteTable",
            Command::TruncateTable { .. } => "TruncateTable",
        }
    }
}
