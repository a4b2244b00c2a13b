//! Cluster state: topology, schema and per-table data.
//!
//! All mutation goes through [`ClusterState::apply_schema`] and
//! [`ClusterState::apply_data`], which turn a [`Command`] into result rows.

use std::collections::BTreeMap;
use std::ops::Bound;

use rustc_hash::FxHashMap;
use sdbp_core::{Command, DatabaseId, NodeId, QuorumId, StatusCode, TableId};
use tracing::info;

use crate::result::Row;

/// First id handed to shard servers; lower ids belong to controllers.
pub(crate) const FIRST_SHARD_SERVER_ID: NodeId = 100;

#[derive(Debug, Clone)]
pub(crate) struct ShardServer {
    pub endpoint: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Quorum {
    pub nodes: Vec<NodeId>,
    pub primary: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Database {
    pub name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Table {
    pub database_id: DatabaseId,
    pub quorum_id: QuorumId,
    pub name: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug)]
pub(crate) struct ClusterState {
    pub controllers: Vec<String>,
    pub reachable: bool,
    pub master_available: bool,
    pub latency_ms: u64,
    pub shard_servers: BTreeMap<NodeId, ShardServer>,
    pub quorums: BTreeMap<QuorumId, Quorum>,
    pub databases: BTreeMap<DatabaseId, Database>,
    pub tables: FxHashMap<TableId, Table>,
    next_node_id: NodeId,
    next_quorum_id: QuorumId,
    next_database_id: DatabaseId,
    next_table_id: TableId,
}

impl ClusterState {
    pub fn new(controllers: Vec<String>) -> Self {
        ClusterState {
            controllers,
            reachable: true,
            master_available: true,
            latency_ms: 0,
            shard_servers: BTreeMap::new(),
            quorums: BTreeMap::new(),
            databases: BTreeMap::new(),
            tables: FxHashMap::default(),
            next_node_id: FIRST_SHARD_SERVER_ID,
            next_quorum_id: 1,
            next_database_id: 1,
            next_table_id: 1,
        }
    }

    pub fn add_shard_server(&mut self, endpoint: String) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.shard_servers.insert(
            id,
            ShardServer {
                endpoint,
                active: false,
            },
        );
        id
    }

    pub fn database_id(&self, name: &str) -> DatabaseId {
        self.databases
            .iter()
            .find(|(_, db)| db.name == name)
            .map_or(0, |(id, _)| *id)
    }

    pub fn table_id(&self, database_id: DatabaseId, name: &str) -> TableId {
        self.tables
            .iter()
            .find(|(_, t)| t.database_id == database_id && t.name == name)
            .map_or(0, |(id, _)| *id)
    }

    /// Whether the quorum serving `table_id` can take a request right now.
    pub fn has_primary(&self, table_id: TableId) -> bool {
        self.tables
            .get(&table_id)
            .and_then(|t| self.quorums.get(&t.quorum_id))
            .is_some_and(|q| q.primary.is_some())
    }

    // =========================================================================
    // Schema
    // =========================================================================

    pub fn apply_schema(&mut self, command: &Command) -> Row {
        let failed = Row::status(StatusCode::Failed);
        match command {
            Command::CreateQuorum { nodes } => {
                if nodes.is_empty() || nodes.iter().any(|n| !self.shard_servers.contains_key(n)) {
                    return failed;
                }
                let id = self.next_quorum_id;
                self.next_quorum_id += 1;
                self.quorums.insert(
                    id,
                    Quorum {
                        nodes: nodes.clone(),
                        primary: nodes.first().copied(),
                    },
                );
                info!(quorum_id = id, ?nodes, "Quorum created");
                Row::status(StatusCode::Success).with_number(id as i64)
            }
            Command::DeleteQuorum { quorum_id } => {
                let in_use = self.tables.values().any(|t| t.quorum_id == *quorum_id);
                if in_use || self.quorums.remove(quorum_id).is_none() {
                    return failed;
                }
                info!(quorum_id, "Quorum deleted");
                Row::status(StatusCode::Success).with_number(*quorum_id as i64)
            }
            Command::ActivateNode { node_id } => match self.shard_servers.get_mut(node_id) {
                Some(server) => {
                    server.active = true;
                    info!(node_id, endpoint = %server.endpoint, "Shard server activated");
                    Row::status(StatusCode::Success).with_number(*node_id as i64)
                }
                None => failed,
            },
            Command::CreateDatabase { name } => {
                if name.is_empty() || self.database_id(name) != 0 {
                    return failed;
                }
                let id = self.next_database_id;
                self.next_database_id += 1;
                self.databases.insert(id, Database { name: name.clone() });
                info!(database_id = id, name = %name, "Database created");
                Row::status(StatusCode::Success)
                    .with_number(id as i64)
                    .with_ids(id, 0)
            }
            Command::RenameDatabase { database_id, name } => {
                if name.is_empty() || self.database_id(name) != 0 {
                    return failed;
                }
                match self.databases.get_mut(database_id) {
                    Some(db) => {
                        db.name = name.clone();
                        Row::status(StatusCode::Success).with_ids(*database_id, 0)
                    }
                    None => failed,
                }
            }
            Command::DeleteDatabase { database_id } => {
                if self.databases.remove(database_id).is_none() {
                    return failed;
                }
                self.tables.retain(|_, t| t.database_id != *database_id);
                info!(database_id, "Database deleted");
                Row::status(StatusCode::Success).with_ids(*database_id, 0)
            }
            Command::CreateTable {
                database_id,
                quorum_id,
                name,
            } => {
                if name.is_empty()
                    || !self.databases.contains_key(database_id)
                    || !self.quorums.contains_key(quorum_id)
                    || self.table_id(*database_id, name) != 0
                {
                    return failed;
                }
                let id = self.next_table_id;
                self.next_table_id += 1;
                self.tables.insert(
                    id,
                    Table {
                        database_id: *database_id,
                        quorum_id: *quorum_id,
                        name: name.clone(),
                        data: BTreeMap::new(),
                    },
                );
                info!(table_id = id, database_id, quorum_id, name = %name, "Table created");
                Row::status(StatusCode::Success)
                    .with_number(id as i64)
                    .with_ids(*database_id, id)
            }
            Command::RenameTable { table_id, name } => {
                let database_id = match self.tables.get(table_id) {
                    Some(t) => t.database_id,
                    None => return failed,
                };
                if name.is_empty() || self.table_id(database_id, name) != 0 {
                    return failed;
                }
                if let Some(table) = self.tables.get_mut(table_id) {
                    table.name = name.clone();
                }
                Row::status(StatusCode::Success).with_ids(database_id, *table_id)
            }
            Command::DeleteTable { table_id } => match self.tables.remove(table_id) {
                Some(t) => {
                    info!(table_id, "Table deleted");
                    Row::status(StatusCode::Success).with_ids(t.database_id, *table_id)
                }
                None => failed,
            },
            Command::TruncateTable { table_id } => match self.tables.get_mut(table_id) {
                Some(t) => {
                    t.data.clear();
                    Row::status(StatusCode::Success).with_ids(t.database_id, *table_id)
                }
                None => failed,
            },
            other => {
                debug_assert!(other.is_data(), "schema match must be exhaustive");
                Row::status(StatusCode::ApiError)
            }
        }
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Execute a data command against a table. Returns its status and rows.
    pub fn apply_data(&mut self, table_id: TableId, command: &Command) -> (StatusCode, Vec<Row>) {
        let Some(table) = self.tables.get_mut(&table_id) else {
            return (StatusCode::BadSchema, vec![Row::status(StatusCode::BadSchema)]);
        };
        let database_id = table.database_id;
        let data = &mut table.data;

        let rows = match command {
            Command::Get { key } => vec![match data.get(key) {
                Some(v) => Row::keyed(key, StatusCode::Success).with_value(Some(v.clone())),
                None => Row::keyed(key, StatusCode::Failed),
            }],
            Command::Set { key, value } => {
                data.insert(key.clone(), value.clone());
                vec![Row::keyed(key, StatusCode::Success)]
            }
            Command::SetIfNotExists { key, value } => vec![if data.contains_key(key) {
                Row::keyed(key, StatusCode::Failed)
            } else {
                data.insert(key.clone(), value.clone());
                Row::keyed(key, StatusCode::Success)
            }],
            Command::TestAndSet { key, test, value } => {
                let current = data.get(key).cloned();
                vec![if current.as_deref() == Some(test.as_str()) {
                    data.insert(key.clone(), value.clone());
                    Row::keyed(key, StatusCode::Success).with_value(Some(value.clone()))
                } else {
                    Row::keyed(key, StatusCode::Failed).with_value(current)
                }]
            }
            Command::GetAndSet { key, value } => {
                let old = data.insert(key.clone(), value.clone());
                vec![Row::keyed(key, StatusCode::Success).with_value(old)]
            }
            Command::Add { key, number } => {
                let sum = data
                    .get(key)
                    .and_then(|v| v.parse::<i64>().ok())
                    .and_then(|current| current.checked_add(*number));
                vec![match sum {
                    Some(sum) => {
                        data.insert(key.clone(), sum.to_string());
                        Row::keyed(key, StatusCode::Success).with_number(sum)
                    }
                    None => Row::keyed(key, StatusCode::Failed),
                }]
            }
            Command::Append { key, value } => {
                let entry = data.entry(key.clone()).or_default();
                entry.push_str(value);
                vec![Row::keyed(key, StatusCode::Success).with_value(Some(entry.clone()))]
            }
            Command::Delete { key } => {
                data.remove(key);
                vec![Row::keyed(key, StatusCode::Success)]
            }
            Command::Remove { key } => vec![match data.remove(key) {
                Some(v) => Row::keyed(key, StatusCode::Success).with_value(Some(v)),
                None => Row::keyed(key, StatusCode::Failed),
            }],
            Command::ListKeys {
                prefix,
                count,
                offset,
            } => scan(data, prefix, *count, *offset)
                .map(|(k, _)| Row::keyed(k, StatusCode::Success))
                .collect(),
            Command::ListKeyValues {
                prefix,
                count,
                offset,
            } => scan(data, prefix, *count, *offset)
                .map(|(k, v)| Row::keyed(k, StatusCode::Success).with_value(Some(v.clone())))
                .collect(),
            Command::Count {
                prefix,
                count,
                offset,
            } => {
                let total = scan(data, prefix, *count, *offset).count();
                vec![Row::status(StatusCode::Success).with_number(total as i64)]
            }
            other => {
                debug_assert!(other.is_schema(), "data match must be exhaustive");
                vec![Row::status(StatusCode::ApiError)]
            }
        };

        let rows: Vec<Row> = rows
            .into_iter()
            .map(|row| row.with_ids(database_id, table_id))
            .collect();
        let status = if command.is_list() {
            StatusCode::Success
        } else {
            rows.first().map_or(StatusCode::Success, |r| r.status)
        };
        (status, rows)
    }
}

/// Keys starting with `prefix` in key order, after `offset`, at most `count`
/// (0 = no limit).
fn scan<'a>(
    data: &'a BTreeMap<String, String>,
    prefix: &'a str,
    count: u32,
    offset: u32,
) -> impl Iterator<Item = (&'a String, &'a String)> + 'a {
    let limit = if count == 0 { usize::MAX } else { count as usize };
    data.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(k, _)| k.starts_with(prefix))
        .skip(offset as usize)
        .take(limit)
}
