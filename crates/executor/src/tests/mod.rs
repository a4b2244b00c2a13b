//! Test modules for the executor crate.


use crate::{ClusterConfig, Connection};
use sdbp_engine::MemoryCluster;

pub(crate) const CONTROLLER: &str = "127.0.0.1:7080";

/// A cluster with one active shard server, one quorum (id 1), database
/// `app` (id 1) and table `kv` (id 1).
pub(crate) fn seeded_cluster() -> MemoryCluster {
    let cluster = MemoryCluster::new([CONTROLLER]);
    let node = cluster.add_shard_server("127.0.0.1:7081");
    let mut admin = connect(&cluster);
    admin.activate_node(node);
    let quorum = admin.create_quorum(&[node]).unwrap();
    let db = admin.create_database("app").unwrap();
    admin.create_table(db, quorum, "kv").unwrap();
    cluster
}

/// A connection with no context selected.
pub(crate) fn connect(cluster: &MemoryCluster) -> Connection {
    Connection::new(cluster.handle(), &ClusterConfig::new([CONTROLLER])).unwrap()
}

/// A connection using `app.kv`.
pub(crate) fn session(cluster: &MemoryCluster) -> Connection {
    let mut conn = connect(cluster);
    conn.use_database("app").unwrap();
    conn.use_table("kv").unwrap();
    conn
}
