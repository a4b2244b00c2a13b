//! Common test utilities for executor tests

use sdbp::{ClusterConfig, Connection, MemoryCluster};

pub const CONTROLLERS: [&str; 3] = ["10.0.0.1:7080", "10.0.0.2:7080", "10.0.0.3:7080"];

/// Cluster with three shard servers in one quorum, database `shop` and
/// tables `orders` and `stock`.
pub fn create_cluster() -> MemoryCluster {
    let cluster = MemoryCluster::new(CONTROLLERS);
    let nodes: Vec<_> = (1..=3)
        .map(|i| cluster.add_shard_server(format!("10.0.1.{}:7081", i)))
        .collect();

    let mut admin = connect(&cluster);
    for node in &nodes {
        admin.activate_node(*node);
    }
    let quorum = admin.create_quorum(&nodes).unwrap();
    let db = admin.create_database("shop").unwrap();
    admin.create_table(db, quorum, "orders").unwrap();
    admin.create_table(db, quorum, "stock").unwrap();
    cluster
}

/// Connection with no context.
pub fn connect(cluster: &MemoryCluster) -> Connection {
    Connection::new(cluster.handle(), &ClusterConfig::new(CONTROLLERS)).unwrap()
}

/// Connection using `shop.<table>`.
pub fn open_table(cluster: &MemoryCluster, table: &str) -> Connection {
    let mut conn = connect(cluster);
    conn.use_database("shop").unwrap();
    conn.use_table(table).unwrap();
    conn
}
