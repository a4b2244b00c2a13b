//! Error Handling Tests
//!
//! Which conditions raise and which come back as statuses.

use crate::common::*;
use sdbp::{ClusterConfig, Connection, Error, MemoryCluster, Outcome, StatusCode, StatusTier};

// ============================================================================
// Raised
// ============================================================================

#[test]
fn unknown_database_raises_bad_schema() {
    let cluster = create_cluster();
    let mut conn = connect(&cluster);

    match conn.use_database("nope") {
        Err(Error::Status { status, message }) => {
            assert_eq!(status, StatusCode::BadSchema);
            assert!(message.contains("nope"), "message should name the database, got: {}", message);
        }
        other => panic!("Expected BAD_SCHEMA, got {:?}", other),
    }
}

#[test]
fn unknown_table_raises_bad_schema() {
    let cluster = create_cluster();
    let mut conn = connect(&cluster);
    conn.use_database("shop").unwrap();

    let err = conn.use_table("nope").unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BadSchema);
    assert_eq!(err.status_code().tier(), Some(StatusTier::Service));
}

#[test]
fn unreachable_controllers_raise_on_connect() {
    let cluster = MemoryCluster::new(CONTROLLERS);
    let err = Connection::new(cluster.handle(), &ClusterConfig::new(["192.0.2.1:7080"]))
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NoConnection);
    assert_eq!(err.status_code().tier(), Some(StatusTier::Connectivity));
}

#[test]
fn reconfigure_to_unreachable_nodes_raises() {
    let cluster = create_cluster();
    let mut conn = connect(&cluster);
    cluster.set_reachable(false);

    let err = conn.configure(&ClusterConfig::new(CONTROLLERS)).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NoConnection);
}

#[test]
fn failed_reconfigure_disconnects() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");
    assert!(conn.set("o1", "x").unwrap().is_completed());

    let err = conn.configure(&ClusterConfig::new(["nowhere:1"])).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NoConnection);
    assert_eq!(
        conn.set("o2", "y").unwrap(),
        Outcome::Failed(StatusCode::NoConnection)
    );
    assert_eq!(conn.result().unwrap().connectivity_status(), StatusCode::NoConnection);

    conn.configure(&ClusterConfig::new(CONTROLLERS)).unwrap();
    conn.use_database("shop").unwrap();
    conn.use_table("orders").unwrap();
    assert!(conn.set("o2", "y").unwrap().is_completed());
}

#[test]
fn batch_limit_message() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");
    conn.set_batch_limit(1);
    conn.begin();
    conn.set("o1", "x").unwrap();

    let err = conn.set("o2", "y").unwrap_err();
    assert_eq!(err.to_string(), "API_ERROR: maximum request limit exceeded");
}

// ============================================================================
// Returned
// ============================================================================

#[test]
fn failed_conditional_write_is_returned() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "stock");
    conn.set("sku-1", "5").unwrap();

    let outcome = conn.test_and_set("sku-1", "4", "3").unwrap();
    assert_eq!(outcome, Outcome::Failed(StatusCode::Failed));
    assert_eq!(outcome.status().tier(), Some(StatusTier::Service));
}

#[test]
fn schema_failures_are_returned() {
    let cluster = create_cluster();
    let mut conn = connect(&cluster);
    assert_eq!(conn.create_database("shop"), None);
    assert_eq!(conn.delete_quorum(42), StatusCode::Failed);
    assert_eq!(conn.rename_table(42, "x"), StatusCode::Failed);
}

#[test]
fn list_failures_are_returned() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");
    cluster.fail_primary(1);

    assert_eq!(conn.list_keys("", 0, 0), None);
    assert_eq!(conn.list_key_values("", 0, 0), None);
    assert_eq!(conn.count("", 0, 0), None);
}
