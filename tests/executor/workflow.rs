//! Workflow Tests
//!
//! A realistic session: provision, load in bulk, query, clean up.

use crate::common::*;
use sdbp::{Outcome, StatusCode};

#[test]
fn provision_load_query() {
    let cluster = create_cluster();
    let mut admin = connect(&cluster);

    let node = cluster.add_shard_server("10.0.2.1:7081");
    assert_eq!(admin.activate_node(node), StatusCode::Success);
    let quorum = admin.create_quorum(&[node]).unwrap();
    let db = admin.create_database("analytics").unwrap();
    let table = admin.create_table(db, quorum, "events").unwrap();
    assert_eq!(admin.get_table_id(db, "events").unwrap(), table);

    let mut conn = connect(&cluster);
    conn.set_bulk_loading();
    conn.use_database("analytics").unwrap();
    conn.use_table("events").unwrap();

    conn.begin();
    for day in 1..=30 {
        conn.set(&format!("2024-06-{:02}", day), &day.to_string()).unwrap();
    }
    conn.set("2024-07-01", "31").unwrap();
    assert_eq!(conn.submit().unwrap(), StatusCode::Success);
    assert_eq!(cluster.last_submission_len(), 31);

    assert_eq!(conn.count("2024-06", 0, 0), Some(30));
    let week = conn.list_key_values("2024-06", 7, 7).unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week.get("2024-06-08"), Some("8"));
    assert_eq!(week.keys().last(), Some("2024-06-14"));

    assert_eq!(conn.add("2024-06-01", 9).unwrap(), Outcome::Completed(10));
    let removed = conn.remove("2024-07-01").unwrap();
    assert_eq!(removed.value.as_deref(), Some("31"));

    assert_eq!(admin.truncate_table(table), StatusCode::Success);
    assert_eq!(conn.count("", 0, 0), Some(0));
    assert_eq!(admin.delete_table(table), StatusCode::Success);
    assert_eq!(admin.delete_quorum(quorum), StatusCode::Success);
}

#[test]
fn switching_tables_mid_session() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");
    conn.set("order:1", "sku-9").unwrap();

    conn.use_table("stock").unwrap();
    conn.set("sku-9", "3").unwrap();
    assert_eq!(conn.get("order:1").unwrap().status(), StatusCode::Failed);

    conn.use_table("orders").unwrap();
    let sku = conn.get("order:1").unwrap().into_option().unwrap();
    conn.use_table("stock").unwrap();
    assert_eq!(conn.add(&sku, -1).unwrap(), Outcome::Completed(2));
}
