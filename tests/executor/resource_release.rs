//! Resource Release Tests
//!
//! A connection holds at most one live result; everything is released on
//! close, replacement and drop.

use crate::common::*;

#[test]
fn every_command_replaces_the_cursor() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");

    conn.set("a", "1").unwrap();
    conn.get("missing").unwrap();
    conn.list_keys("", 0, 0).unwrap();
    conn.create_database("other").unwrap();
    conn.begin();
    conn.set("b", "2").unwrap();
    conn.submit().unwrap();

    assert_eq!(cluster.live_results(), 1);
}

#[test]
fn queued_commands_do_not_fetch_a_cursor() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");
    conn.set("a", "1").unwrap();
    conn.begin();
    conn.set("b", "2").unwrap();

    let cursor = conn.result().unwrap();
    assert_eq!(cursor.key(), Some("a"));
}

#[test]
fn closing_the_cursor_releases_it() {
    let cluster = create_cluster();
    let mut conn = open_table(&cluster, "orders");
    conn.set("a", "1").unwrap();

    conn.result_mut().unwrap().close();
    assert_eq!(cluster.live_results(), 0);
}

#[test]
fn dropping_connections_releases_everything() {
    let cluster = create_cluster();
    {
        let mut a = open_table(&cluster, "orders");
        let mut b = open_table(&cluster, "stock");
        a.set("o", "1").unwrap();
        b.set("s", "1").unwrap();
        assert_eq!(cluster.live_results(), 2);
    }
    assert_eq!(cluster.live_results(), 0);
}

#[test]
fn dropping_with_open_batch_discards_it() {
    let cluster = create_cluster();
    {
        let mut conn = open_table(&cluster, "orders");
        conn.begin();
        conn.set("never", "1").unwrap();
    }
    let mut conn = open_table(&cluster, "orders");
    assert!(conn.get("never").unwrap().into_option().is_none());
}
