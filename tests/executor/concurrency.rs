//! Concurrency Tests
//!
//! Independent connections on separate threads share one cluster.

use crate::common::*;
use sdbp::Outcome;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn connections_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<sdbp::Connection>();
    assert_send::<sdbp::ResultCursor>();
}

#[test]
fn parallel_batches_all_land() {
    let cluster = create_cluster();
    let threads = 4;
    let per_batch = 25;
    let barrier = Arc::new(Barrier::new(threads));

    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let cluster = cluster.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut conn = open_table(&cluster, "orders");
                barrier.wait();
                conn.begin();
                for i in 0..per_batch {
                    let outcome = conn.set(&format!("t{}:{:02}", t, i), "x").unwrap();
                    assert_eq!(outcome, Outcome::Queued);
                }
                conn.submit().unwrap();
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let mut conn = open_table(&cluster, "orders");
    assert_eq!(conn.count("", 0, 0), Some((threads * per_batch) as u64));
    assert_eq!(conn.count("t2:", 0, 0), Some(per_batch as u64));
}

#[test]
fn parallel_counters() {
    let cluster = create_cluster();
    open_table(&cluster, "stock").set("widgets", "0").unwrap();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let cluster = cluster.clone();
            thread::spawn(move || {
                let mut conn = open_table(&cluster, "stock");
                for _ in 0..10 {
                    conn.add("widgets", 1).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let mut conn = open_table(&cluster, "stock");
    assert_eq!(conn.add("widgets", 0).unwrap(), Outcome::Completed(80));
}
