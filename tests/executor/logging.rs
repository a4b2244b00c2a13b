//! Logging Tests
//!
//! Events land in the connection's injected span.

use crate::common::*;
use parking_lot::Mutex;
use sdbp::{ClusterConfig, Connection};
use std::io;
use std::sync::Arc;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn with_capture(f: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.text()
}

#[test]
fn events_carry_injected_span() {
    let cluster = create_cluster();
    let logs = with_capture(|| {
        let span = tracing::info_span!("order-service", worker = 7);
        let mut conn = Connection::builder(cluster.handle())
            .span(span)
            .connect(&ClusterConfig::new(CONTROLLERS))
            .unwrap();
        conn.use_database("shop").unwrap();
        conn.use_table("orders").unwrap();
        conn.begin();
        conn.set("o1", "x").unwrap();
        conn.submit().unwrap();
    });

    assert!(logs.contains("order-service"), "logs: {}", logs);
    assert!(logs.contains("worker=7"), "logs: {}", logs);
    assert!(logs.contains("Batch submitted"), "logs: {}", logs);
}

#[test]
fn default_span_is_named() {
    let cluster = create_cluster();
    let logs = with_capture(|| {
        let mut conn = connect(&cluster);
        conn.use_database("shop").unwrap();
    });
    assert!(logs.contains("sdbp.connection"), "logs: {}", logs);
    assert!(logs.contains("Database in use"), "logs: {}", logs);
}

#[test]
fn partial_submit_warns() {
    let cluster = create_cluster();
    let logs = with_capture(|| {
        let mut conn = open_table(&cluster, "orders");
        conn.begin();
        conn.set("o1", "x").unwrap();
        cluster.fail_primary(1);
        assert!(conn.submit().is_err());
    });
    assert!(logs.contains("WARN"), "logs: {}", logs);
    assert!(logs.contains("Batch not fully served"), "logs: {}", logs);
}
