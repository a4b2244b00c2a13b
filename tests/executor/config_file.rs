//! Config File Tests
//!
//! Connecting from an `sdbp.toml`.

use crate::common::*;
use sdbp::{ClientConfig, Connection, Error, StatusCode, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn connect_from_file() {
    let cluster = create_cluster();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"
nodes = ["10.0.0.9:7080", "10.0.0.2:7080"]
global_timeout_ms = 3000
batch_limit = 2
"#,
    )
    .unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    let mut conn = Connection::from_config(cluster.handle(), &config).unwrap();
    assert_eq!(conn.global_timeout(), 3000);
    assert_eq!(conn.batch_limit(), 2);

    conn.use_database("shop").unwrap();
    conn.use_table("orders").unwrap();
    conn.begin();
    conn.set("a", "1").unwrap();
    conn.set("b", "1").unwrap();
    assert_eq!(
        conn.set("c", "1").unwrap_err().status_code(),
        StatusCode::ApiError
    );
}

#[test]
fn default_file_points_at_unknown_cluster() {
    let cluster = create_cluster();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    ClientConfig::write_default_if_missing(&path).unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    let err = Connection::from_config(cluster.handle(), &config).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NoConnection);
}

#[test]
fn bulk_loading_from_file() {
    let cluster = create_cluster();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let mut config = ClientConfig::new(CONTROLLERS);
    config.bulk_loading = true;
    config.write_to_file(&path).unwrap();

    let loaded = ClientConfig::from_file(&path).unwrap();
    let conn = Connection::from_config(cluster.handle(), &loaded).unwrap();
    assert!(conn.is_bulk_loading());
}

#[test]
fn invalid_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "nodes = 7").unwrap();

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::Config { .. }), "got {:?}", err);
}
