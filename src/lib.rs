//! sdbp - client access layer for a quorum-replicated key-value cluster
//!
//! Applications locate the cluster's controllers, select a database and
//! table, issue single or batched data commands and read multi-row results
//! together with their tiered status information.
//!
//! # Quick Start
//!
//! ```ignore
//! use sdbp::{ClusterConfig, Connection, MemoryCluster};
//!
//! let cluster = MemoryCluster::new(["127.0.0.1:7080"]);
//! let mut conn = Connection::new(cluster.handle(), &ClusterConfig::new(["127.0.0.1:7080"]))?;
//!
//! conn.use_database("app")?;
//! conn.use_table("users")?;
//! conn.set("user:123", "alice")?;
//! let name = conn.get("user:123")?.into_option();
//! ```
//!
//! # Architecture
//!
//! All operations go through a [`Connection`], which drives an engine
//! through the [`ClusterHandle`] trait. The in-memory [`MemoryCluster`] is
//! re-exported for tests and local development.

// Re-export the public API from sdbp-executor
pub use sdbp_executor::*;

// In-memory engine
pub use sdbp_engine::{MemoryCluster, MemoryHandle, MemoryResult, Stats};
