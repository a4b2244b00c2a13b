//! # sdbp executor
//!
//! The client API for a quorum-replicated key-value cluster.
//!
//! This is the only crate applications need to import. It provides:
//! - [`Connection`]: cluster setup, context selection, schema commands and
//!   the batch protocol
//! - data commands on `Connection` returning [`Outcome`]s
//! - [`ResultCursor`]: rows and tiered statuses of the last submission
//!
//! ## Quick Start
//!
//! ```text
//! use sdbp_executor::{ClusterConfig, Connection};
//!
//! let mut conn = Connection::new(engine_handle, &ClusterConfig::new(["10.0.0.1:7080"]))?;
//! conn.use_database("app")?;
//! conn.use_table("users")?;
//!
//! conn.set("user:1", "alice")?;
//! let name = conn.get("user:1")?.into_option();
//! ```
//!
//! ## Batches
//!
//! ```text
//! conn.begin();
//! conn.set("a", "1")?;          // Outcome::Queued
//! conn.set("b", "2")?;
//! conn.submit()?;               // one round trip, raises on PARTIAL / FAILURE
//! ```
//!
//! ## Status tiers
//!
//! | Tier | Codes |
//! |------|-------|
//! | Api | `API_ERROR`, `PARTIAL`, `FAILURE` |
//! | Connectivity | `NO_MASTER`, `NO_CONNECTION`, `NO_PRIMARY` |
//! | Timeout | `MASTER_TIMEOUT`, `GLOBAL_TIMEOUT`, `PRIMARY_TIMEOUT` |
//! | Service | `NO_SERVICE`, `FAILED`, `BAD_SCHEMA` |

#![warn(missing_docs)]

mod connection;
mod cursor;
mod executor;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use connection::{Connection, ConnectionBuilder};
pub use cursor::ResultCursor;
pub use executor::{Outcome, Removed, DATA_COMMAND_ERRORS, SUBMIT_ERRORS};

pub use sdbp_core::{
    ClientConfig, ClusterConfig, ClusterHandle, Command, DatabaseId, Error, KeyValues, NodeId,
    QuorumId, ResultHandle, StatusCode, StatusTier, TableId, CONFIG_FILE_NAME,
    DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_MASTER_TIMEOUT_MS,
};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
