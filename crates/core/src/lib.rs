//! Core types and traits for the sdbp client
//!
//! This crate defines the vocabulary shared by the client and the cluster
//! engines behind it:
//! - StatusCode: the closed outcome taxonomy, grouped in tiers
//! - Error: raised client errors
//! - ClusterConfig: ordered controller endpoints
//! - Command: the request instruction set
//! - ClusterHandle / ResultHandle: the engine boundary
//! - ClientConfig: `sdbp.toml` loading

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod error;
pub mod status;
pub mod traits;
pub mod types;

pub use command::Command;
pub use config::{ClientConfig, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use status::{StatusCode, StatusTier};
pub use traits::{ClusterHandle, ResultHandle};
pub use types::{
    ClusterConfig, DatabaseId, KeyValues, NodeId, QuorumId, TableId, DEFAULT_GLOBAL_TIMEOUT_MS,
    DEFAULT_MASTER_TIMEOUT_MS,
};
