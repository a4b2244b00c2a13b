//! In-memory cluster engine for the sdbp client
//!
//! This crate implements the engine boundary from `sdbp-core` without a
//! network:
//! - MemoryCluster: controllers, shard servers, quorums, schema and data
//! - MemoryHandle: one connection's session, batch queue and pending result
//! - MemoryResult: the rows and tiered statuses of one round trip
//!
//! The cluster exposes fault knobs (unreachable controllers, missing master,
//! lost primaries, latency) so every status tier can be reached from tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cluster;
pub mod handle;
pub mod result;
mod state;

pub use cluster::{MemoryCluster, Stats};
pub use handle::MemoryHandle;
pub use result::MemoryResult;
