//! Executor Layer Tests
//!
//! End-to-end tests of the client against the in-memory cluster:
//! - Connection setup from code and from `sdbp.toml`
//! - Raised errors versus returned statuses
//! - Result handle release and replacement
//! - Logging through the injected span
//! - Independent connections on separate threads

mod common;

mod concurrency;
mod config_file;
mod error_handling;
mod logging;
mod resource_release;
mod workflow;
