//! Error types for the sdbp client
//!
//! Two propagation styles coexist in the client. Conditions that are caller
//! bugs (unknown schema names, missing context, the batch limit) or that make
//! a whole submission unusable are raised as [`Error::Status`]. Ordinary
//! negative outcomes are returned as plain [`StatusCode`] values and never
//! reach this type.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;

use thiserror::Error;

use crate::status::StatusCode;

/// Result type alias for sdbp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the sdbp client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The cluster reported a status the client raises on.
    #[error("{status}: {message}")]
    Status {
        /// Status that triggered the error
        status: StatusCode,
        /// Human-readable description
        message: String,
    },

    /// `next()` was called on a cursor already positioned past its last row.
    #[error("result cursor exhausted")]
    Exhausted,

    /// A closed result cursor was advanced.
    #[error("result cursor is closed")]
    CursorClosed,

    /// A numeric status outside the known taxonomy.
    #[error("unknown status code: {code}")]
    UnknownStatus {
        /// The unrecognised code
        code: i32,
    },

    /// Client configuration could not be parsed or is invalid.
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },

    /// I/O error while reading or writing configuration.
    #[error("I/O error: {reason}")]
    Io {
        /// Underlying error message
        reason: String,
    },
}

impl Error {
    /// Build a status error.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Error::Status {
            status,
            message: message.into(),
        }
    }

    /// Build a `BAD_SCHEMA` error.
    pub fn bad_schema(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BadSchema, message)
    }

    /// The status code carried by this error.
    ///
    /// Errors that do not originate from the cluster map to `API_ERROR`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Status { status, .. } => *status,
            _ => StatusCode::ApiError,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io {
            reason: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config {
            reason: e.to_string(),
        }
    }
}
