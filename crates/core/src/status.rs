//! Status codes returned by the cluster.
//!
//! Every operation against the cluster terminates in exactly one
//! [`StatusCode`]. Zero means success, negative codes are failures. The
//! hundreds digit of a failure code names the layer that failed:
//!
//! | Range | Tier | Codes |
//! |-------|------|-------|
//! | -1, -1xx | [`StatusTier::Api`] | `API_ERROR`, `PARTIAL`, `FAILURE` |
//! | -2xx | [`StatusTier::Connectivity`] | `NO_MASTER`, `NO_CONNECTION`, `NO_PRIMARY` |
//! | -3xx | [`StatusTier::Timeout`] | `MASTER_TIMEOUT`, `GLOBAL_TIMEOUT`, `PRIMARY_TIMEOUT` |
//! | -4xx | [`StatusTier::Service`] | `NO_SERVICE`, `FAILED`, `BAD_SCHEMA` |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Outcome code of a cluster operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum StatusCode {
    /// The operation succeeded.
    Success = 0,
    /// The client API was misused (for example the batch limit was hit).
    ApiError = -1,
    /// Some, but not all, requests of a submission were served.
    Partial = -101,
    /// No request of a submission was served.
    Failure = -102,
    /// The controllers have not elected a master.
    NoMaster = -201,
    /// No cluster node could be reached.
    NoConnection = -202,
    /// The quorum serving the request has no primary.
    NoPrimary = -203,
    /// The master did not answer within the master timeout.
    MasterTimeout = -301,
    /// The request did not complete within the global timeout.
    GlobalTimeout = -302,
    /// The quorum primary did not answer in time.
    PrimaryTimeout = -303,
    /// No server in the cluster was able to serve the request.
    NoService = -401,
    /// The server executed the command and reported failure.
    Failed = -402,
    /// Unknown database or table, or none selected.
    BadSchema = -403,
}

/// Layer of the cluster a failure status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    /// Client API and submission-level outcomes.
    Api,
    /// Cluster availability: master, connection, primary.
    Connectivity,
    /// One of the tiered timeouts expired.
    Timeout,
    /// Service and schema errors reported by servers.
    Service,
}

impl StatusCode {
    /// All status codes, in ascending tier order.
    pub const ALL: [StatusCode; 13] = [
        StatusCode::Success,
        StatusCode::ApiError,
        StatusCode::Partial,
        StatusCode::Failure,
        StatusCode::NoMaster,
        StatusCode::NoConnection,
        StatusCode::NoPrimary,
        StatusCode::MasterTimeout,
        StatusCode::GlobalTimeout,
        StatusCode::PrimaryTimeout,
        StatusCode::NoService,
        StatusCode::Failed,
        StatusCode::BadSchema,
    ];

    /// The numeric code as used by the cluster.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// True for [`StatusCode::Success`].
    pub const fn is_success(self) -> bool {
        self.code() == 0
    }

    /// True for every negative code.
    pub const fn is_failure(self) -> bool {
        self.code() < 0
    }

    /// The layer this status belongs to. `None` for success.
    pub fn tier(self) -> Option<StatusTier> {
        match self {
            StatusCode::Success => None,
            StatusCode::ApiError | StatusCode::Partial | StatusCode::Failure => {
                Some(StatusTier::Api)
            }
            StatusCode::NoMaster | StatusCode::NoConnection | StatusCode::NoPrimary => {
                Some(StatusTier::Connectivity)
            }
            StatusCode::MasterTimeout
            | StatusCode::GlobalTimeout
            | StatusCode::PrimaryTimeout => Some(StatusTier::Timeout),
            StatusCode::NoService | StatusCode::Failed | StatusCode::BadSchema => {
                Some(StatusTier::Service)
            }
        }
    }

    /// The screaming-snake name of the status, e.g. `"BAD_SCHEMA"`.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Success => "SUCCESS",
            StatusCode::ApiError => "API_ERROR",
            StatusCode::Partial => "PARTIAL",
            StatusCode::Failure => "FAILURE",
            StatusCode::NoMaster => "NO_MASTER",
            StatusCode::NoConnection => "NO_CONNECTION",
            StatusCode::NoPrimary => "NO_PRIMARY",
            StatusCode::MasterTimeout => "MASTER_TIMEOUT",
            StatusCode::GlobalTimeout => "GLOBAL_TIMEOUT",
            StatusCode::PrimaryTimeout => "PRIMARY_TIMEOUT",
            StatusCode::NoService => "NO_SERVICE",
            StatusCode::Failed => "FAILED",
            StatusCode::BadSchema => "BAD_SCHEMA",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        StatusCode::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(Error::UnknownStatus { code })
    }
}

impl From<StatusCode> for i32 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}
