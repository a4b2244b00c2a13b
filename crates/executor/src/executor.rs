//! Data command execution.
//!
//! Every data command follows the same contract:
//!
//! 1. dispatch to the handle and read the raw status
//! 2. on a negative status, replace the cursor with the diagnostic result and
//!    consult [`DATA_COMMAND_ERRORS`]: listed statuses are raised, the rest
//!    come back as [`Outcome::Failed`]
//! 3. inside an open batch, report [`Outcome::Queued`] without touching the
//!    cursor
//! 4. otherwise replace the cursor and extract the command's value
//!
//! List and count commands never raise; a negative status yields `None`.

use sdbp_core::{Command, Error, KeyValues, Result, StatusCode};
use tracing::{trace, warn};

use crate::connection::Connection;
use crate::cursor::ResultCursor;

/// Statuses a data command raises on, with the message raised.
pub const DATA_COMMAND_ERRORS: &[(StatusCode, &str)] = &[
    (StatusCode::ApiError, "maximum request limit exceeded"),
    (StatusCode::BadSchema, "no database or table is in use"),
    (
        StatusCode::NoService,
        "no server in the cluster was able to serve the request",
    ),
];

/// Statuses `submit` raises on, with the message raised.
pub const SUBMIT_ERRORS: &[(StatusCode, &str)] = &[
    (StatusCode::Partial, "not all requests could be served"),
    (StatusCode::Failure, "no request could be served"),
];

/// Raise `status` if the table lists it.
pub(crate) fn raise_listed(table: &[(StatusCode, &str)], status: StatusCode) -> Result<()> {
    match table.iter().find(|(listed, _)| *listed == status) {
        Some((_, message)) => Err(Error::status(status, *message)),
        None => Ok(()),
    }
}

/// Non-raising result of a data command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Executed immediately and succeeded.
    Completed(T),
    /// Queued in the open batch; the result arrives with `submit`.
    Queued,
    /// Negative status the client does not raise on. The cursor holds the
    /// diagnostic result.
    Failed(StatusCode),
}

impl<T> Outcome<T> {
    /// The completed value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the command ran and succeeded.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Whether the command waits in a batch.
    pub fn is_queued(&self) -> bool {
        matches!(self, Outcome::Queued)
    }

    /// `SUCCESS` for completed and queued commands, the failing status
    /// otherwise.
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Failed(status) => *status,
            _ => StatusCode::Success,
        }
    }

    /// Transform the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Queued => Outcome::Queued,
            Outcome::Failed(status) => Outcome::Failed(status),
        }
    }
}

/// What `remove` reports: its status and the value it took out.
///
/// `value` is `None` when nothing was removed or the command was queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// Command status.
    pub status: StatusCode,
    /// The removed value.
    pub value: Option<String>,
}

impl Removed {
    /// Whether a value was actually removed.
    pub fn is_removed(&self) -> bool {
        self.value.is_some()
    }
}

// =============================================================================
// Data commands
// =============================================================================

impl Connection {
    /// Read a key.
    pub fn get(&mut self, key: &str) -> Result<Outcome<String>> {
        self.execute_data(Command::Get { key: key.into() }, |c| {
            c.value().unwrap_or_default().to_string()
        })
    }

    /// Write a key unconditionally.
    pub fn set(&mut self, key: &str, value: &str) -> Result<Outcome<()>> {
        self.execute_data(
            Command::Set {
                key: key.into(),
                value: value.into(),
            },
            |_| (),
        )
    }

    /// Write a key only if it does not exist. `FAILED` when it does.
    pub fn set_if_not_exists(&mut self, key: &str, value: &str) -> Result<Outcome<()>> {
        self.execute_data(
            Command::SetIfNotExists {
                key: key.into(),
                value: value.into(),
            },
            |_| (),
        )
    }

    /// Write `value` only if the key currently holds `test`. `FAILED` when
    /// it does not.
    pub fn test_and_set(&mut self, key: &str, test: &str, value: &str) -> Result<Outcome<()>> {
        self.execute_data(
            Command::TestAndSet {
                key: key.into(),
                test: test.into(),
                value: value.into(),
            },
            |_| (),
        )
    }

    /// Write a key and return its previous value, `None` if it had none.
    pub fn get_and_set(&mut self, key: &str, value: &str) -> Result<Outcome<Option<String>>> {
        self.execute_data(
            Command::GetAndSet {
                key: key.into(),
                value: value.into(),
            },
            |c| c.value().map(str::to_string),
        )
    }

    /// Add to a numeric value and return the sum.
    pub fn add(&mut self, key: &str, number: i64) -> Result<Outcome<i64>> {
        self.execute_data(
            Command::Add {
                key: key.into(),
                number,
            },
            ResultCursor::number,
        )
    }

    /// Append to a value, creating the key when absent.
    pub fn append(&mut self, key: &str, value: &str) -> Result<Outcome<()>> {
        self.execute_data(
            Command::Append {
                key: key.into(),
                value: value.into(),
            },
            |_| (),
        )
    }

    /// Delete a key. Succeeds whether or not the key existed.
    pub fn delete(&mut self, key: &str) -> Result<Outcome<()>> {
        self.execute_data(Command::Delete { key: key.into() }, |_| ())
    }

    /// Delete a key and return the value it held.
    pub fn remove(&mut self, key: &str) -> Result<Removed> {
        let outcome = self.execute_data(Command::Remove { key: key.into() }, |c| {
            c.value().map(str::to_string)
        })?;
        Ok(Removed {
            status: outcome.status(),
            value: outcome.into_option().flatten(),
        })
    }

    // =========================================================================
    // List commands
    // =========================================================================

    /// Keys starting with `prefix`, in key order. `count` 0 means no limit.
    pub fn list_keys(&mut self, prefix: &str, count: u32, offset: u32) -> Option<Vec<String>> {
        let command = Command::ListKeys {
            prefix: prefix.into(),
            count,
            offset,
        };
        self.execute_list(command).map(ResultCursor::keys)
    }

    /// Keys and values starting with `prefix`, in key order.
    pub fn list_key_values(&mut self, prefix: &str, count: u32, offset: u32) -> Option<KeyValues> {
        let command = Command::ListKeyValues {
            prefix: prefix.into(),
            count,
            offset,
        };
        self.execute_list(command).map(ResultCursor::key_values)
    }

    /// Number of keys starting with `prefix`.
    pub fn count(&mut self, prefix: &str, count: u32, offset: u32) -> Option<u64> {
        let command = Command::Count {
            prefix: prefix.into(),
            count,
            offset,
        };
        self.execute_list(command).map(|c| c.number().max(0) as u64)
    }

    // =========================================================================
    // Shared contract
    // =========================================================================

    fn execute_data<T>(
        &mut self,
        command: Command,
        extract: impl FnOnce(&ResultCursor) -> T,
    ) -> Result<Outcome<T>> {
        let name = command.name();
        trace!(parent: self.span(), command = name, batched = self.is_batched(), "Dispatching");

        let status = self.handle_mut().dispatch(command);
        if status.is_failure() {
            self.replace_result();
            if let Err(e) = raise_listed(DATA_COMMAND_ERRORS, status) {
                warn!(parent: self.span(), command = name, %status, "Data command raised");
                return Err(e);
            }
            trace!(parent: self.span(), command = name, %status, "Data command failed");
            return Ok(Outcome::Failed(status));
        }

        if self.is_batched() {
            return Ok(Outcome::Queued);
        }
        let cursor = self.replace_result();
        Ok(Outcome::Completed(extract(&*cursor)))
    }

    fn execute_list(&mut self, command: Command) -> Option<&mut ResultCursor> {
        let name = command.name();
        trace!(parent: self.span(), command = name, "Dispatching list");

        let status = self.handle_mut().dispatch(command);
        let cursor = self.replace_result();
        if status.is_failure() {
            return None;
        }
        Some(cursor)
    }
}
