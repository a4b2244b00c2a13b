//! Result cursor over one dispatch or batch submission.
//!
//! A [`ResultCursor`] owns exactly one engine result handle and releases it
//! when closed, replaced or dropped. It starts positioned on the first row,
//! so scalar results can be read right after a command completes.

use std::fmt;

use sdbp_core::{DatabaseId, Error, KeyValues, Result, ResultHandle, StatusCode, TableId};

/// Iterator-style view over the rows and statuses of a result.
///
/// ```text
/// cursor.begin();
/// while !cursor.is_end() {
///     println!("{:?} = {:?}", cursor.key(), cursor.value());
///     cursor.next()?;
/// }
/// ```
pub struct ResultCursor {
    handle: Option<Box<dyn ResultHandle>>,
}

impl ResultCursor {
    /// Wrap a result handle. The cursor becomes its sole owner.
    pub fn new(handle: Box<dyn ResultHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Release the result handle. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }

    /// Whether the handle has been released.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Reposition on the first row.
    pub fn begin(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.begin();
        }
    }

    /// True once positioned past the last row. A closed cursor is at its end.
    pub fn is_end(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_end())
    }

    /// Advance one row.
    ///
    /// Fails with [`Error::Exhausted`] when already past the last row and
    /// with [`Error::CursorClosed`] after `close`.
    pub fn next(&mut self) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::CursorClosed)?;
        if handle.is_end() {
            return Err(Error::Exhausted);
        }
        handle.next();
        Ok(())
    }

    /// Key of the current row.
    pub fn key(&self) -> Option<&str> {
        self.handle.as_ref().and_then(|h| h.key())
    }

    /// Value of the current row.
    pub fn value(&self) -> Option<&str> {
        self.handle.as_ref().and_then(|h| h.value())
    }

    /// Numeric payload of the current row.
    pub fn number(&self) -> i64 {
        self.handle.as_ref().map_or(0, |h| h.number())
    }

    /// Database id of the current row.
    pub fn database_id(&self) -> DatabaseId {
        self.handle.as_ref().map_or(0, |h| h.database_id())
    }

    /// Table id of the current row.
    pub fn table_id(&self) -> TableId {
        self.handle.as_ref().map_or(0, |h| h.table_id())
    }

    /// Status of the command behind the current row.
    pub fn command_status(&self) -> StatusCode {
        self.status_of(|h| h.command_status())
    }

    /// All, some or none of the requests were answered.
    pub fn transport_status(&self) -> StatusCode {
        self.status_of(|h| h.transport_status())
    }

    /// Controller reachability during the round trip.
    pub fn connectivity_status(&self) -> StatusCode {
        self.status_of(|h| h.connectivity_status())
    }

    /// Timeout tier that expired, if any.
    pub fn timeout_status(&self) -> StatusCode {
        self.status_of(|h| h.timeout_status())
    }

    /// Restart and collect every row's key and value.
    ///
    /// Rows without a key are skipped; a missing value is read as empty.
    pub fn key_values(&mut self) -> KeyValues {
        let mut out = KeyValues::new();
        self.drain(|key, value| {
            out.insert(key, value.unwrap_or_default());
        });
        out
    }

    /// Restart and collect every row's key.
    pub fn keys(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        self.drain(|key, _| out.push(key.to_string()));
        out
    }

    fn drain<F>(&mut self, mut visit: F)
    where
        F: FnMut(&str, Option<&str>),
    {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        handle.begin();
        while !handle.is_end() {
            if let Some(key) = handle.key() {
                visit(key, handle.value());
            }
            handle.next();
        }
    }

    fn status_of(&self, read: impl FnOnce(&dyn ResultHandle) -> StatusCode) -> StatusCode {
        match self.handle.as_deref() {
            Some(handle) => read(handle),
            None => StatusCode::ApiError,
        }
    }
}

impl Drop for ResultCursor {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCursor")
            .field("closed", &self.is_closed())
            .field("at_end", &self.is_end())
            .field("transport_status", &self.transport_status())
            .finish()
    }
}
