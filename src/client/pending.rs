//! Handles returned to callers for in-flight requests

use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};

use crate::error::{Result, StoreError};
use crate::protocol::{Outcome, RequestId};

use super::registry::QueryEvent;

/// Completion of an `add_entry` (or the handshake)
///
/// A completion whose sender disappears without an answer resolves as
/// `StoreError::Stopped`.
#[derive(Debug)]
#[must_use = "a PendingWrite does nothing unless waited on"]
pub struct PendingWrite {
    id: RequestId,
    receiver: Receiver<Outcome>,
}

impl PendingWrite {
    pub(crate) fn new(id: RequestId, receiver: Receiver<Outcome>) -> Self {
        Self { id, receiver }
    }

    /// Request id of the underlying command
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Block until the worker acknowledges the write
    pub fn wait(self) -> Result<()> {
        self.receiver.recv().unwrap_or(Err(StoreError::Stopped))
    }

    /// Block for at most `timeout`; hands the handle back if still pending
    pub fn wait_timeout(self, timeout: Duration) -> std::result::Result<Result<()>, Self> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(StoreError::Stopped)),
            Err(RecvTimeoutError::Timeout) => Err(self),
        }
    }

    /// Whether an outcome has arrived (`wait` would not block)
    pub fn is_ready(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// Stream of matches for one `find`
///
/// Yields each match as the worker finds it, in file order, and ends when the
/// worker reports the query done. A failed or abandoned query yields one final
/// `Err`.
#[derive(Debug)]
pub struct Matches {
    id: RequestId,
    receiver: Receiver<QueryEvent>,
    finished: bool,
}

impl Matches {
    pub(crate) fn new(id: RequestId, receiver: Receiver<QueryEvent>) -> Self {
        Self {
            id,
            receiver,
            finished: false,
        }
    }

    /// Request id of the underlying Query
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Drain the stream, failing on the first error
    pub fn collect_matches(self) -> Result<Vec<String>> {
        self.collect()
    }

    fn finish(&mut self, outcome: Outcome) -> Option<Result<String>> {
        self.finished = true;
        outcome.err().map(Err)
    }
}

impl Iterator for Matches {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.receiver.recv() {
            Ok(QueryEvent::Match(value)) => Some(Ok(value)),
            Ok(QueryEvent::Done(outcome)) => self.finish(outcome),
            Err(_) => self.finish(Err(StoreError::Stopped)),
        }
    }
}
