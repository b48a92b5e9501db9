//! Pending request registry
//!
//! Completion senders and result sinks keyed by request id. Shared between the
//! caller (which tracks requests) and the dispatcher (which resolves them).

use std::collections::BTreeMap;
use std::mem;

use crossbeam::channel::{self, Sender};

use crate::error::StoreError;
use crate::protocol::{Outcome, RequestId};

use super::pending::{Matches, PendingWrite};

/// What a query sink receives
#[derive(Debug)]
pub(crate) enum QueryEvent {
    Match(String),
    Done(Outcome),
}

/// Why the registry stopped accepting requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseReason {
    /// `stop`, `shutdown` or drop of the handle
    Stopped,
    /// The worker thread went away on its own
    Disconnected,
}

impl CloseReason {
    fn error(self) -> StoreError {
        match self {
            CloseReason::Stopped => StoreError::Stopped,
            CloseReason::Disconnected => StoreError::Disconnected,
        }
    }
}

/// In-flight operations and queries, ordered by id
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// One per in-flight Init, Add or Shutdown
    operations: BTreeMap<RequestId, Sender<Outcome>>,

    /// One per in-flight Query
    queries: BTreeMap<RequestId, Sender<QueryEvent>>,

    /// Set by `close`; later requests fail immediately
    closed: Option<CloseReason>,
}

impl Registry {
    /// Track a request answered by a single Ack
    pub fn track_operation(&mut self, id: RequestId) -> PendingWrite {
        let (tx, rx) = channel::bounded(1);
        if let Some(reason) = self.closed {
            let _ = tx.send(Err(reason.error()));
        } else {
            self.operations.insert(id, tx);
        }
        PendingWrite::new(id, rx)
    }

    /// Track a query answered by Results and one Done
    pub fn track_query(&mut self, id: RequestId) -> Matches {
        let (tx, rx) = channel::unbounded();
        if let Some(reason) = self.closed {
            let _ = tx.send(QueryEvent::Done(Err(reason.error())));
        } else {
            self.queries.insert(id, tx);
        }
        Matches::new(id, rx)
    }

    /// Returns false if no operation with this id is pending
    pub fn resolve_operation(&mut self, id: RequestId, outcome: Outcome) -> bool {
        match self.operations.remove(&id) {
            Some(tx) => {
                // The caller may have dropped its PendingWrite
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    pub fn push_match(&mut self, id: RequestId, value: String) -> bool {
        match self.queries.get(&id) {
            Some(tx) => {
                let _ = tx.send(QueryEvent::Match(value));
                true
            }
            None => false,
        }
    }

    pub fn finish_query(&mut self, id: RequestId, outcome: Outcome) -> bool {
        match self.queries.remove(&id) {
            Some(tx) => {
                let _ = tx.send(QueryEvent::Done(outcome));
                true
            }
            None => false,
        }
    }

    /// Fail everything still pending with `Stopped`.
    ///
    /// Returns how many requests were abandoned.
    pub fn close(&mut self) -> usize {
        self.close_with(CloseReason::Stopped)
    }

    /// Fail everything still pending with the error for `reason`.
    ///
    /// The first close wins; later calls only sweep what is left.
    pub fn close_with(&mut self, reason: CloseReason) -> usize {
        let reason = *self.closed.get_or_insert(reason);

        let operations = mem::take(&mut self.operations);
        let queries = mem::take(&mut self.queries);
        let abandoned = operations.len() + queries.len();

        for (_, tx) in operations {
            let _ = tx.send(Err(reason.error()));
        }
        for (_, tx) in queries {
            let _ = tx.send(QueryEvent::Done(Err(reason.error())));
        }

        abandoned
    }

    /// (pending operations, pending queries)
    pub fn in_flight(&self) -> (usize, usize) {
        (self.operations.len(), self.queries.len())
    }
}
