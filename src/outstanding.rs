//! The outstanding-request table.
//!
//! Correlation discipline for in-flight side effects: every id is inserted
//! when its effect is dispatched and removed exactly once, on resolution or
//! cancellation. The table holds no business state, only the bookkeeping
//! needed to tie an id to its in-flight operation.

use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::task::AbortHandle;

use crate::error::ProtocolViolation;
use crate::protocol::RequestId;

/// What kind of operation an outstanding id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlightKind {
    Http,
    Stream,
}

struct InFlight {
    kind: InFlightKind,
    abort: Option<AbortHandle>,
}

/// Mutex-guarded map of outstanding ids.
#[derive(Default)]
pub struct Outstanding {
    entries: Mutex<HashMap<RequestId, InFlight>>,
}

impl Outstanding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly dispatched request. A duplicate id while the
    /// first is still outstanding is a protocol violation.
    pub fn insert(&self, id: RequestId, kind: InFlightKind) -> Result<(), ProtocolViolation> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&id) {
            return Err(ProtocolViolation::DuplicateRequestId { id });
        }
        entries.insert(id, InFlight { kind, abort: None });
        Ok(())
    }

    /// Attach the abort handle for the task executing this request. A miss
    /// means the task already completed; the handle is simply dropped.
    pub fn set_abort(&self, id: RequestId, abort: AbortHandle) {
        if let Some(entry) = self.entries.lock().get_mut(&id) {
            entry.abort = Some(abort);
        }
    }

    /// Remove an id on resolution (or stream end). Removing an id with no
    /// entry is a protocol violation: either it was never dispatched or it
    /// was already resolved.
    pub fn complete(&self, id: RequestId) -> Result<InFlightKind, ProtocolViolation> {
        self.entries
            .lock()
            .remove(&id)
            .map(|e| e.kind)
            .ok_or(ProtocolViolation::UnknownRequestId { id })
    }

    /// True while the id has an entry. Stream tasks check this before every
    /// per-item resolution so a cancelled subscription stops delivering.
    pub fn is_outstanding(&self, id: RequestId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Cancel one in-flight request: abort its task and release the entry.
    /// No resolution will be issued for the id afterwards. Returns false if
    /// the id was not outstanding.
    pub fn cancel(&self, id: RequestId) -> bool {
        match self.entries.lock().remove(&id) {
            Some(entry) => {
                if let Some(abort) = entry.abort {
                    abort.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Cancel everything in flight. Returns the number of entries released.
    pub fn cancel_all(&self) -> usize {
        let entries = std::mem::take(&mut *self.entries.lock());
        let count = entries.len();
        for entry in entries.into_values() {
            if let Some(abort) = entry.abort {
                abort.abort();
            }
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
