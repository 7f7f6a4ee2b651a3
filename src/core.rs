//! The boundary to the deterministic core engine.
//!
//! The engine is a black box with exactly three entry points, all
//! synchronous, all working on codec bytes. It has no internal locking and
//! is not reentrant; [`CoreHandle`] is the one exclusively-owned wrapper
//! that serializes every call against the same instance.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::protocol::RequestId;

/// The core engine contract.
///
/// `process_event` and `resolve` return an encoded effect list; `view`
/// returns an encoded snapshot. None of them may block on external I/O.
pub trait CoreEngine: Send {
    /// Feed one encoded event; returns effect-list bytes.
    fn process_event(&mut self, event: &[u8]) -> Vec<u8>;

    /// Feed the encoded response for an outstanding request; returns
    /// effect-list bytes. May be called repeatedly for a streamed id.
    fn resolve(&mut self, id: RequestId, response: &[u8]) -> Vec<u8>;

    /// Produce an encoded snapshot of the current state. Idempotent and
    /// side-effect-free: two calls with no intervening event or resolve
    /// yield equal bytes for equal state.
    fn view(&mut self) -> Vec<u8>;
}

/// Exclusively-owned handle enforcing the single-writer invariant.
///
/// Cloning shares the same engine; the mutex makes `process_event`,
/// `resolve` and `view` mutually exclusive. The lock is only held across
/// synchronous core calls, never across an await point.
#[derive(Clone)]
pub struct CoreHandle {
    inner: Arc<Mutex<Box<dyn CoreEngine>>>,
}

impl CoreHandle {
    pub fn new(engine: impl CoreEngine + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(engine))),
        }
    }

    pub fn process_event(&self, event: &[u8]) -> Vec<u8> {
        self.inner.lock().process_event(event)
    }

    pub fn resolve(&self, id: RequestId, response: &[u8]) -> Vec<u8> {
        self.inner.lock().resolve(id, response)
    }

    pub fn view(&self) -> Vec<u8> {
        self.inner.lock().view()
    }
}
