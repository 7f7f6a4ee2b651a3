//! A core whose outputs are scripted ahead of time.
//!
//! Lets a test hand the dispatcher arbitrary effect batches, including
//! hand-built byte sequences a real core could never produce, and records
//! every resolution routed back in.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use formbridge::codec::{self, DEFAULT_MAX_FRAME_BYTES};
use formbridge::core::CoreEngine;
use formbridge::protocol::{EffectRequest, RequestId, Response, ViewModel};

pub type ResolvedLog = Arc<Mutex<Vec<(RequestId, Response)>>>;

#[derive(Default)]
pub struct ScriptedCore {
    batches: VecDeque<Vec<u8>>,
    resolutions: HashMap<RequestId, VecDeque<Vec<u8>>>,
    resolved: ResolvedLog,
    view_calls: Arc<AtomicUsize>,
}

impl ScriptedCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the batch returned by the next `process_event` call.
    pub fn push_batch(&mut self, requests: &[EffectRequest]) {
        self.batches.push_back(codec::encode_effect_requests(requests));
    }

    /// Queue raw batch bytes, malformed ones included.
    pub fn push_raw_batch(&mut self, bytes: Vec<u8>) {
        self.batches.push_back(bytes);
    }

    /// Queue the batch returned when `id` is next resolved.
    pub fn on_resolve(&mut self, id: RequestId, requests: &[EffectRequest]) {
        self.resolutions
            .entry(id)
            .or_default()
            .push_back(codec::encode_effect_requests(requests));
    }

    /// Handle to the resolution record; clone before moving the core into a
    /// bridge.
    pub fn resolved_log(&self) -> ResolvedLog {
        Arc::clone(&self.resolved)
    }

    /// Number of view pulls so far. The projection pulls once at
    /// construction and once per published render.
    pub fn view_call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.view_calls)
    }
}

impl CoreEngine for ScriptedCore {
    fn process_event(&mut self, _event: &[u8]) -> Vec<u8> {
        self.batches
            .pop_front()
            .unwrap_or_else(|| codec::encode_effect_requests(&[]))
    }

    fn resolve(&mut self, id: RequestId, response: &[u8]) -> Vec<u8> {
        let response =
            codec::decode_response(response, DEFAULT_MAX_FRAME_BYTES).expect("malformed response");
        self.resolved.lock().push((id, response));
        self.resolutions
            .get_mut(&id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| codec::encode_effect_requests(&[]))
    }

    fn view(&mut self) -> Vec<u8> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        codec::encode_view(&ViewModel::default())
    }
}
