//! The effect dispatcher.
//!
//! [`ShellBridge`] is the owner of a processing cycle: feed the core, decode
//! the returned effect batch, execute each effect, and route resolutions
//! back into the core until no work remains. Renders resolve synchronously
//! during the batch walk; I/O effects are registered first and spawned only
//! after the walk, so every render the core ordered before an I/O effect is
//! published before that effect's resolution can trigger another one.
//!
//! Faults in the machinery itself (malformed batches, correlation
//! violations, adapter crashes) never turn into responses; they are logged
//! and pushed to the host through the error channel.

use std::sync::Arc;

use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::codec::{self, DecodedEffect};
use crate::config::{ShellConfig, UnknownEffectPolicy};
use crate::core::CoreHandle;
use crate::error::{DecodeError, ShellError};
use crate::outstanding::{InFlightKind, Outstanding};
use crate::protocol::{
    Effect, EffectRequest, Event, HttpRequest, RequestId, Response, StreamSource, ViewModel,
};
use crate::transport::Transport;
use crate::view::ViewProjection;

/// I/O admitted during a batch walk, waiting for the walk to finish.
enum Deferred {
    Http(RequestId, HttpRequest),
    Stream(RequestId, StreamSource),
}

pub struct ShellBridge {
    core: CoreHandle,
    transport: Arc<dyn Transport>,
    outstanding: Outstanding,
    projection: ViewProjection,
    config: ShellConfig,
    errors: mpsc::UnboundedSender<ShellError>,
    error_rx: Mutex<Option<mpsc::UnboundedReceiver<ShellError>>>,
}

impl ShellBridge {
    /// Wire a core to a transport. Pulls the initial view snapshot so
    /// subscribers never observe an uninitialized view.
    ///
    /// Must be called inside a tokio runtime; I/O effects are spawned as
    /// tasks on it.
    pub fn new(
        core: CoreHandle,
        transport: Arc<dyn Transport>,
        config: ShellConfig,
    ) -> Result<Arc<Self>, DecodeError> {
        let projection = ViewProjection::new(core.clone(), config.max_frame_bytes)?;
        let (errors, error_rx) = mpsc::unbounded_channel();
        Ok(Arc::new(Self {
            core,
            transport,
            outstanding: Outstanding::new(),
            projection,
            config,
            errors,
            error_rx: Mutex::new(Some(error_rx)),
        }))
    }

    /// Feed one event into the core and execute the resulting batch.
    pub fn dispatch(self: &Arc<Self>, event: &Event) {
        tracing::debug!(?event, "dispatching event");
        let batch = self.core.process_event(&codec::encode_event(event));
        self.drain(&batch);
    }

    /// Resolve an outstanding single-shot request by hand.
    ///
    /// This is the path for external collaborators that execute effects
    /// themselves. Resolving an id that is not outstanding, including a
    /// second resolution of the same id, is a protocol violation.
    pub fn resolve(self: &Arc<Self>, id: RequestId, response: Response) {
        match self.outstanding.complete(id) {
            Ok(kind) => {
                tracing::debug!(id, ?kind, "resolving request");
                self.feed(id, &response);
            }
            Err(violation) => self.report(violation.into()),
        }
    }

    /// Cancel one in-flight request. No resolution will reach the core for
    /// this id afterwards. Returns false if the id was not outstanding.
    pub fn cancel(&self, id: RequestId) -> bool {
        let cancelled = self.outstanding.cancel(id);
        if cancelled {
            tracing::debug!(id, "cancelled in-flight request");
        }
        cancelled
    }

    /// Cancel everything in flight, e.g. on teardown.
    pub fn cancel_all(&self) -> usize {
        let count = self.outstanding.cancel_all();
        if count > 0 {
            tracing::debug!(count, "cancelled all in-flight requests");
        }
        count
    }

    pub fn outstanding_len(&self) -> usize {
        self.outstanding.len()
    }

    /// Subscribe to published view snapshots. The receiver always holds the
    /// latest snapshot; intermediate ones may be skipped, torn ones never.
    pub fn subscribe_views(&self) -> watch::Receiver<ViewModel> {
        self.projection.subscribe()
    }

    pub fn latest_view(&self) -> ViewModel {
        self.projection.latest()
    }

    /// Take the error channel receiver. Yields `Some` exactly once.
    pub fn take_errors(&self) -> Option<mpsc::UnboundedReceiver<ShellError>> {
        self.error_rx.lock().take()
    }

    /// Route a resolution into the core and execute whatever it emits.
    fn feed(self: &Arc<Self>, id: RequestId, response: &Response) {
        let batch = self.core.resolve(id, &codec::encode_response(response));
        self.drain(&batch);
    }

    /// Execute one effect batch in order. A fatal fault aborts the rest of
    /// the batch and rolls back ids it admitted, none of which has a task
    /// yet because spawning happens after the walk.
    fn drain(self: &Arc<Self>, batch: &[u8]) {
        let decoded = match codec::decode_effect_requests(batch, self.config.max_frame_bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.report(err.into());
                return;
            }
        };

        let mut deferred = Vec::new();
        let mut registered = Vec::new();
        for element in decoded {
            let fatal = match element {
                DecodedEffect::Effect(request) => {
                    self.admit(request, &mut deferred, &mut registered)
                }
                DecodedEffect::Unknown { id, tag } => match self.config.unknown_effects {
                    UnknownEffectPolicy::Ignore => {
                        tracing::warn!(id, tag, "ignoring unknown effect variant");
                        None
                    }
                    UnknownEffectPolicy::Fatal => Some(ShellError::UnknownEffect { id, tag }),
                },
            };
            if let Some(err) = fatal {
                for id in registered {
                    self.outstanding.cancel(id);
                }
                self.report(err);
                return;
            }
        }

        for work in deferred {
            match work {
                Deferred::Http(id, request) => {
                    let bridge = Arc::clone(self);
                    let task = tokio::spawn(async move { bridge.run_http(id, request).await });
                    self.outstanding.set_abort(id, task.abort_handle());
                }
                Deferred::Stream(id, source) => {
                    let bridge = Arc::clone(self);
                    let task = tokio::spawn(async move { bridge.run_stream(id, source).await });
                    self.outstanding.set_abort(id, task.abort_handle());
                }
            }
        }
    }

    /// Handle one admitted effect. Renders resolve inline; I/O is parked in
    /// `deferred`. Returns the fault that should abort the batch, if any.
    fn admit(
        &self,
        request: EffectRequest,
        deferred: &mut Vec<Deferred>,
        registered: &mut Vec<RequestId>,
    ) -> Option<ShellError> {
        match request.effect {
            Effect::Render => match self.projection.publish() {
                Ok(()) => {
                    tracing::debug!("published view snapshot");
                    None
                }
                Err(err) => Some(err.into()),
            },
            Effect::Http(req) => match self.outstanding.insert(request.id, InFlightKind::Http) {
                Ok(()) => {
                    registered.push(request.id);
                    deferred.push(Deferred::Http(request.id, req));
                    None
                }
                Err(violation) => Some(violation.into()),
            },
            Effect::StreamSubscribe(source) => {
                match self.outstanding.insert(request.id, InFlightKind::Stream) {
                    Ok(()) => {
                        registered.push(request.id);
                        deferred.push(Deferred::Stream(request.id, source));
                        None
                    }
                    Err(violation) => Some(violation.into()),
                }
            }
        }
    }

    async fn run_http(self: Arc<Self>, id: RequestId, request: HttpRequest) {
        match self.transport.send(request).await {
            Ok(outcome) => {
                // A miss here means a concurrent cancel won the race; the
                // resolution is dropped, not reported.
                match self.outstanding.complete(id) {
                    Ok(_) => self.feed(id, &Response::Http(outcome)),
                    Err(_) => tracing::debug!(id, "request cancelled before resolution"),
                }
            }
            Err(source) => {
                self.outstanding.cancel(id);
                self.report(ShellError::TransportCrash { id, source });
            }
        }
    }

    async fn run_stream(self: Arc<Self>, id: RequestId, source: StreamSource) {
        let mut stream = self.transport.subscribe(source);
        while let Some(item) = stream.next().await {
            // Streams resolve repeatedly without releasing the id, so the
            // cancellation check happens per item.
            if !self.outstanding.is_outstanding(id) {
                tracing::debug!(id, "subscription cancelled, dropping remaining items");
                return;
            }
            tracing::debug!(id, "resolving stream item");
            self.feed(id, &Response::Stream(item));
        }
        if self.outstanding.complete(id).is_ok() {
            tracing::debug!(id, "stream ended");
        }
    }

    fn report(&self, err: ShellError) {
        tracing::error!(error = %err, "shell fault");
        let _ = self.errors.send(err);
    }
}
