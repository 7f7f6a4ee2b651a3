//! Scripted transport adapter.
//!
//! Outcomes are matched to requests by URL substring, so completion order
//! stays deterministic no matter how the dispatcher schedules its tasks. A
//! gated outcome is held back until the test fires the returned sender,
//! which is how out-of-order completion is exercised.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use formbridge::protocol::{HttpRequest, HttpResponse, StreamSource};
use formbridge::transport::{BoxFuture, BoxStream, SendOutcome, StreamItem, Transport};

struct SendScript {
    url_contains: String,
    gate: Option<oneshot::Receiver<()>>,
    outcome: anyhow::Result<SendOutcome>,
}

enum StreamBody {
    Items(Vec<StreamItem>),
    Channel(mpsc::UnboundedReceiver<StreamItem>),
}

struct StreamScript {
    url_contains: String,
    body: StreamBody,
}

#[derive(Default)]
pub struct MockTransport {
    sends: Mutex<Vec<SendScript>>,
    streams: Mutex<Vec<StreamScript>>,
    captured_sends: Mutex<Vec<HttpRequest>>,
    captured_subscribes: Mutex<Vec<StreamSource>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the outcome for the next request whose URL contains `url`.
    pub fn respond(&self, url: &str, outcome: anyhow::Result<SendOutcome>) {
        self.sends.lock().push(SendScript {
            url_contains: url.to_string(),
            gate: None,
            outcome,
        });
    }

    /// Like [`respond`](Self::respond), but the outcome is held until the
    /// returned sender fires or is dropped.
    pub fn respond_gated(
        &self,
        url: &str,
        outcome: anyhow::Result<SendOutcome>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.sends.lock().push(SendScript {
            url_contains: url.to_string(),
            gate: Some(rx),
            outcome,
        });
        tx
    }

    /// Script a finite subscription delivered as-is.
    pub fn stream_items(&self, url: &str, items: Vec<StreamItem>) {
        self.streams.lock().push(StreamScript {
            url_contains: url.to_string(),
            body: StreamBody::Items(items),
        });
    }

    /// Script a subscription the test feeds item by item. Dropping the
    /// sender ends the sequence.
    pub fn stream_channel(&self, url: &str) -> mpsc::UnboundedSender<StreamItem> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams.lock().push(StreamScript {
            url_contains: url.to_string(),
            body: StreamBody::Channel(rx),
        });
        tx
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.captured_sends.lock().clone()
    }

    pub fn subscribed(&self) -> Vec<StreamSource> {
        self.captured_subscribes.lock().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<anyhow::Result<SendOutcome>> {
        let script = {
            let mut sends = self.sends.lock();
            sends
                .iter()
                .position(|s| request.url.contains(&s.url_contains))
                .map(|i| sends.remove(i))
        };
        self.captured_sends.lock().push(request);
        Box::pin(async move {
            match script {
                Some(SendScript { gate, outcome, .. }) => {
                    if let Some(gate) = gate {
                        let _ = gate.await;
                    }
                    outcome
                }
                // Unscripted requests succeed with an empty suggestion list.
                None => Ok(Ok(HttpResponse::ok(b"[]".to_vec()))),
            }
        })
    }

    fn subscribe(&self, source: StreamSource) -> BoxStream<StreamItem> {
        let script = {
            let mut streams = self.streams.lock();
            streams
                .iter()
                .position(|s| source.url.contains(&s.url_contains))
                .map(|i| streams.remove(i))
        };
        self.captured_subscribes.lock().push(source);
        match script.map(|s| s.body) {
            Some(StreamBody::Items(items)) => Box::pin(futures_util::stream::iter(items)),
            Some(StreamBody::Channel(rx)) => {
                Box::pin(futures_util::stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                }))
            }
            None => Box::pin(futures_util::stream::iter(Vec::<StreamItem>::new())),
        }
    }
}
