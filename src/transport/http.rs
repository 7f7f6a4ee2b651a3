//! reqwest-backed transport adapter.
//!
//! One adapter covers both transport operations: single-shot requests and
//! SSE subscriptions ride the same connection pool. Two clients are kept
//! because the total-request timeout that protects single-shot calls would
//! kill a long-lived subscription mid-stream.

use anyhow::Context;
use futures_util::StreamExt;
use std::collections::VecDeque;

use super::sse::SseParser;
use super::{BoxFuture, BoxStream, SendOutcome, StreamItem, Transport};
use crate::config::HttpTransportConfig;
use crate::protocol::{HttpRequest, HttpResponse, StreamSource, TransportError};

pub struct HttpTransport {
    client: reqwest::Client,
    stream_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .context("failed to build http client")?;
        // No total timeout: subscriptions are unbounded.
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .context("failed to build streaming client")?;
        Ok(Self {
            client,
            stream_client,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<anyhow::Result<SendOutcome>> {
        let client = self.client.clone();
        Box::pin(async move {
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .with_context(|| format!("invalid request method {:?}", request.method))?;
            let mut builder = client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if !request.body.is_empty() {
                builder = builder.body(request.body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => return classify(err).map(Err),
            };

            // Non-success statuses are data, not failures: the response is
            // handed to the core as-is and the core decides what it means.
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = match response.bytes().await {
                Ok(body) => body.to_vec(),
                Err(err) => return classify(err).map(Err),
            };

            Ok(Ok(HttpResponse {
                status,
                headers,
                body,
            }))
        })
    }

    fn subscribe(&self, source: StreamSource) -> BoxStream<StreamItem> {
        let client = self.stream_client.clone();
        let setup = async move {
            let mut builder = client
                .get(&source.url)
                .header("accept", "text/event-stream");
            for (name, value) in &source.headers {
                builder = builder.header(name, value);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => return single(Err(stream_error(err))),
            };
            if !response.status().is_success() {
                return single(Err(TransportError::Status {
                    code: response.status().as_u16(),
                }));
            }
            event_stream(response)
        };
        Box::pin(futures_util::stream::once(setup).flatten())
    }
}

/// Split a reqwest failure into the two error channels: request
/// construction bugs crash, wire-level failures are typed.
fn classify(err: reqwest::Error) -> anyhow::Result<TransportError> {
    if err.is_builder() {
        return Err(anyhow::Error::new(err).context("request could not be constructed"));
    }
    Ok(stream_error(err))
}

fn stream_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

fn single(item: StreamItem) -> BoxStream<StreamItem> {
    Box::pin(futures_util::stream::iter([item]))
}

struct SseState {
    body: BoxStream<Result<Vec<u8>, reqwest::Error>>,
    parser: SseParser,
    pending: VecDeque<StreamItem>,
    done: bool,
}

/// Turn a streaming response body into a sequence of parsed events.
/// Delivery order matches arrival order; a body failure terminates the
/// sequence after one final typed error item.
fn event_stream(response: reqwest::Response) -> BoxStream<StreamItem> {
    let state = SseState {
        body: Box::pin(response.bytes_stream().map(|chunk| chunk.map(|b| b.to_vec()))),
        parser: SseParser::new(),
        pending: VecDeque::new(),
        done: false,
    };
    Box::pin(futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    state
                        .pending
                        .extend(state.parser.push(&chunk).into_iter().map(Ok));
                }
                Some(Err(err)) => {
                    state.done = true;
                    state
                        .pending
                        .extend(state.parser.finish().into_iter().map(Ok));
                    state.pending.push_back(Err(stream_error(err)));
                }
                None => {
                    state.done = true;
                    state
                        .pending
                        .extend(state.parser.finish().into_iter().map(Ok));
                }
            }
        }
    }))
}
