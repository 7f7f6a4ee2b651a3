//! The transport seam.
//!
//! The dispatcher is agnostic to how I/O actually happens; it only needs an
//! async call-and-result contract. Two error channels exist on purpose: the
//! inner `Result` carries failures the adapter itself can type (these are
//! forwarded into the core as response data), while the outer
//! `anyhow::Error` is an untyped crash that is surfaced to the host and
//! never becomes a response.

mod http;
mod sse;

pub use http::HttpTransport;
pub use sse::SseParser;

use futures_core::Stream;
use std::future::Future;
use std::pin::Pin;

use crate::protocol::{HttpRequest, HttpResponse, StreamEvent, StreamSource, TransportError};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// The typed outcome of a single-shot request.
pub type SendOutcome = Result<HttpResponse, TransportError>;

/// One item of a subscription's sequence.
pub type StreamItem = Result<StreamEvent, TransportError>;

/// A transport adapter.
pub trait Transport: Send + Sync {
    /// Execute one request. Single-shot, asynchronous.
    fn send(&self, request: HttpRequest) -> BoxFuture<anyhow::Result<SendOutcome>>;

    /// Open a continuous sequence of results. Pull-based, unbounded length,
    /// not restartable; a new subscription must be issued from scratch.
    /// Cancellation is cooperative: dropping the stream releases the
    /// underlying resource.
    fn subscribe(&self, source: StreamSource) -> BoxStream<StreamItem>;
}
