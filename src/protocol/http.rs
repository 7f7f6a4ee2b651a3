//! HTTP-class effect payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An HTTP request the core wants executed.
///
/// The core builds these as plain data; it has no knowledge of the client
/// that will execute them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method name, uppercase ("GET", "POST", ...).
    pub method: String,
    pub url: String,
    /// Ordered header pairs. Order is preserved through the codec.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// The response to a single-shot HTTP effect.
///
/// Non-success statuses are carried here, not as errors; the core decides
/// what a 404 means for its state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A failure the transport adapter itself reports.
///
/// Serializable: these are forwarded into the core as the failure arm of a
/// [`Response`](super::Response), letting the UI render degraded states
/// through the normal event flow. Adapter crashes are a different animal and
/// go to the host error channel instead.
#[derive(Error, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("unexpected status {code}")]
    Status { code: u16 },
    #[error("transport failure: {0}")]
    Other(String),
}
