//! Stream-subscribe effect payloads.

use serde::{Deserialize, Serialize};

/// Descriptor for a continuous sequence of results.
///
/// A subscription is pull-based, finite or infinite, and not restartable; a
/// new subscription must be issued from scratch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StreamSource {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl StreamSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }
}

/// One item produced by a subscription.
///
/// SSE-shaped: an optional event name plus a data payload. Every item is
/// resolved against the same request id, in production order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StreamEvent {
    pub event: Option<String>,
    pub data: Vec<u8>,
}
