//! Message types crossing the core/shell boundary.
//!
//! The core is a deterministic state machine that never performs I/O; it
//! communicates with the shell exclusively through these values. Events go
//! in, effect requests come out, and responses are correlated back to the
//! effect that asked for them via [`RequestId`].

mod http;
mod stream;
mod view;

pub use http::{HttpRequest, HttpResponse, TransportError};
pub use stream::{StreamEvent, StreamSource};
pub use view::{AddressSuggestion, FieldView, ViewModel};

use serde::{Deserialize, Serialize};

/// Correlation token for an outstanding effect request.
///
/// Allocated by the core, monotonically, unique among currently outstanding
/// requests. The shell treats it as opaque and echoes it back unchanged.
pub type RequestId = u32;

/// Identifies a survey field in events and view models.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldId {
    Username,
    Email,
    Age,
    Address,
}

/// Something that happened: user input, a selection, a lifecycle signal.
///
/// Produced by the consumer, consumed exactly once by the core.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    UpdateValue { field: FieldId, value: String },
    TouchField { field: FieldId },
    SetFieldEditing { field: FieldId, editing: bool },
    Submit,
    Edit,
    ResetForm,
    FetchSuggestions { query: String },
    SelectSuggestion { suggestion: AddressSuggestion },
    SubscribeSuggestions { query: String },
}

/// A side effect the core asks the shell to perform.
///
/// Closed set, fixed by protocol version; the dispatcher matches on it
/// exhaustively. New kinds are additive: the wire format carries a tag and a
/// payload length so older shells can skip variants they do not know.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Repaint request. No payload; resolved synchronously by pulling a
    /// fresh view snapshot. Never entered in the outstanding table.
    Render,
    /// Single-shot HTTP call. Resolved once with an [`HttpResponse`] or a
    /// typed [`TransportError`].
    Http(HttpRequest),
    /// Continuous subscription. Resolved once per produced item, with the
    /// same request id, until the sequence ends or is cancelled.
    StreamSubscribe(StreamSource),
}

impl Effect {
    /// Wire tag for this variant. Stable across protocol versions.
    pub fn tag(&self) -> u8 {
        match self {
            Effect::Render => 0,
            Effect::Http(_) => 1,
            Effect::StreamSubscribe(_) => 2,
        }
    }
}

/// An effect paired with the core-assigned correlation id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EffectRequest {
    pub id: RequestId,
    pub effect: Effect,
}

/// A result routed back into the core via `resolve`.
///
/// The inner `Result` is the typed channel: transport failures the adapter
/// itself reports travel here so the core can represent them in its own
/// state. Untyped adapter crashes never become a `Response`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Http(Result<HttpResponse, TransportError>),
    Stream(Result<StreamEvent, TransportError>),
}
