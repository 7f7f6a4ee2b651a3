//! Error taxonomy for the shell side of the protocol.
//!
//! Two channels exist for failures. Typed transport failures
//! ([`TransportError`](crate::protocol::TransportError)) are *data*: they are
//! serialized into the response channel so the core can represent them in its
//! own state. Everything in this module is the other channel — faults in the
//! protocol machinery itself, surfaced to the host and never converted into a
//! silently successful empty effect batch.

use thiserror::Error;

use crate::protocol::RequestId;

/// Malformed bytes at a codec boundary.
///
/// Always fatal to the operation in progress. Decoding never falls back to a
/// default value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the announced content did.
    #[error("truncated buffer: needed {expected} more bytes, had {got}")]
    Truncated { expected: usize, got: usize },

    /// Bytes were left over after a complete message was read.
    #[error("trailing bytes after message: {remaining} remaining")]
    TrailingBytes { remaining: usize },

    /// A length prefix exceeded the configured frame bound.
    #[error("frame length {len} exceeds limit {limit}")]
    FrameTooLarge { len: usize, limit: usize },

    /// The payload bytes did not deserialize into the expected type.
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// The pieces of a [`ShellError::ProtocolViolation`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The core emitted a request id that is already outstanding.
    #[error("request id {id} is already outstanding")]
    DuplicateRequestId { id: RequestId },

    /// A resolution was attempted for an id with no outstanding entry.
    #[error("request id {id} is not outstanding")]
    UnknownRequestId { id: RequestId },
}

/// Faults surfaced to the consumer through the shell's error channel.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Malformed bytes at any boundary; aborts the batch in progress.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An effect tag this shell does not know, under the `Fatal` policy.
    /// Under `Ignore` (the default) unknown effects are logged and skipped.
    #[error("unknown effect variant {tag} for request {id}")]
    UnknownEffect { id: RequestId, tag: u8 },

    /// A transport adapter failed in a way it could not type. Not
    /// convertible into a response; the request is cleaned from bookkeeping
    /// without ever being resolved.
    #[error("transport crashed for request {id}: {source}")]
    TransportCrash {
        id: RequestId,
        #[source]
        source: anyhow::Error,
    },

    /// Correlation discipline was broken; core/shell mismatch or a bug.
    /// Always fatal to the processing cycle.
    #[error(transparent)]
    ProtocolViolation(#[from] ProtocolViolation),
}
