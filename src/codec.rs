//! Binary codec for boundary messages.
//!
//! Scalar messages (events, responses, views) are bincode with fixed-width
//! integers. Effect lists get an extra framing layer so the set of effect
//! kinds can grow without breaking older shells:
//!
//! ```text
//! u32 LE count
//! per element:
//!   u32 LE request id
//!   u8     effect tag
//!   u32 LE payload length
//!   N      payload bytes (bincode)
//! ```
//!
//! An unknown tag is skippable via its length prefix and surfaced as
//! [`DecodedEffect::Unknown`] instead of failing the whole batch. The codec
//! knows nothing about effect *semantics*; it only moves typed bytes across
//! the boundary, preserving element order exactly.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DecodeError;
use crate::protocol::{Effect, EffectRequest, Event, RequestId, Response, ViewModel};

/// Default bound on any single frame or message (1 MiB). Guards against
/// malicious or accidental large allocations.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

const RENDER_TAG: u8 = 0;
const HTTP_TAG: u8 = 1;
const STREAM_TAG: u8 = 2;

/// One element of a decoded effect list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEffect {
    Effect(EffectRequest),
    /// A tag this shell does not know. The id is still meaningful; policy
    /// decides whether this is a warning or a fatal error.
    Unknown { id: RequestId, tag: u8 },
}

fn bc_options(limit: usize) -> impl Options {
    bincode::options()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(limit as u64)
}

fn bc_encode<T: Serialize>(value: &T) -> Vec<u8> {
    // Protocol types are plain data; serialization cannot fail for any
    // value the type system can construct.
    bc_options(u32::MAX as usize)
        .serialize(value)
        .expect("protocol value failed to serialize")
}

fn bc_decode<T: DeserializeOwned>(bytes: &[u8], limit: usize) -> Result<T, DecodeError> {
    bc_options(limit)
        .deserialize(bytes)
        .map_err(|e| DecodeError::Payload(e.to_string()))
}

pub fn encode_event(event: &Event) -> Vec<u8> {
    bc_encode(event)
}

pub fn decode_event(bytes: &[u8], max_frame_bytes: usize) -> Result<Event, DecodeError> {
    bc_decode(bytes, max_frame_bytes)
}

pub fn encode_response(response: &Response) -> Vec<u8> {
    bc_encode(response)
}

pub fn decode_response(bytes: &[u8], max_frame_bytes: usize) -> Result<Response, DecodeError> {
    bc_decode(bytes, max_frame_bytes)
}

pub fn encode_view(view: &ViewModel) -> Vec<u8> {
    bc_encode(view)
}

pub fn decode_view(bytes: &[u8], max_frame_bytes: usize) -> Result<ViewModel, DecodeError> {
    bc_decode(bytes, max_frame_bytes)
}

pub fn encode_effect_requests(requests: &[EffectRequest]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(requests.len() as u32).to_le_bytes());
    for request in requests {
        let payload = match &request.effect {
            Effect::Render => Vec::new(),
            Effect::Http(req) => bc_encode(req),
            Effect::StreamSubscribe(src) => bc_encode(src),
        };
        out.extend_from_slice(&request.id.to_le_bytes());
        out.push(request.effect.tag());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
    }
    out
}

/// Decode an ordered effect list. Unknown tags become
/// [`DecodedEffect::Unknown`]; anything structurally wrong fails the whole
/// batch with a [`DecodeError`].
pub fn decode_effect_requests(
    bytes: &[u8],
    max_frame_bytes: usize,
) -> Result<Vec<DecodedEffect>, DecodeError> {
    let mut reader = Reader::new(bytes);
    let count = reader.read_u32()? as usize;
    let mut decoded = Vec::with_capacity(count.min(1024));

    for _ in 0..count {
        let id = reader.read_u32()?;
        let tag = reader.read_u8()?;
        let len = reader.read_u32()? as usize;
        if len > max_frame_bytes {
            return Err(DecodeError::FrameTooLarge {
                len,
                limit: max_frame_bytes,
            });
        }
        let payload = reader.read_bytes(len)?;

        let effect = match tag {
            RENDER_TAG => {
                if !payload.is_empty() {
                    return Err(DecodeError::Payload(format!(
                        "render payload must be empty, got {} bytes",
                        payload.len()
                    )));
                }
                Some(Effect::Render)
            }
            HTTP_TAG => Some(Effect::Http(bc_decode(payload, max_frame_bytes)?)),
            STREAM_TAG => Some(Effect::StreamSubscribe(bc_decode(payload, max_frame_bytes)?)),
            _ => None,
        };

        decoded.push(match effect {
            Some(effect) => DecodedEffect::Effect(EffectRequest { id, effect }),
            None => DecodedEffect::Unknown { id, tag },
        });
    }

    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }
    Ok(decoded)
}

/// Cursor over a byte buffer with truncation-checked reads.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                expected: len,
                got: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
