//! Incremental SSE parser.
//!
//! Subscriptions are unbounded, so parsing has to work on whatever chunk
//! boundaries the network produces: a field may be split mid-line across
//! two chunks. The parser buffers partial lines and emits an event per
//! blank-line terminator. Format variations (`data:{...}` vs `data: {...}`)
//! are tolerated.

use crate::protocol::StreamEvent;

#[derive(Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event_name: Option<String>,
    data_lines: Vec<Vec<u8>>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the events completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop(); // the \n
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.take_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush at end of stream. A dangling event without its blank-line
    /// terminator is still emitted rather than dropped.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let tail: Vec<u8> = std::mem::take(&mut self.buffer);
        if !tail.is_empty() {
            if let Some(event) = self.take_line(&tail) {
                events.push(event);
            }
        }
        if let Some(event) = self.flush_pending() {
            events.push(event);
        }
        events
    }

    fn take_line(&mut self, line: &[u8]) -> Option<StreamEvent> {
        if line.is_empty() {
            return self.flush_pending();
        }
        if line.starts_with(b":") {
            return None; // comment
        }
        if let Some(rest) = strip_field(line, b"event:") {
            self.event_name = Some(String::from_utf8_lossy(rest).into_owned());
        } else if let Some(rest) = strip_field(line, b"data:") {
            self.data_lines.push(rest.to_vec());
        }
        // id: and retry: carry no payload we forward
        None
    }

    fn flush_pending(&mut self) -> Option<StreamEvent> {
        if self.data_lines.is_empty() {
            self.event_name = None;
            return None;
        }
        let data = std::mem::take(&mut self.data_lines).join(&b'\n');
        Some(StreamEvent {
            event: self.event_name.take(),
            data,
        })
    }
}

/// Strip a field prefix plus the optional single space after the colon.
fn strip_field<'a>(line: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    let rest = line.strip_prefix(prefix)?;
    Some(rest.strip_prefix(b" ").unwrap_or(rest))
}
