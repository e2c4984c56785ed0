//! Line-level helpers for `text/event-stream` bodies.
//!
//! Chat-completion streams are newline-delimited `data: <json>` events
//! closed by `data: [DONE]`. The adapter never buffers more than one line,
//! so this module only deals with splitting bytes into lines and peeling
//! the `data: ` prefix off.

use axum::body::Bytes;

/// Prefix carried by every event payload line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload marking the end of a chat-completion stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Media type identifying an event stream response.
pub const EVENT_STREAM: &str = "text/event-stream";

/// Returns true if a `Content-Type` value denotes an event stream.
pub fn is_event_stream(content_type: &str) -> bool {
    content_type.contains(EVENT_STREAM)
}

/// Return the payload of a `data: ` line, or `None` for any other line.
///
/// A single trailing `\r` is ignored so CRLF-framed streams inspect the
/// same as LF-framed ones.
pub fn data_payload(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.strip_prefix(DATA_PREFIX)
}

/// Splits a chunked byte stream into complete lines.
///
/// Bytes after the last `\n` are held until more input arrives or
/// [`LineBuffer::finish`] is called.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completes, without the `\n`.
    ///
    /// Lines are raw bytes; a chunk boundary may fall inside a multi-byte
    /// character, so decoding waits until a line is complete.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(Bytes::from(std::mem::take(&mut self.pending)));
            rest = &rest[pos + 1..];
        }

        self.pending.extend_from_slice(rest);
        lines
    }

    /// Flush the unterminated tail, if any.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            return None;
        }
        Some(Bytes::from(std::mem::take(&mut self.pending)))
    }
}
