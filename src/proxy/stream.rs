//! Streaming chat-completion response rewriting.
//!
//! Each `data: ` event is rewritten and forwarded as soon as its line is
//! complete. While forwarding, reasoning fragments are accumulated together
//! with the tool-call id they belong to; the pair is written to the cache
//! when the stream ends.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures_core::Stream;
use serde_json::Value;

use crate::cache::{ReasoningItem, ReasoningStore};
use crate::config::{Provider, CANONICAL_REASONING_FIELD};
use crate::proxy::fields::rename_field;
use crate::proxy::transform::first_choice_field;
use crate::sse::{data_payload, LineBuffer, DATA_PREFIX, DONE_SENTINEL};

/// Per-stream line state machine.
///
/// State lives for one response only and is dropped with it.
pub struct StreamRewriter {
    provider: Provider,
    cache: Arc<dyn ReasoningStore>,
    reasoning: String,
    tool_call_id: String,
}

impl StreamRewriter {
    pub fn new(provider: Provider, cache: Arc<dyn ReasoningStore>) -> Self {
        Self {
            provider,
            cache,
            reasoning: String::new(),
            tool_call_id: String::new(),
        }
    }

    /// Rewrite one input line (without its `\n`) into the bytes to forward.
    ///
    /// Anything that is not a decodable `data: ` event is forwarded as is.
    pub fn process_line(&mut self, line: &[u8]) -> Bytes {
        let Ok(text) = std::str::from_utf8(line) else {
            return terminated(line);
        };
        let Some(payload) = data_payload(text) else {
            return terminated(line);
        };

        if payload == DONE_SENTINEL {
            tracing::debug!("Received [DONE] event, finalizing stream");
            let out = terminated(line);
            self.finalize();
            return out;
        }
        if payload.is_empty() {
            return terminated(line);
        }

        let mut event: Value = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::trace!(error = %e, "Forwarding undecodable stream event");
                return terminated(line);
            }
        };

        if !self.process_event(&mut event) {
            return terminated(line);
        }

        match serde_json::to_string(&event) {
            Ok(encoded) => Bytes::from(format!("{DATA_PREFIX}{encoded}\n")),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to re-encode stream event");
                terminated(line)
            }
        }
    }

    /// Accumulate reasoning and tool-call id from `choices[0].delta`, then
    /// rename the reasoning field. Returns whether the event changed.
    fn process_event(&mut self, event: &mut Value) -> bool {
        let Some(delta) = first_choice_field(event, "delta") else {
            return false;
        };

        if let Some(fragment) = delta
            .get(&self.provider.reasoning_field)
            .and_then(Value::as_str)
        {
            self.reasoning.push_str(fragment);
        }

        if let Some(id) = delta
            .get("tool_calls")
            .and_then(Value::as_array)
            .and_then(|calls| calls.first())
            .and_then(|call| call.get("id"))
            .and_then(Value::as_str)
        {
            self.tool_call_id = id.to_string();
        }

        rename_field(
            delta,
            &self.provider.reasoning_field,
            CANONICAL_REASONING_FIELD,
        )
    }

    /// Write the accumulated reasoning to the cache.
    ///
    /// Requires both reasoning text and a tool-call id. Each call writes
    /// the current state, so a repeat overwrites the entry with the same
    /// content.
    pub fn finalize(&mut self) {
        if self.reasoning.is_empty() || self.tool_call_id.is_empty() {
            return;
        }

        self.cache.put(
            &self.tool_call_id,
            ReasoningItem::new(self.tool_call_id.clone(), self.reasoning.clone()),
        );
        tracing::info!(
            tool_call_id = %self.tool_call_id,
            content_length = self.reasoning.len(),
            "Cached reasoning content from stream"
        );
    }
}

fn terminated(line: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(line.len() + 1);
    out.extend_from_slice(line);
    out.push(b'\n');
    Bytes::from(out)
}

/// Stream adapter that runs an upstream event stream through a
/// [`StreamRewriter`], yielding one chunk per line.
///
/// Lines are rewritten only when they are about to be yielded, so each
/// output chunk is handed to the client before the next line is looked at.
/// The rewriter is finalized at end of input, after an upstream error, and
/// when the stream is dropped early.
pub struct ReasoningStream<S> {
    inner: S,
    lines: LineBuffer,
    pending: VecDeque<Bytes>,
    rewriter: StreamRewriter,
    input_done: bool,
}

impl<S> ReasoningStream<S> {
    pub fn new(inner: S, rewriter: StreamRewriter) -> Self {
        Self {
            inner,
            lines: LineBuffer::new(),
            pending: VecDeque::new(),
            rewriter,
            input_done: false,
        }
    }

    fn end_of_input(&mut self) {
        if let Some(tail) = self.lines.finish() {
            self.pending.push_back(tail);
        }
        self.input_done = true;
    }
}

impl<S, E> Stream for ReasoningStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(line) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(this.rewriter.process_line(&line))));
            }
            if this.input_done {
                this.rewriter.finalize();
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let lines = this.lines.push(&chunk);
                    this.pending.extend(lines);
                }
                Poll::Ready(Some(Err(err))) => {
                    this.input_done = true;
                    this.rewriter.finalize();
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    tracing::debug!("Upstream stream ended");
                    this.end_of_input();
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S> Drop for ReasoningStream<S> {
    fn drop(&mut self) {
        self.rewriter.finalize();
    }
}
