//! Reasoning adapter.
//!
//! Sits between a chat client and an OpenAI-compatible inference backend.
//! Reasoning text the backend attaches to tool calls is cached by tool-call
//! id and re-injected into follow-up requests that reference the same call.

pub mod cache;
pub mod config;
pub mod proxy;
pub mod sse;
