//! Outgoing request rewriting.
//!
//! Clients drop the reasoning text that accompanied an earlier tool call
//! when they replay the conversation. The augmenter puts it back from the
//! cache and moves the client's `reasoning.effort` to wherever the backend
//! expects it.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::ReasoningStore;
use crate::config::{Provider, CANONICAL_EFFORT_PATH};
use crate::proxy::fields::relocate_path;

/// What an augmentation pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AugmentStats {
    /// Assistant messages that received cached reasoning.
    pub injected: u32,
    /// Whether reasoning effort was moved to the provider's path.
    pub effort_remapped: bool,
}

impl AugmentStats {
    pub fn changed(&self) -> bool {
        self.injected > 0 || self.effort_remapped
    }
}

pub struct RequestAugmenter {
    provider: Provider,
    cache: Arc<dyn ReasoningStore>,
}

impl RequestAugmenter {
    pub fn new(provider: Provider, cache: Arc<dyn ReasoningStore>) -> Self {
        Self { provider, cache }
    }

    /// Apply cache injection and effort remapping to a decoded request body.
    pub fn augment(&self, body: &mut Value) -> AugmentStats {
        let stats = AugmentStats {
            injected: self.inject_reasoning_from_cache(body),
            effort_remapped: self.remap_reasoning_effort(body),
        };

        if stats.injected > 0 {
            tracing::info!(count = stats.injected, "Injected reasoning content");
        }
        stats
    }

    /// For each assistant message with tool calls, inject the reasoning
    /// cached for the first tool-call id that hits. Returns the number of
    /// messages touched.
    pub fn inject_reasoning_from_cache(&self, body: &mut Value) -> u32 {
        let Some(messages) = body.get_mut("messages").and_then(Value::as_array_mut) else {
            return 0;
        };

        let mut injected = 0u32;
        for message in messages.iter_mut() {
            let Some(message) = message.as_object_mut() else {
                continue;
            };
            if message.get("role").and_then(Value::as_str) != Some("assistant") {
                continue;
            }

            let hit = message
                .get("tool_calls")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|call| call.get("id").and_then(Value::as_str))
                .find_map(|id| self.cache.get(id));

            if let Some(item) = hit {
                tracing::debug!(
                    tool_call_id = %item.id,
                    field = %self.provider.reasoning_field,
                    "Injected reasoning content from cache"
                );
                message.insert(
                    self.provider.reasoning_field.clone(),
                    Value::String(item.content),
                );
                injected += 1;
            }
        }
        injected
    }

    /// Move `reasoning.effort` to the provider's effort path.
    pub fn remap_reasoning_effort(&self, body: &mut Value) -> bool {
        let target = self.provider.reasoning_effort_path.as_str();
        if target.is_empty() || target == CANONICAL_EFFORT_PATH {
            return false;
        }
        let Some(record) = body.as_object_mut() else {
            return false;
        };

        let moved = relocate_path(record, CANONICAL_EFFORT_PATH, target);
        if moved {
            tracing::debug!(field = %target, "Remapped reasoning effort");
        }
        moved
    }
}
