//! Non-streaming chat-completion response rewriting.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::cache::{ReasoningItem, ReasoningStore};
use crate::config::{Provider, CANONICAL_REASONING_FIELD};
use crate::proxy::fields::rename_field;

/// Caches reasoning from a complete response and renames the provider's
/// reasoning field to the canonical one.
pub struct BlockingTransformer {
    provider: Provider,
    cache: Arc<dyn ReasoningStore>,
}

impl BlockingTransformer {
    pub fn new(provider: Provider, cache: Arc<dyn ReasoningStore>) -> Self {
        Self { provider, cache }
    }

    /// Rewrite a decoded response body in place.
    ///
    /// Missing `choices`, `message`, tool calls or reasoning leave the body
    /// as it is.
    pub fn transform(&self, body: &mut Value) {
        let Some(message) = first_choice_field(body, "message") else {
            return;
        };

        self.cache_reasoning(message);

        if rename_field(
            message,
            &self.provider.reasoning_field,
            CANONICAL_REASONING_FIELD,
        ) {
            tracing::debug!(
                from = %self.provider.reasoning_field,
                to = CANONICAL_REASONING_FIELD,
                "Transformed reasoning field"
            );
        }
    }

    fn cache_reasoning(&self, message: &Map<String, Value>) {
        let Some(tool_calls) = message.get("tool_calls").and_then(Value::as_array) else {
            return;
        };
        let Some(reasoning) = message
            .get(&self.provider.reasoning_field)
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
        else {
            return;
        };
        let Some(id) = tool_calls
            .first()
            .and_then(|call| call.get("id"))
            .and_then(Value::as_str)
        else {
            return;
        };

        self.cache.put(id, ReasoningItem::new(id, reasoning));
        tracing::info!(
            tool_call_id = %id,
            content_length = reasoning.len(),
            "Cached reasoning content"
        );
    }
}

/// `body.choices[0].<field>` as a mutable object.
pub(crate) fn first_choice_field<'a>(
    body: &'a mut Value,
    field: &str,
) -> Option<&'a mut Map<String, Value>> {
    body.get_mut("choices")?
        .as_array_mut()?
        .first_mut()?
        .get_mut(field)?
        .as_object_mut()
}
