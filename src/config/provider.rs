//! Provider field conventions.
//!
//! Backends disagree on where reasoning text and reasoning effort live.
//! A [`Provider`] names both locations so the transformers can translate
//! between the backend's dialect and the canonical client-facing shape.

use crate::config::loader::ConfigError;
use crate::config::types::ProviderConfig;

/// Field name clients see for reasoning text.
pub const CANONICAL_REASONING_FIELD: &str = "reasoning";

/// Dotted path clients use for reasoning effort.
pub const CANONICAL_EFFORT_PATH: &str = "reasoning.effort";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    /// Top-level message/delta key holding reasoning text.
    pub reasoning_field: String,
    /// Dotted path the backend reads reasoning effort from. Empty disables
    /// effort remapping.
    pub reasoning_effort_path: String,
}

impl Provider {
    pub fn lmstudio() -> Self {
        Self {
            name: "lmstudio".to_string(),
            reasoning_field: "reasoning".to_string(),
            reasoning_effort_path: "reasoning.effort".to_string(),
        }
    }

    pub fn llama_cpp() -> Self {
        Self {
            name: "llama-cpp".to_string(),
            reasoning_field: "reasoning_content".to_string(),
            reasoning_effort_path: "chat_template_kwargs.reasoning_effort".to_string(),
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "lmstudio" | "lm-studio" => Some(Self::lmstudio()),
            "llama-cpp" | "llamacpp" | "llama.cpp" => Some(Self::llama_cpp()),
            _ => None,
        }
    }

    /// Resolve a provider from config: preset first, then overrides.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let mut provider =
            Self::preset(&config.preset).ok_or_else(|| ConfigError::ValidationError {
                message: format!(
                    "Unknown provider preset '{}' (expected 'lmstudio' or 'llama-cpp')",
                    config.preset
                ),
            })?;

        if let Some(field) = &config.reasoning_field {
            provider.reasoning_field = field.clone();
        }
        if let Some(path) = &config.reasoning_effort_path {
            provider.reasoning_effort_path = path.clone();
        }

        if provider.reasoning_field.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "provider.reasoning_field must not be empty".to_string(),
            });
        }

        Ok(provider)
    }
}
