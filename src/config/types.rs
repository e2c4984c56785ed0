use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Local listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Bind address for the adapter (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// Inference backend the adapter forwards to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:1234").
    #[serde(default = "default_target")]
    pub target: String,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached reasoning entries. Zero disables caching.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Backend dialect selection.
///
/// `preset` picks the field conventions; the optional fields override
/// individual entries of the preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub reasoning_field: Option<String>,
    #[serde(default)]
    pub reasoning_effort_path: Option<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_target() -> String {
    "http://127.0.0.1:1234".to_string()
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_preset() -> String {
    "llama-cpp".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            reasoning_field: None,
            reasoning_effort_path: None,
        }
    }
}
