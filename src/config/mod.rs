mod loader;
mod provider;
mod types;

pub use loader::ConfigError;
pub use provider::{Provider, CANONICAL_EFFORT_PATH, CANONICAL_REASONING_FIELD};
pub use types::{CacheConfig, Config, ProviderConfig, ProxyConfig, UpstreamConfig};
