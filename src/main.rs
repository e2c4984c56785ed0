use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use reasoning_adapter::config::Config;
use reasoning_adapter::proxy::tracing::{init_tracing, LOG_FILE_ENV};
use reasoning_adapter::proxy::ProxyServer;

/// Restores tool-call reasoning between chat clients and inference backends.
#[derive(Debug, Parser)]
#[command(name = "reasoning-adapter", version, about)]
struct Cli {
    /// Address to listen on (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Backend base URL
    #[arg(short, long)]
    target: Option<String>,

    /// Provider preset: lmstudio or llama-cpp
    #[arg(short, long)]
    provider: Option<String>,

    /// Maximum number of cached reasoning entries
    #[arg(long)]
    cache_size: Option<usize>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = LOG_FILE_ENV)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(listen) = &self.listen {
            config.proxy.bind_addr = listen.clone();
        }
        if let Some(target) = &self.target {
            config.upstream.target = target.clone();
        }
        if let Some(provider) = &self.provider {
            config.provider.preset = provider.clone();
        }
        if let Some(capacity) = self.cache_size {
            config.cache.capacity = capacity;
        }
    }

    /// Load the config file, apply flag overrides, then validate the result.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let path = self.config.clone().unwrap_or_else(Config::config_path);
        let mut config = Config::load_from(&path).context("loading configuration")?;
        self.apply(&mut config);
        config.validate().context("validating configuration")?;
        tracing::debug!(path = %path.display(), "Configuration file");
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref());

    let config = cli.resolve_config()?;

    tracing::info!(
        target_url = %config.upstream.target,
        provider = %config.provider.preset,
        cache_capacity = config.cache.capacity,
        "Configuration loaded"
    );

    let mut server = ProxyServer::new(config)?;
    server.bind().await?;
    server.run().await?;
    Ok(())
}
