use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cache::LruCache;
use crate::config::{Config, ConfigError};
use crate::proxy::router::{build_router, RouterEngine};
use crate::proxy::shutdown::ShutdownManager;
use crate::proxy::upstream::UpstreamClient;

/// Errors raised while setting up or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ProxyServer {
    pub addr: SocketAddr,
    /// Populated by bind(), consumed by run().
    listener: Option<TcpListener>,
    bind_addr: String,
    router: RouterEngine,
    shutdown: Arc<ShutdownManager>,
    cache: Arc<LruCache>,
}

impl ProxyServer {
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate()?;

        let provider = config.resolve_provider()?;
        let upstream = UpstreamClient::new(&config.upstream)?;
        let cache = Arc::new(LruCache::new(config.cache.capacity));
        let router = RouterEngine::new(upstream, provider, cache.clone());

        Ok(Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)), // Will be determined at bind time
            listener: None,
            bind_addr: config.proxy.bind_addr,
            router,
            shutdown: Arc::new(ShutdownManager::new()),
            cache,
        })
    }

    /// Bind the configured address. Returns the actual bound address,
    /// which differs from the configured one when port 0 is used.
    pub async fn bind(&mut self) -> Result<SocketAddr, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: self.bind_addr.clone(),
                source: e,
            })?;
        self.addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(self.addr)
    }

    /// The reasoning cache shared by all exchanges.
    pub fn cache(&self) -> Arc<LruCache> {
        self.cache.clone()
    }

    /// Handle for stopping [`ProxyServer::run`] without an OS signal.
    pub fn shutdown_handle(&self) -> Arc<ShutdownManager> {
        self.shutdown.clone()
    }

    /// Run until shutdown is signalled.
    ///
    /// Binds first if [`ProxyServer::bind`] was not called.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => {
                self.bind().await?;
                self.listener.take().ok_or_else(|| {
                    ServerError::Io(std::io::Error::other("listener missing after bind"))
                })?
            }
        };

        tracing::info!(
            addr = %self.addr,
            capacity = self.cache.capacity(),
            "Starting reasoning adapter"
        );

        let app = build_router(self.router.clone());
        let make_service = app.into_make_service_with_connect_info::<SocketAddr>();

        let shutdown = self.shutdown.clone();
        axum::serve(listener, make_service)
            .with_graceful_shutdown(async move {
                if let Err(e) = shutdown.wait_for_shutdown().await {
                    tracing::error!(error = %e, "Failed to install signal handler");
                }
            })
            .into_future()
            .await?;

        tracing::info!("Server exited");
        Ok(())
    }
}
