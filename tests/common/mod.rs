//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use reasoning_adapter::cache::LruCache;
use reasoning_adapter::config::Config;
use reasoning_adapter::proxy::shutdown::ShutdownManager;
use reasoning_adapter::proxy::{ProxyServer, ServerError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A running adapter plus handles for assertions.
pub struct TestAdapter {
    pub addr: SocketAddr,
    pub cache: Arc<LruCache>,
    pub shutdown: Arc<ShutdownManager>,
    pub task: JoinHandle<Result<(), ServerError>>,
}

impl TestAdapter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Adapter config pointing at `target` with the given provider preset.
pub fn test_config(target: &str, preset: &str) -> Config {
    let mut config = Config::default();
    config.proxy.bind_addr = "127.0.0.1:0".to_string();
    config.upstream.target = target.to_string();
    config.upstream.connect_timeout_seconds = 2;
    config.provider.preset = preset.to_string();
    config
}

/// Start an adapter on an ephemeral port.
pub async fn start_adapter(config: Config) -> TestAdapter {
    let mut server = ProxyServer::new(config).expect("server should build");
    let addr = server.bind().await.expect("bind should succeed");
    let cache = server.cache();
    let shutdown = server.shutdown_handle();
    let task = tokio::spawn(server.run());

    assert!(wait_for_server(addr, Duration::from_secs(2)).await);
    TestAdapter {
        addr,
        cache,
        shutdown,
        task,
    }
}

/// Wait for a server to become available.
pub async fn wait_for_server(addr: SocketAddr, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Find an address nothing listens on.
pub fn unused_addr() -> SocketAddr {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap()
}
