//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use mockapi::store::{EndpointInput, HttpMethod};
use mockapi::{EndpointRepository, HttpServer, MemoryStore, ServerConfig, Shutdown};
use tokio::net::TcpListener;

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    /// Start a server over `store`.
    pub async fn start(config: ServerConfig, store: Arc<dyn EndpointRepository>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(config, store);
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();

        Self {
            addr,
            client,
            shutdown,
        }
    }

    /// Start a server with default config over an in-memory store.
    #[allow(dead_code)]
    pub async fn with_memory_store() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let server = Self::start(ServerConfig::default(), store.clone()).await;
        (server, store)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[allow(dead_code)]
pub fn endpoint(method: HttpMethod, path: &str, rule: &str, body: &str, status: u16) -> EndpointInput {
    EndpointInput {
        method,
        path_template: path.to_string(),
        validation_rule: rule.to_string(),
        response_body: body.to_string(),
        status_code: status,
    }
}
