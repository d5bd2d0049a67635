//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with mock, admin and health handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Bind server to listener
//! - Hand mock traffic to the dispatch engine
//! - Record request metrics

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::{AdminConfig, ServerConfig};
use crate::dispatch::DispatchEngine;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::store::EndpointRepository;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DispatchEngine>,
    pub store: Arc<dyn EndpointRepository>,
    pub admin: AdminConfig,
}

/// HTTP server for mock traffic and the admin API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `store` with the given configuration.
    pub fn new(config: ServerConfig, store: Arc<dyn EndpointRepository>) -> Self {
        let engine = Arc::new(DispatchEngine::new(store.clone(), config.traffic.prefix.clone()));

        let state = AppState {
            engine,
            store,
            admin: config.admin.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let prefix = config.traffic.prefix.as_str();

        let mut router = Router::new()
            .route(prefix, any(mock_handler))
            .route(&format!("{prefix}/"), any(mock_handler))
            .route(&format!("{prefix}/{{*path}}"), any(mock_handler))
            .route("/health", get(health));

        if config.admin.enabled {
            router = router.nest(&config.admin.prefix, setup_admin_router(state.clone()));
        }

        router
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, e.g. for serving on a custom listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            traffic_prefix = %self.config.traffic.prefix,
            admin_enabled = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Mock traffic handler: everything under the traffic prefix.
async fn mock_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let body = (!body.is_empty()).then_some(body.as_ref());

    let response = state.engine.handle(&method, uri.path(), body);
    metrics::record_request(method.as_str(), response.status, response.outcome.as_str(), start_time);

    response.into_response()
}

async fn health() -> &'static str {
    "ok"
}
