//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, CORS injection)
//! - Bind server to listener and serve until shutdown
//! - Hand every non-preflight request to the [`Forwarder`]
//! - Observability (logs, metrics) per forwarded request

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::cors::cors_middleware;
use crate::http::forward::{Forwarder, UpstreamForwarder};
use crate::observability::metrics;

/// Application state injected into handlers.
pub struct AppState<F> {
    pub forwarder: Arc<F>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            forwarder: self.forwarder.clone(),
        }
    }
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server forwarding to the configured upstream.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let forwarder = UpstreamForwarder::new(&config.upstream)?;
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Create a server around any [`Forwarder`] implementation.
    pub fn with_forwarder<F: Forwarder>(config: ProxyConfig, forwarder: F) -> Self {
        let state = AppState {
            forwarder: Arc::new(forwarder),
        };
        Self {
            router: build_router(state),
            config,
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Build the Axum router with all middleware layers.
fn build_router<F: Forwarder>(state: AppState<F>) -> Router {
    Router::new()
        .route("/", any(proxy_handler::<F>))
        .route("/{*path}", any(proxy_handler::<F>))
        .fallback(proxy_handler::<F>)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(cors_middleware)),
        )
}

/// Catch-all handler: forward to upstream and relay the result.
async fn proxy_handler<F: Forwarder>(
    State(state): State<AppState<F>>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(method = %method, path = %path, "Forwarding request");

    match state.forwarder.forward(request).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                latency_ms = start_time.elapsed().as_millis() as u64,
                "Upstream responded"
            );
            metrics::record_request(method.as_str(), status.as_u16(), start_time);
            response
        }
        Err(e) => {
            let status = e.status_code();
            tracing::warn!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_error(&e);
            metrics::record_request(method.as_str(), status.as_u16(), start_time);
            e.into_response()
        }
    }
}
