//! CORS registry proxy.
//!
//! Sits in front of a package registry that emits no CORS headers so that
//! browser clients can talk to it.
//!
//! ```text
//!   browser ──▶ trace ──▶ cors ──┬─ OPTIONS ──▶ 204 (preflight)
//!                                └─ other ────▶ forward ──▶ upstream registry
//! ```

use cors_registry_proxy::config;
use cors_registry_proxy::error::ProxyError;
use cors_registry_proxy::http::HttpServer;
use cors_registry_proxy::lifecycle::{signals, startup, Shutdown};
use cors_registry_proxy::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Cannot start CORS proxy: {}", ProxyError::from(e));
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        port = config.listener.port,
        upstream = %config.upstream.url,
        "cors-registry-proxy v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        if let Err(e) = metrics::init_metrics(config.observability.metrics_address) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    let server = HttpServer::new(config)?;

    let listener = match startup::bind_listener(&server.config().listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("Cannot start CORS proxy: {e}");
            std::process::exit(1);
        }
    };

    startup::print_banner(server.config(), listener.local_addr()?);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
