//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listening socket, failing fast with a clear message
//! - Print the human-readable startup banner
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, no partial startup
//! - The listener is bound before the banner is printed

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::{ListenerConfig, ProxyConfig};
use crate::error::ProxyError;

/// Bind the configured listening address.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, ProxyError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ProxyError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}

/// Confirmation lines shown once the proxy is accepting connections.
pub fn banner_lines(config: &ProxyConfig, local_addr: SocketAddr) -> Vec<String> {
    let base = format!("http://localhost:{}", local_addr.port());
    vec![
        format!("CORS proxy running on {base}"),
        format!("Proxying to upstream: {}", config.upstream.url),
        format!("Registry: {base}{}", config.registry.example_path),
    ]
}

pub fn print_banner(config: &ProxyConfig, local_addr: SocketAddr) {
    for line in banner_lines(config, local_addr) {
        println!("{line}");
    }
}
