//! Proxy error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while starting the proxy or forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connection refused, reset, DNS failure or a broken upstream response.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Connect timeout or no response headers within the deadline.
    #[error("upstream timed out after {0:?}")]
    UpstreamTimeout(std::time::Duration),

    /// The outbound URI could not be assembled from the base URL and request.
    #[error("invalid upstream uri: {0}")]
    InvalidUpstreamUri(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::InvalidUpstreamUri(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Bind { .. } | ProxyError::Config(_) | ProxyError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short plain-text body sent to the caller.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::UpstreamUnreachable(_) | ProxyError::InvalidUpstreamUri(_) => {
                "Upstream request failed"
            }
            ProxyError::UpstreamTimeout(_) => "Upstream request timed out",
            _ => "Internal proxy error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}
