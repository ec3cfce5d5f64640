//! CORS-injecting reverse proxy for a package registry.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::{Forwarder, HttpServer};
pub use lifecycle::Shutdown;
