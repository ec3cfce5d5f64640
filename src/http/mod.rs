//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace layer)
//!     → cors.rs (OPTIONS → 204 and stop; otherwise continue)
//!     → forward.rs (rewrite URI + Host, send to upstream)
//!     → cors.rs (stamp CORS headers on the relayed response)
//!     → Send to client
//! ```

pub mod cors;
pub mod forward;
pub mod server;

pub use forward::{Forwarder, UpstreamForwarder, UpstreamTarget};
pub use server::HttpServer;
