//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::server, http::forward, lifecycle produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
