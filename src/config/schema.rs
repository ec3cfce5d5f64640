//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind interface and port).
    pub listener: ListenerConfig,

    /// The single upstream every forwarded request goes to.
    pub upstream: UpstreamConfig,

    /// Registry hints shown at startup.
    pub registry: RegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Listening port.
    pub port: u16,
}

impl ListenerConfig {
    /// Bind address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
        }
    }
}

/// Upstream (registry) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream base URL (e.g., "http://localhost:8081").
    pub url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed for the upstream to send response headers, in seconds.
    pub response_timeout_secs: u64,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            connect_timeout_secs: 5,
            response_timeout_secs: 30,
            pool_idle_timeout_secs: 90,
        }
    }
}

/// Registry hints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Example registry sub-path printed in the startup banner.
    pub example_path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            example_path: "/repository/npm-group/".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: SocketAddr,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: SocketAddr::from(([127, 0, 0, 1], 9092)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_registry_setup() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.port, 8082);
        assert_eq!(config.listener.bind_address(), "0.0.0.0:8082");
        assert_eq!(config.upstream.url, "http://localhost:8081");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            url = "http://nexus.internal:8081"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.url, "http://nexus.internal:8081");
        assert_eq!(config.upstream.connect_timeout_secs, 5);
        assert_eq!(config.listener.port, 8082);
        assert_eq!(config.registry.example_path, "/repository/npm-group/");
    }

    #[test]
    fn test_metrics_address_is_parsed_at_load() {
        let config: ProxyConfig = toml::from_str(
            "[observability]\nmetrics_enabled = true\nmetrics_address = \"0.0.0.0:9100\"\n",
        )
        .unwrap();
        assert_eq!(config.observability.metrics_address.port(), 9100);

        let bad = toml::from_str::<ProxyConfig>("[observability]\nmetrics_address = \"nowhere\"\n");
        assert!(bad.is_err());
    }
}
