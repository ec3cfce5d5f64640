//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Path to an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "CORS_PROXY_CONFIG";
/// Overrides `listener.port`.
pub const PORT_ENV: &str = "CORS_PROXY_PORT";
/// Overrides `upstream.url`.
pub const UPSTREAM_ENV: &str = "CORS_PROXY_UPSTREAM";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("CORS_PROXY_PORT='{0}' is not a valid port")]
    InvalidPortOverride(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and deserialize a TOML file. Validation happens after overrides.
fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the process configuration: defaults, then the file named by
/// `CORS_PROXY_CONFIG` (if set), then single-value env overrides.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    resolve(|key| std::env::var(key).ok())
}

/// Same as [`load_from_env`] but with an injectable variable lookup.
pub fn resolve<F>(lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: ProxyConfig = match lookup(CONFIG_PATH_ENV) {
        Some(path) => read_config_file(Path::new(&path))?,
        None => ProxyConfig::default(),
    };

    if let Some(port) = lookup(PORT_ENV) {
        config.listener.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPortOverride(port.clone()))?;
    }

    if let Some(url) = lookup(UPSTREAM_ENV) {
        config.upstream.url = url.trim().to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
