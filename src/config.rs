//! Configuration loaded from the environment (and `.env` when present).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8083";
pub const DEFAULT_CURRENCY_SUFFIX: &str = "VNĐ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Backend host, e.g. `http://localhost:5000`. `/api/` is appended.
    pub api_host: String,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self { api_host: api_host.into(), timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    pub fn base_url(&self) -> String { format!("{}/api/", self.api_host.trim_end_matches('/')) }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub bind_addr: SocketAddr,
    pub currency_suffix: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_host = lookup("POS_API_HOST")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("POS_API_HOST"))?;

        let timeout_secs = match lookup("POS_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "POS_API_TIMEOUT_SECS", reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_addr = lookup("POS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid { var: "POS_BIND_ADDR", reason: e.to_string() })?;

        let currency_suffix = lookup("POS_CURRENCY_SUFFIX").unwrap_or_else(|| DEFAULT_CURRENCY_SUFFIX.to_string());

        tracing::info!(api_host = %api_host, timeout_secs, %bind_addr, "configuration loaded");

        Ok(Self {
            backend: BackendConfig { api_host, timeout: Duration::from_secs(timeout_secs) },
            bind_addr,
            currency_suffix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("POS_API_HOST", "http://localhost:5000/")])).unwrap();
        assert_eq!(config.backend.base_url(), "http://localhost:5000/api/");
        assert_eq!(config.backend.timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr, "0.0.0.0:8083".parse::<SocketAddr>().unwrap());
        assert_eq!(config.currency_suffix, "VNĐ");
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])).unwrap_err(), ConfigError::Missing("POS_API_HOST"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = AppConfig::from_lookup(lookup(&[("POS_API_HOST", "h"), ("POS_API_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "POS_API_TIMEOUT_SECS", .. }));
    }
}
