//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the resolver.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the observability resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    /// Resource API the reference chain is read from.
    pub resource_api: ResourceApiConfig,

    /// Resolution cache settings.
    pub cache: CacheConfig,

    /// Settings for clients bound to resolved observer URLs.
    pub observer: ObserverConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Resource API connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceApiConfig {
    /// Base URL of the resource API (e.g., "http://localhost:8080").
    pub base_url: String,

    /// Per-lookup request timeout in seconds.
    pub timeout_secs: u64,

    /// Bearer token forwarded with every lookup.
    ///
    /// Overridden by the `OBS_RESOLVER_TOKEN` environment variable.
    pub token: Option<String>,
}

impl Default for ResourceApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
            token: None,
        }
    }
}

impl ResourceApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolution cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live of a resolved entry in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 } // 5 minutes
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Observer client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Request timeout for observer and RCA agent calls in seconds.
    pub timeout_secs: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.resource_api.timeout_secs, 10);
        assert!(config.resource_api.token.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ResolverConfig = toml::from_str(
            r#"
            [resource_api]
            base_url = "https://api.example.com"

            [cache]
            ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.resource_api.base_url, "https://api.example.com");
        assert_eq!(config.resource_api.timeout_secs, 10);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.observer.timeout_secs, 30);
        assert_eq!(config.observability.log_level, "info");
    }
}
