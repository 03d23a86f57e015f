//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the frontend.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the frontend service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FrontendConfig {
    /// Host/port pairs of this service and its peers, plus the base path.
    pub services: ConfigOptions,

    /// Downstream ETA aggregator settings.
    pub aggregator: AggregatorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Addresses that let the frontend and its service clients find each other.
///
/// Constructed once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigOptions {
    /// Bind address of the frontend itself (e.g., "0.0.0.0:8080").
    pub frontend_host_port: String,

    /// Address of the driver service.
    pub driver_host_port: String,

    /// Address of the customer service.
    pub customer_host_port: String,

    /// Address of the route service.
    pub route_host_port: String,

    /// Path prefix under which the frontend routes are mounted.
    pub basepath: String,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            frontend_host_port: "0.0.0.0:8080".to_string(),
            driver_host_port: "0.0.0.0:8082".to_string(),
            customer_host_port: "0.0.0.0:8081".to_string(),
            route_host_port: "0.0.0.0:8083".to_string(),
            basepath: String::new(),
        }
    }
}

/// Downstream ETA aggregator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Endpoint queried with `?customer=<id>`.
    pub url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8084/eta".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level directive (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Span exporter: "none" or "stdout".
    pub trace_exporter: String,

    /// Service name reported on exported spans.
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            trace_exporter: "none".to_string(),
            service_name: "frontend".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: FrontendConfig = toml::from_str(
            r#"
            [services]
            basepath = "hotrod"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.services.basepath, "hotrod");
        assert_eq!(config.services.frontend_host_port, "0.0.0.0:8080");
        assert_eq!(config.services.customer_host_port, "0.0.0.0:8081");
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.observability.trace_exporter, "none");
        assert_eq!(config.aggregator.timeout_secs, 10);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: FrontendConfig = toml::from_str("").unwrap();
        assert_eq!(config.services.basepath, "");
        assert_eq!(config.aggregator.url, "http://127.0.0.1:8084/eta");
    }
}
