//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate host:port pairs, the base path and the aggregator URL
//! - Validate value ranges and enumerated options
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FrontendConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::FrontendConfig;
use crate::routing::path;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid host:port {value:?}")]
    HostPort { field: &'static str, value: String },

    #[error("services.basepath: segment {segment:?} of {value:?} would be a route capture")]
    Basepath { value: String, segment: String },

    #[error("aggregator.url: invalid URL {value:?}: {reason}")]
    AggregatorUrl { value: String, reason: String },

    #[error("aggregator.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.log_format: expected \"pretty\" or \"json\", got {0:?}")]
    LogFormat(String),

    #[error("observability.trace_exporter: expected \"none\" or \"stdout\", got {0:?}")]
    TraceExporter(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &FrontendConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let services = &config.services;
    for (field, value) in [
        ("services.frontend_host_port", &services.frontend_host_port),
        ("services.driver_host_port", &services.driver_host_port),
        ("services.customer_host_port", &services.customer_host_port),
        ("services.route_host_port", &services.route_host_port),
    ] {
        if !is_host_port(value) {
            errors.push(ValidationError::HostPort {
                field,
                value: value.clone(),
            });
        }
    }

    if let Some(segment) = path::capture_segment(&services.basepath) {
        errors.push(ValidationError::Basepath {
            value: services.basepath.clone(),
            segment: segment.to_string(),
        });
    }

    match url::Url::parse(&config.aggregator.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::AggregatorUrl {
            value: config.aggregator.url.clone(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::AggregatorUrl {
            value: config.aggregator.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.aggregator.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let observability = &config.observability;
    if !matches!(observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::LogFormat(observability.log_format.clone()));
    }
    if !matches!(observability.trace_exporter.as_str(), "none" | "stdout") {
        errors.push(ValidationError::TraceExporter(
            observability.trace_exporter.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a numeric port; the host may be empty (":8080").
fn is_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => {
            !host.chars().any(char::is_whitespace) && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}
