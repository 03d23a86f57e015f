//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Tag failures with the request's trace context
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment
//! - Request-scoped fields (`trace_id`, `span_id`) come from the span the
//!   router opens around each handler, so handlers log with plain macros

use std::fmt::Display;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::observability::tracing::{RequestSpan, TelemetryError};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "eta_frontend={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        _ => registry.with(fmt::layer()).try_init(),
    };

    result.map_err(|e| TelemetryError::Subscriber(e.to_string()))
}

/// Log a failure at error level and record it on the request's span.
pub fn log_error(span: &RequestSpan, message: &'static str, error: &dyn Display) {
    tracing::error!(error = %error, "{}", message);
    span.record_error(message, error);
}
