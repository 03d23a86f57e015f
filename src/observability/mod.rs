//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router middleware
//!     → tracing.rs (server span per request, W3C context in/out)
//!     → logging.rs (structured log events tagged with trace_id/span_id)
//!
//! Consumers:
//!     → stdout (pretty or JSON logs)
//!     → span exporter (optional stdout exporter)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace context flows through every handler and downstream call
//! - Spans are always recorded; exporting them is optional

pub mod logging;
pub mod tracing;

pub use self::logging::{init_logging, log_error};
pub use self::tracing::{
    extract_context, init_tracer, inject_context, RequestSpan, TelemetryError, TelemetryGuard,
    Tracer,
};
