//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OpenTelemetry tracer provider (optional stdout exporter)
//! - Extract W3C trace context from incoming requests
//! - Propagate trace context to downstream requests
//! - Carry the live server span of a request as a typed handle
//!
//! # Design Decisions
//! - The tracer is passed explicitly; no global provider or propagator
//! - Spans are always created, exporting is optional
//! - `RequestSpan` is the only way handlers reach the span, so a trace id
//!   can only come from the span that wraps the current request

use std::convert::Infallible;
use std::fmt::Display;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::{
    SpanId, SpanKind, Status, TraceContextExt, TraceId, Tracer as OtelTracer, TracerProvider as _,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::ObservabilityConfig;

/// Instrumentation scope name used for every span this service creates.
pub const TRACER_NAME: &str = "eta-frontend";

/// Error raised while setting up telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("unknown trace exporter {0:?}")]
    UnknownExporter(String),

    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

/// Handle used to start server spans.
#[derive(Clone)]
pub struct Tracer {
    inner: SdkTracer,
}

impl Tracer {
    /// Wrap an SDK tracer obtained from a provider.
    pub fn new(inner: SdkTracer) -> Self {
        Self { inner }
    }

    /// Create a tracer from a provider using the service's scope name.
    pub fn from_provider(provider: &SdkTracerProvider) -> Self {
        Self::new(provider.tracer(TRACER_NAME))
    }

    /// Start a server span, continuing the trace found in `headers` if any.
    pub fn start_server_span(
        &self,
        name: String,
        headers: &HeaderMap,
        attributes: Vec<KeyValue>,
    ) -> RequestSpan {
        let parent = extract_context(headers);
        let span = self
            .inner
            .span_builder(name)
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start_with_context(&self.inner, &parent);

        RequestSpan {
            cx: parent.with_span(span),
        }
    }

    /// Start a client span for an outbound call made on behalf of `parent`.
    pub fn start_client_span(
        &self,
        name: String,
        parent: &RequestSpan,
        attributes: Vec<KeyValue>,
    ) -> RequestSpan {
        let span = self
            .inner
            .span_builder(name)
            .with_kind(SpanKind::Client)
            .with_attributes(attributes)
            .start_with_context(&self.inner, parent.context());

        RequestSpan {
            cx: parent.context().with_span(span),
        }
    }
}

/// The live span wrapping one inbound request.
///
/// Cheap to clone; every clone refers to the same span.
#[derive(Clone, Debug)]
pub struct RequestSpan {
    cx: Context,
}

impl RequestSpan {
    /// A handle with no span behind it. Events and errors recorded on it are dropped.
    pub fn detached() -> Self {
        Self { cx: Context::new() }
    }

    /// The OpenTelemetry context carrying the span.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    /// Trace id of the span, if the span context is valid.
    pub fn trace_id(&self) -> Option<TraceId> {
        let span = self.cx.span();
        let span_context = span.span_context();
        span_context.is_valid().then(|| span_context.trace_id())
    }

    /// Span id of the span, if the span context is valid.
    pub fn span_id(&self) -> Option<SpanId> {
        let span = self.cx.span();
        let span_context = span.span_context();
        span_context.is_valid().then(|| span_context.span_id())
    }

    /// Record a failure on the span: an `error` event plus error status.
    pub fn record_error(&self, message: &'static str, error: &dyn Display) {
        let span = self.cx.span();
        span.add_event(
            "error",
            vec![
                KeyValue::new("message", message),
                KeyValue::new("error", error.to_string()),
            ],
        );
        span.set_status(Status::error(message));
    }

    /// Set a single attribute on the span.
    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// End the span. Ending an already ended span has no effect.
    pub fn finish(&self) {
        self.cx.span().end();
    }
}

impl<S> FromRequestParts<S> for RequestSpan
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestSpan>()
            .cloned()
            .unwrap_or_else(RequestSpan::detached))
    }
}

/// Extract the W3C trace context (`traceparent`, `tracestate`) from request headers.
///
/// Returns an empty context when the headers carry no valid trace.
pub fn extract_context(headers: &HeaderMap) -> Context {
    TraceContextPropagator::new().extract_with_context(&Context::new(), &HeaderExtractor(headers))
}

/// Inject the trace context of `span` into outgoing request headers.
pub fn inject_context(span: &RequestSpan, headers: &mut HeaderMap) {
    TraceContextPropagator::new().inject_context(span.context(), &mut HeaderInjector(headers));
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(key, error = %e, "Invalid header name for trace injection");
                return;
            }
        };
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                self.0.insert(name, value);
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "Invalid header value for trace injection");
            }
        }
    }
}

/// Guard that owns the tracer provider.
/// Dropping it flushes and shuts down span export.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
    tracer: Tracer,
}

impl TelemetryGuard {
    /// Tracer handle backed by the guarded provider.
    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shutdown tracer provider: {e:?}");
            }
        }
    }
}

/// Build the tracer provider described by `config`.
pub fn init_tracer(config: &ObservabilityConfig) -> Result<TelemetryGuard, TelemetryError> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let builder = SdkTracerProvider::builder().with_resource(resource);
    let provider = match config.trace_exporter.as_str() {
        "stdout" => builder
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build(),
        "none" => builder.build(),
        other => return Err(TelemetryError::UnknownExporter(other.to_string())),
    };

    let tracer = Tracer::from_provider(&provider);
    Ok(TelemetryGuard {
        provider: Some(provider),
        tracer,
    })
}
