//! Trace-aware route registration.
//!
//! # Responsibilities
//! - Register exact-path routes on an axum router
//! - Open a server span named after the route for every matched request
//! - Hand the span to the handler through the request extensions
//! - Finish the span exactly once when the handler returns
//!
//! # Design Decisions
//! - The span middleware is a route layer, so unmatched paths and methods
//!   never open a span and keep axum's default 404/405 behavior
//! - A drop guard ends the span if the handler panics or is cancelled

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use axum::Router;
use opentelemetry::KeyValue;
use tracing::Instrument;

use crate::observability::tracing::{RequestSpan, Tracer};
use crate::routing::path;

/// Router wrapper that instruments every registered route.
pub struct TracedRouter<S = ()> {
    router: Router<S>,
    tracer: Tracer,
    patterns: Vec<String>,
}

impl<S> TracedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create an empty router that starts spans with `tracer`.
    pub fn new(tracer: Tracer) -> Self {
        Self {
            router: Router::new(),
            tracer,
            patterns: Vec::new(),
        }
    }

    /// Register `route` at the exact path `pattern`.
    ///
    /// Braces in `pattern` match literally. Segments starting with `:` or `*`
    /// are rejected by axum and must be filtered out beforehand.
    pub fn handle(mut self, pattern: &str, route: MethodRouter<S>) -> Self {
        let route_tracer = RouteTracer {
            tracer: self.tracer.clone(),
            pattern: Arc::from(pattern),
        };
        let layer = middleware::from_fn_with_state(route_tracer, trace_route);

        self.router = self
            .router
            .route(&path::literal_route(pattern), route.route_layer(layer));
        self.patterns.push(pattern.to_string());
        self
    }

    /// Registered patterns, in registration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Finish registration and return the plain axum router.
    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

#[derive(Clone)]
struct RouteTracer {
    tracer: Tracer,
    pattern: Arc<str>,
}

/// Ends the span when dropped, whichever way the handler exits.
struct SpanFinisher(RequestSpan);

impl Drop for SpanFinisher {
    fn drop(&mut self) {
        self.0.finish();
    }
}

async fn trace_route(
    State(route): State<RouteTracer>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let span = route.tracer.start_server_span(
        format!("HTTP {} {}", method, route.pattern),
        request.headers(),
        vec![
            KeyValue::new("http.method", method.to_string()),
            KeyValue::new("http.url", request.uri().to_string()),
            KeyValue::new("http.route", route.pattern.to_string()),
        ],
    );
    let finisher = SpanFinisher(span.clone());

    let log_span = tracing::info_span!(
        "request",
        route = %route.pattern,
        trace_id = %span.trace_id().map(|id| id.to_string()).unwrap_or_default(),
        span_id = %span.span_id().map(|id| id.to_string()).unwrap_or_default(),
    );

    request.extensions_mut().insert(span.clone());
    let response = next.run(request).instrument(log_span).await;

    let status = response.status();
    span.set_attribute(KeyValue::new("http.status_code", i64::from(status.as_u16())));
    if status.is_server_error() {
        span.set_attribute(KeyValue::new("error", true));
    }

    drop(finisher);
    response
}
