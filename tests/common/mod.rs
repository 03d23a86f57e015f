//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use eta_frontend::aggregator::{AggregatorError, EtaAggregator};
use eta_frontend::config::ConfigOptions;
use eta_frontend::http::FrontendServer;
use eta_frontend::observability::{RequestSpan, Tracer};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Tracer whose finished spans land in the returned exporter.
pub fn tracer_with_exporter() -> (Tracer, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    // Dropping the last provider reference shuts it down, which clears the
    // in-memory exporter; keep one reference alive for the test's lifetime.
    std::mem::forget(provider.clone());
    (Tracer::from_provider(&provider), exporter)
}

/// Finished spans with the given name.
pub fn spans_named(exporter: &InMemorySpanExporter, name: &str) -> Vec<SpanData> {
    exporter
        .get_finished_spans()
        .unwrap()
        .into_iter()
        .filter(|span| span.name == name)
        .collect()
}

/// One call observed by [`FakeEta`].
#[derive(Debug, Clone)]
pub struct Call {
    pub customer_id: String,
    pub trace_id: Option<String>,
}

/// Aggregator double: answers with a canned ETA or a canned failure.
#[derive(Clone)]
pub struct FakeEta {
    calls: Arc<Mutex<Vec<Call>>>,
    failure: Option<String>,
    delay: Duration,
}

impl FakeEta {
    pub fn succeeding() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The body a successful call for `customer_id` produces.
    pub fn eta_for(customer_id: &str, trace_id: Option<&str>) -> Value {
        json!({
            "Driver": format!("T7{customer_id}C"),
            "ETA": 120_000_000_000u64,
            "customer": customer_id,
            "trace": trace_id,
        })
    }
}

#[async_trait]
impl EtaAggregator for FakeEta {
    type Response = Value;

    async fn get(&self, span: &RequestSpan, customer_id: &str) -> Result<Value, AggregatorError> {
        let trace_id = span.trace_id().map(|id| id.to_string());
        self.calls.lock().unwrap().push(Call {
            customer_id: customer_id.to_string(),
            trace_id: trace_id.clone(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.failure {
            Some(message) => Err(AggregatorError::Failed(message.clone())),
            None => Ok(Self::eta_for(customer_id, trace_id.as_deref())),
        }
    }
}

/// Build the frontend router around `aggregator`.
pub fn frontend<A: EtaAggregator>(aggregator: A, basepath: &str) -> (Router, InMemorySpanExporter) {
    let (tracer, exporter) = tracer_with_exporter();
    let options = ConfigOptions {
        basepath: basepath.to_string(),
        ..ConfigOptions::default()
    };
    let server = FrontendServer::new(&options, tracer, aggregator);
    (server.router(), exporter)
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Start a programmable mock aggregator on an ephemeral port.
///
/// `f` receives the request headers and the raw query string.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(HeaderMap, Option<String>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move |request: Request| {
        let f = f.clone();
        async move {
            let query = request.uri().query().map(str::to_string);
            let (status, body) = f(request.headers().clone(), query).await;
            (
                StatusCode::from_u16(status).unwrap(),
                [("content-type", "application/json")],
                body,
            )
                .into_response()
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}
