//! End-to-end tests against a live frontend and a mock aggregator.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::HeaderMap;
use eta_frontend::config::{AggregatorConfig, ConfigOptions};
use eta_frontend::http::FrontendServer;
use eta_frontend::lifecycle::Shutdown;
use eta_frontend::RemoteEta;
use opentelemetry::trace::SpanKind;
use opentelemetry_sdk::trace::InMemorySpanExporter;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

mod common;

const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

type Seen = Arc<Mutex<Vec<(HeaderMap, Option<String>)>>>;

struct Running {
    addr: SocketAddr,
    shutdown: Shutdown,
    exporter: InMemorySpanExporter,
    handle: JoinHandle<std::io::Result<()>>,
}

async fn start_frontend(backend: SocketAddr, basepath: &str) -> Running {
    let (tracer, exporter) = common::tracer_with_exporter();
    let aggregator = RemoteEta::new(
        &AggregatorConfig {
            url: format!("http://{backend}/eta"),
            timeout_secs: 5,
        },
        tracer.clone(),
    )
    .unwrap();

    let options = ConfigOptions {
        frontend_host_port: "127.0.0.1:0".to_string(),
        basepath: basepath.to_string(),
        ..ConfigOptions::default()
    };
    let server = FrontendServer::new(&options, tracer, aggregator);
    let listener = TcpListener::bind(server.host_port()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Running {
        addr,
        shutdown,
        exporter,
        handle,
    }
}

async fn recording_backend(status: u16, body: &'static str) -> (SocketAddr, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let addr = common::start_programmable_backend(move |headers, query| {
        let recorder = recorder.clone();
        async move {
            recorder.lock().unwrap().push((headers, query));
            (status, body.to_string())
        }
    })
    .await;
    (addr, seen)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_trace_context_reaches_aggregator() {
    let (backend, seen) = recording_backend(200, r#"{"Driver":"T757183C","ETA":120000000000}"#).await;
    let frontend = start_frontend(backend, "").await;

    let response = client()
        .get(format!("http://{}/dispatch?customer=123", frontend.addr))
        .header("traceparent", TRACEPARENT)
        .send()
        .await
        .expect("frontend unreachable");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["Driver"], "T757183C");
    assert_eq!(body["ETA"], 120_000_000_000u64);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let (headers, query) = &seen[0];
    assert_eq!(query.as_deref(), Some("customer=123"));

    let traceparent = headers["traceparent"].to_str().unwrap();
    let parts: Vec<&str> = traceparent.split('-').collect();
    assert_eq!(parts[1], TRACE_ID);
    assert_ne!(parts[2], "00f067aa0ba902b7");

    let client_spans = common::spans_named(&frontend.exporter, "HTTP GET");
    assert_eq!(client_spans.len(), 1);
    assert_eq!(client_spans[0].span_kind, SpanKind::Client);
    assert_eq!(client_spans[0].span_context.span_id().to_string(), parts[2]);

    let server_spans = common::spans_named(&frontend.exporter, "HTTP GET /dispatch");
    assert_eq!(server_spans.len(), 1);
    assert_eq!(server_spans[0].span_kind, SpanKind::Server);
    assert_eq!(
        client_spans[0].parent_span_id,
        server_spans[0].span_context.span_id()
    );

    frontend.shutdown.trigger();
}

#[tokio::test]
async fn test_aggregator_error_status_is_reported() {
    let (backend, seen) = recording_backend(503, "busy\n").await;
    let frontend = start_frontend(backend, "hotrod").await;

    let response = client()
        .post(format!("http://{}/hotrod/dispatch", frontend.addr))
        .form(&[("customer", "567")])
        .send()
        .await
        .expect("frontend unreachable");

    assert_eq!(response.status(), 500);
    assert_eq!(
        response.text().await.unwrap(),
        "aggregator returned 503 Service Unavailable: busy"
    );
    assert_eq!(seen.lock().unwrap()[0].1.as_deref(), Some("customer=567"));

    let client_spans = common::spans_named(&frontend.exporter, "HTTP GET");
    assert_eq!(client_spans.len(), 1);
    assert!(client_spans[0]
        .events
        .iter()
        .any(|event| event.name == "error"));

    frontend.shutdown.trigger();
}

#[tokio::test]
async fn test_index_served_over_tcp() {
    let (backend, seen) = recording_backend(200, "{}").await;
    let frontend = start_frontend(backend, "").await;

    let response = client()
        .get(format!("http://{}/", frontend.addr))
        .header("traceparent", TRACEPARENT)
        .send()
        .await
        .expect("frontend unreachable");

    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains(TRACE_ID));
    assert!(seen.lock().unwrap().is_empty());

    frontend.shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let (backend, _) = recording_backend(200, "{}").await;
    let frontend = start_frontend(backend, "").await;

    frontend.shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), frontend.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
