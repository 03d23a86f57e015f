//! HTTP client for a remote ETA aggregator.
//!
//! # Responsibilities
//! - Issue `GET {url}?customer=<id>` to the configured endpoint
//! - Open a client span and propagate it via W3C trace headers
//! - Return the downstream JSON untouched
//!
//! # Design Decisions
//! - One attempt per call, bounded by the configured timeout
//! - Non-2xx answers are errors carrying the downstream body

use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use opentelemetry::KeyValue;
use serde_json::Value;
use url::Url;

use crate::aggregator::{AggregatorError, EtaAggregator};
use crate::config::AggregatorConfig;
use crate::observability::{inject_context, log_error, RequestSpan, Tracer};

/// Aggregator reached over HTTP.
pub struct RemoteEta {
    client: reqwest::Client,
    url: Url,
    tracer: Tracer,
}

impl RemoteEta {
    pub fn new(config: &AggregatorConfig, tracer: Tracer) -> Result<Self, AggregatorError> {
        let url = Url::parse(&config.url).map_err(|e| {
            AggregatorError::Failed(format!("invalid aggregator URL {:?}: {e}", config.url))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            tracer,
        })
    }

    /// Endpoint this client queries.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch(&self, span: &RequestSpan, url: Url) -> Result<Value, AggregatorError> {
        let mut headers = HeaderMap::new();
        inject_context(span, &mut headers);

        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status();
        span.set_attribute(KeyValue::new("http.status_code", i64::from(status.as_u16())));

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body.trim().to_string(),
                Err(e) => format!("<unreadable body: {e}>"),
            };
            return Err(AggregatorError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl EtaAggregator for RemoteEta {
    type Response = Value;

    async fn get(&self, span: &RequestSpan, customer_id: &str) -> Result<Value, AggregatorError> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("customer", customer_id);

        let client_span = self.tracer.start_client_span(
            "HTTP GET".to_string(),
            span,
            vec![
                KeyValue::new("http.method", "GET"),
                KeyValue::new("http.url", url.to_string()),
                KeyValue::new("customer_id", customer_id.to_string()),
            ],
        );
        tracing::info!(url = %url, customer_id, "Requesting best ETA");

        let result = self.fetch(&client_span, url).await;
        if let Err(e) = &result {
            log_error(&client_span, "aggregator call failed", e);
        }
        client_span.finish();
        result
    }
}
