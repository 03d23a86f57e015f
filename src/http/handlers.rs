//! Route handlers: the landing page and the dispatch API.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::aggregator::EtaAggregator;
use crate::http::form::parse_form;
use crate::http::response::{Classify, HttpError};
use crate::http::server::AppState;
use crate::http::template::TemplateRenderer;
use crate::observability::{log_error, RequestSpan};

/// Asset name of the landing page template.
pub const INDEX_TEMPLATE: &str = "/index.html";

/// Body returned when the `customer` parameter is missing or empty.
pub const MISSING_CUSTOMER: &str = "Missing required 'customer' parameter";

/// Render the landing page, exposing the request's trace id to the template.
pub async fn index<A: EtaAggregator>(
    State(state): State<Arc<AppState<A>>>,
    span: RequestSpan,
) -> Response {
    match render_index(&state.templates, &span) {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

fn render_index(templates: &TemplateRenderer, span: &RequestSpan) -> Result<String, HttpError> {
    let page = templates
        .get_template(span, INDEX_TEMPLATE)
        .or_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut ctx = BTreeMap::new();
    if let Some(trace_id) = span.trace_id() {
        ctx.insert("traceID", trace_id.to_string());
    }

    page.render(&ctx)
        .inspect_err(|e| log_error(span, "could not execute template", e))
        .or_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Compute the best ETA for the `customer` form parameter and return it as JSON.
pub async fn dispatch<A: EtaAggregator>(
    State(state): State<Arc<AppState<A>>>,
    span: RequestSpan,
    request: Request,
) -> Response {
    match handle_dispatch(&state, &span, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn handle_dispatch<A: EtaAggregator>(
    state: &AppState<A>,
    span: &RequestSpan,
    request: Request,
) -> Result<Response, HttpError> {
    tracing::info!(
        method = %request.method(),
        url = %request.uri(),
        "HTTP request received"
    );

    let form = parse_form(request)
        .await
        .inspect_err(|e| log_error(span, "bad request", e))
        .or_status(StatusCode::BAD_REQUEST)?;

    let customer_id = match form.get("customer") {
        Some(id) if !id.is_empty() => id,
        _ => return Err(HttpError::bad_request(MISSING_CUSTOMER)),
    };

    // TODO: map unknown-customer failures to 4xx once the aggregator reports them distinctly
    let response = state
        .aggregator
        .get(span, customer_id)
        .await
        .inspect_err(|e| log_error(span, "request failed", e))
        .or_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    let data = serde_json::to_vec(&response)
        .inspect_err(|e| log_error(span, "cannot marshal response", e))
        .or_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        data,
    )
        .into_response())
}
