//! Error responses.
//!
//! # Responsibilities
//! - Turn a failed step into a plain-text HTTP error response
//! - Leave successful steps untouched so the handler can continue
//!
//! # Design Decisions
//! - Status choice belongs to the caller; this module never inspects the error
//! - The body is the error's message verbatim
//! - A handler returns `Result<_, HttpError>`, so exactly one response is
//!   written per request

use std::fmt::Display;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// A classified failure: status plus message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ),
            ],
            self.message,
        )
            .into_response()
    }
}

/// Classify the outcome of a handler step.
pub trait Classify<T> {
    /// `Ok` passes through; `Err` becomes an [`HttpError`] with `status`
    /// and the error's message as body.
    fn or_status(self, status: StatusCode) -> Result<T, HttpError>;
}

impl<T, E: Display> Classify<T> for Result<T, E> {
    fn or_status(self, status: StatusCode) -> Result<T, HttpError> {
        self.map_err(|e| HttpError::new(status, e.to_string()))
    }
}
