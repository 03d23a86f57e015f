//! Form parameter parsing.
//!
//! # Responsibilities
//! - Collect parameters from the URL query string
//! - Collect parameters from `application/x-www-form-urlencoded` bodies
//!   on POST, PUT and PATCH
//! - Reject malformed input instead of decoding it lossily
//!
//! # Design Decisions
//! - Body parameters come before query parameters, so `get` prefers the body
//! - Bodies are capped at 10 MiB
//! - `;` is not accepted as a pair separator
//! - Other content types leave the body unread

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderMap, Method};
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// Upper bound on a urlencoded request body.
pub const MAX_FORM_BODY: usize = 10 << 20;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Why a request's parameters could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("invalid UTF-8 in form data")]
    InvalidUtf8,

    #[error("invalid semicolon separator in query")]
    Semicolon,

    #[error("http: POST too large")]
    TooLarge,

    #[error("failed to read form body: {0}")]
    Body(String),
}

/// Parsed request parameters, in order of precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse the query string and, when applicable, the urlencoded body.
pub async fn parse_form(request: Request) -> Result<Form, FormError> {
    let (parts, body) = request.into_parts();

    let mut pairs = Vec::new();
    if has_form_body(&parts.method, &parts.headers) {
        let bytes = read_body(&parts.headers, body).await?;
        pairs.extend(parse_query(&bytes)?);
    }
    if let Some(query) = parts.uri.query() {
        pairs.extend(parse_query(query.as_bytes())?);
    }

    Ok(Form { pairs })
}

/// Decode `k=v&k2=v2` strictly: bad escapes, `;` separators and values
/// that do not decode to UTF-8 are errors.
pub fn parse_query(raw: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    if raw.contains(&b';') {
        return Err(FormError::Semicolon);
    }
    check_encoding(raw)?;

    Ok(url::form_urlencoded::parse(raw).into_owned().collect())
}

/// Percent-decode `raw` and check the result is UTF-8.
///
/// Separators are ASCII, so the whole input decodes to UTF-8 exactly when
/// every key and value does.
fn check_encoding(raw: &[u8]) -> Result<(), FormError> {
    let mut decoded = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let escape = raw
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            match escape {
                Some(byte) if raw[i + 1].is_ascii_hexdigit() => decoded.push(byte),
                _ => {
                    let end = (i + 3).min(raw.len());
                    return Err(FormError::InvalidEscape(
                        String::from_utf8_lossy(&raw[i..end]).into_owned(),
                    ));
                }
            }
            i += 3;
        } else {
            decoded.push(raw[i]);
            i += 1;
        }
    }

    std::str::from_utf8(&decoded)
        .map(|_| ())
        .map_err(|_| FormError::InvalidUtf8)
}

fn has_form_body(method: &Method, headers: &HeaderMap) -> bool {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

async fn read_body(headers: &HeaderMap, body: Body) -> Result<Vec<u8>, FormError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > MAX_FORM_BODY) {
        return Err(FormError::TooLarge);
    }

    Limited::new(body, MAX_FORM_BODY)
        .collect()
        .await
        .map(|collected| collected.to_bytes().to_vec())
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                FormError::TooLarge
            } else {
                FormError::Body(e.to_string())
            }
        })
}
