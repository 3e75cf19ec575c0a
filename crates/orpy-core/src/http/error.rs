//! HTTP error classification
//!
//! Maps Orchestrator error responses onto a closed taxonomy of client errors.
//! Every error carries the request method and URL together with the message
//! and details extracted from the response body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Text used when the body does not carry a message or details
pub const NOT_AVAILABLE: &str = "n/a";

/// Classification of an HTTP error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// HTTP 400 - malformed data was sent
    BadRequest,
    /// HTTP 401 - bad credentials
    Unauthorized,
    /// HTTP 403 - credentials do not grant access to this resource
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 405
    MethodNotAllowed,
    /// HTTP 406
    NotAcceptable,
    /// HTTP 409
    Conflict,
    /// HTTP 413 - over the API limits for this time period
    OverLimit,
    /// HTTP 429 - too many requests for this time period
    RateLimit,
    /// HTTP 501 - the server does not support this operation
    NotImplemented,
    /// Any other status code
    Generic,
}

impl ErrorKind {
    /// Map an HTTP status code to its error kind
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            405 => ErrorKind::MethodNotAllowed,
            406 => ErrorKind::NotAcceptable,
            409 => ErrorKind::Conflict,
            413 => ErrorKind::OverLimit,
            429 => ErrorKind::RateLimit,
            501 => ErrorKind::NotImplemented,
            _ => ErrorKind::Generic,
        }
    }

    /// Whether the server may send a Retry-After hint for this kind
    pub fn carries_retry_after(&self) -> bool {
        matches!(self, ErrorKind::OverLimit | ErrorKind::RateLimit)
    }

    /// Default human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not found",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::NotAcceptable => "Not Acceptable",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::OverLimit => "Over limit",
            ErrorKind::RateLimit => "Rate limit",
            ErrorKind::NotImplemented => "Not Implemented",
            ErrorKind::Generic => "An unknown exception occurred",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A classified error response from the Orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientError {
    /// Error classification
    pub kind: ErrorKind,
    /// HTTP status code
    pub status: u16,
    /// Request method
    pub method: String,
    /// Fully resolved request URL
    pub url: String,
    /// Message extracted from the body
    pub message: String,
    /// Details extracted from the body
    pub details: Option<String>,
    /// Seconds to wait before retrying (OverLimit and RateLimit only)
    pub retry_after: Option<u64>,
}

impl ClientError {
    /// Build the error record for a completed exchange.
    ///
    /// `body` is the parsed JSON body or, when the body was not JSON, the raw
    /// text wrapped in [`Value::String`]. `retry_after` is the raw value of the
    /// `Retry-After` response header.
    pub fn classify(
        status: u16,
        body: Option<&Value>,
        url: &str,
        method: &str,
        retry_after: Option<&str>,
    ) -> Self {
        let kind = ErrorKind::from_status(status);
        let (message, details) = extract_message(body);

        let retry_after = kind.carries_retry_after().then(|| {
            retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0)
        });

        Self {
            kind,
            status,
            method: method.to_string(),
            url: url.to_string(),
            message,
            details,
            retry_after,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (HTTP {}) {} {}: {}",
            self.kind, self.status, self.method, self.url, self.message
        )?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {}

/// Extract `(message, details)` from an error body.
///
/// Priority: top-level `message`, then top-level `title`, then the first
/// entry of a mapping holding a nested `message`/`details` pair.
fn extract_message(body: Option<&Value>) -> (String, Option<String>) {
    let map = match body {
        Some(Value::Object(map)) if !map.is_empty() => map,
        _ => return (NOT_AVAILABLE.to_string(), Some(NOT_AVAILABLE.to_string())),
    };

    let source = if map.contains_key("message") || map.contains_key("title") {
        map
    } else {
        match map.values().next() {
            Some(Value::Object(nested)) => nested,
            _ => return (NOT_AVAILABLE.to_string(), Some(NOT_AVAILABLE.to_string())),
        }
    };

    let message_key = if source.contains_key("message") || !source.contains_key("title") {
        "message"
    } else {
        "title"
    };

    let message = source
        .get(message_key)
        .and_then(value_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let details = source.get("details").and_then(value_text);

    (message, details)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
