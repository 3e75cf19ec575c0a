//! HTTP debug logging
//!
//! Requests are rendered as an equivalent `curl` command line and responses as
//! status, headers and a redacted JSON body. Credentials never reach the log:
//! the `Authorization` header and the `access`, `token` and `id` keys of
//! response bodies are replaced by digests.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::http::redact::Redactor;
use crate::http::transport::{HttpRequest, ResponseEnvelope};

/// Top-level response keys that are redacted
pub const REDACTED_RESPONSE_KEYS: [&str; 3] = ["access", "token", "id"];

/// Render a request as a `curl` command line
pub fn render_request(
    method: &str,
    url: &str,
    headers: &BTreeMap<String, String>,
    body: Option<&str>,
    verify_tls: bool,
    redactor: &Redactor,
) -> String {
    let mut parts = vec!["curl -g -i".to_string()];

    if !verify_tls {
        parts.push("--insecure".to_string());
    }
    parts.push(format!("'{}'", url));
    parts.push(format!("-X {}", method));

    // BTreeMap keeps the names sorted
    let mut headers = Value::Object(
        headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    );
    for name in authorization_names(&headers) {
        redactor.redact(&mut headers, &[name.as_str()], None);
    }
    if let Value::Object(map) = &headers {
        for (name, value) in map {
            let value = value.as_str().unwrap_or_default();
            parts.push(format!("-H \"{}: {}\"", name, value));
        }
    }

    if let Some(body) = body {
        // re-encode so the logged payload is compact
        let data = serde_json::from_str::<Value>(body)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| body.to_string());
        parts.push(format!("-d '{}'", data));
    }

    parts.join(" ")
}

fn authorization_names(headers: &Value) -> Vec<String> {
    headers
        .as_object()
        .map(|map| {
            map.keys()
                .filter(|k| k.eq_ignore_ascii_case("Authorization"))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Render a response with its redacted body.
///
/// The body is only shown when it is non-empty JSON and the status is not
/// 400; otherwise `null` is written.
pub fn render_response(envelope: &ResponseEnvelope, redactor: &Redactor) -> String {
    let body = match &envelope.parsed_body {
        Some(body) if envelope.status != 400 && !envelope.raw_body.is_empty() => {
            let mut body = body.clone();
            for key in REDACTED_RESPONSE_KEYS {
                redactor.redact(&mut body, &[key], None);
            }
            body
        }
        _ => Value::Null,
    };

    let headers = serde_json::to_string(&envelope.headers).unwrap_or_default();
    format!(
        "RESP: [{}] {}\nRESP BODY: {}",
        envelope.status, headers, body
    )
}

/// Emits request and response renderings when HTTP debugging is enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugLogger {
    enabled: bool,
    verify_tls: bool,
    redactor: Redactor,
}

impl DebugLogger {
    pub fn new(enabled: bool, verify_tls: bool, redactor: Redactor) -> Self {
        Self {
            enabled,
            verify_tls,
            redactor,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log_request(&self, request: &HttpRequest) {
        if !self.enabled {
            return;
        }
        let line = render_request(
            request.method.as_str(),
            request.url.as_str(),
            &request.headers,
            request.body.as_deref(),
            self.verify_tls,
            &self.redactor,
        );
        debug!(target: "orpy_core::http", "REQ: {}", line);
    }

    pub fn log_response(&self, envelope: &ResponseEnvelope) {
        if !self.enabled {
            return;
        }
        debug!(target: "orpy_core::http", "{}", render_response(envelope, &self.redactor));
    }
}
