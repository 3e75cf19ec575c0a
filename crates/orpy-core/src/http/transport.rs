//! HTTP transport abstraction
//!
//! The pipeline talks to the network through [`Transport`], which performs
//! exactly one exchange per call. [`ReqwestTransport`] is the default
//! implementation; it keeps a single `reqwest::Client` so connections are
//! pooled across requests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use url::Url;

use crate::{Error, Result};

/// A fully prepared HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Header names as written by the caller
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON payload
    pub body: Option<String>,
}

impl HttpRequest {
    /// Same request against another URL (used when following pages)
    pub fn with_url(&self, url: Url) -> Self {
        Self {
            url,
            ..self.clone()
        }
    }

    /// Header value, looked up case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status, headers and body of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    /// Lower-case header names
    pub headers: BTreeMap<String, String>,
    pub raw_body: String,
    /// The body decoded as JSON, when it is JSON
    pub parsed_body: Option<Value>,
}

impl ResponseEnvelope {
    /// Build an envelope, decoding the body if possible
    pub fn new(status: u16, headers: BTreeMap<String, String>, raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        let parsed_body = if raw_body.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&raw_body).ok()
        };

        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Self {
            status,
            headers,
            raw_body,
            parsed_body,
        }
    }

    /// Header value by (case-insensitive) name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the status code denotes an error
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Performs one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once and collect the whole response
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope>;
}

/// Transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Build a transport.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(verify_tls: bool, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(!verify_tls);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| Error::Transport {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let raw_body = response.text().await?;
        Ok(ResponseEnvelope::new(status, headers, raw_body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_parses_json() {
        let env = ResponseEnvelope::new(200, BTreeMap::new(), r#"{"a": 1}"#);
        assert_eq!(env.parsed_body, Some(json!({"a": 1})));
        assert!(!env.is_error());
    }

    #[test]
    fn test_envelope_keeps_text() {
        let env = ResponseEnvelope::new(502, BTreeMap::new(), "<html>bad gateway</html>");
        assert_eq!(env.parsed_body, None);
        assert_eq!(env.raw_body, "<html>bad gateway</html>");
        assert!(env.is_error());

        let env = ResponseEnvelope::new(204, BTreeMap::new(), "");
        assert_eq!(env.parsed_body, None);
    }

    #[test]
    fn test_envelope_header_names_are_lowercase() {
        let headers = BTreeMap::from([("Retry-After".to_string(), "5".to_string())]);
        let env = ResponseEnvelope::new(429, headers, "");
        assert!(env.headers.contains_key("retry-after"));
        assert_eq!(env.header("RETRY-AFTER"), Some("5"));
    }

    #[test]
    fn test_request_header_lookup() {
        let request = HttpRequest {
            method: Method::POST,
            url: Url::parse("https://example.org/").unwrap(),
            headers: BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]),
            body: None,
        };
        assert_eq!(request.header("Content-Type"), Some("text/plain"));

        let moved = request.with_url(Url::parse("https://example.org/next").unwrap());
        assert_eq!(moved.method, Method::POST);
        assert_eq!(moved.url.path(), "/next");
    }

    #[test]
    fn test_transport_builds() {
        assert!(ReqwestTransport::new(true, None).is_ok());
        assert!(ReqwestTransport::new(false, Some(Duration::from_secs(5))).is_ok());
    }
}
