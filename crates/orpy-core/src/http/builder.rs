//! HTTP request construction
//!
//! Turns a [`RequestDescriptor`] into a fully resolved [`HttpRequest`]:
//! method normalization, URL resolution against the Orchestrator base URL,
//! fixed headers and the JSON payload.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::http::auth::BearerStyle;
use crate::http::transport::HttpRequest;
use crate::{Error, Result};

const JSON: &str = "application/json";

/// Description of a single logical API call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method, case-insensitive
    pub method: String,
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    /// Whether an `Authorization` header must be sent
    pub requires_auth: bool,
    /// JSON payload
    pub payload: Option<Value>,
    /// Extra headers; the fixed headers take precedence over these
    pub extra_headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Authenticated request without payload
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            requires_auth: true,
            payload: None,
            extra_headers: BTreeMap::new(),
        }
    }

    /// Attach a JSON payload.
    ///
    /// Date-times and UUIDs are written in their serde string forms.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Attach an already built JSON payload
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Add an extra header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Send the request without credentials
    pub fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self
    }
}

/// Builds [`HttpRequest`]s against one Orchestrator
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    bearer_style: BearerStyle,
    user_agent: String,
}

impl RequestBuilder {
    /// Create a builder for `base_url`
    pub fn new(base_url: &str, bearer_style: BearerStyle) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            bearer_style,
            user_agent: format!("orpy-{}", crate::VERSION),
        })
    }

    /// Base URL, always ending in a single `/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the request for `descriptor`.
    ///
    /// `token` is only used when the descriptor requires authentication.
    pub fn build(&self, descriptor: &RequestDescriptor, token: Option<&str>) -> Result<HttpRequest> {
        let method = parse_method(&descriptor.method)?;
        let url = self.resolve(&descriptor.path)?;

        let mut headers = descriptor.extra_headers.clone();
        set_header(&mut headers, "User-Agent", &self.user_agent);
        set_header(&mut headers, "Accept", JSON);

        if descriptor.requires_auth {
            if let Some(token) = token {
                set_header(&mut headers, "Authorization", &self.bearer_style.header_value(token));
            }
        }

        let body = match &descriptor.payload {
            Some(payload) => {
                if !headers.keys().any(|k| k.eq_ignore_ascii_case("Content-Type")) {
                    headers.insert("Content-Type".to_string(), JSON.to_string());
                }
                Some(serde_json::to_string(payload)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Resolve `path` against the base URL
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::invalid_usage(format!("Cannot resolve '{}': {}", path, e)))
    }
}

/// Parse a method name case-insensitively
pub fn parse_method(method: &str) -> Result<Method> {
    match method.to_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "PATCH" => Ok(Method::PATCH),
        "HEAD" => Ok(Method::HEAD),
        _ => Err(Error::invalid_usage(format!("Unsupported HTTP method: {}", method))),
    }
}

/// Parse the Orchestrator URL and make it end with exactly one `/`
pub fn normalize_base_url(url: &str) -> Result<Url> {
    let trimmed = url.trim().trim_end_matches('/');
    Url::parse(&format!("{}/", trimmed))
        .map_err(|e| Error::configuration(format!("Invalid Orchestrator URL '{}': {}", url, e)))
}

/// Replace any header with the same name, ignoring case
fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}
