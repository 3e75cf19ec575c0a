//! Orchestrator client orchestrating all HTTP components
//!
//! [`OrchestratorClient::execute`] runs the request pipeline: resolve the
//! token, build the request, send it once, classify errors, decode the body
//! and follow pagination links.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, warn};

use crate::http::auth::{AuthError, AuthWarning, BearerStyle, Credentials, TokenSource};
use crate::http::builder::{parse_method, RequestBuilder, RequestDescriptor};
use crate::http::debug::DebugLogger;
use crate::http::error::ClientError;
use crate::http::pagination::{PaginationFollower, DEFAULT_MAX_PAGES};
use crate::http::redact::{DigestAlgorithm, Redactor};
use crate::http::transport::{HttpRequest, ReqwestTransport, ResponseEnvelope, Transport};
use crate::oidc::{OidcAgent, OidcSession};
use crate::resources::{Config, Deployments, Info, Resources};
use crate::Result;

/// Configuration for the Orchestrator client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Orchestrator endpoint
    pub base_url: String,
    /// Log requests and responses on the `orpy_core::http` target
    pub debug: bool,
    /// Whether to validate TLS certificates
    pub verify_tls: bool,
    /// Request timeout, unbounded when `None`
    pub timeout: Option<Duration>,
    /// Ceiling on pages fetched per call, unbounded when `None`
    pub max_pages: Option<usize>,
    /// Digest used when redacting debug output
    pub digest: DigestAlgorithm,
    /// Format of the `Authorization` header
    pub bearer_style: BearerStyle,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            debug: false,
            verify_tls: true,
            timeout: None,
            max_pages: Some(DEFAULT_MAX_PAGES),
            digest: DigestAlgorithm::default(),
            bearer_style: BearerStyle::default(),
        }
    }
}

/// Decoded body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Json(Value),
    /// The body was not JSON
    Text(String),
}

impl Content {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Content::Json(value) => Some(value),
            Content::Text(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Content::Json(value) => Some(value),
            Content::Text(_) => None,
        }
    }

    /// Items of a list response; empty for anything else
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Content::Json(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }
}

/// Result of a logical call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The last response received (the last page when paginating)
    pub envelope: ResponseEnvelope,
    pub content: Content,
    /// Number of pages fetched
    pub pages: usize,
}

/// Builder for [`OrchestratorClient`]
#[derive(Debug, Clone)]
pub struct OrchestratorClientBuilder {
    config: ClientConfig,
    credentials: Credentials,
}

impl OrchestratorClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(base_url),
            credentials: Credentials::new(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            credentials: Credentials::new(),
        }
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.verify_tls = verify;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn digest(mut self, digest: DigestAlgorithm) -> Self {
        self.config.digest = digest;
        self
    }

    pub fn bearer_style(mut self, style: BearerStyle) -> Self {
        self.config.bearer_style = style;
        self
    }

    /// Replace all credentials
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_token(token);
        self
    }

    pub fn oidc_agent(mut self, agent: OidcAgent) -> Self {
        self.credentials = self.credentials.with_agent(agent);
        self
    }

    pub fn oidc_session(mut self, session: OidcSession) -> Self {
        self.credentials = self.credentials.with_session(session);
        self
    }

    /// Build a client using the default reqwest transport
    pub fn build(self) -> Result<OrchestratorClient> {
        let transport = ReqwestTransport::new(self.config.verify_tls, self.config.timeout)?;
        self.build_with_transport(transport)
    }

    /// Build a client on top of a custom transport
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<OrchestratorClient<T>> {
        let builder = RequestBuilder::new(&self.config.base_url, self.config.bearer_style)?;
        let logger = DebugLogger::new(
            self.config.debug,
            self.config.verify_tls,
            Redactor::new(self.config.digest),
        );

        let resolved = self.credentials.resolve();
        for warning in &resolved.warnings {
            warn!("{}", warning);
        }

        Ok(OrchestratorClient {
            transport,
            builder,
            logger,
            config: self.config,
            token_source: resolved.source,
            auth_warnings: resolved.warnings,
        })
    }
}

/// Client for the Orchestrator REST API
pub struct OrchestratorClient<T: Transport = ReqwestTransport> {
    transport: T,
    builder: RequestBuilder,
    logger: DebugLogger,
    config: ClientConfig,
    token_source: Option<Arc<dyn TokenSource>>,
    auth_warnings: Vec<AuthWarning>,
}

impl OrchestratorClient {
    /// Start building a client for `base_url`
    pub fn builder(base_url: impl Into<String>) -> OrchestratorClientBuilder {
        OrchestratorClientBuilder::new(base_url)
    }
}

impl<T: Transport> OrchestratorClient<T> {
    /// Base URL, ending in `/`
    pub fn base_url(&self) -> &str {
        self.builder.base_url().as_str()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Warnings produced while selecting the token source
    pub fn auth_warnings(&self) -> &[AuthWarning] {
        &self.auth_warnings
    }

    /// Whether a token source is configured
    pub fn is_authenticated(&self) -> bool {
        self.token_source.is_some()
    }

    /// Obtain a token from the selected source
    pub fn token(&self) -> Result<String> {
        let source = self.token_source.as_ref().ok_or(AuthError::NotConfigured)?;
        Ok(source.token()?)
    }

    /// Deployments endpoint group
    pub fn deployments(&self) -> Deployments<'_, T> {
        Deployments::new(self)
    }

    /// Resources endpoint group
    pub fn resources(&self) -> Resources<'_, T> {
        Resources::new(self)
    }

    /// Information endpoint
    pub fn info(&self) -> Info<'_, T> {
        Info::new(self)
    }

    /// Configuration endpoint
    pub fn configuration(&self) -> Config<'_, T> {
        Config::new(self)
    }

    /// Start describing a request
    pub fn request(&self, method: impl Into<String>, path: impl Into<String>) -> RequestDescriptor {
        RequestDescriptor::new(method, path)
    }

    /// Run a request through the pipeline
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path))]
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        parse_method(&descriptor.method)?;

        let token = if descriptor.requires_auth {
            Some(self.token()?)
        } else {
            None
        };

        let request = self.builder.build(&descriptor, token.as_deref())?;
        let envelope = self.send(&request).await?;

        let decoded = envelope.parsed_body.as_ref().map(|body| {
            let content = body.get("content").unwrap_or(body).clone();
            (content, body.get("links").is_some())
        });

        let items = match decoded {
            Some((Value::Array(items), true)) => items,
            Some((content, _)) => {
                return Ok(ApiResponse {
                    envelope,
                    content: Content::Json(content),
                    pages: 1,
                })
            }
            None => {
                let content = Content::Text(envelope.raw_body.clone());
                return Ok(ApiResponse {
                    envelope,
                    content,
                    pages: 1,
                });
            }
        };

        let mut follower = PaginationFollower::new(items, self.config.max_pages);
        let mut last = envelope;
        while let Some(next) = follower.next_page(last.parsed_body.as_ref())? {
            let url = self.builder.resolve(&next)?;
            last = self.send(&request.with_url(url)).await?;
            follower.push_page(last.parsed_body.as_ref());
        }

        Ok(ApiResponse {
            envelope: last,
            pages: follower.pages(),
            content: Content::Json(Value::Array(follower.into_content())),
        })
    }

    /// Send one request and fail on error statuses
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope> {
        self.logger.log_request(request);
        let envelope = self.transport.send(request).await?;
        self.logger.log_response(&envelope);

        if envelope.is_error() {
            return Err(classify(request, &envelope).into());
        }
        Ok(envelope)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::new("GET", path)).await
    }

    pub async fn head(&self, path: &str) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::new("HEAD", path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::new("DELETE", path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::new("POST", path).json(payload)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::new("PUT", path).json(payload)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::new("PATCH", path).json(payload)?).await
    }
}

#[cfg(test)]
impl OrchestratorClient<crate::http::mock::MockTransport> {
    pub(crate) fn transport_requests(&self) -> Vec<HttpRequest> {
        self.transport.requests()
    }
}

/// Turn an error response into a [`ClientError`]
fn classify(request: &HttpRequest, envelope: &ResponseEnvelope) -> ClientError {
    let body = match &envelope.parsed_body {
        Some(body) => Some(body.clone()),
        None if !envelope.raw_body.is_empty() => Some(Value::String(envelope.raw_body.clone())),
        None => None,
    };

    ClientError::classify(
        envelope.status,
        body.as_ref(),
        request.url.as_str(),
        request.method.as_str(),
        envelope.header("retry-after"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::ErrorKind;
    use crate::http::mock::MockTransport;
    use crate::Error;
    use reqwest::Method;
    use serde_json::json;

    const BASE: &str = "https://o.example/orchestrator";

    fn client(mock: MockTransport) -> OrchestratorClient<MockTransport> {
        OrchestratorClient::builder(BASE)
            .token("tok")
            .build_with_transport(mock)
            .unwrap()
    }

    fn page(current: &str, next: &str, last: &str, items: Value) -> Value {
        json!({
            "content": items,
            "links": [
                {"rel": "self", "href": current},
                {"rel": "next", "href": next},
                {"rel": "last", "href": last}
            ]
        })
    }

    #[tokio::test]
    async fn test_json_content_is_unwrapped() {
        let mock = MockTransport::new().json(200, json!({"content": {"uuid": "u"}}));
        let client = client(mock);

        let response = client.get("./deployments/u").await.unwrap();
        assert_eq!(response.content, Content::Json(json!({"uuid": "u"})));
        assert_eq!(response.pages, 1);

        let request = &client.transport.requests()[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "https://o.example/orchestrator/deployments/u");
        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_whole_body_without_content_key() {
        let mock = MockTransport::new().json(200, json!({"uuid": "u", "status": "CREATE_COMPLETE"}));
        let response = client(mock).get("./deployments/u").await.unwrap();
        assert_eq!(
            response.content,
            Content::Json(json!({"uuid": "u", "status": "CREATE_COMPLETE"}))
        );
    }

    #[tokio::test]
    async fn test_text_body() {
        let mock = MockTransport::new().text(200, "tosca_definitions_version: tosca_simple_yaml_1_0");
        let response = client(mock).get("./deployments/u/template").await.unwrap();
        assert_eq!(
            response.content,
            Content::Text("tosca_definitions_version: tosca_simple_yaml_1_0".to_string())
        );
    }

    #[tokio::test]
    async fn test_error_classification() {
        let mock = MockTransport::new().json(404, json!({"message": "not found", "details": "no such deployment"}));
        let err = client(mock).delete("./deployments/u").await.unwrap_err();

        let err = err.as_client_error().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.method, "DELETE");
        assert_eq!(err.url, "https://o.example/orchestrator/deployments/u");
        assert_eq!(err.message, "not found");
        assert_eq!(err.details.as_deref(), Some("no such deployment"));
    }

    #[tokio::test]
    async fn test_text_error_body() {
        let mock = MockTransport::new().text(502, "<html>Bad Gateway</html>");
        let err = client(mock).get("./info").await.unwrap_err();
        let err = err.as_client_error().unwrap();
        assert_eq!(err.kind, ErrorKind::Generic);
        assert_eq!(err.message, "n/a");
    }

    #[tokio::test]
    async fn test_rate_limit_retry_after() {
        let mock = MockTransport::new().with_response(
            ResponseEnvelope::new(
                429,
                [("Retry-After".to_string(), "12".to_string())].into(),
                "",
            ),
        );
        let err = client(mock).get("./deployments").await.unwrap_err();
        assert_eq!(err.as_client_error().unwrap().retry_after, Some(12));
    }

    #[tokio::test]
    async fn test_missing_auth_fails_before_sending() {
        let client = OrchestratorClient::builder(BASE)
            .build_with_transport(MockTransport::new())
            .unwrap();

        let err = client.get("./deployments").await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotConfigured)));
        assert!(client.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_request() {
        let mock = MockTransport::new().json(200, json!({"buildNumber": "1"}));
        let client = OrchestratorClient::builder(BASE)
            .build_with_transport(mock)
            .unwrap();

        let descriptor = client.request("get", "./info").unauthenticated();
        client.execute(descriptor).await.unwrap();
        assert!(client.transport.requests()[0].header("Authorization").is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let client = client(MockTransport::new());
        let err = client.execute(client.request("TRACE", "x")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUsage { .. }));
    }

    #[tokio::test]
    async fn test_pagination() {
        let mock = MockTransport::new()
            .json(200, page("p0", "https://o.example/orchestrator/deployments?page=1", "p2", json!([1, 2])))
            .json(200, page("p1", "https://o.example/orchestrator/deployments?page=2", "p2", json!([3])))
            .json(200, json!({"content": [4], "links": [{"rel": "self", "href": "p2"}, {"rel": "last", "href": "p2"}]}));
        let client = client(mock);

        let response = client.get("./deployments").await.unwrap();
        assert_eq!(response.content, Content::Json(json!([1, 2, 3, 4])));
        assert_eq!(response.pages, 3);

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].url.query(), Some("page=2"));
        // every page carries the same headers
        assert_eq!(requests[2].headers, requests[0].headers);
    }

    #[tokio::test]
    async fn test_single_page_not_followed() {
        let mock = MockTransport::new().json(200, page("p0", "p1", "p0", json!([1])));
        let client = client(mock);
        let response = client.get("./deployments").await.unwrap();
        assert_eq!(response.content.into_items(), vec![json!(1)]);
        assert_eq!(client.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_error_on_later_page() {
        let mock = MockTransport::new()
            .json(200, page("p0", "p1", "p2", json!([1])))
            .json(403, json!({"title": "Forbidden"}));
        let err = client(mock).get("./deployments").await.unwrap_err();
        let err = err.as_client_error().unwrap();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert_eq!(err.url, "https://o.example/orchestrator/p1");
    }

    #[tokio::test]
    async fn test_page_ceiling() {
        let mock = MockTransport::new()
            .json(200, page("p0", "p1", "p9", json!([])))
            .json(200, page("p1", "p2", "p9", json!([])));
        let client = OrchestratorClient::builder(BASE)
            .token("tok")
            .max_pages(Some(2))
            .build_with_transport(mock)
            .unwrap();

        let err = client.get("./deployments").await.unwrap_err();
        assert!(matches!(err, Error::Pagination { pages: 2, .. }));
    }

    #[tokio::test]
    async fn test_auth_warnings_exposed() {
        let client = OrchestratorClient::builder(BASE)
            .token("tok")
            .oidc_agent(OidcAgent::new("acc").with_socket_path("/nonexistent"))
            .build_with_transport(MockTransport::new())
            .unwrap();
        assert_eq!(client.auth_warnings().len(), 1);
        assert!(matches!(client.token(), Err(Error::Auth(AuthError::AgentUnavailable(_)))));
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new(BASE);
        assert!(config.verify_tls);
        assert!(!config.debug);
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_pages, Some(DEFAULT_MAX_PAGES));
        assert_eq!(config.bearer_style, BearerStyle::Standard);
    }

    #[test]
    fn test_builder_debug_hides_token() {
        let builder = OrchestratorClient::builder(BASE).token("s3cr3t-access");
        assert!(!format!("{:?}", builder).contains("s3cr3t-access"));
    }
}
