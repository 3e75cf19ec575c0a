//! Deployment management

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Deployment, ToscaTemplate};
use crate::http::client::{Content, OrchestratorClient};
use crate::http::transport::Transport;
use crate::Result;

/// Body of a deployment create or update request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentRequest {
    pub template: String,
    /// Keep the allocated resources when the deployment fails
    #[serde(rename = "keepLastAttemp")]
    pub keep_last_attempt: bool,
    pub parameters: Map<String, Value>,
    #[serde(rename = "callback", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(rename = "maxProvidersRetry", skip_serializing_if = "Option::is_none")]
    pub max_providers_retry: Option<u32>,
}

impl DeploymentRequest {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            keep_last_attempt: true,
            parameters: Map::new(),
            callback_url: None,
            max_providers_retry: None,
        }
    }

    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Zero means "server default" and is not sent
    pub fn max_providers_retry(mut self, retries: u32) -> Self {
        self.max_providers_retry = (retries > 0).then_some(retries);
        self
    }

    pub fn keep_last_attempt(mut self, keep: bool) -> Self {
        self.keep_last_attempt = keep;
        self
    }
}

/// Manage Orchestrator deployments
pub struct Deployments<'a, T: Transport> {
    client: &'a OrchestratorClient<T>,
}

impl<'a, T: Transport> Deployments<'a, T> {
    pub(crate) fn new(client: &'a OrchestratorClient<T>) -> Self {
        Self { client }
    }

    /// List existing deployments, following every page
    pub async fn list(&self) -> Result<Vec<Deployment>> {
        let response = self.client.get("./deployments").await?;
        response
            .content
            .into_items()
            .into_iter()
            .map(Deployment::from_json)
            .collect()
    }

    /// Details of one deployment
    pub async fn show(&self, uuid: &str) -> Result<Deployment> {
        let response = self.client.get(&format!("./deployments/{}", uuid)).await?;
        into_deployment(response.content)
    }

    /// The TOSCA template a deployment was created from
    pub async fn template(&self, uuid: &str) -> Result<ToscaTemplate> {
        let response = self
            .client
            .get(&format!("./deployments/{}/template/", uuid))
            .await?;

        let mut template = ToscaTemplate::from_map(Map::new());
        template.uuid = Some(uuid.to_string());
        let text = match response.content {
            Content::Text(text) => text,
            // a JSON body is a quoted template
            Content::Json(Value::String(text)) => text,
            Content::Json(other) => other.to_string(),
        };
        template.insert("template", Value::String(text));
        Ok(template)
    }

    /// Create a deployment
    pub async fn create(&self, request: &DeploymentRequest) -> Result<Deployment> {
        let response = self.client.post("./deployments/", request).await?;
        into_deployment(response.content)
    }

    /// Update a deployment
    pub async fn update(&self, uuid: &str, request: &DeploymentRequest) -> Result<Deployment> {
        let response = self
            .client
            .put(&format!("./deployments/{}", uuid), request)
            .await?;
        into_deployment(response.content)
    }

    /// Delete a deployment
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        self.client.delete(&format!("./deployments/{}", uuid)).await?;
        Ok(())
    }
}

/// Responses with no JSON body (e.g. 201 with an empty body) yield an empty deployment
fn into_deployment(content: Content) -> Result<Deployment> {
    match content {
        Content::Json(document) => Deployment::from_json(document),
        Content::Text(_) => Ok(Deployment::from_map(Map::new())),
    }
}
