//! Resources belonging to a deployment

use super::Resource;
use crate::http::client::OrchestratorClient;
use crate::http::transport::Transport;
use crate::Result;

/// Manage the resources of Orchestrator deployments
pub struct Resources<'a, T: Transport> {
    client: &'a OrchestratorClient<T>,
}

impl<'a, T: Transport> Resources<'a, T> {
    pub(crate) fn new(client: &'a OrchestratorClient<T>) -> Self {
        Self { client }
    }

    /// List the resources of a deployment
    pub async fn list(&self, deployment_uuid: &str) -> Result<Vec<Resource>> {
        let response = self
            .client
            .get(&format!("./deployments/{}/resources/", deployment_uuid))
            .await?;
        response
            .content
            .into_items()
            .into_iter()
            .map(Resource::from_json)
            .collect()
    }

    /// Details of one resource
    pub async fn show(&self, deployment_uuid: &str, resource_uuid: &str) -> Result<Resource> {
        let response = self
            .client
            .get(&format!(
                "./deployments/{}/resources/{}",
                deployment_uuid, resource_uuid
            ))
            .await?;
        match response.content.into_json() {
            Some(document) => Resource::from_json(document),
            None => Err(crate::Error::invalid_usage(format!(
                "Resource {} did not return a JSON document",
                resource_uuid
            ))),
        }
    }
}
