//! Orchestrator information and configuration
//!
//! Both endpoints are queried without credentials and double as a check that
//! the configured URL points to an Orchestrator: any error response is
//! reported as [`Error::InvalidUrl`].

use serde_json::Value;

use super::{OrchestratorConfiguration, OrchestratorInfo, ResourceKind, ResourceObject};
use crate::http::builder::RequestDescriptor;
use crate::http::client::OrchestratorClient;
use crate::http::transport::Transport;
use crate::{Error, Result};

/// Fetch `path` unauthenticated and tag the document with the base URL
async fn fetch<K: ResourceKind, T: Transport>(
    client: &OrchestratorClient<T>,
    path: &str,
) -> Result<ResourceObject<K>> {
    let invalid = || Error::InvalidUrl {
        url: client.base_url().to_string(),
    };

    let response = match client
        .execute(RequestDescriptor::new("GET", path).unauthenticated())
        .await
    {
        Ok(response) => response,
        Err(Error::Client(_)) => return Err(invalid()),
        Err(other) => return Err(other),
    };

    if response.envelope.status != 200 {
        return Err(invalid());
    }

    match response.content.into_json() {
        Some(Value::Object(map)) => {
            let mut object = ResourceObject::from_map(map);
            object.insert("url", Value::String(client.base_url().to_string()));
            Ok(object)
        }
        _ => Err(invalid()),
    }
}

/// Information about the Orchestrator
pub struct Info<'a, T: Transport> {
    client: &'a OrchestratorClient<T>,
}

impl<'a, T: Transport> Info<'a, T> {
    pub(crate) fn new(client: &'a OrchestratorClient<T>) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<OrchestratorInfo> {
        fetch(self.client, "./info").await
    }
}

/// Endpoints configured on the Orchestrator
pub struct Config<'a, T: Transport> {
    client: &'a OrchestratorClient<T>,
}

impl<'a, T: Transport> Config<'a, T> {
    pub(crate) fn new(client: &'a OrchestratorClient<T>) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<OrchestratorConfiguration> {
        fetch(self.client, "./configuration").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;
    use serde_json::json;

    fn public_client(mock: MockTransport) -> OrchestratorClient<MockTransport> {
        // no credentials: both endpoints are public
        OrchestratorClient::builder("https://o.example/orchestrator")
            .build_with_transport(mock)
            .unwrap()
    }

    #[tokio::test]
    async fn test_info_gains_url() {
        let client = public_client(MockTransport::new().json(200, json!({"buildNumber": "v2.5.0"})));
        let info = client.info().get().await.unwrap();
        assert_eq!(info.get_str("url").as_deref(), Some("https://o.example/orchestrator/"));
        assert_eq!(info.get_str("buildNumber").as_deref(), Some("v2.5.0"));
        assert!(client.transport_requests()[0].header("Authorization").is_none());
    }

    #[tokio::test]
    async fn test_configuration() {
        let client = public_client(MockTransport::new().json(
            200,
            json!({"cpr_url": "https://cpr/", "slam_url": "https://slam/"}),
        ));
        let config = client.configuration().get().await.unwrap();
        assert_eq!(config.get_str("cpr_url").as_deref(), Some("https://cpr/"));
        assert_eq!(client.transport_requests()[0].url.path(), "/orchestrator/configuration");
    }

    #[tokio::test]
    async fn test_errors_become_invalid_url() {
        let client = public_client(MockTransport::new().json(404, json!({"message": "nope"})));
        match client.info().get().await {
            Err(Error::InvalidUrl { url }) => assert_eq!(url, "https://o.example/orchestrator/"),
            other => panic!("unexpected: {:?}", other),
        }

        let client = public_client(MockTransport::new().json(204, json!({})));
        assert!(matches!(client.configuration().get().await, Err(Error::InvalidUrl { .. })));

        let client = public_client(MockTransport::new().text(200, "<html>not an orchestrator</html>"));
        assert!(matches!(client.info().get().await, Err(Error::InvalidUrl { .. })));
    }
}
