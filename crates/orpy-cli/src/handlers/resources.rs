//! Resource command handlers

use crate::cli::{ResourceAction, ResourceArgs};
use crate::error::Result;
use crate::output::{OutputWriter, RESOURCE_COLUMNS};
use orpy_core::OrchestratorClient;
use serde_json::Value;

/// Handle the resource command
pub async fn handle_resource(
    args: ResourceArgs,
    client: &OrchestratorClient,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ResourceAction::List { deployment_uuid } => {
            let spinner = output.spinner("Listing resources...");
            let resources = client.resources().list(&deployment_uuid).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            let items: Vec<Value> = resources?.iter().map(|r| r.to_json()).collect();
            output.list(RESOURCE_COLUMNS, &items)
        }
        ResourceAction::Show {
            deployment_uuid,
            resource_uuid,
        } => {
            let resource = client
                .resources()
                .show(&deployment_uuid, &resource_uuid)
                .await?;
            output.show(&resource.to_json())
        }
    }
}
