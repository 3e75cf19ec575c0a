//! Deployment command handlers

use crate::cli::{DeploymentAction, DeploymentArgs, DeploymentSpecArgs};
use crate::error::{Error, Result};
use crate::output::{OutputWriter, DEPLOYMENT_COLUMNS};
use orpy_core::{DeploymentRequest, OrchestratorClient};
use serde_json::{Map, Value};
use std::fs;
use tracing::info;

/// Handle the deployment command
pub async fn handle_deployment(
    args: DeploymentArgs,
    client: &OrchestratorClient,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        DeploymentAction::List => {
            let spinner = output.spinner("Listing deployments...");
            let deployments = client.deployments().list().await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            let items: Vec<Value> = deployments?.iter().map(|d| d.to_json()).collect();
            info!(count = items.len(), "Listed deployments");
            output.list(DEPLOYMENT_COLUMNS, &items)
        }
        DeploymentAction::Show { uuid } => {
            let deployment = client.deployments().show(&uuid).await?;
            output.show(&deployment.to_json())
        }
        DeploymentAction::Template { uuid } => {
            let template = client.deployments().template(&uuid).await?;
            output.text(&template.get_str("template").unwrap_or_default())
        }
        DeploymentAction::Create(spec) => {
            let request = build_request(&spec)?;
            let spinner = output.spinner("Creating deployment...");
            let deployment = client.deployments().create(&request).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            let deployment = deployment?;
            info!(uuid = ?deployment.uuid, "Deployment created");
            output.show(&deployment.to_json())
        }
        DeploymentAction::Update { uuid, spec } => {
            let request = build_request(&spec)?;
            let deployment = client.deployments().update(&uuid, &request).await?;
            info!(uuid = %uuid, "Deployment updated");
            output.show(&deployment.to_json())
        }
        DeploymentAction::Delete { uuid } => {
            client.deployments().delete(&uuid).await?;
            info!(uuid = %uuid, "Deployment deleted");
            output.success(&format!("Deployment {} deleted", uuid))
        }
    }
}

/// Read the template and collect the parameters of a create or update request
fn build_request(spec: &DeploymentSpecArgs) -> Result<DeploymentRequest> {
    if !spec.template.exists() {
        return Err(Error::FileNotFound {
            path: spec.template.clone(),
        });
    }
    let template = fs::read_to_string(&spec.template)?;

    let mut request = DeploymentRequest::new(template)
        .parameters(collect_parameters(spec.parameters.as_deref(), &spec.parameter)?)
        .keep_last_attempt(!spec.no_keep_last_attempt);
    if let Some(callback) = &spec.callback {
        request = request.callback_url(callback.clone());
    }
    if let Some(retries) = spec.max_providers_retry {
        request = request.max_providers_retry(retries);
    }

    Ok(request)
}

/// Merge `--parameters` with the individual `--parameter` pairs; pairs win
fn collect_parameters(json: Option<&str>, pairs: &[String]) -> Result<Map<String, Value>> {
    let mut parameters = match json {
        None => Map::new(),
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => map,
            _ => return Err(Error::usage("--parameters must be a JSON object")),
        },
    };

    for pair in pairs {
        let (name, raw) = pair
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| {
                Error::usage(format!("invalid parameter '{}', expected KEY=VALUE", pair))
            })?;
        // bare words stay strings
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        parameters.insert(name.to_string(), value);
    }

    Ok(parameters)
}
