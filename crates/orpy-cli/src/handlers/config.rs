//! Orchestrator configuration and endpoint test handlers

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use orpy_core::OrchestratorClient;

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    client: &OrchestratorClient,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let configuration = client.configuration().get().await?;
            output.show(&configuration.to_json())
        }
    }
}

/// Handle the test command
pub async fn handle_test(client: &OrchestratorClient, output: &mut OutputWriter) -> Result<()> {
    let info = client.info().get().await?;
    output.show(&info.to_json())
}
