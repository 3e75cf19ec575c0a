//! Orpy CLI - command-line client for the INDIGO PaaS Orchestrator
//!
//! This is the main entry point for the orpy application, providing
//! commands to manage deployments, inspect their resources and check
//! the Orchestrator endpoint.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use handlers::ConnectionOptions;
use logging::{timing::Timer, LoggingConfig};
use orpy_core::OrchestratorClient;
use output::OutputWriter;
use std::io::IsTerminal;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    let result = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => {
            if let Err(e) = init_logging(&cli, &config) {
                eprintln!("Failed to initialize logging: {}", e);
            }
            run(cli, config).await
        }
        Err(e) => Err(e),
    };

    // Handle the result
    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = match cli.output {
        Some(format) => format,
        None => config.output_format()?.unwrap_or(OutputFormat::Table),
    };
    let mut output = OutputWriter::new(format, cli.use_color(), cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    let options = ConnectionOptions::resolve(&cli, &config);
    let requires_auth = cli.command.requires_auth();

    // Handle the subcommand
    match cli.command {
        Commands::Deployment(args) => {
            let client = connect(&options, requires_auth, &mut output)?;
            handlers::handle_deployment(args, &client, &mut output).await
        }
        Commands::Resource(args) => {
            let client = connect(&options, requires_auth, &mut output)?;
            handlers::handle_resource(args, &client, &mut output).await
        }
        Commands::Config(args) => {
            let client = connect(&options, requires_auth, &mut output)?;
            handlers::handle_config(args, &client, &mut output).await
        }
        Commands::Test => {
            let client = connect(&options, requires_auth, &mut output)?;
            handlers::handle_test(&client, &mut output).await
        }
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Build the client and report credential warnings
fn connect(
    options: &ConnectionOptions,
    requires_auth: bool,
    output: &mut OutputWriter,
) -> Result<OrchestratorClient> {
    let client = options.build_client(requires_auth)?;
    for warning in client.auth_warnings() {
        output.warning(&warning.to_string())?;
    }
    Ok(client)
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_file(&config.logging, cli.verbosity_level());

    // Apply environment overrides
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
    }
    logging_config.http_debug = cli.debug;
    logging_config.ansi = !cli.no_color && std::io::stderr().is_terminal();

    logging::init_logging(logging_config)
}
