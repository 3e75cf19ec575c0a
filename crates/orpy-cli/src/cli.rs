//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

const AUTH_HELP: &str = "\
Authentication:

  Requests to the Orchestrator need an OpenID Connect access token from a
  provider trusted by the Orchestrator. Either store the token in
  ORCHESTRATOR_TOKEN, or point orpy to a running oidc-agent:

      export ORCHESTRATOR_TOKEN=<access token>
          OR
      export OIDC_SOCK=<path to the oidc-agent socket>
      export OIDC_ACCOUNT=<account to use>

  OIDC_SOCK is usually exported by oidc-agent itself. The socket and account
  can also be given with --oidc-agent-sock and --oidc-agent-account. When both
  are configured the oidc-agent is used.";

/// Orpy - command line client for the INDIGO PaaS Orchestrator
///
/// Manage deployments and inspect their resources on an Orchestrator.
#[derive(Parser, Debug)]
#[command(
    name = "orpy",
    version,
    author,
    about,
    long_about = None,
    after_long_help = AUTH_HELP,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Base URL of the Orchestrator REST interface
    #[arg(long, global = true, env = "ORCHESTRATOR_URL", value_name = "ORCHESTRATOR_URL")]
    pub url: Option<String>,

    /// OpenID Connect access token
    #[arg(long, global = true, env = "ORCHESTRATOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path of the oidc-agent socket
    #[arg(long, global = true, env = "OIDC_SOCK", value_name = "SOCKET")]
    pub oidc_agent_sock: Option<PathBuf>,

    /// oidc-agent account used to obtain tokens
    #[arg(long, global = true, env = "OIDC_ACCOUNT", value_name = "ACCOUNT")]
    pub oidc_agent_account: Option<String>,

    /// Log HTTP requests and responses (credentials are redacted)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Do not verify the Orchestrator TLS certificate
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ORPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage deployments
    Deployment(DeploymentArgs),

    /// Inspect the resources of a deployment
    Resource(ResourceArgs),

    /// Show the endpoints configured on the Orchestrator
    Config(ConfigArgs),

    /// Check that the URL points to an Orchestrator
    Test,

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

impl Commands {
    /// Whether the command sends authenticated requests
    pub fn requires_auth(&self) -> bool {
        matches!(self, Commands::Deployment(_) | Commands::Resource(_))
    }
}

/// Arguments for the deployment command
#[derive(Args, Debug)]
pub struct DeploymentArgs {
    #[command(subcommand)]
    pub action: DeploymentAction,
}

/// Deployment actions
#[derive(Subcommand, Debug)]
pub enum DeploymentAction {
    /// List existing deployments
    List,

    /// Show details about a deployment
    Show {
        /// Deployment UUID
        uuid: String,
    },

    /// Show the TOSCA template of a deployment
    Template {
        /// Deployment UUID
        uuid: String,
    },

    /// Create a deployment from a TOSCA template
    Create(DeploymentSpecArgs),

    /// Update a deployment with a new TOSCA template
    Update {
        /// Deployment UUID
        uuid: String,

        #[command(flatten)]
        spec: DeploymentSpecArgs,
    },

    /// Delete a deployment
    Delete {
        /// Deployment UUID
        uuid: String,
    },
}

/// Template and options of a create or update request
#[derive(Args, Debug)]
pub struct DeploymentSpecArgs {
    /// Path of the TOSCA template
    #[arg(long, value_name = "FILE")]
    pub template: PathBuf,

    /// Input parameters as a JSON object
    #[arg(long, value_name = "JSON")]
    pub parameters: Option<String>,

    /// A single input parameter (repeatable); values are parsed as JSON when possible
    #[arg(long = "parameter", value_name = "KEY=VALUE")]
    pub parameter: Vec<String>,

    /// URL the Orchestrator calls when the deployment finishes
    #[arg(long, value_name = "URL")]
    pub callback: Option<String>,

    /// Maximum number of cloud providers to try
    #[arg(long, value_name = "N")]
    pub max_providers_retry: Option<u32>,

    /// Release the allocated resources if the deployment fails
    #[arg(long)]
    pub no_keep_last_attempt: bool,
}

/// Arguments for the resource command
#[derive(Args, Debug)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub action: ResourceAction,
}

/// Resource actions
#[derive(Subcommand, Debug)]
pub enum ResourceAction {
    /// List the resources of a deployment
    List {
        /// Deployment UUID
        deployment_uuid: String,
    },

    /// Show details about a resource
    Show {
        /// Deployment UUID
        deployment_uuid: String,

        /// Resource UUID
        resource_uuid: String,
    },
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Orchestrator configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the endpoints the Orchestrator is using
    Show,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
