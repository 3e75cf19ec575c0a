//! Shared utilities for command handlers

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Error, Result};
use orpy_core::{BearerStyle, OidcAgent, OrchestratorClient};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const MISSING_URL: &str = "No URL for the orchestrator has been supplied, use --url or set the \
    ORCHESTRATOR_URL environment variable.";

const MISSING_AUTH: &str = "No oidc-agent has been set up or no access token has been provided, \
    please set the ORCHESTRATOR_TOKEN environment variable or set up an oidc-agent \
    (see 'orpy --help' for more details on how to set up authentication)";

/// Connection settings after merging the command line with the config file
#[derive(Clone, Default, PartialEq)]
pub struct ConnectionOptions {
    pub url: Option<String>,
    pub token: Option<String>,
    pub oidc_agent_sock: Option<PathBuf>,
    pub oidc_agent_account: Option<String>,
    pub debug: bool,
    pub verify_tls: bool,
    pub timeout: Option<Duration>,
    /// `None` keeps the library default, `Some(None)` disables the limit
    pub max_pages: Option<Option<usize>>,
    pub bearer_style: BearerStyle,
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("oidc_agent_sock", &self.oidc_agent_sock)
            .field("oidc_agent_account", &self.oidc_agent_account)
            .field("debug", &self.debug)
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .field("max_pages", &self.max_pages)
            .field("bearer_style", &self.bearer_style)
            .finish()
    }
}

impl ConnectionOptions {
    /// Command-line values win; the config file fills the gaps
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            url: non_empty(cli.url.clone()).or_else(|| non_empty(config.url.clone())),
            token: non_empty(cli.token.clone()),
            oidc_agent_sock: cli
                .oidc_agent_sock
                .clone()
                .or_else(|| config.oidc_agent_sock.clone()),
            oidc_agent_account: non_empty(cli.oidc_agent_account.clone())
                .or_else(|| non_empty(config.oidc_agent_account.clone())),
            debug: cli.debug,
            verify_tls: !cli.insecure && config.verify_tls,
            timeout: config.timeout_secs.map(Duration::from_secs),
            max_pages: config.page_limit(),
            bearer_style: if config.legacy_bearer {
                BearerStyle::Concatenated
            } else {
                BearerStyle::Standard
            },
        }
    }

    /// An oidc-agent needs both the socket and the account
    fn agent(&self) -> Option<OidcAgent> {
        match (&self.oidc_agent_sock, &self.oidc_agent_account) {
            (Some(sock), Some(account)) => {
                Some(OidcAgent::new(account.clone()).with_socket_path(sock.clone()))
            }
            _ => None,
        }
    }

    /// Check the options are enough to run a command
    pub fn validate(&self, requires_auth: bool) -> Result<&str> {
        let url = self.url.as_deref().ok_or_else(|| Error::usage(MISSING_URL))?;

        if requires_auth && self.agent().is_none() && self.token.is_none() {
            return Err(Error::usage(MISSING_AUTH));
        }

        Ok(url)
    }

    /// Build the Orchestrator client
    pub fn build_client(&self, requires_auth: bool) -> Result<OrchestratorClient> {
        let url = self.validate(requires_auth)?;

        let mut builder = OrchestratorClient::builder(url)
            .debug(self.debug)
            .verify_tls(self.verify_tls)
            .bearer_style(self.bearer_style);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(max_pages) = self.max_pages {
            builder = builder.max_pages(max_pages);
        }
        if let Some(agent) = self.agent() {
            debug!(account = agent.account(), "Using oidc-agent");
            builder = builder.oidc_agent(agent);
        }
        if let Some(token) = &self.token {
            builder = builder.token(token.clone());
        }

        Ok(builder.build()?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
