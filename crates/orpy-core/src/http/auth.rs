//! Authentication handling for Orchestrator requests
//!
//! Supports three ways of obtaining an OpenID Connect access token:
//! - an oidc-agent daemon reachable through a UNIX socket
//! - a session object that already holds a token document
//! - a static access token
//!
//! Only one source is used for a client. When more than one is configured the
//! selection follows a fixed precedence (agent, then session, then static
//! token) and a warning is reported.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::oidc::{OidcAgent, OidcSession};

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication is not configured: pass an oidc-agent, an oidc session or an access token")]
    NotConfigured,

    #[error("Cannot communicate with the oidc-agent: {0}")]
    AgentUnavailable(String),

    #[error("oidc-agent returned a failure: {0}")]
    Agent(String),

    #[error("Token document does not contain an access token ({0})")]
    MissingToken(String),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

/// Capability producing a bearer token on demand
pub trait TokenSource: Send + Sync {
    /// Produce an access token
    fn token(&self) -> Result<String, AuthError>;

    /// Short name used in diagnostics
    fn kind(&self) -> CredentialKind;
}

/// A fixed access token, e.g. from `ORCHESTRATOR_TOKEN`
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Wrap an access token
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticToken").field("token", &"***").finish()
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::Token
    }
}

/// The kinds of token sources, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CredentialKind {
    /// oidc-agent socket
    Agent,
    /// Session-held token document
    Session,
    /// Static access token
    Token,
}

impl CredentialKind {
    /// Precedence used when several sources are configured
    pub const PRECEDENCE: [CredentialKind; 3] = [
        CredentialKind::Agent,
        CredentialKind::Session,
        CredentialKind::Token,
    ];
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Agent => write!(f, "oidc-agent"),
            CredentialKind::Session => write!(f, "oidc-session"),
            CredentialKind::Token => write!(f, "access token"),
        }
    }
}

/// Diagnostic produced while validating the credential configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthWarning {
    /// More than one source was configured; only `selected` is used
    MultipleSources {
        configured: Vec<CredentialKind>,
        selected: CredentialKind,
    },
}

impl fmt::Display for AuthWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthWarning::MultipleSources { configured, selected } => {
                let names: Vec<String> = configured.iter().map(|k| k.to_string()).collect();
                write!(
                    f,
                    "more than one authentication method configured ({}); only the {} will be used",
                    names.join(", "),
                    selected
                )
            }
        }
    }
}

/// How the `Authorization` header is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BearerStyle {
    /// `Bearer <token>`
    #[default]
    Standard,
    /// `Bearer<token>`, as written by early orpy releases
    Concatenated,
}

impl BearerStyle {
    /// Render the header value for `token`
    pub fn header_value(&self, token: &str) -> String {
        match self {
            BearerStyle::Standard => format!("Bearer {}", token),
            BearerStyle::Concatenated => format!("Bearer{}", token),
        }
    }
}

/// Credential configuration before validation
#[derive(Default, Clone)]
pub struct Credentials {
    agent: Option<OidcAgent>,
    session: Option<OidcSession>,
    token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("agent", &self.agent)
            .field("session", &self.session)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Outcome of [`Credentials::resolve`]
pub struct ResolvedCredentials {
    /// Selected token source, `None` when nothing was configured
    pub source: Option<Arc<dyn TokenSource>>,
    /// Diagnostics about the configuration
    pub warnings: Vec<AuthWarning>,
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("source", &self.source.as_ref().map(|s| s.kind()))
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl Credentials {
    /// No credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an oidc-agent
    pub fn with_agent(mut self, agent: OidcAgent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Use a session-held token
    pub fn with_session(mut self, session: OidcSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Use a static access token; empty strings are ignored
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Kinds configured, in precedence order
    pub fn configured(&self) -> Vec<CredentialKind> {
        CredentialKind::PRECEDENCE
            .into_iter()
            .filter(|kind| match kind {
                CredentialKind::Agent => self.agent.is_some(),
                CredentialKind::Session => self.session.is_some(),
                CredentialKind::Token => self.token.is_some(),
            })
            .collect()
    }

    /// Whether any source is configured
    pub fn is_configured(&self) -> bool {
        self.agent.is_some() || self.session.is_some() || self.token.is_some()
    }

    /// Select the token source to use.
    ///
    /// The first configured kind in [`CredentialKind::PRECEDENCE`] wins. The
    /// remaining sources are ignored, even if the selected one later fails.
    pub fn resolve(self) -> ResolvedCredentials {
        let configured = self.configured();
        let mut warnings = Vec::new();

        let source: Option<Arc<dyn TokenSource>> = if let Some(agent) = self.agent {
            Some(Arc::new(agent))
        } else if let Some(session) = self.session {
            Some(Arc::new(session))
        } else {
            self.token.map(|t| Arc::new(StaticToken::new(t)) as Arc<dyn TokenSource>)
        };

        if configured.len() > 1 {
            if let Some(selected) = source.as_ref().map(|s| s.kind()) {
                warnings.push(AuthWarning::MultipleSources { configured, selected });
            }
        }

        ResolvedCredentials { source, warnings }
    }
}
