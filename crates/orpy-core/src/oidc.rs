//! OpenID Connect token sources
//!
//! [`OidcAgent`] talks to a running oidc-agent over its UNIX socket and
//! [`OidcSession`] reads the token held by an externally managed session.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::http::auth::{AuthError, CredentialKind, TokenSource};
use crate::{Error, Result};

/// Environment variable holding the oidc-agent socket path
pub const OIDC_SOCK_ENV: &str = "OIDC_SOCK";

const ACCESS_TOKEN: &str = "access_token";

/// Default limit on each socket read and write
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request sent to the agent
#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    request: &'static str,
    account: &'a str,
    min_valid_period: u64,
    application_hint: &'static str,
}

/// Client for the oidc-agent daemon
#[derive(Debug, Clone)]
pub struct OidcAgent {
    account: String,
    socket_path: Option<PathBuf>,
    /// Minimum validity, in minutes, that the returned token must have
    min_valid_period: u64,
    timeout: Duration,
}

impl OidcAgent {
    /// Agent for `account`, socket taken from `OIDC_SOCK`
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            socket_path: std::env::var_os(OIDC_SOCK_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            min_valid_period: 60,
            timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    /// Use an explicit socket path
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    /// Minimum validity of the token in minutes
    pub fn with_min_valid_period(mut self, minutes: u64) -> Self {
        self.min_valid_period = minutes;
        self
    }

    /// Give up on an agent that does not answer within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Account name
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Socket path, if known
    pub fn socket_path(&self) -> Option<&Path> {
        self.socket_path.as_deref()
    }

    fn request_body(&self) -> std::result::Result<Vec<u8>, AuthError> {
        serde_json::to_vec(&AgentRequest {
            request: "access_token",
            account: &self.account,
            min_valid_period: self.min_valid_period,
            application_hint: "orpy",
        })
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    #[cfg(unix)]
    fn exchange(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        use std::io::{Read, Write};
        use std::net::Shutdown;
        use std::os::unix::net::UnixStream;

        let body = self
            .request_body()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        // a zero duration is rejected by the socket options
        let timeout = Some(self.timeout).filter(|t| !t.is_zero());

        let mut stream = UnixStream::connect(path)?;
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        stream.write_all(&body)?;
        // the agent answers once the request is complete
        stream.shutdown(Shutdown::Write)?;

        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        Ok(data)
    }

    #[cfg(not(unix))]
    fn exchange(&self, _path: &Path) -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "oidc-agent sockets are only available on unix platforms",
        ))
    }
}

/// Interpret an agent reply
fn parse_agent_reply(data: &[u8]) -> std::result::Result<String, AuthError> {
    let reply: Value =
        serde_json::from_slice(data).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    if reply.get("status").and_then(Value::as_str) == Some("failure") {
        let error = reply
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AuthError::Agent(error.to_string()));
    }

    reply
        .get(ACCESS_TOKEN)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AuthError::MissingToken("oidc-agent reply".to_string()))
}

impl TokenSource for OidcAgent {
    fn token(&self) -> std::result::Result<String, AuthError> {
        let path = self
            .socket_path
            .as_deref()
            .ok_or_else(|| AuthError::AgentUnavailable(format!("{} is not set", OIDC_SOCK_ENV)))?;

        debug!(account = %self.account, socket = %path.display(), "Requesting token from oidc-agent");

        let data = self
            .exchange(path)
            .map_err(|e| AuthError::AgentUnavailable(e.to_string()))?;
        parse_agent_reply(&data)
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::Agent
    }
}

/// A session object holding an OAuth2 token document
pub trait TokenSession: Send + Sync {
    /// Current token document (must contain `access_token`)
    fn token_document(&self) -> Option<Map<String, Value>>;
}

/// Token source backed by a [`TokenSession`]
#[derive(Clone)]
pub struct OidcSession {
    session: Arc<dyn TokenSession>,
}

impl OidcSession {
    /// Wrap a session; fails if it does not currently hold a token document
    pub fn new(session: Arc<dyn TokenSession>) -> Result<Self> {
        if session.token_document().is_none() {
            return Err(Error::invalid_usage("Session object is not valid"));
        }
        Ok(Self { session })
    }
}

impl fmt::Debug for OidcSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcSession").finish_non_exhaustive()
    }
}

impl TokenSource for OidcSession {
    fn token(&self) -> std::result::Result<String, AuthError> {
        let document = self
            .session
            .token_document()
            .ok_or_else(|| AuthError::MissingToken("session holds no token".to_string()))?;

        document
            .get(ACCESS_TOKEN)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuthError::MissingToken("session token document".to_string()))
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::Session
    }
}
