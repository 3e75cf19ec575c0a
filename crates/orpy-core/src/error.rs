//! Error types for the orpy core library
//!
//! This module defines the error handling system for the Orchestrator client,
//! using thiserror for ergonomic error definitions and anyhow for opaque
//! transport-level causes.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::http::auth::AuthError;
use crate::http::error::ClientError;

/// Main error type for orpy operations
#[derive(Error, Debug)]
pub enum Error {
    /// A token could not be produced for an authenticated request
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The Orchestrator answered with a status code >= 400
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Connectivity failure (DNS, TLS, connection reset, timeout)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The configured URL does not point to an Orchestrator
    #[error("URL provided is not a valid orchestrator ({url})")]
    InvalidUrl { url: String },

    /// The client was used in an unsupported way
    #[error("Invalid client usage: {message}")]
    InvalidUsage { message: String },

    /// The server's pagination links could not be followed safely
    #[error("Pagination aborted at {url} after {pages} page(s): {kind}")]
    Pagination {
        kind: PaginationFailure,
        url: String,
        pages: usize,
    },

    /// JSON serialization errors (request payloads)
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Why the pagination follower gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationFailure {
    /// The configured maximum number of pages was reached
    PageLimit,
    /// A `self` link repeated, the server is looping
    Cycle,
}

impl fmt::Display for PaginationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationFailure::PageLimit => write!(f, "page limit reached"),
            PaginationFailure::Cycle => write!(f, "pagination cycle detected"),
        }
    }
}

impl Error {
    /// Create an invalid usage error
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Error::InvalidUsage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// The classified HTTP error, if this is one
    pub fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Client(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport {
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_display() {
        let err = Error::InvalidUrl {
            url: "https://example.org/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "URL provided is not a valid orchestrator (https://example.org/)"
        );
    }

    #[test]
    fn test_pagination_display() {
        let err = Error::Pagination {
            kind: PaginationFailure::Cycle,
            url: "https://example.org/deployments?page=1".to_string(),
            pages: 2,
        };
        assert!(err.to_string().contains("cycle"));
        assert!(err.to_string().contains("2 page(s)"));
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: Error = AuthError::NotConfigured.into();
        assert!(matches!(err, Error::Auth(AuthError::NotConfigured)));
        assert!(err.as_client_error().is_none());
    }
}
