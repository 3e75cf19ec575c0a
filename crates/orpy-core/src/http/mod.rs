//! HTTP pipeline for the Orchestrator REST API
//!
//! This module provides:
//! - Request construction against the Orchestrator base URL
//! - Token sources and credential selection
//! - Error classification of REST error responses
//! - Pagination over `links`-style list responses
//! - Redacted debug logging of requests and responses

pub mod auth;
pub mod builder;
pub mod client;
pub mod debug;
pub mod error;
pub mod pagination;
pub mod redact;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use auth::{AuthError, AuthWarning, BearerStyle, CredentialKind, Credentials, StaticToken, TokenSource};
pub use builder::{RequestBuilder, RequestDescriptor};
pub use client::{ApiResponse, ClientConfig, Content, OrchestratorClient, OrchestratorClientBuilder};
pub use debug::DebugLogger;
pub use error::{ClientError, ErrorKind};
pub use pagination::{PageLinks, PaginationFollower};
pub use redact::{redact, DigestAlgorithm, Redactor};
pub use transport::{HttpRequest, ReqwestTransport, ResponseEnvelope, Transport};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
