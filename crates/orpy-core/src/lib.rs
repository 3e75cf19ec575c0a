//! Orpy Core - client library for the INDIGO PaaS Orchestrator REST API
//!
//! This crate authenticates requests against an Orchestrator, issues the HTTP
//! calls, follows paginated listings and maps error responses onto a typed
//! error taxonomy.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` and `anyhow`
//! - **HTTP Pipeline**: [`OrchestratorClient`] and its collaborators in [`http`]
//! - **Authentication**: oidc-agent, session and static token sources
//! - **Resources**: typed wrappers for deployments, resources and server info
//!
//! # Example
//!
//! ```no_run
//! use orpy_core::{OrchestratorClient, Result};
//!
//! async fn example() -> Result<()> {
//!     let client = OrchestratorClient::builder("https://orchestrator.example.org/orchestrator")
//!         .token("access-token")
//!         .build()?;
//!
//!     for deployment in client.deployments().list().await? {
//!         println!("{}", deployment);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod oidc;
pub mod resources;

// Re-export main types for convenience
pub use error::{Error, PaginationFailure, Result};
pub use http::{
    ApiResponse, AuthError, AuthWarning, BearerStyle, ClientConfig, ClientError, Content,
    CredentialKind, Credentials, DigestAlgorithm, ErrorKind, OrchestratorClient,
    OrchestratorClientBuilder, RequestDescriptor, ResponseEnvelope, TokenSource, Transport,
};
pub use oidc::{OidcAgent, OidcSession, TokenSession};
pub use resources::{
    Deployment, DeploymentRequest, ObjectKind, OrchestratorConfiguration, OrchestratorInfo,
    Resource, ResourceObject, ToscaTemplate,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
