//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the orpy-core library
    #[error("{0}")]
    Core(#[from] orpy_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or inconsistent arguments
    #[error("{0}")]
    Usage(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML configuration error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Usage(_) => 2,
            Self::Config(_) | Self::Toml(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::Json(_) | Self::Yaml(_) => 5,
            Self::Core(core) => match core {
                orpy_core::Error::Auth(_) => 10,
                orpy_core::Error::Client(_) => 11,
                orpy_core::Error::Transport { .. } => 12,
                orpy_core::Error::InvalidUrl { .. } => 13,
                orpy_core::Error::Pagination { .. } => 14,
                orpy_core::Error::InvalidUsage { .. } => 2,
                orpy_core::Error::Configuration { .. } => 3,
                orpy_core::Error::Json { .. } => 5,
            },
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut text = error.to_string();
    if let Error::Core(orpy_core::Error::Client(client)) = error {
        if let Some(seconds) = client.retry_after.filter(|s| *s > 0) {
            text.push_str(&format!("\nRetry after {} seconds", seconds));
        }
    }

    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), text)
    } else {
        format!("Error: {}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orpy_core::{ClientError, ErrorKind};
    use serde_json::json;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::usage("no url").exit_code(), 2);
        assert!(Error::usage("no url").should_show_help());
        assert!(!Error::config("bad").should_show_help());

        let err = Error::from(orpy_core::Error::InvalidUrl {
            url: "https://x/".to_string(),
        });
        assert_eq!(err.exit_code(), 13);
    }

    #[test]
    fn test_format_client_error() {
        let client = ClientError::classify(
            429,
            Some(&json!({"message": "slow down"})),
            "https://o.example/deployments",
            "GET",
            Some("30"),
        );
        assert_eq!(client.kind, ErrorKind::RateLimit);

        let err = Error::from(orpy_core::Error::Client(client));
        let text = format_error(&err, false);
        assert!(text.starts_with("Error: Rate limit (HTTP 429) GET https://o.example/deployments: slow down"));
        assert!(text.ends_with("Retry after 30 seconds"));
    }
}
