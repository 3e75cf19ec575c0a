//! Configuration management for the CLI
//!
//! Settings are resolved from, in order of precedence:
//! - Command-line arguments and their environment variables
//! - A configuration file (TOML, YAML or JSON)
//! - Default values

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Orchestrator endpoint
    pub url: Option<String>,

    /// oidc-agent account
    pub oidc_agent_account: Option<String>,

    /// oidc-agent socket path
    pub oidc_agent_sock: Option<PathBuf>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Maximum pages fetched per listing, 0 for no limit
    pub max_pages: Option<usize>,

    /// Send `Bearer<token>` without the separating space
    pub legacy_bearer: bool,

    /// Verify the Orchestrator TLS certificate
    pub verify_tls: bool,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (table, json, json-pretty, yaml)
    pub format: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            oidc_agent_account: None,
            oidc_agent_sock: None,
            timeout_secs: None,
            max_pages: None,
            legacy_bearer: false,
            verify_tls: true,
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file, picking the format from its extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_first(&Self::default_config_paths())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Load the first existing file in `paths`, falling back to the defaults
    fn load_first(paths: &[PathBuf]) -> Result<Self> {
        for path in paths {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".orpy.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("orpy").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".orpy.toml"));
        }

        paths
    }

    /// The configured output format, if any
    pub fn output_format(&self) -> Result<Option<OutputFormat>> {
        self.output
            .format
            .as_deref()
            .map(|format| {
                format.parse::<OutputFormat>().map_err(|_| {
                    Error::config(format!(
                        "unknown output format '{}' (expected table, json, json-pretty or yaml)",
                        format
                    ))
                })
            })
            .transpose()
    }

    /// Page ceiling for the client; `0` disables the limit
    pub fn page_limit(&self) -> Option<Option<usize>> {
        self.max_pages.map(|n| (n > 0).then_some(n))
    }
}
