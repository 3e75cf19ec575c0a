//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod config;
mod deployments;
mod resources;
mod utils;

pub use completions::handle_completions;
pub use config::{handle_config, handle_test};
pub use deployments::handle_deployment;
pub use resources::handle_resource;
pub use utils::ConnectionOptions;
