//! Configuration management for Figport.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Figport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FIGPORT_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level, dry run)
//! - [`FigmaConfig`] - Figma API connection and flow control
//! - [`ExportConfig`] - Output root, tracking, batching and parallelism
//! - [`PlatformConfig`] - Output platforms, each compiled into a pipeline
//! - [`AssetConfig`] - Nodes to export
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [figma]
//! access_token = "${FIGMA_ACCESS_TOKEN}"
//!
//! [figma.flow_control]
//! concurrency_limit = 5
//! retry_limit = 5
//!
//! [export]
//! output_directory = "./assets"
//!
//! [[platforms]]
//! name = "ios"
//! format = "pdf"
//!
//! [[assets]]
//! file_key = "FpKcPBk2q3wDhYzTfwBDq1"
//! node_id = "12:345"
//! name = "logo"
//! path = ["brand"]
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use figport::config::load_config;
//!
//! # fn example() {
//! match load_config("figport.toml") {
//!     Ok(config) => println!("Configuration valid"),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, AssetConfig, ExportConfig, FigmaConfig, FigportConfig, LoggingConfig,
    PlatformConfig, VariantConfig,
};
pub use secret::AccessToken;
