//! Figma REST API integration
//!
//! - [`FigmaApi`] - the API surface, implemented by every client
//! - [`FigmaHttpClient`] - reqwest-based implementation
//! - [`FlowControlledClient`] - concurrency gate and rate-limit backoff around any client
//!
//! ```rust,no_run
//! use figport::adapters::figma::{FigmaHttpClient, FlowControlledClient};
//! use figport::config::FigmaConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FigmaConfig::default();
//! let http = FigmaHttpClient::new(&config)?;
//! let client = FlowControlledClient::new(http, config.flow_control.clone())?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod flow_control;
pub mod models;

pub use api::{ApiResponse, FigmaApi};
pub use client::FigmaHttpClient;
pub use flow_control::{FlowControlConfig, FlowControlledClient};
pub use models::{GetFileResponse, GetImagesResponse, GetLocalVariablesResponse};
