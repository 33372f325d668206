//! External system integrations for Figport.
//!
//! - [`figma`] - Figma REST API client, models and flow control
//! - [`download`] - fetches rendered assets from export URLs
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. The Figma surface is the
//! [`figma::FigmaApi`] trait, so the flow-controlled wrapper and test doubles
//! stack over the HTTP client transparently.
//!
//! ```rust,no_run
//! use figport::adapters::figma::{FigmaApi, FigmaHttpClient, FlowControlledClient};
//! use figport::config::FigmaConfig;
//! use figport::domain::FileKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FigmaConfig::default();
//! let client = FlowControlledClient::new(
//!     FigmaHttpClient::new(&config)?,
//!     config.flow_control.clone(),
//! )?;
//!
//! let file = client.get_file(&FileKey::new("FpKcPBk2q3wDhYzTfwBDq1")?).await?;
//! println!("Exporting from {}", file.name);
//! # Ok(())
//! # }
//! ```

pub mod download;
pub mod figma;
