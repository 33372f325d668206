//! Core business logic for Figport.
//!
//! # Modules
//!
//! - [`pipeline`] - Step algebra, import pipelines and the locked destination writer
//! - [`export`] - Platform compilation and export coordination
//! - [`state`] - Processing record for incremental exports
//!
//! # Export Workflow
//!
//! 1. **Compile**: Turn each configured platform into a shared pipeline
//! 2. **Plan**: Pair assets with their platforms to build instructions
//! 3. **Resolve**: Fetch file versions and skip instructions already processed
//! 4. **Render**: Request export URLs in batches per render setting
//! 5. **Import**: Download each asset and run its pipeline
//! 6. **Record**: Persist the processing record and report a summary
//!
//! # Example
//!
//! ```rust,no_run
//! use figport::adapters::download::AssetDownloader;
//! use figport::adapters::figma::{FigmaHttpClient, FlowControlledClient};
//! use figport::config::load_config;
//! use figport::core::export::{
//!     build_instructions, compile_platforms, CoordinatorOptions, ExportCoordinator,
//! };
//! use figport::core::pipeline::PathLockRegistry;
//! use figport::core::state::NoOpProcessingRecord;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("figport.toml")?;
//!
//! let http = FigmaHttpClient::new(&config.figma)?;
//! let api = Arc::new(FlowControlledClient::new(http, config.figma.flow_control.clone())?);
//!
//! let locks = Arc::new(PathLockRegistry::new());
//! let platforms = compile_platforms(&config, &[], &locks)?;
//! let instructions = build_instructions(&config, &platforms)?;
//!
//! let coordinator = ExportCoordinator::new(
//!     api,
//!     AssetDownloader::new(Duration::from_secs(60))?,
//!     Arc::new(NoOpProcessingRecord),
//!     CoordinatorOptions::from_config(&config.export, false),
//! );
//!
//! let summary = coordinator.execute(instructions).await?;
//! println!("Successful: {}", summary.successful);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod pipeline;
pub mod state;
