// Figport - Figma asset exporter
// Copyright (c) 2025 Figport Contributors
// Licensed under the MIT License

//! # Figport - Figma asset exporter
//!
//! Figport exports nodes from Figma files and imports them into
//! platform-specific directory trees, one configurable pipeline per platform.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Talking** to the Figma REST API through a flow-controlled client that
//!   bounds concurrency and backs off on rate limits
//! - **Composing** import pipelines from small steps (`THEN`, `AND`, `OR`, `IF`)
//! - **Writing** outputs through a destination that serializes writes per path
//! - **Tracking** processed assets per file version for incremental runs
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipelines, export coordination and the processing record
//! - [`adapters`] - Figma API client and asset downloads
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use figport::core::pipeline::{
//!     path_elements_append, rename_suffix, sequence, Destination, DirectoryDestination,
//!     ImportPipeline, PathLockRegistry, StepExt, StepRef,
//! };
//! use std::sync::Arc;
//!
//! let locks = Arc::new(PathLockRegistry::new());
//! let write: StepRef = Arc::new(Destination::Directory(DirectoryDestination::new(
//!     "./assets/android",
//!     locks,
//! )));
//!
//! let pipeline = ImportPipeline::new(
//!     sequence(vec![
//!         path_elements_append(vec!["drawable-xhdpi".to_string()]),
//!         rename_suffix("_xhdpi"),
//!     ])
//!     .then(write),
//! );
//! println!("{}", pipeline.describe());
//! ```
//!
//! ## Flow Control
//!
//! Every Figma request passes a concurrency gate. A `429` response makes the
//! client back off on a shared schedule; concurrent requests hitting the
//! limit while a backoff is in progress wait for it instead of starting their
//! own.
//!
//! ```rust,no_run
//! use figport::adapters::figma::{
//!     FigmaApi, FigmaHttpClient, FlowControlConfig, FlowControlledClient,
//! };
//! use figport::config::FigmaConfig;
//! use figport::domain::FileKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = FigmaHttpClient::new(&FigmaConfig::default())?;
//! let client = FlowControlledClient::new(http, FlowControlConfig::default())?;
//!
//! let file = client.get_file(&FileKey::new("FpKcPBk2q3wDhYzTfwBDq1")?).await?;
//! println!("{} @ {}", file.name, file.version);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Figport uses [`domain::FigportError`] for all library errors;
//! [`domain::FigmaApiError`] is returned as data by the API client:
//!
//! ```rust,no_run
//! use figport::domain::FigportError;
//!
//! fn example() -> Result<(), FigportError> {
//!     let config = figport::config::load_config("figport.toml")?;
//!     println!("{} platform(s)", config.platforms.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
