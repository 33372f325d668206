//! Assets command implementation
//!
//! This module implements the `assets` command: export every configured
//! asset from Figma and run it through its platform pipelines.

use crate::adapters::download::AssetDownloader;
use crate::adapters::figma::{FigmaApi, FigmaHttpClient, FlowControlledClient};
use crate::config::load_config;
use crate::core::export::{
    build_instructions, compile_platforms, CoordinatorOptions, ExportCoordinator,
};
use crate::core::pipeline::PathLockRegistry;
use crate::core::state::{JsonFileProcessingRecord, NoOpProcessingRecord, ProcessingRecord};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the assets command
#[derive(Args, Debug)]
pub struct AssetsArgs {
    /// Dry run mode - resolve and plan without downloading or writing
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore the processing record and export everything
    #[arg(long)]
    pub no_tracking: bool,

    /// Only export these platforms (repeatable)
    #[arg(short, long, value_name = "NAME")]
    pub platform: Vec<String>,
}

impl AssetsArgs {
    /// Execute the assets command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting assets command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if self.no_tracking {
            tracing::info!("Disabling processing record from CLI");
            config.export.tracking_enabled = false;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let locks = Arc::new(PathLockRegistry::new());
        let platforms = match compile_platforms(&config, &self.platform, &locks) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to compile platforms: {e}");
                return Ok(2);
            }
        };
        let instructions = match build_instructions(&config, &platforms) {
            Ok(i) => i,
            Err(e) => {
                eprintln!("Invalid asset configuration: {e}");
                return Ok(2);
            }
        };

        let api: Arc<dyn FigmaApi> = match FigmaHttpClient::new(&config.figma)
            .map_err(|e| e.to_string())
            .and_then(|http| FlowControlledClient::new(http, config.figma.flow_control.clone()))
        {
            Ok(client) => Arc::new(client),
            Err(e) => {
                eprintln!("Failed to create Figma client: {e}");
                return Ok(2);
            }
        };

        let downloader = AssetDownloader::with_proxy(
            Duration::from_secs(config.export.download_timeout_seconds),
            config.export.proxy.as_deref(),
        )?;

        let record: Arc<dyn ProcessingRecord> = if config.export.tracking_enabled {
            match JsonFileProcessingRecord::open(&config.export.record_file) {
                Ok(record) => Arc::new(record),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to open processing record");
                    eprintln!("Failed to open processing record: {e}");
                    return Ok(5);
                }
            }
        } else {
            Arc::new(NoOpProcessingRecord)
        };

        let dry_run = config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - Nothing will be downloaded or written");
            println!();
        }

        let coordinator = ExportCoordinator::new(
            api,
            downloader,
            record,
            CoordinatorOptions::from_config(&config.export, dry_run),
        )
        .with_shutdown_signal(shutdown_signal);

        println!(
            "🚀 Exporting {} instruction(s) across {} platform(s)...",
            instructions.len(),
            platforms.len()
        );
        println!();

        let summary = match coordinator.execute(instructions).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        for platform in &platforms {
            platform.log_timing();
        }

        println!("📊 Export Summary:");
        println!("  Instructions: {}", summary.total_instructions);
        if summary.dry_run {
            println!("  Would export: {}", summary.planned);
        } else {
            println!("  Successful: {}", summary.successful);
            println!("  Failed: {}", summary.failed);
        }
        println!("  Skipped (unchanged): {}", summary.skipped);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in &summary.errors {
                println!("  - {:?}: {}", error.error_type, error.message);
                if let Some(context) = &error.context {
                    println!("    Context: {context}");
                }
            }
            println!();
        }

        let exit_code = if summary.interrupted {
            println!("⚠️  Export interrupted. Completed assets were recorded.");
            tracing::info!("Export interrupted by user signal");
            130
        } else if summary.is_successful() {
            println!("✅ Export completed successfully!");
            0
        } else {
            println!("⚠️  Export completed with failures");
            1
        };

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_args_defaults() {
        let args = AssetsArgs {
            dry_run: false,
            no_tracking: false,
            platform: vec![],
        };

        assert!(!args.dry_run);
        assert!(!args.no_tracking);
        assert!(args.platform.is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let args = AssetsArgs {
            dry_run: true,
            no_tracking: true,
            platform: vec![],
        };
        let (_tx, rx) = watch::channel(false);

        let code = args
            .execute("/nonexistent/figport.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
