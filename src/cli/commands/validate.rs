//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Figport configuration file.

use crate::config::load_config;
use crate::core::export::{build_instructions, compile_platforms};
use crate::core::pipeline::PathLockRegistry;
use clap::Args;
use std::sync::Arc;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Print the compiled pipeline of every platform
    #[arg(long)]
    pub show_pipelines: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let locks = Arc::new(PathLockRegistry::new());
        let compiled = compile_platforms(&config, &[], &locks)
            .and_then(|platforms| {
                build_instructions(&config, &platforms)
                    .map(|instructions| (platforms, instructions))
            });
        let (platforms, instructions) = match compiled {
            Ok(compiled) => compiled,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Figma API: {}", config.figma.base_url);
        println!(
            "  Flow Control: {} concurrent, {} attempts",
            config.figma.flow_control.concurrency_limit, config.figma.flow_control.retry_limit
        );
        println!("  Output Directory: {}", config.export.output_directory);
        println!(
            "  Tracking: {}",
            if config.export.tracking_enabled {
                config.export.record_file.as_str()
            } else {
                "disabled"
            }
        );
        println!("  Assets: {}", config.assets.len());
        println!("  Instructions: {}", instructions.len());
        println!("  Platforms:");
        for platform in &platforms {
            println!("    - {} ({})", platform.name, platform.setting);
            if self.show_pipelines {
                println!("      {}", platform.pipeline.describe());
            }
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config_exits_zero() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[figma]
access_token = "figd_test"

[[platforms]]
name = "web"
format = "svg"

[[assets]]
file_key = "FpKcPBk2q3wDhYzTfwBDq1"
node_id = "1:2"
name = "logo"
"#
        )
        .unwrap();

        let args = ValidateArgs {
            show_pipelines: true,
        };
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_exits_two() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[figma]\naccess_token = \"figd_test\"\n").unwrap();

        let args = ValidateArgs {
            show_pipelines: false,
        };
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 2);
    }
}
