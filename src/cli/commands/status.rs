//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! processing record.

use crate::config::load_config;
use crate::core::state::{JsonFileProcessingRecord, ProcessingRecord};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show entries whose key starts with this file key
    #[arg(long)]
    pub file_key: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if !config.export.tracking_enabled {
            println!("Tracking is disabled; no processing record is kept.");
            return Ok(0);
        }

        let record = match JsonFileProcessingRecord::open(&config.export.record_file) {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Failed to load processing record");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let entries: Vec<_> = record
            .entries()
            .into_iter()
            .filter(|(key, _)| match &self.file_key {
                Some(file_key) => key.starts_with(&format!("{file_key}/")),
                None => true,
            })
            .collect();

        if entries.is_empty() {
            println!("No export history found in {}.", record.path().display());
            println!("Run 'figport assets' to start exporting.");
            return Ok(0);
        }

        println!("Found {} processed instruction(s):", entries.len());
        println!();
        println!("{:<70} {:<20} {:<20}", "Instruction", "Version", "Recorded");
        println!("{}", "-".repeat(110));

        for (key, entry) in entries {
            println!(
                "{:<70} {:<20} {:<20}",
                key,
                entry.version,
                entry.recorded_at.format("%Y-%m-%d %H:%M:%S")
            );
        }

        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_args_defaults() {
        let args = StatusArgs { file_key: None };
        assert!(args.file_key.is_none());
    }

    #[tokio::test]
    async fn test_missing_config_exits_two() {
        let args = StatusArgs { file_key: None };
        let code = args.execute("/nonexistent/figport.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
