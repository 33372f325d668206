//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "figport.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Figport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your file keys and node ids", self.output);
                println!("  2. Create a .env file with FIGMA_ACCESS_TOKEN=<personal access token>");
                println!("  3. Validate configuration: figport validate-config");
                println!("  4. Preview the run: figport assets --dry-run");
                println!("  5. Export: figport assets");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Figport Configuration File

[application]
log_level = "info"
dry_run = false

[figma]
access_token = "${FIGMA_ACCESS_TOKEN}"

[export]
output_directory = "./assets"

[[platforms]]
name = "web"
format = "svg"

[[assets]]
file_key = "FpKcPBk2q3wDhYzTfwBDq1"
node_id = "1:2"
name = "logo"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Figport Configuration File
#
# Exports nodes from Figma files into one directory tree per platform.
# Every [[platforms]] entry is compiled into a pipeline; every [[assets]]
# entry is exported once per platform it targets.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (resolve and plan, don't download or write)
dry_run = false

# ============================================================================
# Figma API
# ============================================================================
[figma]
base_url = "https://api.figma.com"

# Personal access token (use environment variable)
access_token = "${FIGMA_ACCESS_TOKEN}"

# HTTP request timeout
timeout_seconds = 60

# HTTP(S) proxy for API requests
# proxy = "http://proxy.example.com:3128"

[figma.flow_control]
# Requests in flight at once, including requests waiting out a backoff
concurrency_limit = 5

# Attempts per request when the API answers 429
retry_limit = 5

# Delay before each retry; the last value repeats
backoff_ms = [1000, 5000, 15000, 30000, 60000]

# ============================================================================
# Export
# ============================================================================
[export]
# Root of every platform directory
output_directory = "./assets"

# Skip assets whose file version hasn't changed since the last run
tracking_enabled = true
record_file = ".figport/processed.json"

# Assets downloaded and processed at the same time (1-64)
parallel_instructions = 8

# Node ids per images request (1-500)
batch_size = 50

download_timeout_seconds = 60

# HTTP(S) proxy for asset downloads
# proxy = "http://proxy.example.com:3128"

# ============================================================================
# Platforms
# ============================================================================
[[platforms]]
name = "ios"
format = "pdf"
path = ["Images.xcassets"]

[[platforms]]
name = "android"
directory = "res"
format = "png"
extension = "png"
manifest = "manifest.jsonl"

# Each variant is a concurrent branch of the platform pipeline
[[platforms.variants]]
path = ["drawable-mdpi"]

[[platforms.variants]]
path = ["drawable-xhdpi"]
suffix = "_xhdpi"

[[platforms]]
name = "web"
format = "svg"
suffix = ".min"

# ============================================================================
# Assets
# ============================================================================
[[assets]]
file_key = "FpKcPBk2q3wDhYzTfwBDq1"
node_id = "1:2"
name = "logo"
path = ["brand"]

[[assets]]
file_key = "FpKcPBk2q3wDhYzTfwBDq1"
node_id = "1:3"
name = "splash"
# Empty or missing means every platform
platforms = ["ios", "android"]

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = false
local_path = "./logs"

# Log rotation (hourly, daily or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
