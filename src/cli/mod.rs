//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Figport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Figport - Figma asset exporter
#[derive(Parser, Debug)]
#[command(name = "figport")]
#[command(version, about, long_about = None)]
#[command(author = "Figport Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "figport.toml", env = "FIGPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FIGPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export configured assets from Figma into platform directories
    Assets(commands::assets::AssetsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the processing record
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
