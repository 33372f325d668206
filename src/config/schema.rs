//! Configuration schema types
//!
//! This module defines the configuration structure for Figport.

use crate::adapters::figma::FlowControlConfig;
use crate::config::AccessToken;
use crate::domain::{validate_path_segment, ExportFormat, ExportSetting, FileKey, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Main Figport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Figma API connection
    pub figma: FigmaConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Output platforms; each compiles into one shared pipeline
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,

    /// Nodes to export
    #[serde(default)]
    pub assets: Vec<AssetConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FigportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.figma.validate()?;
        self.export.validate()?;
        self.logging.validate()?;

        if self.platforms.is_empty() {
            return Err("at least one [[platforms]] entry is required".to_string());
        }

        let mut names = HashSet::new();
        for platform in &self.platforms {
            platform.validate()?;
            if !names.insert(platform.name.as_str()) {
                return Err(format!("duplicate platform name '{}'", platform.name));
            }
        }

        for asset in &self.assets {
            asset.validate()?;
            for platform in &asset.platforms {
                if !names.contains(platform.as_str()) {
                    return Err(format!(
                        "asset '{}' references unknown platform '{platform}'",
                        asset.name
                    ));
                }
            }
        }

        Ok(())
    }

    /// Look up a platform by name
    pub fn platform(&self, name: &str) -> Option<&PlatformConfig> {
        self.platforms.iter().find(|platform| platform.name == name)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (fetch nothing, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Figma API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigmaConfig {
    /// API base URL
    #[serde(default = "default_figma_base_url")]
    pub base_url: String,

    /// Personal access token, sent as `X-Figma-Token`
    pub access_token: AccessToken,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Concurrency gate and rate-limit backoff
    #[serde(default)]
    pub flow_control: FlowControlConfig,

    /// HTTP(S) proxy for API requests
    #[serde(default)]
    pub proxy: Option<String>,
}

impl FigmaConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("figma.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("figma.base_url must start with http:// or https://".to_string());
        }

        if self.access_token.is_blank() {
            return Err("figma.access_token cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("figma.timeout_seconds must be > 0".to_string());
        }

        validate_proxy("figma.proxy", self.proxy.as_deref())?;

        self.flow_control.validate()
    }
}

impl Default for FigmaConfig {
    fn default() -> Self {
        Self {
            base_url: default_figma_base_url(),
            access_token: AccessToken::default(),
            timeout_seconds: default_timeout_seconds(),
            flow_control: FlowControlConfig::default(),
            proxy: None,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory platform directories are created under
    #[serde(default = "default_output_directory")]
    pub output_directory: String,

    /// Skip instructions already exported at the current file version
    #[serde(default = "default_true")]
    pub tracking_enabled: bool,

    /// Processing record location
    #[serde(default = "default_record_file")]
    pub record_file: String,

    /// Instructions processed concurrently
    #[serde(default = "default_parallel_instructions")]
    pub parallel_instructions: usize,

    /// Node ids per images request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Timeout for downloading rendered assets, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub download_timeout_seconds: u64,

    /// HTTP(S) proxy for asset downloads
    #[serde(default)]
    pub proxy: Option<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_directory.is_empty() {
            return Err("export.output_directory cannot be empty".to_string());
        }

        if self.tracking_enabled && self.record_file.is_empty() {
            return Err(
                "export.record_file cannot be empty when tracking is enabled".to_string(),
            );
        }

        if self.parallel_instructions == 0 || self.parallel_instructions > 64 {
            return Err("export.parallel_instructions must be between 1 and 64".to_string());
        }

        if self.batch_size == 0 || self.batch_size > 500 {
            return Err("export.batch_size must be between 1 and 500".to_string());
        }

        if self.download_timeout_seconds == 0 {
            return Err("export.download_timeout_seconds must be > 0".to_string());
        }

        validate_proxy("export.proxy", self.proxy.as_deref())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            tracking_enabled: true,
            record_file: default_record_file(),
            parallel_instructions: default_parallel_instructions(),
            batch_size: default_batch_size(),
            download_timeout_seconds: default_timeout_seconds(),
            proxy: None,
        }
    }
}

/// An output platform
///
/// ```toml
/// [[platforms]]
/// name = "android"
/// directory = "android/res"
/// format = "png"
/// scale = 4.0
/// manifest = "manifest.jsonl"
///
/// [[platforms.variants]]
/// path = ["drawable-xxxhdpi"]
///
/// [[platforms.variants]]
/// path = ["drawable-xxhdpi"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: String,

    /// Directory below `export.output_directory`; defaults to the platform name
    #[serde(default)]
    pub directory: Option<String>,

    /// Path elements appended to every asset's own path
    #[serde(default)]
    pub path: Vec<String>,

    /// Appended to every output name (e.g. "@2x")
    #[serde(default)]
    pub suffix: Option<String>,

    /// Render format requested from Figma
    #[serde(default = "default_export_format")]
    pub format: ExportFormat,

    /// Render scale requested from Figma
    #[serde(default = "default_scale")]
    pub scale: f32,

    #[serde(default)]
    pub contents_only: Option<bool>,

    /// File extension override
    #[serde(default)]
    pub extension: Option<String>,

    /// Manifest file, relative to the platform directory
    #[serde(default)]
    pub manifest: Option<String>,

    /// Fan-out: each variant writes its own copy
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

impl PlatformConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("platforms.name cannot be empty".to_string());
        }

        self.export_setting()
            .map_err(|e| format!("platform '{}': {e}", self.name))?;

        if matches!(
            &self.extension,
            Some(extension) if extension.is_empty() || extension.contains('.')
        ) {
            return Err(format!(
                "platform '{}': extension must be non-empty and without a leading dot",
                self.name
            ));
        }

        for element in self.path.iter().chain(self.variants.iter().flat_map(|v| v.path.iter())) {
            validate_path_segment(element).map_err(|e| format!("platform '{}': {e}", self.name))?;
        }

        // Nested directories are allowed; each level must stay inside the export root
        if let Some(directory) = &self.directory {
            for part in directory.split('/') {
                validate_path_segment(part)
                    .map_err(|e| format!("platform '{}' directory: {e}", self.name))?;
            }
        }

        Ok(())
    }

    /// Render setting for every asset on this platform
    pub fn export_setting(&self) -> Result<ExportSetting, String> {
        let setting = ExportSetting::new(self.format, self.scale)?;
        Ok(match self.contents_only {
            Some(contents_only) => setting.with_contents_only(contents_only),
            None => setting,
        })
    }

    /// Directory name below the export root
    pub fn directory(&self) -> &str {
        self.directory.as_deref().unwrap_or(&self.name)
    }
}

/// One branch of a platform's fan-out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantConfig {
    #[serde(default)]
    pub path: Vec<String>,

    #[serde(default)]
    pub suffix: Option<String>,
}

/// A node to export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub file_key: String,

    pub node_id: String,

    /// Output base name, without extension
    pub name: String,

    /// Directory hierarchy below the platform directory
    #[serde(default)]
    pub path: Vec<String>,

    /// Platforms to export to; empty means all
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl AssetConfig {
    fn validate(&self) -> Result<(), String> {
        FileKey::new(self.file_key.clone()).map_err(|e| format!("asset '{}': {e}", self.name))?;
        NodeId::new(self.node_id.clone()).map_err(|e| format!("asset '{}': {e}", self.name))?;

        if self.name.trim().is_empty() {
            return Err(format!("asset {} has an empty name", self.node_id));
        }

        for segment in std::iter::once(&self.name).chain(&self.path) {
            validate_path_segment(segment).map_err(|e| format!("asset '{}': {e}", self.name))?;
        }

        Ok(())
    }

    /// Whether this asset should be exported to `platform`
    pub fn targets(&self, platform: &str) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|name| name == platform)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn validate_proxy(field: &str, proxy: Option<&str>) -> Result<(), String> {
    let Some(proxy) = proxy else {
        return Ok(());
    };
    let url = Url::parse(proxy).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(format!("{field} must be an http:// or https:// URL with a host"));
    }
    Ok(())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_figma_base_url() -> String {
    "https://api.figma.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_output_directory() -> String {
    "./assets".to_string()
}

fn default_record_file() -> String {
    ".figport/processed.json".to_string()
}

fn default_parallel_instructions() -> usize {
    8
}

fn default_batch_size() -> usize {
    50
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Png
}

fn default_scale() -> f32 {
    1.0
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
