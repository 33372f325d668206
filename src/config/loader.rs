//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FigportConfig;
use super::secret::AccessToken;
use crate::domain::errors::FigportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FigportConfig
/// 4. Applies environment variable overrides (FIGPORT_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use figport::config::loader::load_config;
///
/// let config = load_config("figport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FigportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FigportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FigportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from a TOML string
///
/// # Errors
///
/// Same as [`load_config`], minus file access.
pub fn parse_config(contents: &str) -> Result<FigportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FigportConfig = toml::from_str(&contents)
        .map_err(|e| FigportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        FigportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FigportError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Placeholders in comments are left alone
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FigportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using FIGPORT_* prefix
///
/// Environment variables follow the pattern: FIGPORT_<SECTION>_<KEY>
/// For example: FIGPORT_FIGMA_ACCESS_TOKEN, FIGPORT_EXPORT_BATCH_SIZE
fn apply_env_overrides(config: &mut FigportConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("FIGPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("FIGPORT_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Figma overrides
    if let Ok(val) = std::env::var("FIGPORT_FIGMA_BASE_URL") {
        config.figma.base_url = val;
    }
    if let Ok(val) = std::env::var("FIGPORT_FIGMA_ACCESS_TOKEN") {
        config.figma.access_token = AccessToken::new(val);
    }
    if let Ok(val) = std::env::var("FIGPORT_FIGMA_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.figma.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("FIGPORT_FIGMA_PROXY") {
        config.figma.proxy = Some(val);
    }
    if let Ok(val) = std::env::var("FIGPORT_FIGMA_FLOW_CONTROL_CONCURRENCY_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.figma.flow_control.concurrency_limit = limit;
        }
    }
    if let Ok(val) = std::env::var("FIGPORT_FIGMA_FLOW_CONTROL_RETRY_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.figma.flow_control.retry_limit = limit;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("FIGPORT_EXPORT_OUTPUT_DIRECTORY") {
        config.export.output_directory = val;
    }
    if let Ok(val) = std::env::var("FIGPORT_EXPORT_TRACKING_ENABLED") {
        config.export.tracking_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FIGPORT_EXPORT_RECORD_FILE") {
        config.export.record_file = val;
    }
    if let Ok(val) = std::env::var("FIGPORT_EXPORT_PARALLEL_INSTRUCTIONS") {
        if let Ok(parallel) = val.parse() {
            config.export.parallel_instructions = parallel;
        }
    }
    if let Ok(val) = std::env::var("FIGPORT_EXPORT_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.export.batch_size = size;
        }
    }

    if let Ok(val) = std::env::var("FIGPORT_EXPORT_PROXY") {
        config.export.proxy = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FIGPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FIGPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
