//! Tracing subscriber for the CLI
//!
//! Human-readable events go to stderr, leaving stdout to command output
//! (summaries, status tables). With `logging.local_enabled` the same events
//! are also appended as flat JSON objects to `figport.log` under
//! `logging.local_path`, one per line, so instruction keys can be grepped
//! or fed to `jq`.
//!
//! Dependencies only log warnings unless `RUST_LOG` says otherwise.

use crate::config::LoggingConfig;
use crate::domain::{FigportError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Base name of the local log file; rotation appends the date or hour
const LOG_FILE_NAME: &str = "figport.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes the local log file when dropped; keep it alive until exit
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails on an unknown level, when the log directory can't be created, or
/// when a global subscriber is already installed.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_level(level)?;

    let mut layers = vec![console_layer(level)];
    let file_guard = match file_layer(level, config)? {
        Some((layer, guard)) => {
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| FigportError::Configuration(format!("Logging already initialized: {e}")))?;

    tracing::debug!(
        level = %level,
        log_file = config.local_enabled.then_some(config.local_path.as_str()),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn console_layer(level: Level) -> BoxedLayer {
    tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter(level))
        .boxed()
}

fn file_layer(level: Level, config: &LoggingConfig) -> Result<Option<(BoxedLayer, WorkerGuard)>> {
    if !config.local_enabled {
        return Ok(None);
    }

    let directory = Path::new(&config.local_path);
    std::fs::create_dir_all(directory).map_err(|e| {
        FigportError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            directory.display()
        ))
    })?;

    let appender =
        RollingFileAppender::new(rotation(&config.local_rotation), directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
        .with_filter(filter(level))
        .boxed();

    Ok(Some((layer, guard)))
}

/// `RUST_LOG` wins; otherwise figport logs at `level` and everything else at warn
fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    format!("warn,figport={}", level.as_str().to_ascii_lowercase())
}

/// Config validation restricts the names; anything else rotates daily
fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_level(level: &str) -> Result<Level> {
    level.trim().parse::<Level>().map_err(|_| {
        FigportError::Configuration(format!(
            "Invalid log level '{level}': use trace, debug, info, warn or error"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("info", Level::INFO)]
    #[test_case("Debug", Level::DEBUG)]
    #[test_case(" warn ", Level::WARN)]
    fn test_parse_level(input: &str, expected: Level) {
        assert_eq!(parse_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_level_rejects_unknown() {
        let error = parse_level("verbose").unwrap_err().to_string();
        assert!(error.contains("verbose"), "{error}");
    }

    #[test]
    fn test_dependencies_stay_at_warn() {
        assert_eq!(default_directives(Level::DEBUG), "warn,figport=debug");
        assert_eq!(default_directives(Level::ERROR), "warn,figport=error");
    }

    #[test]
    fn test_disabled_file_logging_has_no_layer() {
        let config = LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        };
        assert!(file_layer(Level::INFO, &config).unwrap().is_none());
    }

    #[test]
    fn test_file_layer_writes_flat_json_lines() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        let config = LoggingConfig {
            local_enabled: true,
            local_path: logs.display().to_string(),
            local_rotation: "never".to_string(),
        };

        let (layer, guard) = file_layer(Level::INFO, &config).unwrap().unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(instruction = "abc/1:2/png@1x:ios/logo", bytes = 42, "Exported");
            tracing::debug!("below the configured level");
        });
        drop(guard);

        let written = std::fs::read_to_string(logs.join(LOG_FILE_NAME)).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["instruction"], "abc/1:2/png@1x:ios/logo");
        assert_eq!(lines[0]["bytes"], 42);
        assert_eq!(lines[0]["message"], "Exported");
    }
}
