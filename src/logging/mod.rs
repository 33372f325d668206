//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable through `RUST_LOG`
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use figport::logging::init_logging;
//! use figport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an instruction
///
/// # Example
///
/// ```no_run
/// use figport::log_instruction_start;
///
/// log_instruction_start!("FpKcPBk2q3wDhYzTfwBDq1/1:2/png@1x/logo", "ios");
/// ```
#[macro_export]
macro_rules! log_instruction_start {
    ($key:expr, $pipeline:expr) => {
        tracing::debug!(
            instruction = %$key,
            pipeline = %$pipeline,
            "Starting instruction"
        );
    };
}

/// Log the completion of an instruction
///
/// # Example
///
/// ```no_run
/// use figport::log_instruction_complete;
/// use std::time::Duration;
///
/// let key = "FpKcPBk2q3wDhYzTfwBDq1/1:2/png@1x:ios/logo";
/// log_instruction_complete!(key, 2048, Duration::from_millis(35));
/// ```
#[macro_export]
macro_rules! log_instruction_complete {
    ($key:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            instruction = %$key,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "Instruction completed"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a rate-limit backoff before the next attempt
///
/// # Example
///
/// ```no_run
/// use figport::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!("get_images", 2, 5, Duration::from_secs(5));
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $attempt:expr, $max_attempts:expr, $delay:expr) => {
        tracing::warn!(
            operation = $operation,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            "Rate limited, backing off before retrying"
        );
    };
}
