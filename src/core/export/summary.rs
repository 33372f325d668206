//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use std::time::Duration;

/// Summary of an export run
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Number of instructions handed to the coordinator
    pub total_instructions: usize,

    /// Instructions whose pipeline completed
    pub successful: usize,

    /// Instructions that failed at any stage
    pub failed: usize,

    /// Instructions skipped because the processing record already holds them
    pub skipped: usize,

    /// Instructions a dry run would have executed
    pub planned: usize,

    /// Whether a shutdown signal stopped the run early
    pub interrupted: bool,

    /// Whether this was a dry run
    pub dry_run: bool,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Counts one failed instruction and keeps its error
    pub fn record_failure(&mut self, error: ExportError) {
        self.failed += 1;
        self.add_error(error);
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }

    /// Get success rate as a percentage of attempted instructions
    pub fn success_rate(&self) -> f64 {
        let attempted = self.successful + self.failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.successful as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_instructions = self.total_instructions,
            successful = self.successful,
            failed = self.failed,
            skipped = self.skipped,
            planned = self.planned,
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Export error"
                );
            }
        }
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Figma API unreachable or returned an error
    Connection,
    /// Rendered asset could not be downloaded
    Download,
    /// A pipeline step failed
    Pipeline,
    /// Processing record error
    State,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (usually the instruction key)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new();

        assert_eq!(summary.total_instructions, 0);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 0);
        assert!(!summary.interrupted);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new().with_duration(Duration::from_secs(120));

        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_export_summary_is_successful() {
        let mut summary = ExportSummary::new();
        summary.successful = 10;
        assert!(summary.is_successful());

        summary.record_failure(ExportError::new(
            ExportErrorType::Download,
            "403".to_string(),
        ));
        assert!(!summary.is_successful());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors.len(), 1);
    }

    #[test]
    fn test_success_rate_ignores_skipped() {
        let mut summary = ExportSummary::new();
        summary.successful = 3;
        summary.failed = 1;
        summary.skipped = 20;

        assert_eq!(summary.success_rate(), 75.0);

        assert_eq!(ExportSummary::new().success_rate(), 100.0);
    }

    #[test]
    fn test_export_error_with_context() {
        let error = ExportError::new(ExportErrorType::Pipeline, "disk full".to_string())
            .with_context("abc/1:2/png@1x/logo".to_string());

        assert_eq!(error.error_type, ExportErrorType::Pipeline);
        assert_eq!(error.context.as_deref(), Some("abc/1:2/png@1x/logo"));
    }
}
