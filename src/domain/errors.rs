//! Domain error types
//!
//! This module defines the error hierarchy for Figport. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Figport error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FigportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Figma API errors that surfaced to a caller
    #[error("Figma API error: {0}")]
    FigmaApi(#[from] FigmaApiError),

    /// A pipeline step failed
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Export orchestration errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Processing record errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Figma API errors
///
/// These are returned as the error side of an [`ApiResponse`](crate::adapters::figma::ApiResponse)
/// and are treated as data by the flow-controlled client: rate-limit errors are
/// retried, everything else is handed straight back to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FigmaApiError {
    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Client error (4xx other than 429)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Failed to reach the server
    #[error("Failed to connect to Figma API: {0}")]
    ConnectionFailed(String),

    /// Request timed out in the transport
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The client can no longer issue requests
    #[error("Client unavailable: {0}")]
    Unavailable(String),
}

impl FigmaApiError {
    /// Whether this error is the upstream telling us to slow down
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FigmaApiError::RateLimited(_))
    }

    /// Maps an HTTP status and body into the matching error variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => FigmaApiError::RateLimited(message),
            400..=499 => FigmaApiError::ClientError { status, message },
            _ => FigmaApiError::ServerError { status, message },
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FigportError {
    fn from(err: std::io::Error) -> Self {
        FigportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FigportError {
    fn from(err: serde_json::Error) -> Self {
        FigportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FigportError {
    fn from(err: toml::de::Error) -> Self {
        FigportError::Configuration(format!("TOML parse error: {err}"))
    }
}
