//! Figma API trait definition
//!
//! This module defines the `FigmaApi` trait that abstracts the remote Figma
//! REST API. The HTTP implementation and the flow-controlled wrapper both
//! implement it, so callers can stack them freely and tests can substitute
//! scripted fakes.

use super::models::{GetFileResponse, GetImagesResponse, GetLocalVariablesResponse};
use crate::domain::{ExportFormat, FigmaApiError, FileKey, NodeId};
use async_trait::async_trait;

/// Result of a single API call
///
/// The error side is data, not a failure of the call itself: wrappers inspect
/// it (e.g. for rate limiting) and hand it back unchanged when they give up.
pub type ApiResponse<T> = std::result::Result<T, FigmaApiError>;

/// Trait for Figma API implementations
///
/// # Example
///
/// ```no_run
/// use figport::adapters::figma::{FigmaApi, FigmaHttpClient};
/// use figport::config::FigmaConfig;
/// use figport::domain::FileKey;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FigmaHttpClient::new(&FigmaConfig::default())?;
/// let file = client.get_file(&FileKey::new("FpKcPBk2q3wDhYzTfwBDq1")?).await?;
/// println!("{} is at version {}", file.name, file.version);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait FigmaApi: Send + Sync {
    /// Fetch file metadata, including its current version
    async fn get_file(&self, key: &FileKey) -> ApiResponse<GetFileResponse>;

    /// Request rendered export URLs for a set of nodes
    ///
    /// # Arguments
    ///
    /// * `key` - File containing the nodes
    /// * `ids` - Nodes to render; sent as a single comma-joined parameter
    /// * `format` - Render format
    /// * `scale` - Render scale, in (0, 4]
    /// * `contents_only` - Exclude overlapping content; omitted when `None`
    async fn get_images(
        &self,
        key: &FileKey,
        ids: &[NodeId],
        format: ExportFormat,
        scale: f32,
        contents_only: Option<bool>,
    ) -> ApiResponse<GetImagesResponse>;

    /// Fetch the file's local variables and variable collections
    async fn get_local_variables(&self, key: &FileKey) -> ApiResponse<GetLocalVariablesResponse>;
}
