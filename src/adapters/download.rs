//! Downloads rendered assets from the URLs returned by the images endpoint
//!
//! Render URLs point at a CDN and are pre-signed, so no token is sent.

use crate::adapters::figma::client::{apply_proxy, map_send_error};
use crate::domain::{FigmaApiError, Result};
use reqwest::Client;
use std::time::Duration;

/// Fetches rendered asset bytes
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: Client,
}

impl AssetDownloader {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_proxy(timeout, None)
    }

    /// Downloader whose requests go through `proxy`
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is invalid or the HTTP client cannot
    /// be built.
    pub fn with_proxy(timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        let builder = Client::builder().timeout(timeout);
        let client = apply_proxy(builder, proxy)?.build().map_err(|e| {
            crate::domain::FigportError::Configuration(format!(
                "Failed to build download client: {e}"
            ))
        })?;
        Ok(Self { client })
    }

    /// Download the full body at `url`
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FigmaApiError::from_status(status.as_u16(), body).into());
        }

        let bytes = response.bytes().await.map_err(map_send_error)?;
        tracing::trace!(url = %url, bytes = bytes.len(), "Downloaded asset");
        Ok(bytes.to_vec())
    }
}
