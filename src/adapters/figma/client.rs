//! HTTP implementation of the Figma REST API
//!
//! Every call is a single request; retries and rate limiting are the job of
//! [`FlowControlledClient`](super::FlowControlledClient), which is expected to
//! wrap this client.

use super::api::{ApiResponse, FigmaApi};
use super::models::{ErrorBody, GetFileResponse, GetImagesResponse, GetLocalVariablesResponse};
use crate::config::FigmaConfig;
use crate::domain::{ExportFormat, FigmaApiError, FigportError, FileKey, NodeId, Result};
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Client, ClientBuilder, Proxy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Personal access token header
const TOKEN_HEADER: &str = "X-Figma-Token";

/// Figma REST API client
pub struct FigmaHttpClient {
    base_url: Url,
    client: Client,
    /// Sensitive `X-Figma-Token` value
    token: HeaderValue,
}

impl FigmaHttpClient {
    /// Create a new client from the `[figma]` configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL, proxy or access token is unusable, or
    /// the HTTP client cannot be built.
    pub fn new(config: &FigmaConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            FigportError::Configuration(format!(
                "Invalid figma.base_url '{}': {e}",
                config.base_url
            ))
        })?;

        let token = config.access_token.header_value().map_err(|e| {
            FigportError::Configuration(format!("figma.access_token is not a valid header: {e}"))
        })?;

        let builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("figport/", env!("CARGO_PKG_VERSION")));
        let client = apply_proxy(builder, config.proxy.as_deref())?
            .build()
            .map_err(|e| FigportError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResponse<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FigmaApiError::Unavailable(format!(
                    "Base URL cannot have a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResponse<T> {
        tracing::debug!(url = %url, "Sending Figma API request");

        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, self.token.clone())
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|error| error.message().map(str::to_string))
                .unwrap_or(body);
            return Err(FigmaApiError::from_status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FigmaApiError::InvalidResponse(e.to_string()))
    }
}

/// Route every request through `proxy` when one is configured
pub(crate) fn apply_proxy(builder: ClientBuilder, proxy: Option<&str>) -> Result<ClientBuilder> {
    let Some(proxy) = proxy else {
        return Ok(builder);
    };
    let proxy = Proxy::all(proxy)
        .map_err(|e| FigportError::Configuration(format!("Invalid proxy URL: {e}")))?;
    Ok(builder.proxy(proxy))
}

pub(crate) fn map_send_error(error: reqwest::Error) -> FigmaApiError {
    if error.is_timeout() {
        FigmaApiError::Timeout(error.to_string())
    } else {
        FigmaApiError::ConnectionFailed(error.to_string())
    }
}

#[async_trait]
impl FigmaApi for FigmaHttpClient {
    async fn get_file(&self, key: &FileKey) -> ApiResponse<GetFileResponse> {
        let url = self.endpoint(&["v1", "files", key.as_str()])?;
        self.get_json(url).await
    }

    async fn get_images(
        &self,
        key: &FileKey,
        ids: &[NodeId],
        format: ExportFormat,
        scale: f32,
        contents_only: Option<bool>,
    ) -> ApiResponse<GetImagesResponse> {
        let mut url = self.endpoint(&["v1", "images", key.as_str()])?;
        {
            let ids = ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(",");
            let mut query = url.query_pairs_mut();
            query
                .append_pair("ids", &ids)
                .append_pair("format", format.as_api_str())
                .append_pair("scale", &scale.to_string());
            if let Some(contents_only) = contents_only {
                query.append_pair("contents_only", &contents_only.to_string());
            }
        }
        self.get_json(url).await
    }

    async fn get_local_variables(&self, key: &FileKey) -> ApiResponse<GetLocalVariablesResponse> {
        let url = self.endpoint(&["v1", "files", key.as_str(), "variables", "local"])?;
        self.get_json(url).await
    }
}
