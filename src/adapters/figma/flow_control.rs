//! Flow-controlled Figma API wrapper
//!
//! [`FlowControlledClient`] wraps any [`FigmaApi`] and adds two things the
//! upstream needs from a well-behaved client:
//!
//! - a concurrency gate bounding the number of in-flight logical requests;
//! - rate-limit aware retries, where the first caller to see a rate-limit
//!   response holds a shared flood-mitigation lock while it backs off, and
//!   every other caller waits for that lock before sending anything.
//!
//! A gate permit is taken before the first attempt and held through every
//! retry and backoff sleep, so the gate counts logical requests, not
//! physical ones.
//!
//! # Known race
//!
//! Checking whether mitigation is already in progress and starting it are two
//! separate steps. Two callers that see rate-limit responses at the same time
//! can both find the lock free, and the second then sleeps again after the
//! first releases it. This lengthens the pause, which is harmless against a
//! throttling upstream, and is left as is.

use super::api::{ApiResponse, FigmaApi};
use super::models::{GetFileResponse, GetImagesResponse, GetLocalVariablesResponse};
use crate::domain::{ExportFormat, FigmaApiError, FileKey, NodeId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

/// Flow control settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowControlConfig {
    /// Maximum number of concurrent logical requests
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Maximum number of attempts per logical request
    #[serde(default = "default_retry_limit")]
    pub retry_limit: usize,

    /// Backoff after the n-th rate-limited attempt; the last entry repeats
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_retry_limit() -> usize {
    5
}

fn default_backoff_ms() -> Vec<u64> {
    // Figma throttles aggressively, so the curve is steep
    vec![1_000, 5_000, 15_000, 30_000, 60_000]
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            retry_limit: default_retry_limit(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl FlowControlConfig {
    /// Validate flow control settings
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency_limit == 0 {
            return Err("flow_control.concurrency_limit must be at least 1".to_string());
        }
        if self.retry_limit == 0 {
            return Err("flow_control.retry_limit must be at least 1".to_string());
        }
        if self.backoff_ms.is_empty() {
            return Err("flow_control.backoff_ms must not be empty".to_string());
        }
        Ok(())
    }

    /// Backoff for a 1-based attempt number, clamped to the schedule
    pub fn backoff_for_attempt(&self, attempt: usize) -> Duration {
        let index = attempt
            .saturating_sub(1)
            .min(self.backoff_ms.len().saturating_sub(1));
        Duration::from_millis(self.backoff_ms.get(index).copied().unwrap_or_default())
    }
}

/// Figma API client with a concurrency gate and coordinated rate-limit backoff
pub struct FlowControlledClient<A: FigmaApi> {
    inner: A,
    config: FlowControlConfig,
    gate: Semaphore,
    flood_mitigation: Mutex<()>,
}

impl<A: FigmaApi> FlowControlledClient<A> {
    /// Wrap an upstream client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (zero concurrency,
    /// zero retries or an empty backoff schedule).
    pub fn new(inner: A, config: FlowControlConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            gate: Semaphore::new(config.concurrency_limit),
            inner,
            config,
            flood_mitigation: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &FlowControlConfig {
        &self.config
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    async fn wrap_request<T, F, Fut>(&self, operation: &'static str, request: F) -> ApiResponse<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResponse<T>>,
    {
        let _permit = self.gate.acquire().await.map_err(|_| {
            FigmaApiError::Unavailable("flow control gate has been closed".to_string())
        })?;

        let mut attempt = 1;
        loop {
            // Wait out any mitigation in progress
            drop(self.flood_mitigation.lock().await);

            let response = request().await;
            if !matches!(&response, Err(error) if error.is_rate_limited()) {
                return response;
            }

            if attempt >= self.config.retry_limit {
                tracing::warn!(
                    operation = operation,
                    attempts = attempt,
                    "Rate limit retries exhausted"
                );
                return response;
            }

            // Probe and release; not atomic with the lock below
            let mitigating = self.flood_mitigation.try_lock().is_err();
            if !mitigating {
                let _mitigation = self.flood_mitigation.lock().await;
                let delay = self.config.backoff_for_attempt(attempt);
                crate::log_retry_attempt!(operation, attempt, self.config.retry_limit, delay);
                tokio::time::sleep(delay).await;
            }

            attempt += 1;
        }
    }
}

#[async_trait]
impl<A: FigmaApi> FigmaApi for FlowControlledClient<A> {
    async fn get_file(&self, key: &FileKey) -> ApiResponse<GetFileResponse> {
        self.wrap_request("get_file", || self.inner.get_file(key)).await
    }

    async fn get_images(
        &self,
        key: &FileKey,
        ids: &[NodeId],
        format: ExportFormat,
        scale: f32,
        contents_only: Option<bool>,
    ) -> ApiResponse<GetImagesResponse> {
        self.wrap_request("get_images", || {
            self.inner
                .get_images(key, ids, format, scale, contents_only)
        })
        .await
    }

    async fn get_local_variables(&self, key: &FileKey) -> ApiResponse<GetLocalVariablesResponse> {
        self.wrap_request("get_local_variables", || {
            self.inner.get_local_variables(key)
        })
        .await
    }
}
