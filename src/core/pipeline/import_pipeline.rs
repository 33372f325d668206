//! Import pipelines: a composed step plus lifecycle hooks

use super::step::StepRef;
use crate::domain::{ImportTargetOverride, Instruction, PipelineOutput, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Callbacks around every pipeline execution
#[async_trait]
pub trait PipelineHooks: Send + Sync {
    /// Runs before the steps; an error aborts the execution
    async fn before(&self) -> Result<()> {
        Ok(())
    }

    /// Runs after the steps, or after `before` failed
    async fn after(&self, _successful: bool) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PipelineHooks for NoHooks {}

/// Counts executions and tracks how long the pipeline has been busy
///
/// The busy window spans from the first `before` to the most recent `after`
/// and covers every instruction sharing the pipeline.
#[derive(Debug)]
pub struct TimingHooks {
    name: String,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    first_started: Mutex<Option<Instant>>,
}

impl TimingHooks {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            first_started: Mutex::new(None),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Time since the first execution started, if any has
    pub fn busy_for(&self) -> Option<Duration> {
        self.first_started
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .map(|started| started.elapsed())
    }
}

#[async_trait]
impl PipelineHooks for TimingHooks {
    async fn before(&self) -> Result<()> {
        self.first_started
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_or_insert_with(Instant::now);
        Ok(())
    }

    async fn after(&self, successful: bool) {
        if successful {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }

        tracing::trace!(
            pipeline = %self.name,
            successful = successful,
            succeeded = self.succeeded(),
            failed = self.failed(),
            busy_ms = self.busy_for().unwrap_or_default().as_millis() as u64,
            "Pipeline execution finished"
        );
    }
}

/// Runs several hooks in order
pub struct CombinedHooks {
    hooks: Vec<Arc<dyn PipelineHooks>>,
}

impl CombinedHooks {
    pub fn new(hooks: Vec<Arc<dyn PipelineHooks>>) -> Self {
        Self { hooks }
    }
}

#[async_trait]
impl PipelineHooks for CombinedHooks {
    async fn before(&self) -> Result<()> {
        for hook in &self.hooks {
            hook.before().await?;
        }
        Ok(())
    }

    async fn after(&self, successful: bool) {
        for hook in &self.hooks {
            hook.after(successful).await;
        }
    }
}

/// A statically composed pipeline shared by every instruction that uses it
///
/// # Example
///
/// ```no_run
/// use figport::core::pipeline::{
///     Destination, DirectoryDestination, ImportPipeline, PathLockRegistry,
/// };
/// use std::sync::Arc;
///
/// let locks = Arc::new(PathLockRegistry::new());
/// let destination = Destination::Directory(DirectoryDestination::new("./assets/web", locks));
/// let pipeline = Arc::new(ImportPipeline::new(Arc::new(destination)));
/// ```
pub struct ImportPipeline {
    steps: StepRef,
    hooks: Arc<dyn PipelineHooks>,
}

impl ImportPipeline {
    pub fn new(steps: StepRef) -> Self {
        Self {
            steps,
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn PipelineHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn describe(&self) -> String {
        self.steps.describe()
    }

    /// Run the pipeline for one instruction
    ///
    /// The initial output carries `data` and an override built from the
    /// remaining arguments. `after(false)` runs before any failure is
    /// returned; `after(true)` runs once the steps complete.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `before` or any step.
    pub async fn execute(
        &self,
        instruction: &Instruction,
        data: Vec<u8>,
        output_name: Option<String>,
        path_elements: Vec<String>,
        format: Option<String>,
    ) -> Result<()> {
        let input = PipelineOutput::new(
            data,
            ImportTargetOverride::new(output_name, path_elements, format),
        );

        let result = match self.hooks.before().await {
            Ok(()) => self.steps.process(instruction, &input).await.map(|_| ()),
            Err(error) => Err(error),
        };

        self.hooks.after(result.is_ok()).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timing_hooks_count_outcomes() {
        let hooks = TimingHooks::new("ios");
        assert!(hooks.busy_for().is_none());

        hooks.before().await.unwrap();
        hooks.after(true).await;
        hooks.before().await.unwrap();
        hooks.after(false).await;

        assert_eq!(hooks.succeeded(), 1);
        assert_eq!(hooks.failed(), 1);
        assert!(hooks.busy_for().is_some());
    }

    #[tokio::test]
    async fn test_combined_hooks_forward_to_all() {
        let first = Arc::new(TimingHooks::new("first"));
        let second = Arc::new(TimingHooks::new("second"));
        let combined =
            CombinedHooks::new(vec![first.clone() as Arc<dyn PipelineHooks>, second.clone()]);

        combined.before().await.unwrap();
        combined.after(true).await;

        assert_eq!(first.succeeded(), 1);
        assert_eq!(second.succeeded(), 1);
    }
}
