//! Export coordinator
//!
//! Drives a set of instructions from the Figma API to their pipelines:
//! resolve file versions, skip what the processing record already holds,
//! request render URLs in batches, then download and run each instruction's
//! pipeline with bounded parallelism.

use crate::adapters::download::AssetDownloader;
use crate::adapters::figma::FigmaApi;
use crate::config::ExportConfig;
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::core::state::ProcessingRecord;
use crate::domain::{ExportFormat, FileKey, FigportError, Instruction, NodeId, Result};
use crate::{log_instruction_complete, log_instruction_start};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Tunables for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Instructions downloading or running their pipeline at the same time
    pub parallel_instructions: usize,

    /// Node ids per images request
    pub batch_size: usize,

    /// Resolve and plan only; nothing is downloaded or written
    pub dry_run: bool,
}

impl CoordinatorOptions {
    pub fn from_config(config: &ExportConfig, dry_run: bool) -> Self {
        Self {
            parallel_instructions: config.parallel_instructions,
            batch_size: config.batch_size,
            dry_run,
        }
    }
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            parallel_instructions: 8,
            batch_size: 50,
            dry_run: false,
        }
    }
}

type RenderKey = (FileKey, (ExportFormat, u32, Option<bool>));

/// An instruction ready to run: file version known and render URL resolved
struct Job {
    instruction: Instruction,
    version: String,
    url: std::result::Result<String, ExportError>,
}

enum Outcome {
    Succeeded,
    Failed(ExportError),
    NotStarted,
}

/// Export coordinator
///
/// Owns nothing but shared handles, so one coordinator can serve several
/// runs. Every per-instruction failure lands in the summary; only a failure
/// to persist the processing record is reported as an error of the run.
pub struct ExportCoordinator {
    api: Arc<dyn FigmaApi>,
    downloader: AssetDownloader,
    record: Arc<dyn ProcessingRecord>,
    options: CoordinatorOptions,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl ExportCoordinator {
    pub fn new(
        api: Arc<dyn FigmaApi>,
        downloader: AssetDownloader,
        record: Arc<dyn ProcessingRecord>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            api,
            downloader,
            record,
            options: CoordinatorOptions {
                parallel_instructions: options.parallel_instructions.max(1),
                batch_size: options.batch_size.max(1),
                dry_run: options.dry_run,
            },
            shutdown_signal: None,
        }
    }

    /// Stop starting new instructions once `signal` turns `true`
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }

    /// Execute every instruction and report the outcome
    ///
    /// # Errors
    ///
    /// Returns [`FigportError::State`] if the processing record can't be
    /// persisted. All other failures are collected in the summary.
    pub async fn execute(&self, instructions: Vec<Instruction>) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary {
            total_instructions: instructions.len(),
            dry_run: self.options.dry_run,
            ..ExportSummary::default()
        };

        tracing::info!(
            instructions = instructions.len(),
            parallel = self.options.parallel_instructions,
            dry_run = self.options.dry_run,
            "Starting export"
        );

        if instructions.is_empty() {
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        let versions = self.resolve_versions(&instructions).await;

        let mut pending = Vec::new();
        for instruction in instructions {
            match versions.get(&instruction.export.file_key) {
                Some(Ok(version)) => {
                    if self.record.is_processed(&instruction.key(), version) {
                        tracing::debug!(
                            instruction = %instruction.key(),
                            "Already processed, skipping"
                        );
                        summary.skipped += 1;
                    } else {
                        pending.push((instruction, version.clone()));
                    }
                }
                Some(Err(error)) => {
                    summary.record_failure(error.clone().with_context(instruction.key()));
                }
                None => {
                    summary.record_failure(
                        ExportError::new(
                            ExportErrorType::Unknown,
                            "File version was not resolved".to_string(),
                        )
                        .with_context(instruction.key()),
                    );
                }
            }
        }

        if self.is_shutdown_requested() {
            summary.interrupted = true;
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        if self.options.dry_run {
            for (instruction, version) in &pending {
                tracing::info!(
                    instruction = %instruction.key(),
                    version = %version,
                    pipeline = %instruction.pipeline.describe(),
                    "Dry run: would export"
                );
            }
            summary.planned = pending.len();
            let summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        let jobs = self.resolve_urls(pending).await;

        let outcomes: Vec<Outcome> = stream::iter(jobs)
            .map(|job| self.run_job(job))
            .buffer_unordered(self.options.parallel_instructions)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Succeeded => summary.successful += 1,
                Outcome::Failed(error) => summary.record_failure(error),
                Outcome::NotStarted => summary.interrupted = true,
            }
        }

        if let Err(e) = self.record.persist().await {
            tracing::error!(error = %e, "Failed to persist processing record");
            return Err(FigportError::State(format!(
                "Failed to persist processing record: {e}"
            )));
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// One `get_file` call per distinct file key
    async fn resolve_versions(
        &self,
        instructions: &[Instruction],
    ) -> HashMap<FileKey, std::result::Result<String, ExportError>> {
        let mut seen = HashSet::new();
        let keys: Vec<FileKey> = instructions
            .iter()
            .map(|instruction| instruction.export.file_key.clone())
            .filter(|key| seen.insert(key.clone()))
            .collect();

        let responses =
            futures::future::join_all(keys.iter().map(|key| self.api.get_file(key))).await;

        keys.into_iter()
            .zip(responses)
            .map(|(key, response)| {
                let version = match response {
                    Ok(file) => {
                        tracing::debug!(
                            file_key = %key,
                            name = %file.name,
                            version = %file.version,
                            "Resolved file version"
                        );
                        Ok(file.version)
                    }
                    Err(e) => {
                        tracing::error!(file_key = %key, error = %e, "Failed to fetch file");
                        Err(ExportError::new(
                            ExportErrorType::Connection,
                            format!("Failed to fetch file {key}: {e}"),
                        ))
                    }
                };
                (key, version)
            })
            .collect()
    }

    /// Requests render URLs grouped by file and render setting
    async fn resolve_urls(&self, pending: Vec<(Instruction, String)>) -> Vec<Job> {
        let mut groups: Vec<(RenderKey, Vec<NodeId>)> = Vec::new();
        let mut group_index: HashMap<RenderKey, usize> = HashMap::new();

        for (instruction, _) in &pending {
            let export = &instruction.export;
            let render_key = (export.file_key.clone(), export.setting.batch_key());
            let index = *group_index.entry(render_key.clone()).or_insert_with(|| {
                groups.push((render_key, Vec::new()));
                groups.len() - 1
            });
            let nodes = &mut groups[index].1;
            if !nodes.contains(&export.node_id) {
                nodes.push(export.node_id.clone());
            }
        }

        let requests = groups.iter().flat_map(|((file_key, batch_key), nodes)| {
            let (format, scale_bits, contents_only) = *batch_key;
            nodes.chunks(self.options.batch_size).map(move |chunk| async move {
                let response = self
                    .api
                    .get_images(
                        file_key,
                        chunk,
                        format,
                        f32::from_bits(scale_bits),
                        contents_only,
                    )
                    .await;
                (file_key, (format, scale_bits, contents_only), chunk, response)
            })
        });
        let responses = futures::future::join_all(requests).await;

        let mut urls: HashMap<(RenderKey, NodeId), std::result::Result<String, ExportError>> =
            HashMap::new();
        for (file_key, batch_key, chunk, response) in responses {
            tracing::debug!(
                file_key = %file_key,
                nodes = chunk.len(),
                ok = response.is_ok(),
                "Requested render URLs"
            );
            for node_id in chunk {
                let url = match &response {
                    Ok(images) => match (&images.err, images.url_for(node_id.as_str())) {
                        (Some(err), _) => Err(ExportError::new(
                            ExportErrorType::Connection,
                            format!("Figma could not render node {node_id}: {err}"),
                        )),
                        (None, Some(url)) => Ok(url.to_string()),
                        (None, None) => Err(ExportError::new(
                            ExportErrorType::Download,
                            format!("No render URL returned for node {node_id}"),
                        )),
                    },
                    Err(e) => Err(ExportError::new(
                        ExportErrorType::Connection,
                        format!("Failed to request render URLs: {e}"),
                    )),
                };
                urls.insert(((file_key.clone(), batch_key), node_id.clone()), url);
            }
        }

        pending
            .into_iter()
            .map(|(instruction, version)| {
                let export = &instruction.export;
                let lookup = (
                    (export.file_key.clone(), export.setting.batch_key()),
                    export.node_id.clone(),
                );
                let url = urls.get(&lookup).cloned().unwrap_or_else(|| {
                    Err(ExportError::new(
                        ExportErrorType::Unknown,
                        "Render URL was not requested".to_string(),
                    ))
                });
                Job {
                    instruction,
                    version,
                    url,
                }
            })
            .collect()
    }

    async fn run_job(&self, job: Job) -> Outcome {
        if self.is_shutdown_requested() {
            return Outcome::NotStarted;
        }

        let Job {
            instruction,
            version,
            url,
        } = job;
        let key = instruction.key();
        let started = Instant::now();

        let url = match url {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!(instruction = %key, error = %error.message, "No render URL");
                return Outcome::Failed(error.with_context(key));
            }
        };

        log_instruction_start!(key, instruction.pipeline.describe());

        let data = match self.downloader.download(&url).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(instruction = %key, error = %e, "Download failed");
                return Outcome::Failed(
                    ExportError::new(ExportErrorType::Download, e.to_string()).with_context(key),
                );
            }
        };
        let bytes = data.len();

        if let Err(e) = instruction
            .pipeline
            .execute(&instruction, data, None, Vec::new(), None)
            .await
        {
            tracing::error!(instruction = %key, error = %e, "Pipeline failed");
            return Outcome::Failed(
                ExportError::new(ExportErrorType::Pipeline, e.to_string()).with_context(key),
            );
        }

        self.record.record(&key, &version);
        log_instruction_complete!(key, bytes, started.elapsed());
        Outcome::Succeeded
    }
}
