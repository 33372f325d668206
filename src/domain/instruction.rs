//! Instructions: the unit of work handed to the export coordinator
//!
//! An [`Instruction`] pairs one export request with its initial import target
//! and the pipeline that will process the fetched bytes. Instructions are
//! created up front, once per (node, platform) combination, and never change
//! afterwards.

use super::export::ExportRequest;
use super::output::PipelineOutput;
use super::target::ImportTarget;
use crate::core::pipeline::ImportPipeline;
use std::fmt;
use std::sync::Arc;

/// Immutable export request + import target + pipeline
#[derive(Clone)]
pub struct Instruction {
    pub export: ExportRequest,
    pub target: ImportTarget,
    pub pipeline: Arc<ImportPipeline>,

    /// Platform whose pipeline this is; part of the record key
    pub platform: Option<String>,
}

impl Instruction {
    pub fn new(export: ExportRequest, target: ImportTarget, pipeline: Arc<ImportPipeline>) -> Self {
        Self {
            export,
            target,
            pipeline,
            platform: None,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Stable identity used by the processing record
    ///
    /// Format: `{file_key}/{node_id}/{format}@{scale}[:{platform}]/{path...}/{output_name}`.
    /// Two platforms sharing a render setting still get distinct keys.
    pub fn key(&self) -> String {
        let mut key = format!(
            "{}/{}/{}",
            self.export.file_key, self.export.node_id, self.export.setting
        );
        if let Some(platform) = &self.platform {
            key.push(':');
            key.push_str(platform);
        }
        for element in &self.target.path_elements {
            key.push('/');
            key.push_str(element);
        }
        key.push('/');
        key.push_str(&self.target.output_name);
        key
    }

    /// Initial target with the output's overrides applied
    pub fn resolve_target(&self, output: &PipelineOutput) -> ImportTarget {
        self.target.merge(&output.target)
    }

    pub fn resolve_output_name(&self, output: &PipelineOutput) -> String {
        self.resolve_target(output).output_name
    }

    pub fn resolve_path_elements(&self, output: &PipelineOutput) -> Vec<String> {
        self.resolve_target(output).path_elements
    }

    pub fn resolve_extension(&self, output: &PipelineOutput) -> String {
        self.target
            .resolve_extension(&output.target, self.export.setting.format)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("export", &self.export)
            .field("target", &self.target)
            .field("platform", &self.platform)
            .field("pipeline", &self.pipeline.describe())
            .finish()
    }
}

/// Collects instructions, mirroring how selection logic emits them
///
/// # Examples
///
/// ```
/// use figport::core::pipeline::{Destination, ImportPipeline};
/// use figport::domain::{ExportRequest, ExportSetting, ImportTarget, InstructionSetBuilder};
/// use std::sync::Arc;
///
/// let pipeline = Arc::new(ImportPipeline::new(Arc::new(Destination::None)));
/// let mut builder = InstructionSetBuilder::new();
/// builder.add(
///     ExportRequest::new(
///         "abc".parse().unwrap(),
///         "1:2".parse().unwrap(),
///         ExportSetting::default(),
///     ),
///     ImportTarget::new("logo").unwrap(),
///     &pipeline,
/// );
/// assert_eq!(builder.build().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InstructionSetBuilder {
    instructions: Vec<Instruction>,
}

impl InstructionSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        export: ExportRequest,
        target: ImportTarget,
        pipeline: &Arc<ImportPipeline>,
    ) -> &mut Self {
        self.push(Instruction::new(export, target, Arc::clone(pipeline)))
    }

    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn build(self) -> Vec<Instruction> {
        self.instructions
    }
}
