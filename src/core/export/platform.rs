//! Platform compilation
//!
//! Each configured platform becomes one shared [`ImportPipeline`]:
//!
//! ```text
//! pathElementsAppend(platform.path)
//!   THEN format(extension)
//!   THEN (variant_1 AND variant_2 AND ...)   or renameSuffix(suffix)
//!   THEN manifest append
//!   THEN Destination.directory(output_root/directory)
//! ```
//!
//! Assets are then paired with every platform they target to produce the
//! instruction set.

use crate::config::{FigportConfig, PlatformConfig};
use crate::core::pipeline::{
    all, format_override, path_elements_append, rename_suffix, sequence, Destination,
    DirectoryDestination, ImportPipeline, ManifestAppend, PathLockRegistry, StepExt, StepRef,
    TimingHooks,
};
use crate::domain::{
    ExportRequest, ExportSetting, FigportError, FileKey, ImportTarget, Instruction,
    InstructionSetBuilder, NodeId, Result,
};
use std::path::Path;
use std::sync::Arc;

/// A platform ready to receive instructions
pub struct CompiledPlatform {
    pub name: String,
    pub setting: ExportSetting,
    pub pipeline: Arc<ImportPipeline>,
    pub timing: Arc<TimingHooks>,
}

impl CompiledPlatform {
    /// Builds the pipeline for `platform`, writing under `output_root`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the platform's render setting is invalid.
    pub fn compile(
        platform: &PlatformConfig,
        output_root: &Path,
        locks: &Arc<PathLockRegistry>,
    ) -> Result<Self> {
        let setting = platform.export_setting().map_err(|e| {
            FigportError::Configuration(format!("Platform '{}': {e}", platform.name))
        })?;
        let root = output_root.join(platform.directory());

        let mut steps: Vec<StepRef> = Vec::new();
        if !platform.path.is_empty() {
            steps.push(path_elements_append(platform.path.clone()));
        }
        if let Some(extension) = &platform.extension {
            steps.push(format_override(extension.clone()));
        }

        if platform.variants.is_empty() {
            if let Some(suffix) = &platform.suffix {
                steps.push(rename_suffix(suffix.clone()));
            }
        } else {
            let variants = platform
                .variants
                .iter()
                .map(|variant| {
                    let mut branch = Vec::new();
                    if !variant.path.is_empty() {
                        branch.push(path_elements_append(variant.path.clone()));
                    }
                    if let Some(suffix) = &variant.suffix {
                        branch.push(rename_suffix(suffix.clone()));
                    }
                    sequence(branch)
                })
                .collect();
            steps.push(all(variants));
        }

        if let Some(manifest) = &platform.manifest {
            steps.push(Arc::new(ManifestAppend::new(
                root.join(manifest),
                Arc::clone(locks),
            )));
        }

        let destination: StepRef = Arc::new(Destination::Directory(DirectoryDestination::new(
            root,
            Arc::clone(locks),
        )));
        let steps = sequence(steps).then(destination);

        let timing = Arc::new(TimingHooks::new(platform.name.clone()));
        let pipeline = ImportPipeline::new(steps).with_hooks(timing.clone());

        tracing::debug!(
            platform = %platform.name,
            setting = %setting,
            pipeline = %pipeline.describe(),
            "Compiled platform pipeline"
        );

        Ok(Self {
            name: platform.name.clone(),
            setting,
            pipeline: Arc::new(pipeline),
            timing,
        })
    }

    /// Logs the platform's pipeline timing
    pub fn log_timing(&self) {
        tracing::info!(
            platform = %self.name,
            succeeded = self.timing.succeeded(),
            failed = self.timing.failed(),
            busy_ms = self.timing.busy_for().map(|d| d.as_millis() as u64).unwrap_or(0),
            "Platform finished"
        );
    }
}

/// Compiles the configured platforms, optionally restricted to `only`
///
/// All platforms share one lock registry, so outputs from different
/// platforms that resolve to the same file are serialized too.
///
/// # Errors
///
/// Returns a configuration error for an unknown name in `only` or an invalid
/// render setting.
pub fn compile_platforms(
    config: &FigportConfig,
    only: &[String],
    locks: &Arc<PathLockRegistry>,
) -> Result<Vec<CompiledPlatform>> {
    if let Some(unknown) = only.iter().find(|name| config.platform(name).is_none()) {
        return Err(FigportError::Configuration(format!(
            "Unknown platform '{unknown}'"
        )));
    }

    let output_root = Path::new(&config.export.output_directory);
    config
        .platforms
        .iter()
        .filter(|platform| only.is_empty() || only.contains(&platform.name))
        .map(|platform| CompiledPlatform::compile(platform, output_root, locks))
        .collect()
}

/// One instruction per (asset, targeted platform)
///
/// # Errors
///
/// Returns a validation error for a malformed file key, node id or name.
pub fn build_instructions(
    config: &FigportConfig,
    platforms: &[CompiledPlatform],
) -> Result<Vec<Instruction>> {
    let mut builder = InstructionSetBuilder::new();

    for asset in &config.assets {
        let file_key = FileKey::new(asset.file_key.as_str()).map_err(FigportError::Validation)?;
        let node_id = NodeId::new(asset.node_id.as_str()).map_err(FigportError::Validation)?;

        for platform in platforms.iter().filter(|p| asset.targets(&p.name)) {
            let target = ImportTarget::new(asset.name.as_str())
                .map_err(FigportError::Validation)?
                .with_path_elements(asset.path.clone());
            let export = ExportRequest::new(file_key.clone(), node_id.clone(), platform.setting);
            builder.push(
                Instruction::new(export, target, Arc::clone(&platform.pipeline))
                    .with_platform(platform.name.as_str()),
            );
        }
    }

    tracing::debug!(
        assets = config.assets.len(),
        platforms = platforms.len(),
        instructions = builder.len(),
        "Built instruction set"
    );
    Ok(builder.build())
}
