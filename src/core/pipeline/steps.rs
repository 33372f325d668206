//! Reusable steps: output naming and the shared asset manifest

use super::destination::relative_path;
use super::lock::PathLockRegistry;
use super::step::{transform, Step, StepRef};
use crate::domain::{FigportError, Instruction, PipelineOutput, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;

/// Replaces the output name
pub fn rename(output_name: impl Into<String>) -> StepRef {
    let output_name = output_name.into();
    transform(format!("rename({output_name})"), move |_, input| {
        Ok(input.clone().with_output_name(output_name.clone()).single())
    })
}

/// Appends `suffix` to the current output name (e.g. "@2x")
pub fn rename_suffix(suffix: impl Into<String>) -> StepRef {
    let suffix = suffix.into();
    transform(format!("renameSuffix({suffix})"), move |instruction, input| {
        let output_name = format!("{}{suffix}", instruction.resolve_output_name(input));
        Ok(input.clone().with_output_name(output_name).single())
    })
}

/// Appends directories to the current path
pub fn path_elements_append(elements: Vec<String>) -> StepRef {
    transform(
        format!("pathElementsAppend({})", elements.join("/")),
        move |instruction, input| {
            let mut path_elements = instruction.resolve_path_elements(input);
            path_elements.extend(elements.iter().cloned());
            Ok(input.clone().with_path_elements(path_elements).single())
        },
    )
}

/// Replaces the file extension
pub fn format_override(format: impl Into<String>) -> StepRef {
    let format = format.into();
    transform(format!("format({format})"), move |_, input| {
        Ok(input.clone().with_format(format.clone()).single())
    })
}

/// One line of the manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Relative to the destination root
    pub path: String,
    pub format: String,
    pub sha256: String,
    pub bytes: usize,
}

impl ManifestEntry {
    pub fn for_output(instruction: &Instruction, output: &PipelineOutput) -> Result<Self> {
        Ok(Self {
            name: instruction.resolve_output_name(output),
            path: relative_path(instruction, output)?
                .to_string_lossy()
                .replace('\\', "/"),
            format: instruction.resolve_extension(output),
            sha256: format!("{:x}", Sha256::digest(&output.data)),
            bytes: output.data.len(),
        })
    }
}

/// Keeps one JSON line per output path in a manifest shared by many branches
///
/// Re-exporting a path replaces its line, so the manifest reflects the
/// latest bytes on disk across runs. The manifest is locked through the
/// same registry the destinations use. Inputs pass through unchanged.
pub struct ManifestAppend {
    manifest: PathBuf,
    locks: Arc<PathLockRegistry>,
}

impl ManifestAppend {
    pub fn new(manifest: impl Into<PathBuf>, locks: Arc<PathLockRegistry>) -> Self {
        Self {
            manifest: manifest.into(),
            locks,
        }
    }

    /// Current entries; a missing manifest has none
    async fn read_entries(&self) -> Result<Vec<ManifestEntry>> {
        let contents = match tokio::fs::read_to_string(&self.manifest).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(FigportError::Io(format!(
                    "Failed to read manifest {}: {e}",
                    self.manifest.display()
                )))
            }
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    FigportError::Serialization(format!(
                        "Corrupt manifest line in {}: {e}",
                        self.manifest.display()
                    ))
                })
            })
            .collect()
    }
}

#[async_trait]
impl Step for ManifestAppend {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        let entry = ManifestEntry::for_output(instruction, input)?;

        if let Some(parent) = self.manifest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let _guard = self.locks.acquire(&self.manifest).await?;
        let mut entries = self.read_entries().await?;
        match entries.iter_mut().find(|existing| existing.path == entry.path) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        let mut contents = Vec::new();
        for entry in &entries {
            contents.extend(serde_json::to_vec(entry)?);
            contents.push(b'\n');
        }
        tokio::fs::write(&self.manifest, contents).await.map_err(|e| {
            FigportError::Io(format!(
                "Failed to write manifest {}: {e}",
                self.manifest.display()
            ))
        })?;

        Ok(input.clone().single())
    }

    fn describe(&self) -> String {
        format!("manifest({})", self.manifest.display())
    }
}
