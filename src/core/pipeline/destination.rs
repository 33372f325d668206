//! Terminal pipeline steps that persist outputs

use super::lock::PathLockRegistry;
use super::step::Step;
use crate::domain::{validate_path_segment, FigportError, Instruction, PipelineOutput, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where pipeline outputs end up
///
/// Destinations always return no outputs.
#[derive(Debug)]
pub enum Destination {
    /// Discards everything
    None,

    /// Writes files below a root directory
    Directory(DirectoryDestination),
}

#[async_trait]
impl Step for Destination {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        match self {
            Destination::None => {}
            Destination::Directory(directory) => directory.write(instruction, input).await?,
        }
        Ok(PipelineOutput::none())
    }

    fn describe(&self) -> String {
        match self {
            Destination::None => "Destination.none".to_string(),
            Destination::Directory(directory) => format!(
                "Destination.directory(directory: {})",
                directory.root.display()
            ),
        }
    }
}

/// Writes each output to `root/<path elements>/<name>.<extension>`
///
/// The target path is locked for the duration of the write.
#[derive(Debug, Clone)]
pub struct DirectoryDestination {
    root: PathBuf,
    locks: Arc<PathLockRegistry>,
}

impl DirectoryDestination {
    pub fn new(root: impl Into<PathBuf>, locks: Arc<PathLockRegistry>) -> Self {
        Self {
            root: root.into(),
            locks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location of `output`, always below the root
    ///
    /// # Errors
    ///
    /// Returns a validation error if a name or path element would leave the root.
    pub fn resolve_path(
        &self,
        instruction: &Instruction,
        output: &PipelineOutput,
    ) -> Result<PathBuf> {
        Ok(self.root.join(relative_path(instruction, output)?))
    }

    /// Write `output` under the path lock for its resolved location
    pub async fn write(&self, instruction: &Instruction, output: &PipelineOutput) -> Result<()> {
        let path = self.resolve_path(instruction, output)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FigportError::Io(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let _guard = self.locks.acquire(&path).await?;
        tokio::fs::write(&path, &output.data)
            .await
            .map_err(|e| FigportError::Io(format!("Failed to write {}: {e}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            bytes = output.data.len(),
            "Wrote asset"
        );
        Ok(())
    }
}

/// `<path elements>/<name>.<extension>` after applying the output's overrides
///
/// # Errors
///
/// Returns a validation error for a segment that is empty, `.`, `..`,
/// absolute or contains a separator.
pub fn relative_path(instruction: &Instruction, output: &PipelineOutput) -> Result<PathBuf> {
    let target = instruction.resolve_target(output);
    let extension = instruction.resolve_extension(output);
    let file_name = format!("{}.{extension}", target.output_name);

    for segment in target
        .path_elements
        .iter()
        .chain([&target.output_name, &file_name])
    {
        validate_path_segment(segment).map_err(|e| {
            FigportError::Validation(format!("{e} in target of {}", instruction.key()))
        })?;
    }

    let mut path: PathBuf = target.path_elements.iter().collect();
    path.push(file_name);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::ImportPipeline;
    use crate::domain::{ExportFormat, ExportRequest, ExportSetting, ImportTarget};

    fn instruction() -> Instruction {
        Instruction::new(
            ExportRequest::new(
                "abc".parse().unwrap(),
                "1:2".parse().unwrap(),
                ExportSetting::new(ExportFormat::Svg, 1.0).unwrap(),
            ),
            ImportTarget::new("logo")
                .unwrap()
                .with_path_elements(vec!["brand".to_string()]),
            Arc::new(ImportPipeline::new(Arc::new(Destination::None))),
        )
    }

    #[test]
    fn test_relative_path_uses_merged_target() {
        let output = PipelineOutput::default();
        assert_eq!(
            relative_path(&instruction(), &output).unwrap(),
            PathBuf::from("brand/logo.svg")
        );

        let output = PipelineOutput::default()
            .with_output_name("logo_dark")
            .with_path_elements(vec!["dark".to_string(), "brand".to_string()])
            .with_format("xml");
        assert_eq!(
            relative_path(&instruction(), &output).unwrap(),
            PathBuf::from("dark/brand/logo_dark.xml")
        );
    }

    #[test]
    fn test_relative_path_rejects_escaping_segments() {
        let escaping = [
            PipelineOutput::default().with_output_name("../../escaped"),
            PipelineOutput::default().with_path_elements(vec!["..".to_string()]),
            PipelineOutput::default().with_path_elements(vec!["/tmp".to_string()]),
            PipelineOutput::default().with_format("png/../../x"),
        ];

        for output in escaping {
            assert!(matches!(
                relative_path(&instruction(), &output),
                Err(FigportError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_directory_destination_writes_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let destination = Destination::Directory(DirectoryDestination::new(
            temp_dir.path(),
            Arc::new(PathLockRegistry::new()),
        ));

        let output = PipelineOutput::default().with_data(b"<svg/>".to_vec());
        let outputs = destination.process(&instruction(), &output).await.unwrap();

        assert!(outputs.is_empty());
        let written = std::fs::read(temp_dir.path().join("brand/logo.svg")).unwrap();
        assert_eq!(written, b"<svg/>");
    }

    #[tokio::test]
    async fn test_none_destination_discards() {
        let outputs = Destination::None
            .process(&instruction(), &PipelineOutput::default())
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }
}
