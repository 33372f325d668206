//! Import targets: where and how a fetched artifact ends up on disk
//!
//! An [`ImportTarget`] is attached to an instruction before processing begins
//! and is always fully specified. Pipeline steps attach an
//! [`ImportTargetOverride`] to their outputs instead, where every field is
//! optional. [`ImportTarget::merge`] combines the two field by field.

use super::export::ExportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Checks that `segment` names exactly one entry inside its parent directory
///
/// Rejects empty segments, `.`, `..`, separators and absolute or prefixed
/// paths, so joined targets can't leave their destination root.
pub fn validate_path_segment(segment: &str) -> Result<(), String> {
    let mut components = Path::new(segment).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || segment.contains(['/', '\\']) {
        return Err(format!("Invalid path segment '{segment}'"));
    }
    Ok(())
}

/// Initial target of an instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTarget {
    /// Base file name, without extension
    pub output_name: String,

    /// Directory hierarchy below the destination root
    #[serde(default)]
    pub path_elements: Vec<String>,

    /// Extension override; falls back to the export format when unset
    #[serde(default)]
    pub format: Option<String>,
}

impl ImportTarget {
    pub fn new(output_name: impl Into<String>) -> Result<Self, String> {
        let output_name = output_name.into();
        if output_name.trim().is_empty() {
            return Err("Import target output name cannot be empty".to_string());
        }
        Ok(Self {
            output_name,
            path_elements: Vec::new(),
            format: None,
        })
    }

    pub fn with_path_elements(mut self, path_elements: Vec<String>) -> Self {
        self.path_elements = path_elements;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Applies an override: each non-empty override field replaces ours
    pub fn merge(&self, target: &ImportTargetOverride) -> ImportTarget {
        ImportTarget {
            output_name: target
                .output_name
                .as_ref()
                .filter(|name| !name.is_empty())
                .unwrap_or(&self.output_name)
                .clone(),
            path_elements: if target.path_elements.is_empty() {
                self.path_elements.clone()
            } else {
                target.path_elements.clone()
            },
            format: target
                .format
                .as_ref()
                .filter(|format| !format.is_empty())
                .or(self.format.as_ref())
                .cloned(),
        }
    }

    /// Extension after merging, falling back to the declared export format
    pub fn resolve_extension(
        &self,
        target: &ImportTargetOverride,
        export_format: ExportFormat,
    ) -> String {
        self.merge(target)
            .format
            .unwrap_or_else(|| export_format.file_extension().to_string())
    }
}

/// Target adjustments produced by a pipeline step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTargetOverride {
    pub output_name: Option<String>,

    /// Empty means "keep the initial path"
    pub path_elements: Vec<String>,

    pub format: Option<String>,
}

impl ImportTargetOverride {
    pub fn new(
        output_name: Option<String>,
        path_elements: Vec<String>,
        format: Option<String>,
    ) -> Self {
        Self {
            output_name,
            path_elements,
            format,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.output_name.is_none() && self.path_elements.is_empty() && self.format.is_none()
    }
}
