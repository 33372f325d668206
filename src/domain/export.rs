//! Export requests: what to ask the Figma API to render

use super::ids::{FileKey, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Render format supported by the images endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpg,
    Svg,
    Pdf,
}

impl ExportFormat {
    /// Value used in the `format` query parameter
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Extension written to disk when nothing overrides it
    pub fn file_extension(&self) -> &'static str {
        self.as_api_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!(
                "Invalid export format '{other}'. Must be one of: png, jpg, svg, pdf"
            )),
        }
    }
}

/// How a node should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSetting {
    pub format: ExportFormat,

    /// Render scale, in (0, 4]
    pub scale: f32,

    /// Exclude overlapping content when rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents_only: Option<bool>,
}

impl ExportSetting {
    pub const MAX_SCALE: f32 = 4.0;

    pub fn new(format: ExportFormat, scale: f32) -> Result<Self, String> {
        if !(scale > 0.0 && scale <= Self::MAX_SCALE) {
            return Err(format!(
                "Invalid export scale {scale}. Must be > 0 and <= {}",
                Self::MAX_SCALE
            ));
        }
        Ok(Self {
            format,
            scale,
            contents_only: None,
        })
    }

    pub fn with_contents_only(mut self, contents_only: bool) -> Self {
        self.contents_only = Some(contents_only);
        self
    }

    /// Hashable identity used to batch image requests sharing a render setting
    pub fn batch_key(&self) -> (ExportFormat, u32, Option<bool>) {
        (self.format, self.scale.to_bits(), self.contents_only)
    }
}

impl Default for ExportSetting {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            scale: 1.0,
            contents_only: None,
        }
    }
}

impl fmt::Display for ExportSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}x", self.format, self.scale)
    }
}

/// One thing to fetch from the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub file_key: FileKey,
    pub node_id: NodeId,
    pub setting: ExportSetting,
}

impl ExportRequest {
    pub fn new(file_key: FileKey, node_id: NodeId, setting: ExportSetting) -> Self {
        Self {
            file_key,
            node_id,
            setting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpg);
        assert!("webp".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_setting_scale_bounds() {
        assert!(ExportSetting::new(ExportFormat::Png, 0.0).is_err());
        assert!(ExportSetting::new(ExportFormat::Png, 4.5).is_err());
        assert!(ExportSetting::new(ExportFormat::Png, f32::NAN).is_err());
        assert!(ExportSetting::new(ExportFormat::Png, 4.0).is_ok());
    }

    #[test]
    fn test_batch_key_distinguishes_scale() {
        let one = ExportSetting::new(ExportFormat::Png, 1.0).unwrap();
        let three = ExportSetting::new(ExportFormat::Png, 3.0).unwrap();
        assert_ne!(one.batch_key(), three.batch_key());
        assert_eq!(one.batch_key(), ExportSetting::default().batch_key());
    }

    #[test]
    fn test_setting_display() {
        let setting = ExportSetting::new(ExportFormat::Svg, 2.0).unwrap();
        assert_eq!(setting.to_string(), "svg@2x");
    }
}
