//! Domain models and types for Figport.
//!
//! This module contains the data exchanged between the Figma client, the
//! export coordinator and the import pipelines.
//!
//! # Overview
//!
//! - **Strongly-typed identifiers** ([`FileKey`], [`NodeId`])
//! - **Export requests** ([`ExportRequest`], [`ExportSetting`], [`ExportFormat`])
//! - **Import targets** ([`ImportTarget`], [`ImportTargetOverride`]) and their merge rule
//! - **Instructions** ([`Instruction`]) and **pipeline outputs** ([`PipelineOutput`])
//! - **Error types** ([`FigportError`], [`FigmaApiError`]) and the [`Result`] alias
//!
//! # Type Safety
//!
//! ```rust
//! use figport::domain::{FileKey, NodeId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let file_key = FileKey::new("FpKcPBk2q3wDhYzTfwBDq1")?;
//! let node_id = NodeId::new("12:345")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: FileKey = node_id;
//! # Ok(())
//! # }
//! ```
//!
//! # Import Targets
//!
//! ```rust
//! use figport::domain::{ImportTarget, ImportTargetOverride};
//!
//! let initial = ImportTarget::new("bar")
//!     .unwrap()
//!     .with_path_elements(vec!["x".to_string()])
//!     .with_format("png");
//! let target = ImportTargetOverride::new(Some("foo".to_string()), vec![], None);
//!
//! let merged = initial.merge(&target);
//! assert_eq!(merged.output_name, "foo");
//! assert_eq!(merged.path_elements, vec!["x".to_string()]);
//! assert_eq!(merged.format.as_deref(), Some("png"));
//! ```

pub mod errors;
pub mod export;
pub mod ids;
pub mod instruction;
pub mod output;
pub mod result;
pub mod target;

// Re-export commonly used types for convenience
pub use errors::{FigmaApiError, FigportError};
pub use export::{ExportFormat, ExportRequest, ExportSetting};
pub use ids::{FileKey, NodeId};
pub use instruction::{Instruction, InstructionSetBuilder};
pub use output::PipelineOutput;
pub use result::Result;
pub use target::{validate_path_segment, ImportTarget, ImportTargetOverride};
