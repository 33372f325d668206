//! Export orchestration
//!
//! This module provides the core export logic for Figport, including:
//! - Compiling configured platforms into pipelines and instructions
//! - Export coordination and orchestration
//! - Summary and reporting

pub mod coordinator;
pub mod platform;
pub mod summary;

pub use coordinator::{CoordinatorOptions, ExportCoordinator};
pub use platform::{build_instructions, compile_platforms, CompiledPlatform};
pub use summary::{ExportError, ExportErrorType, ExportSummary};
