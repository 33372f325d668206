//! Import pipelines
//!
//! Every instruction carries a shared [`ImportPipeline`]: a tree of
//! [`Step`]s built from the combinators in [`step`], usually ending in a
//! [`Destination`]. Steps may fan one input out into many outputs; outputs
//! reaching the same file are serialized through a [`PathLockRegistry`].
//!
//! ```no_run
//! use figport::core::pipeline::{
//!     all, path_elements_append, rename_suffix, sequence, DirectoryDestination, Destination,
//!     ImportPipeline, PathLockRegistry, StepExt, StepRef,
//! };
//! use std::sync::Arc;
//!
//! let locks = Arc::new(PathLockRegistry::new());
//! let write: StepRef = Arc::new(Destination::Directory(DirectoryDestination::new(
//!     "./assets/ios",
//!     locks,
//! )));
//!
//! let steps = all(vec![
//!     sequence(vec![rename_suffix("@2x"), path_elements_append(vec!["2x".into()])]),
//!     sequence(vec![rename_suffix("@3x"), path_elements_append(vec!["3x".into()])]),
//! ])
//! .then(write);
//!
//! let pipeline = Arc::new(ImportPipeline::new(steps));
//! ```

pub mod destination;
pub mod import_pipeline;
pub mod lock;
pub mod step;
pub mod steps;

pub use destination::{relative_path, Destination, DirectoryDestination};
pub use import_pipeline::{CombinedHooks, ImportPipeline, NoHooks, PipelineHooks, TimingHooks};
pub use lock::PathLockRegistry;
pub use step::{
    all, any, described, if_else, pass_through, sequence, side_effect, transform, Action, And,
    Described, IfElse, Or, PassThrough, Predicate, SideEffect, Step, StepExt, StepRef, Then,
};
pub use steps::{
    format_override, path_elements_append, rename, rename_suffix, ManifestAppend, ManifestEntry,
};
