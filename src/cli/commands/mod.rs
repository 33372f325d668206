//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod assets;
pub mod init;
pub mod status;
pub mod validate;
