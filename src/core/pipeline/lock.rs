//! Per-path write locks
//!
//! Writers to the same file must not interleave, writers to different files
//! must not wait on each other. [`PathLockRegistry`] hands out one async mutex
//! per normalized absolute path. Entries are created on first use and kept
//! for the registry's lifetime.
//!
//! The registry is an ordinary value: create one per export run and share it
//! (behind `Arc`) with every destination that can touch the same files.

use crate::domain::{FigportError, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
pub struct PathLockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl PathLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`
    ///
    /// The lock is held until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative path cannot be made absolute.
    pub async fn acquire(&self, path: &Path) -> Result<OwnedMutexGuard<()>> {
        let key = normalize(path)?;
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(key).or_default())
        };
        Ok(lock.lock_owned().await)
    }

    /// Number of distinct paths seen so far
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Absolute path with `.` and `..` resolved lexically
///
/// Symlinks are not followed; the file usually doesn't exist yet.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        FigportError::Io(format!("Failed to resolve path {}: {e}", path.display()))
    })?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
