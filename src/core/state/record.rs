//! Processing record
//!
//! Remembers which instructions were already written for a given Figma file
//! version, so unchanged assets are skipped on the next run. The record is
//! keyed by [`Instruction::key`](crate::domain::Instruction::key); a new file
//! version invalidates every entry for that key.

use crate::domain::{FigportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Tracks processed instructions across runs
#[async_trait]
pub trait ProcessingRecord: Send + Sync {
    /// Whether `key` was recorded for exactly this file `version`
    fn is_processed(&self, key: &str, version: &str) -> bool;

    /// Marks `key` as processed at `version`, replacing any older entry
    fn record(&self, key: &str, version: &str);

    /// Writes pending changes to durable storage
    async fn persist(&self) -> Result<()>;

    /// Snapshot of every entry, ordered by key
    fn entries(&self) -> Vec<(String, RecordEntry)>;
}

/// One processed instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Figma file version the output was produced from
    pub version: String,

    /// When the entry was last written
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordFile {
    #[serde(default)]
    entries: BTreeMap<String, RecordEntry>,
}

/// Processing record stored as a JSON document on disk
///
/// The file is read once on construction. [`persist`](ProcessingRecord::persist)
/// writes to a sibling temporary file and renames it over the original, so a
/// crash mid-write leaves the previous record intact.
pub struct JsonFileProcessingRecord {
    path: PathBuf,
    state: Mutex<RecordFile>,
}

impl JsonFileProcessingRecord {
    /// Opens the record at `path`, starting empty if the file doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                FigportError::State(format!(
                    "Processing record {} is corrupt: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RecordFile::default(),
            Err(e) => {
                return Err(FigportError::State(format!(
                    "Failed to read processing record {}: {e}",
                    path.display()
                )))
            }
        };

        tracing::debug!(
            path = %path.display(),
            entries = state.entries.len(),
            "Loaded processing record"
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, RecordFile> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProcessingRecord for JsonFileProcessingRecord {
    fn is_processed(&self, key: &str, version: &str) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.version == version)
    }

    fn record(&self, key: &str, version: &str) {
        self.lock().entries.insert(
            key.to_string(),
            RecordEntry {
                version: version.to_string(),
                recorded_at: Utc::now(),
            },
        );
    }

    async fn persist(&self) -> Result<()> {
        let contents = {
            let state = self.lock();
            serde_json::to_vec_pretty(&*state)?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "record".to_string());
        let temp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        tokio::fs::write(&temp, &contents).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(FigportError::State(format!(
                "Failed to replace processing record {}: {e}",
                self.path.display()
            )));
        }

        tracing::debug!(path = %self.path.display(), "Persisted processing record");
        Ok(())
    }

    fn entries(&self) -> Vec<(String, RecordEntry)> {
        self.lock()
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }
}

/// Record used when tracking is disabled: nothing is ever processed
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProcessingRecord;

#[async_trait]
impl ProcessingRecord for NoOpProcessingRecord {
    fn is_processed(&self, _key: &str, _version: &str) -> bool {
        false
    }

    fn record(&self, _key: &str, _version: &str) {}

    async fn persist(&self) -> Result<()> {
        Ok(())
    }

    fn entries(&self) -> Vec<(String, RecordEntry)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let record = JsonFileProcessingRecord::open(dir.path().join("processed.json")).unwrap();
        assert!(record.is_empty());
        assert!(!record.is_processed("abc/1:2/png@1x/logo", "42"));
    }

    #[test]
    fn test_version_change_invalidates_entry() {
        let dir = TempDir::new().unwrap();
        let record = JsonFileProcessingRecord::open(dir.path().join("processed.json")).unwrap();

        record.record("abc/1:2/png@1x/logo", "42");
        assert!(record.is_processed("abc/1:2/png@1x/logo", "42"));
        assert!(!record.is_processed("abc/1:2/png@1x/logo", "43"));

        record.record("abc/1:2/png@1x/logo", "43");
        assert!(record.is_processed("abc/1:2/png@1x/logo", "43"));
        assert_eq!(record.len(), 1);
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".figport").join("processed.json");

        let record = JsonFileProcessingRecord::open(&path).unwrap();
        record.record("abc/1:2/svg@1x/icons/home", "7");
        record.persist().await.unwrap();

        let reloaded = JsonFileProcessingRecord::open(&path).unwrap();
        assert!(reloaded.is_processed("abc/1:2/svg@1x/icons/home", "7"));

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_state_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonFileProcessingRecord::open(&path);
        assert!(matches!(result, Err(FigportError::State(_))));
    }

    #[tokio::test]
    async fn test_noop_record_never_remembers() {
        let record = NoOpProcessingRecord;
        record.record("key", "1");
        assert!(!record.is_processed("key", "1"));
        assert!(record.entries().is_empty());
        record.persist().await.unwrap();
    }
}
