//! JSON snapshot files
//!
//! Snapshots are written to a temporary file in the target directory, synced,
//! and renamed over the target, so the previous snapshot stays intact until the
//! new one is complete.

use crate::model::Entity;
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::ResultStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reads and deserializes a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| StorageError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Serializes `value` as pretty JSON and atomically replaces `path`
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let write_error = |e: std::io::Error| StorageError::Write {
        path: path.display().to_string(),
        source: e,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_error)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    serde_json::to_writer_pretty(&mut tmp, value).map_err(|e| StorageError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    tmp.write_all(b"\n").map_err(write_error)?;
    tmp.flush().map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;

    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// Reads the catalog snapshot
pub fn load_entities(path: &Path) -> StorageResult<Vec<Entity>> {
    read_json(path)
}

/// Writes the catalog snapshot, replacing any previous one
pub fn save_entities(path: &Path, entities: &[Entity]) -> StorageResult<()> {
    write_json_atomic(path, entities)
}

/// Results checkpoint stored as a single JSON file
#[derive(Debug, Clone)]
pub struct JsonCheckpoint {
    path: PathBuf,
}

impl JsonCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpoint {
    fn load(&self) -> ResultStore {
        if !self.path.exists() {
            tracing::info!(
                "No checkpoint at {}, starting with empty results",
                self.path.display()
            );
            return ResultStore::new();
        }

        match read_json::<ResultStore>(&self.path) {
            Ok(results) => {
                tracing::info!(
                    "Loaded checkpoint with {} films and {} fans",
                    results.len(),
                    results.total_associates()
                );
                results
            }
            Err(e) => {
                tracing::error!("Error reading existing fans data: {}", e);
                ResultStore::new()
            }
        }
    }

    fn flush(&self, results: &ResultStore) -> StorageResult<()> {
        write_json_atomic(&self.path, results)?;
        tracing::debug!(
            "Checkpoint written to {} ({} films)",
            self.path.display(),
            results.len()
        );
        Ok(())
    }
}
