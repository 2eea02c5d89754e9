//! Storage traits and error types
//!
//! This module defines the checkpoint interface used by the fan crawl and the
//! errors raised by snapshot files.

use crate::storage::ResultStore;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing snapshot files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home for the fan crawl's accumulated results
///
/// `flush` must leave a complete snapshot behind: a reader never sees a
/// partially written file.
pub trait CheckpointStore {
    /// Loads the previous snapshot
    ///
    /// A missing or unreadable checkpoint yields an empty store; the failure is
    /// logged rather than returned.
    fn load(&self) -> ResultStore;

    /// Replaces the durable snapshot with `results`
    fn flush(&self, results: &ResultStore) -> StorageResult<()>;
}
