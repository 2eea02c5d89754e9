//! Storage module for crawl snapshots
//!
//! This module handles the two files a crawl produces:
//! - the catalog snapshot, written once by the catalog crawl
//! - the fan results checkpoint, rewritten after every film

mod json;
mod results;
mod traits;

pub use json::{load_entities, read_json, save_entities, write_json_atomic, JsonCheckpoint};
pub use results::ResultStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};
