//! film-fans: a resumable catalog and fan crawler
//!
//! This crate walks a paginated film catalog, then walks every film's paginated
//! list of five-star raters, checkpointing the accumulated fan lists after each
//! film so an interrupted run can pick up where it left off.

pub mod config;
pub mod crawler;
pub mod model;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] session::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Expected {expected} items on {url}, found {found}")]
    StructuralMismatch {
        url: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot build page URL from '{template}' for '{link}': {message}")]
    Template {
        template: String,
        link: String,
        message: String,
    },

    #[error("Start marker '{0}' was not found in the catalog")]
    StartMarkerNotFound(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Associate, Entity};
pub use storage::ResultStore;
