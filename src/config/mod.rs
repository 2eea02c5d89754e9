//! Configuration module for film-fans
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use film_fans::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("film-fans.toml")).unwrap();
//! println!("Fan pages per film: {}", config.fans.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, FansConfig, FetchConfig, MismatchPolicy, SelectorConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
