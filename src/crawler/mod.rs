//! Crawl drivers
//!
//! This module contains the crawling logic, including:
//! - URL templates for listing and fan pages
//! - The page stream walker shared by every paginated resource
//! - Extraction of films and fans from loaded pages
//! - The catalog crawl and the per-film fan crawl

mod catalog;
mod extract;
mod fans;
mod template;
mod walker;

pub use catalog::{run_catalog, CatalogCrawl};
pub use extract::{extract_entities, extract_fans};
pub use fans::{FanCrawl, FanCrawlSummary, Markers, Phase};
pub use template::PageTemplate;
pub use walker::{PageStreamWalker, StreamEnd, WalkOutcome};

use crate::config::Config;
use crate::model::Entity;
use crate::session::{HttpSessionFactory, SessionManager};
use crate::storage::{load_entities, JsonCheckpoint};
use crate::CrawlError;
use std::path::Path;

/// Crawls the configured catalog page range over HTTP
///
/// Writes the catalog snapshot to `catalog.output-path` and returns the films.
pub async fn crawl_catalog(config: &Config) -> Result<Vec<Entity>, CrawlError> {
    let crawl = CatalogCrawl::new(config)?;
    let mut manager = SessionManager::new(HttpSessionFactory::new(config.fetch.clone()));
    let pages = config.catalog.page_start..=config.catalog.page_end;

    tracing::info!(
        "Crawling catalog pages {} to {}",
        config.catalog.page_start,
        config.catalog.page_end
    );
    run_catalog(
        &crawl,
        &mut manager,
        pages,
        Path::new(&config.catalog.output_path),
    )
    .await
}

/// Crawls the fans of every film in the catalog snapshot over HTTP
///
/// Reads films from `fans.catalog-path` and checkpoints to `fans.output-path`.
/// A missing or unreadable catalog snapshot is an error.
pub async fn crawl_fans(config: &Config) -> Result<FanCrawlSummary, CrawlError> {
    let entities = load_entities(Path::new(&config.fans.catalog_path))?;
    tracing::info!(
        "Loaded {} films from {}",
        entities.len(),
        config.fans.catalog_path
    );

    let crawl = FanCrawl::new(config)?;
    let mut manager = SessionManager::new(HttpSessionFactory::new(config.fetch.clone()));
    let checkpoint = JsonCheckpoint::new(&config.fans.output_path);
    tracing::info!("Checkpointing fans to {}", checkpoint.path().display());

    crawl.run(&entities, &mut manager, &checkpoint).await
}
