//! Catalog crawl
//!
//! Walks a fixed range of listing pages. Every listing page is expected to
//! hold the same number of films, so each page is polled until that many
//! film names are present. A page that never fills up means the site layout
//! changed; what happens next is set by [`MismatchPolicy`].

use crate::config::{Config, MismatchPolicy, SelectorConfig};
use crate::crawler::extract::extract_entities;
use crate::crawler::PageTemplate;
use crate::model::Entity;
use crate::session::{Document, FetchSession, NavigateOptions, SessionFactory, SessionManager};
use crate::storage::save_entities;
use crate::{ConfigError, CrawlError};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Builds the ordered film list from the catalog listing
#[derive(Debug, Clone)]
pub struct CatalogCrawl {
    template: PageTemplate,
    expected_items: usize,
    on_mismatch: MismatchPolicy,
    selectors: SelectorConfig,
    navigate: NavigateOptions,
    content_wait: Duration,
}

impl CatalogCrawl {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            template: PageTemplate::new(&config.catalog.url_template)?,
            expected_items: config.catalog.expected_items,
            on_mismatch: config.catalog.on_count_mismatch,
            selectors: config.selectors.clone(),
            navigate: NavigateOptions::new(config.fetch.fetch_timeout()),
            content_wait: config.fetch.content_wait_timeout(),
        })
    }

    /// Crawls every page in `pages`, returning films in page order
    ///
    /// Any navigation failure aborts the crawl, as does a short page under
    /// [`MismatchPolicy::Abort`].
    pub async fn run<S>(
        &self,
        session: &mut S,
        pages: RangeInclusive<u32>,
    ) -> Result<Vec<Entity>, CrawlError>
    where
        S: FetchSession + ?Sized,
    {
        let mut entities = Vec::new();

        for page in pages {
            let films = self.crawl_page(session, page).await?;
            tracing::info!("Page {} processed. Collected {} films.", page, films.len());
            entities.extend(films);
        }

        Ok(entities)
    }

    async fn crawl_page<S>(&self, session: &mut S, page: u32) -> Result<Vec<Entity>, CrawlError>
    where
        S: FetchSession + ?Sized,
    {
        let url = self.template.listing_url(page);
        let document = session.navigate(&url, &self.navigate).await?;

        let expected = self.expected_items;
        let name_selector = self.selectors.catalog_name.clone();
        let filled = move |doc: &Document| {
            doc.count(&name_selector)
                .map(|found| found == expected)
                .unwrap_or(false)
        };

        let outcome = session
            .wait_for_condition(document, &filled, self.content_wait)
            .await?;

        let satisfied = outcome.is_satisfied();
        let document = outcome.into_document();

        if !satisfied {
            let found = document.count(&self.selectors.catalog_name)?;
            match self.on_mismatch {
                MismatchPolicy::Abort => {
                    return Err(CrawlError::StructuralMismatch {
                        url,
                        expected,
                        found,
                    });
                }
                MismatchPolicy::Skip => {
                    tracing::warn!(
                        "Skipping page {}: expected {} films, found {}",
                        page,
                        expected,
                        found
                    );
                    return Ok(Vec::new());
                }
                MismatchPolicy::Accept => {
                    tracing::warn!(
                        "Page {} holds {} films instead of {}, keeping them",
                        page,
                        found,
                        expected
                    );
                }
            }
        }

        Ok(extract_entities(&document, &self.selectors)?)
    }
}

/// Runs a catalog crawl with a managed session and writes the snapshot
///
/// The snapshot at `output` is only replaced when every page succeeded.
pub async fn run_catalog<F>(
    crawl: &CatalogCrawl,
    manager: &mut SessionManager<F>,
    pages: RangeInclusive<u32>,
    output: &Path,
) -> Result<Vec<Entity>, CrawlError>
where
    F: SessionFactory,
{
    let mut session = manager.acquire().await?;
    let result = crawl.run(&mut session, pages).await;
    let released = manager.release(session).await;

    let entities = result?;
    released?;

    save_entities(output, &entities)?;
    tracing::info!(
        "All pages processed. {} films written to {}.",
        entities.len(),
        output.display()
    );
    Ok(entities)
}
