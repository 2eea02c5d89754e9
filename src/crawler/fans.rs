//! Per-film fan crawl
//!
//! Walks a window of the catalog chosen by start and stop markers, walking
//! each film's fan stream and checkpointing after every film. Progress through
//! the catalog is an explicit [`Phase`] so the window logic can be checked
//! without any session.

use crate::config::{Config, SelectorConfig};
use crate::crawler::extract::extract_fans;
use crate::crawler::walker::{PageStreamWalker, WalkOutcome};
use crate::crawler::PageTemplate;
use crate::model::{Associate, Entity};
use crate::session::{FetchError, FetchSession, SessionFactory, SessionManager};
use crate::storage::{CheckpointStore, ResultStore};
use crate::{ConfigError, CrawlError};
use chrono::{DateTime, Utc};

/// Film names bounding the window of films to crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    /// First film to crawl; crawling starts at the first film when unset
    pub start: Option<String>,
    /// First film not to crawl; crawling runs to the end when unset
    pub stop: Option<String>,
}

impl Markers {
    pub fn new(start: Option<String>, stop: Option<String>) -> Self {
        Self { start, stop }
    }

    /// Phase before the first film is seen
    pub fn initial_phase(&self) -> Phase {
        if self.start.is_some() {
            Phase::Skipping
        } else {
            Phase::Active
        }
    }

    fn is_start(&self, name: &str) -> bool {
        self.start.as_deref() == Some(name)
    }

    fn is_stop(&self, name: &str) -> bool {
        self.stop.as_deref() == Some(name)
    }
}

/// Where the crawl stands relative to the marker window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the start marker; films are passed over
    Skipping,
    /// Inside the window; the current film is crawled
    Active,
    /// At or past the stop marker; nothing more is crawled
    Done,
}

impl Phase {
    /// Moves to the phase that applies to the film called `name`
    ///
    /// The start film is crawled, the stop film is not. A stop marker seen
    /// before the start marker has no effect.
    pub fn advance(self, name: &str, markers: &Markers) -> Phase {
        match self {
            Phase::Skipping if markers.is_start(name) => {
                if markers.is_stop(name) {
                    Phase::Done
                } else {
                    Phase::Active
                }
            }
            Phase::Skipping => Phase::Skipping,
            Phase::Active if markers.is_stop(name) => Phase::Done,
            Phase::Active => Phase::Active,
            Phase::Done => Phase::Done,
        }
    }
}

/// What a fan crawl did
#[derive(Debug, Clone)]
pub struct FanCrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Films passed over before the start marker
    pub skipped: usize,
    /// Films crawled, including failed ones
    pub processed: usize,
    /// Films whose crawl failed before any page was walked
    pub failed: usize,
    /// Films whose fan stream was cut short by a fetch or extraction failure
    pub truncated: usize,
    /// Fan pages that yielded fans, across all films
    pub pages_walked: u32,
    /// Fan records added to the results
    pub fans_collected: usize,
    pub recycles: u32,
    /// The stop marker film, if the crawl reached it
    pub stopped_at: Option<String>,
}

impl FanCrawlSummary {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            skipped: 0,
            processed: 0,
            failed: 0,
            truncated: 0,
            pages_walked: 0,
            fans_collected: 0,
            recycles: 0,
            stopped_at: None,
        }
    }
}

/// Drives fan stream walks across the catalog
#[derive(Debug, Clone)]
pub struct FanCrawl {
    walker: PageStreamWalker,
    template: PageTemplate,
    selectors: SelectorConfig,
    markers: Markers,
    recycle_every: u32,
    dedupe: bool,
}

impl FanCrawl {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            walker: PageStreamWalker::new(
                config.fans.max_pages,
                config.selectors.fan_item.clone(),
                config.fetch.fetch_timeout(),
            ),
            template: PageTemplate::new(&config.fans.url_template)?,
            selectors: config.selectors.clone(),
            markers: Markers::new(
                config.fans.start_marker.clone(),
                config.fans.stop_marker.clone(),
            ),
            recycle_every: config.fans.recycle_every.max(1),
            dedupe: config.fans.dedupe,
        })
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Crawls the fans of every film in the marker window
    ///
    /// Results from `checkpoint` are loaded first and the checkpoint is
    /// flushed after every film. Failures inside one film are logged and the
    /// crawl moves on; checkpoint write failures and session lifecycle
    /// failures end the run. The session is released before returning.
    pub async fn run<F, C>(
        &self,
        entities: &[Entity],
        manager: &mut SessionManager<F>,
        checkpoint: &C,
    ) -> Result<FanCrawlSummary, CrawlError>
    where
        F: SessionFactory,
        C: CheckpointStore + ?Sized,
    {
        let mut results = checkpoint.load();
        let mut summary = FanCrawlSummary::new();

        let mut session = Some(manager.acquire().await?);
        let result = self
            .process(
                entities,
                manager,
                &mut session,
                &mut results,
                checkpoint,
                &mut summary,
            )
            .await;

        let released = match session.take() {
            Some(session) => manager.release(session).await,
            None => Ok(()),
        };

        result?;
        released?;

        summary.finished_at = Some(Utc::now());
        tracing::info!(
            "All films have been processed: {} crawled, {} skipped, {} failed, {} fans added",
            summary.processed,
            summary.skipped,
            summary.failed,
            summary.fans_collected
        );
        Ok(summary)
    }

    async fn process<F, C>(
        &self,
        entities: &[Entity],
        manager: &mut SessionManager<F>,
        session: &mut Option<F::Session>,
        results: &mut ResultStore,
        checkpoint: &C,
        summary: &mut FanCrawlSummary,
    ) -> Result<(), CrawlError>
    where
        F: SessionFactory,
        C: CheckpointStore + ?Sized,
    {
        let mut phase = self.markers.initial_phase();
        let mut since_recycle = 0;

        for entity in entities {
            phase = phase.advance(&entity.name, &self.markers);
            match phase {
                Phase::Skipping => {
                    tracing::debug!("Skipping film: {}", entity.name);
                    summary.skipped += 1;
                    continue;
                }
                Phase::Done => {
                    tracing::info!("Stopping at film: {}", entity.name);
                    summary.stopped_at = Some(entity.name.clone());
                    break;
                }
                Phase::Active => {}
            }

            tracing::info!("Processing film: {}", entity.name);
            if !entity.has_slug() {
                tracing::warn!("Film {} has no slug in its link: {}", entity.name, entity.link);
            }
            let active = session.as_mut().ok_or(FetchError::Closed)?;

            match self.collect(active, entity).await {
                Ok(outcome) => {
                    summary.pages_walked += outcome.pages_collected;
                    if !outcome.end.is_clean() {
                        tracing::warn!(
                            "Fan stream for {} cut short: {:?}; keeping {} fans",
                            entity.name,
                            outcome.end,
                            outcome.items.len()
                        );
                        summary.truncated += 1;
                    }
                    let added = results.append(&entity.name, outcome.items, self.dedupe);
                    checkpoint.flush(results)?;
                    summary.fans_collected += added;
                    tracing::info!("Finished processing film: {} ({} fans)", entity.name, added);
                }
                Err(e) => {
                    tracing::error!("Error processing film: {}: {}", entity.name, e);
                    summary.failed += 1;
                }
            }

            summary.processed += 1;
            since_recycle += 1;

            if since_recycle >= self.recycle_every {
                if let Some(current) = session.take() {
                    *session = Some(manager.recycle(current).await?);
                }
                summary.recycles += 1;
                since_recycle = 0;
            }
        }

        if phase == Phase::Skipping {
            if let Some(start) = &self.markers.start {
                tracing::warn!("Start film '{}' never appeared in the catalog", start);
                return Err(CrawlError::StartMarkerNotFound(start.clone()));
            }
        }

        Ok(())
    }

    /// Walks the fan stream of one film
    async fn collect<S>(
        &self,
        session: &mut S,
        entity: &Entity,
    ) -> Result<WalkOutcome<Associate>, CrawlError>
    where
        S: FetchSession + ?Sized,
    {
        self.template.check_entity_link(&entity.link)?;

        let outcome = self
            .walker
            .walk(
                session,
                &entity.name,
                |page| self.template.entity_url(&entity.link, page),
                |document| extract_fans(document, &self.selectors, &entity.slug),
            )
            .await;

        Ok(outcome)
    }
}
