//! HTTP-backed fetch session
//!
//! Each session owns its own reqwest client, so recycling a session drops the
//! connection pool along with it. Pages are returned for any status code, the
//! way a browser renders error pages; the crawler decides from the content
//! whether a page is useful.

use crate::config::FetchConfig;
use crate::session::{
    Document, FetchError, FetchSession, NavigateOptions, SessionFactory, WaitOutcome,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Fetch session backed by a dedicated HTTP client
pub struct HttpSession {
    id: u64,
    client: Option<Client>,
    poll_interval: Duration,
}

impl HttpSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl FetchSession for HttpSession {
    async fn navigate(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> Result<Document, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::Closed)?;
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!("Session {} loading {}", self.id, url);

        let load = async {
            let response = client
                .get(parsed)
                .send()
                .await
                .map_err(|e| FetchError::Http {
                    url: url.to_string(),
                    source: e,
                })?;

            let status = response.status().as_u16();
            let final_url = response.url().clone();
            let body = response.text().await.map_err(|e| FetchError::Http {
                url: url.to_string(),
                source: e,
            })?;

            if status >= 400 {
                tracing::debug!("HTTP {} for {}", status, final_url);
            }

            Ok(Document::new(final_url, status, body))
        };

        match tokio::time::timeout(options.timeout, load).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: options.timeout,
            }),
        }
    }

    /// Re-fetches the page every poll interval until `condition` holds
    async fn wait_for_condition(
        &mut self,
        document: Document,
        condition: &(dyn for<'d> Fn(&'d Document) -> bool + Send + Sync),
        timeout: Duration,
    ) -> Result<WaitOutcome, FetchError> {
        let deadline = Instant::now() + timeout;
        let mut document = document;

        loop {
            if condition(&document) {
                return Ok(WaitOutcome::Satisfied(document));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitOutcome::TimedOut(document));
            }

            tokio::time::sleep(self.poll_interval.min(remaining)).await;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitOutcome::TimedOut(document));
            }

            let url = document.url().to_string();
            match self.navigate(&url, &NavigateOptions::new(remaining)).await {
                Ok(next) => document = next,
                Err(FetchError::Timeout { .. }) => return Ok(WaitOutcome::TimedOut(document)),
                Err(e) => return Err(e),
            }
        }
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if self.client.take().is_some() {
            tracing::debug!("Session {} closed", self.id);
        }
        Ok(())
    }
}

/// Opens [`HttpSession`]s with the configured user agent
pub struct HttpSessionFactory {
    config: FetchConfig,
    next_id: AtomicU64,
}

impl HttpSessionFactory {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, FetchError> {
        let client = Client::builder()
            .user_agent(self.config.user_agent.clone())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Open(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Session {} opened", id);

        Ok(HttpSession {
            id,
            client: Some(client),
            poll_interval: self.config.poll_interval(),
        })
    }
}
