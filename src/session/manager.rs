//! Fetch session lifecycle
//!
//! Long-lived page-loading contexts accumulate memory, so the crawl
//! periodically swaps its session for a fresh one. Sessions are passed by
//! value: `recycle` consumes the old session and closes it before opening the
//! replacement, so two sessions are never live at once.

use crate::session::{FetchError, FetchSession, SessionFactory};

/// Opens, recycles and releases fetch sessions
pub struct SessionManager<F: SessionFactory> {
    factory: F,
    opened: u32,
    recycled: u32,
}

impl<F: SessionFactory> SessionManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            opened: 0,
            recycled: 0,
        }
    }

    /// Opens a new session
    pub async fn acquire(&mut self) -> Result<F::Session, FetchError> {
        let session = self.factory.open().await?;
        self.opened += 1;
        tracing::info!("Fetch session opened ({} so far)", self.opened);
        Ok(session)
    }

    /// Closes `session` completely, then opens a fresh one
    ///
    /// Blocks until the replacement is ready.
    pub async fn recycle(&mut self, session: F::Session) -> Result<F::Session, FetchError> {
        tracing::info!("Recycling fetch session to release resources");
        self.release(session).await?;
        self.recycled += 1;
        self.acquire().await
    }

    /// Closes `session` for good
    pub async fn release(&mut self, mut session: F::Session) -> Result<(), FetchError> {
        session.close().await?;
        tracing::info!("Fetch session closed");
        Ok(())
    }

    /// Number of sessions opened so far
    pub fn opened(&self) -> u32 {
        self.opened
    }

    /// Number of recycles performed so far
    pub fn recycled(&self) -> u32 {
        self.recycled
    }
}
