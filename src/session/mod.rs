//! Fetch sessions
//!
//! A fetch session is a stateful page-loading context (an HTTP client, or a
//! browser with one open tab). The crawler only talks to it through the
//! [`FetchSession`] trait:
//! - `navigate` loads a URL into a [`Document`]
//! - `wait_for_condition` blocks until a predicate holds on the page or a deadline passes
//! - `close` releases everything the session holds
//!
//! Sessions are opened by a [`SessionFactory`] and owned by the
//! [`SessionManager`], which recycles them to bound resource growth.

mod document;
mod http;
mod manager;
#[cfg(test)]
pub(crate) mod scripted;

pub use document::{Document, Element};
pub use http::{HttpSession, HttpSessionFactory};
pub use manager::SessionManager;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a fetch session
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out after {timeout:?} loading {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Failed to open fetch session: {0}")]
    Open(String),

    #[error("Fetch session is closed")]
    Closed,
}

/// Per-navigation settings
///
/// A navigation finishes once the document itself has arrived; nothing waits
/// for subresources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub timeout: Duration,
}

impl NavigateOptions {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Result of waiting for a condition on a loaded page
#[derive(Debug, Clone)]
pub enum WaitOutcome {
    /// The condition held on this document
    Satisfied(Document),
    /// The deadline passed; this is the last document observed
    TimedOut(Document),
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    pub fn into_document(self) -> Document {
        match self {
            Self::Satisfied(document) | Self::TimedOut(document) => document,
        }
    }
}

/// A stateful page-loading context
#[async_trait]
pub trait FetchSession: Send {
    /// Loads `url` and returns the resulting document
    async fn navigate(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> Result<Document, FetchError>;

    /// Waits until `condition` holds for the page shown in `document`
    ///
    /// Returns `TimedOut` with the last observed document when `timeout`
    /// elapses first; only session failures are errors.
    async fn wait_for_condition(
        &mut self,
        document: Document,
        condition: &(dyn for<'d> Fn(&'d Document) -> bool + Send + Sync),
        timeout: Duration,
    ) -> Result<WaitOutcome, FetchError>;

    /// Releases every resource held by the session
    async fn close(&mut self) -> Result<(), FetchError>;
}

/// Opens fresh fetch sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: FetchSession;

    async fn open(&self) -> Result<Self::Session, FetchError>;
}
