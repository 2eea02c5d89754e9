//! In-memory fetch session for tests
//!
//! Pages are looked up by exact URL. Unknown URLs load as an empty 404 page,
//! which is how the target site answers past the end of a listing.

use crate::session::{
    Document, FetchError, FetchSession, NavigateOptions, SessionFactory, WaitOutcome,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Page(String),
    Timeout,
}

#[derive(Debug, Default)]
struct LogState {
    navigations: Vec<String>,
    opened: u32,
    closed: u32,
    live: u32,
    max_live: u32,
}

/// Shared record of what the sessions of one factory did
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptLog(Arc<Mutex<LogState>>);

impl ScriptLog {
    pub(crate) fn navigations(&self) -> Vec<String> {
        self.0.lock().unwrap().navigations.clone()
    }

    /// Number of navigations whose URL starts with `prefix`
    pub(crate) fn visits(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .navigations
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }

    pub(crate) fn opened(&self) -> u32 {
        self.0.lock().unwrap().opened
    }

    pub(crate) fn closed(&self) -> u32 {
        self.0.lock().unwrap().closed
    }

    pub(crate) fn live(&self) -> u32 {
        self.0.lock().unwrap().live
    }

    pub(crate) fn max_live(&self) -> u32 {
        self.0.lock().unwrap().max_live
    }

    fn record_navigation(&self, url: &str) {
        self.0.lock().unwrap().navigations.push(url.to_string());
    }

    fn record_open(&self) {
        let mut state = self.0.lock().unwrap();
        state.opened += 1;
        state.live += 1;
        state.max_live = state.max_live.max(state.live);
    }

    fn record_close(&self) {
        let mut state = self.0.lock().unwrap();
        state.closed += 1;
        state.live -= 1;
    }
}

pub(crate) struct ScriptedFactory {
    pages: Arc<HashMap<String, Scripted>>,
    log: ScriptLog,
    fail_open: bool,
}

impl ScriptedFactory {
    pub(crate) fn new() -> Self {
        Self {
            pages: Arc::new(HashMap::new()),
            log: ScriptLog::default(),
            fail_open: false,
        }
    }

    pub(crate) fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), Scripted::Page(html.into()));
        self
    }

    pub(crate) fn with_timeout(mut self, url: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), Scripted::Timeout);
        self
    }

    pub(crate) fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub(crate) fn log(&self) -> ScriptLog {
        self.log.clone()
    }

    /// Opens a session outside of any manager
    pub(crate) fn session(&self) -> ScriptedSession {
        self.log.record_open();
        ScriptedSession {
            pages: Arc::clone(&self.pages),
            log: self.log.clone(),
            open: true,
        }
    }
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    async fn open(&self) -> Result<ScriptedSession, FetchError> {
        if self.fail_open {
            return Err(FetchError::Open("scripted failure".to_string()));
        }
        Ok(self.session())
    }
}

pub(crate) struct ScriptedSession {
    pages: Arc<HashMap<String, Scripted>>,
    log: ScriptLog,
    open: bool,
}

#[async_trait]
impl FetchSession for ScriptedSession {
    async fn navigate(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> Result<Document, FetchError> {
        self.log.record_navigation(url);
        if !self.open {
            return Err(FetchError::Closed);
        }
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match self.pages.get(url) {
            Some(Scripted::Page(html)) => Ok(Document::new(parsed, 200, html.clone())),
            Some(Scripted::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: options.timeout,
            }),
            None => Ok(Document::new(parsed, 404, "<html><body></body></html>")),
        }
    }

    async fn wait_for_condition(
        &mut self,
        document: Document,
        condition: &(dyn for<'d> Fn(&'d Document) -> bool + Send + Sync),
        _timeout: Duration,
    ) -> Result<WaitOutcome, FetchError> {
        if condition(&document) {
            Ok(WaitOutcome::Satisfied(document))
        } else {
            Ok(WaitOutcome::TimedOut(document))
        }
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if self.open {
            self.open = false;
            self.log.record_close();
        }
        Ok(())
    }
}

/// Markup for a fan page listing `users`
pub(crate) fn fan_page(users: &[String]) -> String {
    let items: String = users
        .iter()
        .map(|user| {
            format!(
                r#"<li class="film-detail"><a class="avatar" href="/{}/"><img></a></li>"#,
                user
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", items)
}

/// `count` distinct user names prefixed with `prefix`
pub(crate) fn users(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}-{}", prefix, i)).collect()
}

/// Markup for a catalog listing page of `films` (name, slug) pairs
pub(crate) fn listing_page(films: &[(String, String)]) -> String {
    let items: String = films
        .iter()
        .map(|(name, slug)| {
            format!(
                r#"<li class="listitem poster-container" data-average-rating="3.9">
                    <div data-film-name="{name}"><img src="/posters/{slug}.jpg"></div>
                    <a class="frame" href="/film/{slug}/">{name}</a>
                </li>"#,
                name = name,
                slug = slug
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", items)
}
