//! Page stream walker
//!
//! Walks pages 1, 2, 3... of one paginated resource until the stream runs
//! dry. The source never says which page is last, so the walk ends when:
//! - the content marker is missing from a page
//! - a page holds the marker but yields no items
//! - a page fails to load (no retry; the rest of the stream is abandoned)
//! - the page cap is reached
//!
//! None of these are errors: the walker always hands back what it collected.

use crate::session::{Document, FetchError, FetchSession, NavigateOptions};
use std::time::Duration;

/// Why a stream walk stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The content marker was absent on this page
    NoContent { page: u32 },
    /// The marker was present but nothing could be extracted
    EmptyPage { page: u32 },
    /// The page could not be loaded
    FetchFailed { page: u32, error: String },
    /// Items could not be extracted from the page
    ExtractFailed { page: u32, error: String },
    /// Every page up to the cap yielded items
    PageCap,
}

impl StreamEnd {
    /// True when the stream ended on its own rather than through a failure
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            Self::NoContent { .. } | Self::EmptyPage { .. } | Self::PageCap
        )
    }
}

/// Items collected from one stream
#[derive(Debug, Clone)]
pub struct WalkOutcome<T> {
    /// Items in page order, then in-page order
    pub items: Vec<T>,
    /// Pages that contributed items
    pub pages_collected: u32,
    pub end: StreamEnd,
}

/// Walks one paginated stream at a time
#[derive(Debug, Clone)]
pub struct PageStreamWalker {
    max_pages: u32,
    content_marker: String,
    navigate: NavigateOptions,
}

impl PageStreamWalker {
    /// Creates a walker visiting at most `max_pages` pages per stream
    ///
    /// `content_marker` is a selector that matches on every page that still
    /// has items.
    pub fn new(max_pages: u32, content_marker: impl Into<String>, fetch_timeout: Duration) -> Self {
        Self {
            max_pages,
            content_marker: content_marker.into(),
            navigate: NavigateOptions::new(fetch_timeout),
        }
    }

    /// Walks the stream named `stream_key`
    ///
    /// `url_for` maps a page number (starting at 1) to its URL and `extract`
    /// pulls the items out of a loaded page.
    pub async fn walk<S, T, U, E>(
        &self,
        session: &mut S,
        stream_key: &str,
        url_for: U,
        extract: E,
    ) -> WalkOutcome<T>
    where
        S: FetchSession + ?Sized,
        U: Fn(u32) -> String,
        E: Fn(&Document) -> Result<Vec<T>, FetchError>,
    {
        let mut items = Vec::new();
        let mut pages_collected = 0;

        for page in 1..=self.max_pages {
            let url = url_for(page);

            let document = match session.navigate(&url, &self.navigate).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Error on page {} for {}: {}", page, stream_key, e);
                    return WalkOutcome {
                        items,
                        pages_collected,
                        end: StreamEnd::FetchFailed {
                            page,
                            error: e.to_string(),
                        },
                    };
                }
            };

            let found = match document.contains(&self.content_marker) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Cannot probe page {} for {}: {}", page, stream_key, e);
                    return WalkOutcome {
                        items,
                        pages_collected,
                        end: StreamEnd::ExtractFailed {
                            page,
                            error: e.to_string(),
                        },
                    };
                }
            };

            if !found {
                tracing::info!(
                    "No more items for {} at page {} (HTTP {})",
                    stream_key,
                    page,
                    document.status()
                );
                return WalkOutcome {
                    items,
                    pages_collected,
                    end: StreamEnd::NoContent { page },
                };
            }

            let page_items = match extract(&document) {
                Ok(page_items) => page_items,
                Err(e) => {
                    tracing::warn!("Cannot extract page {} for {}: {}", page, stream_key, e);
                    return WalkOutcome {
                        items,
                        pages_collected,
                        end: StreamEnd::ExtractFailed {
                            page,
                            error: e.to_string(),
                        },
                    };
                }
            };

            if page_items.is_empty() {
                tracing::info!("Page {} for {} had no items", page, stream_key);
                return WalkOutcome {
                    items,
                    pages_collected,
                    end: StreamEnd::EmptyPage { page },
                };
            }

            tracing::info!(
                "Page {} for {} collected {} items",
                page,
                stream_key,
                page_items.len()
            );
            items.extend(page_items);
            pages_collected += 1;
        }

        tracing::info!(
            "Reached the {}-page cap for {}",
            self.max_pages,
            stream_key
        );
        WalkOutcome {
            items,
            pages_collected,
            end: StreamEnd::PageCap,
        }
    }
}
