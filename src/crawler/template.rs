//! Page URL templates
//!
//! Listing and fan pages are addressed by a URL pattern with a `{page}`
//! placeholder; fan pages additionally take the film's link as `{link}`.

use crate::{ConfigError, CrawlError};
use url::Url;

const PAGE: &str = "{page}";
const LINK: &str = "{link}";

/// A URL pattern for one paginated resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    raw: String,
}

impl PageTemplate {
    /// Creates a template, requiring a `{page}` placeholder
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        if !raw.contains(PAGE) {
            return Err(ConfigError::InvalidTemplate(format!(
                "'{}' has no {} placeholder",
                raw, PAGE
            )));
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Checks the template works as a standalone listing URL
    pub fn check_listing(&self) -> Result<(), ConfigError> {
        if self.raw.contains(LINK) {
            return Err(ConfigError::InvalidTemplate(format!(
                "listing template '{}' cannot use {}",
                self.raw, LINK
            )));
        }
        Url::parse(&self.listing_url(1))
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidTemplate(format!("'{}': {}", self.raw, e)))
    }

    /// Checks the template works as a per-film URL
    pub fn check_per_entity(&self) -> Result<(), ConfigError> {
        if !self.raw.contains(LINK) {
            return Err(ConfigError::InvalidTemplate(format!(
                "'{}' has no {} placeholder",
                self.raw, LINK
            )));
        }
        Url::parse(&self.entity_url("https://example.com/film/sample/", 1))
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidTemplate(format!("'{}': {}", self.raw, e)))
    }

    pub fn listing_url(&self, page: u32) -> String {
        self.raw.replace(PAGE, &page.to_string())
    }

    pub fn entity_url(&self, link: &str, page: u32) -> String {
        self.raw
            .replace(LINK, link)
            .replace(PAGE, &page.to_string())
    }

    /// Resolves the first fan page for `link`, failing if the result is not a URL
    pub fn check_entity_link(&self, link: &str) -> Result<(), CrawlError> {
        Url::parse(&self.entity_url(link, 1))
            .map(|_| ())
            .map_err(|e| CrawlError::Template {
                template: self.raw.clone(),
                link: link.to_string(),
                message: e.to_string(),
            })
    }
}
