//! Loaded pages and the elements queried from them
//!
//! Documents keep the raw markup and parse it on demand, so they can be held
//! across await points.

use crate::session::FetchError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A loaded page
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    status: u16,
    body: String,
}

impl Document {
    pub fn new(url: Url, status: u16, body: impl Into<String>) -> Self {
        Self {
            url,
            status,
            body: body.into(),
        }
    }

    /// Final URL of the page, after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status the page was served with
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns every element matching `selector`, in document order
    pub fn query_all(&self, selector: &str) -> Result<Vec<Element>, FetchError> {
        let selector = parse_selector(selector)?;
        let html = Html::parse_document(&self.body);
        let elements = html.select(&selector).map(Element::from_ref).collect();
        Ok(elements)
    }

    /// Counts the elements matching `selector`
    pub fn count(&self, selector: &str) -> Result<usize, FetchError> {
        let selector = parse_selector(selector)?;
        let html = Html::parse_document(&self.body);
        let count = html.select(&selector).count();
        Ok(count)
    }

    /// Returns true if at least one element matches `selector`
    pub fn contains(&self, selector: &str) -> Result<bool, FetchError> {
        let selector = parse_selector(selector)?;
        let html = Html::parse_document(&self.body);
        let found = html.select(&selector).next().is_some();
        Ok(found)
    }

    /// Resolves a possibly relative link against the page URL
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.url.join(href).ok().map(|url| url.to_string())
    }
}

/// An element detached from its document
///
/// Carries its attributes, text and markup so nested lookups can run
/// without the parent document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    html: String,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            name: value.name().to_string(),
            attrs: value
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            text: element.text().collect::<String>().trim().to_string(),
            html: element.html(),
        }
    }

    /// Tag name, lowercased
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns every element inside this one matching `selector`
    pub fn query_all(&self, selector: &str) -> Result<Vec<Element>, FetchError> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        let elements = fragment.select(&selector).map(Element::from_ref).collect();
        Ok(elements)
    }

    /// Returns the first element inside this one matching `selector`
    pub fn query_first(&self, selector: &str) -> Result<Option<Element>, FetchError> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        let element = fragment.select(&selector).next().map(Element::from_ref);
        Ok(element)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
