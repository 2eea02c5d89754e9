use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for film-fans
///
/// Every section is optional; the defaults reproduce a crawl of the popular
/// films listing on letterboxd.com.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fans: FansConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Fetch session behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-page navigation timeout (milliseconds)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// How long a catalog page may take to show the expected item count (milliseconds)
    #[serde(
        rename = "content-wait-timeout-ms",
        default = "default_content_wait_timeout_ms"
    )]
    pub content_wait_timeout_ms: u64,

    /// Delay between re-checks while waiting for content (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl FetchConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn content_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.content_wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            content_wait_timeout_ms: default_content_wait_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// What to do when a catalog page never shows the expected item count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Fail the whole catalog crawl
    #[default]
    Abort,
    /// Drop the page and move on
    Skip,
    /// Keep whatever items the page does hold
    Accept,
}

/// Catalog crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Listing URL with a `{page}` placeholder
    #[serde(rename = "url-template", default = "default_catalog_template")]
    pub url_template: String,

    /// First listing page (inclusive)
    #[serde(rename = "page-start", default = "default_page_start")]
    pub page_start: u32,

    /// Last listing page (inclusive)
    #[serde(rename = "page-end", default = "default_page_end")]
    pub page_end: u32,

    /// Number of films every listing page is expected to hold
    #[serde(rename = "expected-items", default = "default_expected_items")]
    pub expected_items: usize,

    #[serde(rename = "on-count-mismatch", default)]
    pub on_count_mismatch: MismatchPolicy,

    /// Where the catalog snapshot is written
    #[serde(rename = "output-path", default = "default_catalog_path")]
    pub output_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url_template: default_catalog_template(),
            page_start: default_page_start(),
            page_end: default_page_end(),
            expected_items: default_expected_items(),
            on_count_mismatch: MismatchPolicy::default(),
            output_path: default_catalog_path(),
        }
    }
}

/// Per-film fan crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FansConfig {
    /// Fan page URL with `{link}` and `{page}` placeholders
    #[serde(rename = "url-template", default = "default_fans_template")]
    pub url_template: String,

    /// Upper bound on fan pages walked per film
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Films processed per fetch session before it is recycled
    #[serde(rename = "recycle-every", default = "default_recycle_every")]
    pub recycle_every: u32,

    /// Film name to start processing at (inclusive); from the first film when unset
    #[serde(rename = "start-marker", default)]
    pub start_marker: Option<String>,

    /// Film name to stop at (exclusive); runs to the end when unset
    #[serde(rename = "stop-marker", default)]
    pub stop_marker: Option<String>,

    /// Catalog snapshot to read films from
    #[serde(rename = "catalog-path", default = "default_catalog_path")]
    pub catalog_path: String,

    /// Results checkpoint, read at start and rewritten after every film
    #[serde(rename = "output-path", default = "default_fans_path")]
    pub output_path: String,

    /// Drop fans already recorded for a film instead of appending duplicates
    #[serde(default)]
    pub dedupe: bool,
}

impl Default for FansConfig {
    fn default() -> Self {
        Self {
            url_template: default_fans_template(),
            max_pages: default_max_pages(),
            recycle_every: default_recycle_every(),
            start_marker: None,
            stop_marker: None,
            catalog_path: default_catalog_path(),
            output_path: default_fans_path(),
            dedupe: false,
        }
    }
}

/// CSS selectors and attribute names for the target site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "catalog-item")]
    pub catalog_item: String,

    /// Counted while waiting for a listing page to finish loading
    #[serde(rename = "catalog-name")]
    pub catalog_name: String,

    #[serde(rename = "catalog-name-attr")]
    pub catalog_name_attr: String,

    #[serde(rename = "catalog-rating-attr")]
    pub catalog_rating_attr: String,

    #[serde(rename = "catalog-poster")]
    pub catalog_poster: String,

    #[serde(rename = "catalog-link")]
    pub catalog_link: String,

    /// Path segment preceding the slug in a film link
    #[serde(rename = "slug-marker")]
    pub slug_marker: String,

    /// One fan entry; its absence marks the end of a fan stream
    #[serde(rename = "fan-item")]
    pub fan_item: String,

    #[serde(rename = "fan-avatar")]
    pub fan_avatar: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            catalog_item: "li.listitem.poster-container".to_string(),
            catalog_name: "[data-film-name]".to_string(),
            catalog_name_attr: "data-film-name".to_string(),
            catalog_rating_attr: "data-average-rating".to_string(),
            catalog_poster: "img".to_string(),
            catalog_link: "a.frame".to_string(),
            slug_marker: "/film/".to_string(),
            fan_item: "li.film-detail".to_string(),
            fan_avatar: "a.avatar".to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("film-fans/{}", env!("CARGO_PKG_VERSION"))
}

fn default_fetch_timeout_ms() -> u64 {
    60_000
}

fn default_content_wait_timeout_ms() -> u64 {
    50_000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_catalog_template() -> String {
    "https://letterboxd.com/films/popular/page/{page}/".to_string()
}

fn default_page_start() -> u32 {
    1
}

fn default_page_end() -> u32 {
    500
}

fn default_expected_items() -> usize {
    72
}

fn default_catalog_path() -> String {
    "films.json".to_string()
}

fn default_fans_template() -> String {
    "{link}reviews/rated/5/by/activity/page/{page}/".to_string()
}

fn default_max_pages() -> u32 {
    50
}

fn default_recycle_every() -> u32 {
    10
}

fn default_fans_path() -> String {
    "film_fans.json".to_string()
}
