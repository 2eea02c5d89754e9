//! Integration tests for the crawler
//!
//! These tests use wiremock to serve catalog and fan pages and drive the
//! HTTP-backed session through full catalog and fan crawls.

use film_fans::config::{parse_config, Config, MismatchPolicy};
use film_fans::crawler::{crawl_catalog, crawl_fans};
use film_fans::storage::{load_entities, read_json};
use film_fans::{CrawlError, Entity, ResultStore};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir, expected_items: usize) -> Config {
    let toml = format!(
        r#"
[fetch]
user-agent = "film-fans-test/1.0"
fetch-timeout-ms = 2000
content-wait-timeout-ms = 300
poll-interval-ms = 50

[catalog]
url-template = "{base}/films/popular/page/{{page}}/"
page-start = 1
page-end = 2
expected-items = {expected}
output-path = "{dir}/films.json"

[fans]
max-pages = 5
recycle-every = 2
catalog-path = "{dir}/films.json"
output-path = "{dir}/film_fans.json"
"#,
        base = base_url,
        expected = expected_items,
        dir = dir.path().display()
    );
    parse_config(&toml).expect("test config should be valid")
}

fn listing_page(films: &[&str]) -> String {
    let items: String = films
        .iter()
        .map(|slug| {
            format!(
                r#"<li class="listitem poster-container" data-average-rating="4.1">
                    <div class="film-poster" data-film-name="{slug} title">
                        <img src="/posters/{slug}.jpg">
                        <a class="frame" href="/film/{slug}/"></a>
                    </div>
                </li>"#,
                slug = slug
            )
        })
        .collect();
    format!("<html><body><ul class=\"poster-list\">{}</ul></body></html>", items)
}

fn fan_page(users: &[&str]) -> String {
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

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn film(server: &MockServer, name: &str, slug: &str) -> Entity {
    Entity::new(name, format!("{}/film/{}/", server.uri(), slug), "/film/")
}

#[tokio::test]
async fn test_catalog_crawl_writes_snapshot() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/films/popular/page/1/",
        listing_page(&["heat", "alien", "her"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/films/popular/page/2/",
        listing_page(&["zodiac", "memento", "arrival"]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir, 3);
    let films = crawl_catalog(&config).await.unwrap();

    let slugs: Vec<&str> = films.iter().map(|f| f.slug.as_str()).collect();
    assert_eq!(slugs, ["heat", "alien", "her", "zodiac", "memento", "arrival"]);
    assert_eq!(films[0].name, "heat title");
    assert_eq!(films[0].rating.as_deref(), Some("4.1"));
    assert_eq!(
        films[0].poster_url,
        Some(format!("{}/posters/heat.jpg", mock_server.uri()))
    );

    let snapshot = load_entities(&dir.path().join("films.json")).unwrap();
    assert_eq!(snapshot, films);
}

#[tokio::test]
async fn test_catalog_short_page_aborts() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/films/popular/page/1/",
        listing_page(&["heat", "alien"]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir, 3);
    let result = crawl_catalog(&config).await;

    assert!(matches!(
        result,
        Err(CrawlError::StructuralMismatch {
            expected: 3,
            found: 2,
            ..
        })
    ));
    assert!(!dir.path().join("films.json").exists());
}

#[tokio::test]
async fn test_catalog_short_page_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/films/popular/page/1/",
        listing_page(&["heat", "alien"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/films/popular/page/2/",
        listing_page(&["zodiac", "memento", "arrival"]),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), &dir, 3);
    config.catalog.on_count_mismatch = MismatchPolicy::Skip;
    let films = crawl_catalog(&config).await.unwrap();

    assert_eq!(films.len(), 3);
    assert_eq!(films[0].slug, "zodiac");
}

#[tokio::test]
async fn test_fan_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let films = vec![
        film(&mock_server, "Heat", "heat"),
        film(&mock_server, "Alien", "alien"),
        film(&mock_server, "Zodiac", "zodiac"),
    ];
    film_fans::storage::save_entities(&dir.path().join("films.json"), &films).unwrap();

    // Heat: two full pages, then the site answers with an empty page
    mount_page(
        &mock_server,
        "/film/heat/reviews/rated/5/by/activity/page/1/",
        fan_page(&["ana", "ben"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/film/heat/reviews/rated/5/by/activity/page/2/",
        fan_page(&["cy"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/film/heat/reviews/rated/5/by/activity/page/3/",
        "<html><body><p>No reviews.</p></body></html>".to_string(),
    )
    .await;

    // Alien: one page, page 2 is a 404
    mount_page(
        &mock_server,
        "/film/alien/reviews/rated/5/by/activity/page/1/",
        fan_page(&["dee"]),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), &dir, 3);
    config.fans.stop_marker = Some("Zodiac".to_string());

    let summary = crawl_fans(&config).await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.fans_collected, 4);
    assert_eq!(summary.recycles, 1);
    assert_eq!(summary.stopped_at.as_deref(), Some("Zodiac"));

    let results: ResultStore = read_json(&dir.path().join("film_fans.json")).unwrap();
    let heat: Vec<&str> = results
        .get("Heat")
        .unwrap()
        .iter()
        .map(|fan| fan.identifier.as_str())
        .collect();
    assert_eq!(heat, ["ana", "ben", "cy"]);
    assert_eq!(results.get("Alien").unwrap()[0].entity_slug, "alien");
    assert!(!results.contains("Zodiac"));

    // A second run appends to the checkpoint instead of replacing it
    crawl_fans(&config).await.unwrap();
    let results: ResultStore = read_json(&dir.path().join("film_fans.json")).unwrap();
    assert_eq!(results.get("Heat").unwrap().len(), 6);
    assert_eq!(results.get("Alien").unwrap().len(), 2);
}

#[tokio::test]
async fn test_fan_crawl_without_catalog_fails() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://127.0.0.1:9", &dir, 3);

    let result = crawl_fans(&config).await;
    assert!(matches!(result, Err(CrawlError::Storage(_))));
    assert!(!dir.path().join("film_fans.json").exists());
}

#[tokio::test]
async fn test_corrupt_checkpoint_starts_empty() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let films = vec![film(&mock_server, "Her", "her")];
    film_fans::storage::save_entities(&dir.path().join("films.json"), &films).unwrap();
    std::fs::write(dir.path().join("film_fans.json"), "{ not json").unwrap();

    mount_page(
        &mock_server,
        "/film/her/reviews/rated/5/by/activity/page/1/",
        fan_page(&["eve"]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir, 3);
    let summary = crawl_fans(&config).await.unwrap();
    assert_eq!(summary.fans_collected, 1);

    let results: ResultStore = read_json(&dir.path().join("film_fans.json")).unwrap();
    assert_eq!(results.len(), 1);
}
