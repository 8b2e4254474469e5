//! Integration tests for the crawler and query engine
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl → index → query cycle end-to-end against a SQLite index.

use std::path::Path;
use std::sync::Arc;
use sumi_index::config::{parse_config, Config};
use sumi_index::output::{load_spider_entries, load_statistics, ENTRY_SEPARATOR};
use sumi_index::{run_crawl, KeyValueStore, Namespace, QueryProcessor, SqliteStore};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for a site rooted at `prefix`
fn create_test_config(prefix: &str, db_path: &Path) -> Config {
    let toml = format!(
        r#"
[crawler]
seed-url = "{prefix}index.htm"
link-prefix = "{prefix}"
url-limit = 20

[fetch]
timeout-ms = 2000
connect-timeout-ms = 1000
retries = 0
retry-delay-ms = 10

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[storage]
database-path = "{db}"
"#,
        prefix = prefix,
        db = db_path.display()
    );
    parse_config(&toml).expect("valid test config")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a small site:
///
/// - index.htm links to ust_cse.htm, books.htm, missing.htm and flaky.htm
/// - missing.htm is a 404 and never enters the worklist
/// - flaky.htm answers once (during discovery) and fails afterwards
/// - books.htm links to books/book1.htm with a trailing slash
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/pages/index.htm",
        r#"<html><head><title>Test page</title></head><body>
           <p class="right">Last updated 2023-02-01</p>
           <a href="ust_cse.htm">CSE</a>
           <a href="books.htm">Books</a>
           <a href="missing.htm">Missing</a>
           <a href="flaky.htm">Flaky</a>
           <a href="https://elsewhere.example.org/x.htm">Elsewhere</a>
           computer science department
           </body></html>"#,
    )
    .await;

    mount_page(
        server,
        "/pages/ust_cse.htm",
        r#"<html><head><title>Computer Science</title></head><body>
           <a href="index.htm">Home</a>
           computer science computer lab
           <script>var ignored = "computer";</script>
           </body></html>"#,
    )
    .await;

    mount_page(
        server,
        "/pages/books.htm",
        r#"<html><head><title>Books</title></head><body>
           <a href="books/book1.htm/">Book one</a>
           science fiction books
           </body></html>"#,
    )
    .await;

    mount_page(
        server,
        "/pages/books/book1.htm",
        "<html><head><title>Book 1</title></head><body>A book about nothing</body></html>",
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/pages/missing.htm"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pages/flaky.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>flaky</body></html>"))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages/flaky.htm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_then_query() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let prefix = format!("{}/pages/", mock_server.uri());

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&prefix, &db_path);

    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&db_path).unwrap());
    let report = run_crawl(&config, store.clone(), true).await.unwrap();

    // index, ust_cse, books, flaky, book1; missing.htm dropped during discovery
    assert_eq!(report.discovered, 5);
    assert_eq!(report.index.indexed, 4);
    assert_eq!(report.index.fetch_failed, 1);

    // docIds follow the worklist, skipping the page that failed to index
    let doc_id = |page: &str| store.get(Namespace::UrlMapping, &format!("{}{}", prefix, page)).unwrap();
    assert_eq!(doc_id("index.htm"), Some("0".to_string()));
    assert_eq!(doc_id("ust_cse.htm"), Some("1".to_string()));
    assert_eq!(doc_id("books.htm"), Some("2".to_string()));
    assert_eq!(doc_id("books/book1.htm"), Some("3".to_string()));
    assert_eq!(doc_id("flaky.htm"), None);
    assert_eq!(doc_id("missing.htm"), None);

    let processor = QueryProcessor::new(store.clone(), &config);
    let results = processor.search("computer science", None).await.unwrap();

    let urls: Vec<_> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], format!("{}ust_cse.htm", prefix));
    assert!(!urls.contains(&format!("{}books/book1.htm", prefix)));
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));

    let top = &results[0];
    assert_eq!(top.title, "Computer Science");
    assert_eq!(top.keyword_frequency.get("comput"), Some(&2));
    assert_eq!(top.child_links, vec![format!("{}index.htm", prefix)]);

    let home = results
        .iter()
        .find(|r| r.url == format!("{}index.htm", prefix))
        .unwrap();
    assert_eq!(home.date, "2023-02-01");
    assert_eq!(home.child_links.len(), 4);

    let none = processor.search("zebra", None).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_index_survives_reopen() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let prefix = format!("{}/pages/", mock_server.uri());

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&prefix, &db_path);

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&db_path).unwrap());
        run_crawl(&config, store, true).await.unwrap();
    }

    let store = SqliteStore::new(&db_path).unwrap();
    let stats = load_statistics(&store).unwrap();
    assert_eq!(stats.documents(), 4);
    assert_eq!(stats.count(Namespace::Info), 4);
    assert_eq!(stats.count(Namespace::Forward), 4);
    assert_eq!(stats.count(Namespace::ParentChild), 4);

    let entries = load_spider_entries(&store).unwrap();
    assert_eq!(entries.len(), 4);
    let report: String = entries
        .iter()
        .map(sumi_index::output::format_spider_entry)
        .collect();
    assert_eq!(report.matches(ENTRY_SEPARATOR).count(), 4);
}

#[tokio::test]
async fn test_phrase_query_over_crawled_site() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let prefix = format!("{}/pages/", mock_server.uri());

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&prefix, &db_path);

    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&db_path).unwrap());
    run_crawl(&config, store.clone(), true).await.unwrap();

    let processor = QueryProcessor::new(store, &config);
    let results = processor
        .search("science", Some("computer science"))
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.score > 0.0 && r.score.is_finite()));
    assert_eq!(results[0].url, format!("{}ust_cse.htm", prefix));
}
