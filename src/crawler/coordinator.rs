//! Crawler coordinator - main crawl orchestration logic
//!
//! A crawl runs in two phases:
//! - Discovery: expand the seed into the ordered URL worklist
//! - Indexing: fetch and store each worklist entry, one at a time
//!
//! Both phases share one HTTP client, so timeouts and retry policy apply
//! uniformly.

use crate::config::Config;
use crate::crawler::discovery::discover_links;
use crate::crawler::fetcher::PageFetcher;
use crate::index::{IndexReport, Indexer};
use crate::storage::{KeyValueStore, Namespace};
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// URLs in the discovery worklist
    pub discovered: usize,
    pub index: IndexReport,
    /// Documents in the store after the run
    pub total_documents: usize,
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    fetcher: PageFetcher,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - The index store the crawl writes into
    /// * `fresh` - Whether to start from an empty index (clears existing data)
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>, fresh: bool) -> Result<Self> {
        if fresh {
            tracing::info!("Clearing all namespaces for a fresh crawl");
            store.clear_all()?;
        } else {
            let existing = store.count(Namespace::UrlMapping)?;
            if existing > 0 {
                tracing::info!(
                    "Continuing existing index of {} documents; known URLs are skipped",
                    existing
                );
            }
        }

        let fetcher = PageFetcher::new(config)?;

        Ok(Self {
            config: config.clone(),
            store,
            fetcher,
        })
    }

    /// Runs discovery then indexing
    pub async fn run(&self) -> Result<CrawlReport> {
        let started = Instant::now();
        let crawler = &self.config.crawler;

        let urls = discover_links(&self.fetcher, &crawler.seed_url, crawler.url_limit).await;

        let indexer = Indexer::new(self.store.clone());
        let index = indexer.index_all(&self.fetcher, &urls).await;

        let report = CrawlReport {
            discovered: urls.len(),
            index,
            total_documents: self.store.count(Namespace::UrlMapping)?,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Crawl complete in {:.1}s: {} discovered, {} indexed, {} already indexed, {} fetch failures, {} store failures",
            report.elapsed.as_secs_f64(),
            report.discovered,
            report.index.indexed,
            report.index.already_indexed,
            report.index.fetch_failed,
            report.index.store_failed
        );

        Ok(report)
    }
}

/// Convenience function for running a complete crawl
pub async fn run_crawl(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
    fresh: bool,
) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config, store, fresh)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::test_support::test_config;
    use crate::storage::MemoryStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    #[test]
    fn test_fresh_clears_store() {
        let store = Arc::new(MemoryStore::new());
        store.put(Namespace::UrlMapping, "https://old", "0").unwrap();

        let config = test_config("https://example.com/pages/", "index.htm");
        Coordinator::new(&config, store.clone(), true).unwrap();

        assert_eq!(store.count(Namespace::UrlMapping).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_crawl_indexes_discovered_pages() {
        let server = MockServer::start().await;
        let prefix = format!("{}/pages/", server.uri());

        mount_page(
            &server,
            "/pages/index.htm",
            r#"<html><head><title>Home</title></head><body>
               <a href="a.htm">A</a> <a href="missing.htm">Gone</a> <a href="b.htm">B</a>
               welcome home</body></html>"#,
        )
        .await;
        mount_page(&server, "/pages/a.htm", "<html><body>alpha page</body></html>").await;
        mount_page(&server, "/pages/b.htm", "<html><body>beta page</body></html>").await;
        Mock::given(method("GET"))
            .and(path("/pages/missing.htm"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let config = test_config(&prefix, "index.htm");
        let report = run_crawl(&config, store.clone(), false).await.unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.index.indexed, 3);
        assert_eq!(report.total_documents, 3);
        assert_eq!(
            store
                .get(Namespace::UrlMapping, &format!("{}b.htm", prefix))
                .unwrap(),
            Some("2".to_string())
        );
    }

    #[tokio::test]
    async fn test_recrawl_skips_known_urls() {
        let server = MockServer::start().await;
        let prefix = format!("{}/pages/", server.uri());
        mount_page(
            &server,
            "/pages/index.htm",
            r#"<html><body><a href="a.htm">A</a> root</body></html>"#,
        )
        .await;
        mount_page(&server, "/pages/a.htm", "<html><body>alpha</body></html>").await;

        let store = Arc::new(MemoryStore::new());
        let config = test_config(&prefix, "index.htm");
        run_crawl(&config, store.clone(), false).await.unwrap();
        let second = run_crawl(&config, store.clone(), false).await.unwrap();

        assert_eq!(second.index.indexed, 0);
        assert_eq!(second.index.already_indexed, 2);
        assert_eq!(store.count(Namespace::UrlMapping).unwrap(), 2);
        assert_eq!(
            store.get(Namespace::Inverted, "alpha").unwrap(),
            Some("1 1 1".to_string())
        );
    }
}
