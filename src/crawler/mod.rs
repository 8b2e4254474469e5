//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Breadth-first link discovery
//! - Overall crawl coordination

mod coordinator;
mod discovery;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use discovery::{discover_links, walk};
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, FetchError, FetchedPage, PageFetcher,
};
pub use parser::{
    canonical_url, extract_date, extract_links, parse_page, resolve_link, visible_text, PageRules,
    ParsedPage,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{
        Config, CrawlerConfig, FetchConfig, QueryConfig, StorageConfig, UserAgentConfig,
    };

    /// Configuration for a site rooted at `prefix`, seeded at `prefix + seed_page`
    pub(crate) fn test_config(prefix: &str, seed_page: &str) -> Config {
        Config {
            crawler: CrawlerConfig {
                seed_url: format!("{}{}", prefix, seed_page),
                link_prefix: prefix.to_string(),
                url_limit: 300,
                date_selector: "p.right".to_string(),
            },
            fetch: FetchConfig {
                timeout_ms: 2_000,
                connect_timeout_ms: 1_000,
                retries: 0,
                retry_delay_ms: 0,
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            query: QueryConfig::default(),
            storage: StorageConfig {
                database_path: ":memory:".to_string(),
            },
        }
    }
}
