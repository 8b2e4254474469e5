use serde::Deserialize;

/// Main configuration structure for Sumi-Index
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub storage: StorageConfig,
}

/// Crawl scope configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root page the link walk starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Same-site prefix that relative links are resolved against
    #[serde(rename = "link-prefix")]
    pub link_prefix: String,

    /// Maximum number of URLs to discover and index
    #[serde(rename = "url-limit", default = "default_url_limit")]
    pub url_limit: usize,

    /// CSS selector whose text carries the site-specific page date
    #[serde(rename = "date-selector", default = "default_date_selector")]
    pub date_selector: String,
}

/// HTTP fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Total request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout-ms", default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Extra attempts for timeouts, connection failures and 5xx responses
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Ranking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of results returned for one query
    #[serde(rename = "query-limit", default = "default_query_limit")]
    pub query_limit: usize,

    /// Weight of the title-match bonus
    #[serde(rename = "title-match-weight", default = "default_title_match_weight")]
    pub title_match_weight: f64,

    /// Corpus size used as the numerator of idf
    #[serde(rename = "idf-base", default)]
    pub idf_base: IdfBase,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query_limit: default_query_limit(),
            title_match_weight: default_title_match_weight(),
            idf_base: IdfBase::default(),
        }
    }
}

/// Which corpus size `idf = 1 + ln(N / df)` uses for `N`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdfBase {
    /// The configured URL limit, regardless of how many pages were indexed
    #[default]
    UrlLimit,
    /// The number of documents actually present in the index
    IndexedDocuments,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_url_limit() -> usize {
    300
}

fn default_date_selector() -> String {
    "p.right".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_retries() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_query_limit() -> usize {
    50
}

fn default_title_match_weight() -> f64 {
    1.0
}
