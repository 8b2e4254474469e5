//! Sumi-Index: a small positional search engine
//!
//! This crate crawls the pages reachable from a seed URL under a fixed
//! same-site prefix, builds a forward and inverted positional index in a
//! six-namespace key-value store, and ranks documents for free-text and
//! phrase queries with a TF-IDF vector model plus title and phrase bonuses.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod query;
pub mod storage;

use thiserror::Error;

/// Main error type for Sumi-Index operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sumi-Index operations
pub type Result<T> = std::result::Result<T, SearchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{discover_links, run_crawl};
pub use index::Indexer;
pub use query::{QueryProcessor, SearchResult};
pub use storage::{KeyValueStore, MemoryStore, Namespace, SqliteStore};
