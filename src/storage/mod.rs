//! Storage module for the index namespaces
//!
//! This module handles all persistence for the search engine, including:
//! - The six key-value namespaces the crawler writes and the query engine reads
//! - Symmetric text encodings for every namespace value
//! - A SQLite backend for real crawls and an in-memory backend for tests

pub mod codec;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{scan_all, KeyValueStore, StorageError, StorageResult, WriteBatch, WriteOp};

use serde::{Deserialize, Serialize};

/// Identifier of an indexed document, in processing order
pub type DocId = u32;

/// Identifier of a distinct stemmed term, in first-seen order
pub type TermId = u32;

/// The independent key spaces of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// url → docId
    UrlMapping,
    /// term → termId
    WordMapping,
    /// docId → distinct terms on the page
    Forward,
    /// term → posting list
    Inverted,
    /// docId → title, date, size, token count
    Info,
    /// docId → outbound links
    ParentChild,
}

impl Namespace {
    /// Every namespace, in schema order
    pub const ALL: [Namespace; 6] = [
        Self::UrlMapping,
        Self::WordMapping,
        Self::Forward,
        Self::Inverted,
        Self::Info,
        Self::ParentChild,
    ];

    /// Name of the backing table / diagnostic dump
    pub fn name(&self) -> &'static str {
        match self {
            Self::UrlMapping => "url_mapping",
            Self::WordMapping => "word_mapping",
            Self::Forward => "forward",
            Self::Inverted => "inverted",
            Self::Info => "info",
            Self::ParentChild => "parent_child",
        }
    }

    /// Parses a namespace from its name
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.name() == s)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-document metadata stored in [`Namespace::Info`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    pub date: String,
    pub size: u64,
    pub token_count: u32,
}

/// One document's entry in a term's posting list
///
/// The occurrence count is `positions.len()`; positions are 1-based and
/// ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>,
}

impl Posting {
    /// Number of occurrences of the term in the document
    pub fn count(&self) -> u32 {
        self.positions.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_name_roundtrip() {
        for ns in Namespace::ALL {
            assert_eq!(Namespace::from_name(ns.name()), Some(ns));
        }
    }

    #[test]
    fn test_namespace_invalid() {
        assert_eq!(Namespace::from_name("pages"), None);
    }
}
