//! Query module for ranking indexed documents
//!
//! This module contains:
//! - The vector-space scoring primitives
//! - The query processor that reads the index and ranks documents

mod processor;
pub mod scoring;

pub use processor::QueryProcessor;

use serde::Serialize;
use std::collections::BTreeMap;

/// One ranked document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub date: String,
    pub size: u64,

    /// Every distinct term of the document with its occurrence count
    pub keyword_frequency: BTreeMap<String, u32>,

    pub child_links: Vec<String>,
    pub score: f64,
}
