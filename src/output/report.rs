//! Per-document spider report
//!
//! One entry per indexed URL, in url order:
//!
//! ```text
//! <title>
//! <url>
//! <date>, <size>
//! <term> <count>; <term> <count>; ...
//! <child link>
//! ...
//! --------------------------------------------------
//! ```

use crate::storage::codec::{decode_id, decode_info, decode_links, decode_postings, decode_terms};
use crate::storage::{scan_all, DocId, KeyValueStore, Namespace, StorageError, StorageResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Line closing every report entry
pub const ENTRY_SEPARATOR: &str = "--------------------------------------------------";

/// Everything the report shows about one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpiderEntry {
    pub url: String,
    pub title: String,
    pub date: String,
    pub size: u64,

    /// Distinct terms in first-occurrence order with their counts
    pub keyword_frequency: Vec<(String, u32)>,

    pub child_links: Vec<String>,
}

/// Loads one entry per indexed URL, ordered by url
pub fn load_spider_entries(store: &dyn KeyValueStore) -> StorageResult<Vec<SpiderEntry>> {
    let urls = scan_all(store, Namespace::UrlMapping, &[], |v| {
        decode_id(Namespace::UrlMapping, v)
    })?;
    let infos = scan_all(store, Namespace::Info, &[], decode_info)?;
    let forward = scan_all(store, Namespace::Forward, &[], |v| Ok(decode_terms(v)))?;
    let links = scan_all(store, Namespace::ParentChild, &[], decode_links)?;

    // term -> docId -> count
    let mut counts: HashMap<String, HashMap<DocId, u32>> = HashMap::new();
    for (term, raw) in store.scan(Namespace::Inverted)? {
        let per_doc = decode_postings(&raw)?
            .into_iter()
            .map(|p| (p.doc_id, p.count()))
            .collect();
        counts.insert(term, per_doc);
    }

    let mut entries = Vec::with_capacity(urls.len());
    for (url, doc_id) in urls {
        let key = doc_id.to_string();
        let info = infos
            .get(&key)
            .ok_or_else(|| StorageError::corrupt(Namespace::Info, format!("no entry for {}", url)))?;

        let keyword_frequency = forward
            .get(&key)
            .map(|terms| {
                terms
                    .iter()
                    .map(|t| {
                        let n = counts
                            .get(t)
                            .and_then(|docs| docs.get(&doc_id))
                            .copied()
                            .unwrap_or(0);
                        (t.clone(), n)
                    })
                    .collect()
            })
            .unwrap_or_default();

        entries.push(SpiderEntry {
            url,
            title: info.title.clone(),
            date: info.date.clone(),
            size: info.size,
            keyword_frequency,
            child_links: links.get(&key).cloned().unwrap_or_default(),
        });
    }

    Ok(entries)
}

/// Renders one entry, separator line included
pub fn format_spider_entry(entry: &SpiderEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", entry.title);
    let _ = writeln!(out, "{}", entry.url);
    let _ = writeln!(out, "{}, {}", entry.date, entry.size);
    for (term, count) in &entry.keyword_frequency {
        let _ = write!(out, "{} {}; ", term, count);
    }
    out.push('\n');
    for link in &entry.child_links {
        let _ = writeln!(out, "{}", link);
    }
    out.push_str(ENTRY_SEPARATOR);
    out.push('\n');
    out
}

pub fn render_spider_report(entries: &[SpiderEntry]) -> String {
    entries.iter().map(format_spider_entry).collect()
}

/// Writes the report to a file
pub fn write_spider_report(entries: &[SpiderEntry], path: &Path) -> std::io::Result<()> {
    std::fs::write(path, render_spider_report(entries))?;
    tracing::info!("Wrote {} report entries to {}", entries.len(), path.display());
    Ok(())
}
