//! Statistics generation from the index store
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::storage::{KeyValueStore, Namespace, StorageResult};

/// Index statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatistics {
    /// Entry count per namespace, in schema order
    pub namespace_counts: Vec<(Namespace, usize)>,
}

impl IndexStatistics {
    pub fn count(&self, namespace: Namespace) -> usize {
        self.namespace_counts
            .iter()
            .find(|(ns, _)| *ns == namespace)
            .map_or(0, |(_, n)| *n)
    }

    pub fn documents(&self) -> usize {
        self.count(Namespace::UrlMapping)
    }

    pub fn terms(&self) -> usize {
        self.count(Namespace::WordMapping)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The storage backend to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to count a namespace
pub fn load_statistics(store: &dyn KeyValueStore) -> StorageResult<IndexStatistics> {
    let namespace_counts = Namespace::ALL
        .into_iter()
        .map(|ns| Ok((ns, store.count(ns)?)))
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(IndexStatistics { namespace_counts })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Documents indexed: {}", stats.documents());
    println!("  Distinct terms: {}", stats.terms());
    println!();

    println!("Entries by Namespace:");
    for (namespace, count) in &stats.namespace_counts {
        println!("  {:<14} {}", namespace.name(), count);
    }
}
